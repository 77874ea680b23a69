//! Page persistence - pages and their blocks in the database.
//!
//! Every mutation runs in one database transaction: the page snapshot is
//! loaded, the pure operation from [`crate::core::page`] is applied, and the
//! resulting block rows are written back. Storage therefore keeps the same
//! dense `0..n` block order as the in-memory model.

use crate::core::block::{Block, BlockId, BlockType, Configuration};
use crate::core::page::{
    self, MenuEntry, MoveDirection, Page, PageId, PageUpdate, PublicPage, PublicationState,
};
use crate::core::templates::default_configuration;
use crate::entities::{self, PageBlock, page_block};
use crate::errors::{Error, Result};
use chrono::Utc;
use sea_orm::{Condition, PaginatorTrait, QueryOrder, Set, TransactionTrait, prelude::*};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

/// A block to create together with its page.
#[derive(Debug, Clone, PartialEq)]
pub struct NewBlock {
    /// Block type
    pub block_type: BlockType,
    /// Whether the block starts visible
    pub is_visible: bool,
    /// Settings; the block template's defaults when `None`
    pub configuration: Option<Configuration>,
}

impl NewBlock {
    /// A visible block with template defaults.
    #[must_use]
    pub const fn new(block_type: BlockType) -> Self {
        Self {
            block_type,
            is_visible: true,
            configuration: None,
        }
    }
}

/// Largest result page of [`list_pages`].
pub const MAX_PAGE_SIZE: u64 = 100;

/// Filters and paging for [`list_pages`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PageQuery {
    /// Substring of title or slug, ignoring ASCII case
    pub search: Option<String>,
    /// Only published pages
    pub published_only: bool,
    /// One-based result page number
    pub page: u64,
    /// Pages per result page, 1 to [`MAX_PAGE_SIZE`]
    pub page_size: u64,
}

impl Default for PageQuery {
    fn default() -> Self {
        Self {
            search: None,
            published_only: false,
            page: 1,
            page_size: 20,
        }
    }
}

/// Everything needed to create a page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewPage {
    /// Display title
    pub title: String,
    /// URL slug
    pub slug: String,
    /// Publish immediately instead of starting as a draft
    pub publish: bool,
    /// List in the navigation menu
    pub show_in_menu: bool,
    /// Menu sort key
    pub menu_position: i32,
    /// Menu label override
    pub menu_label: Option<String>,
    /// SEO title
    pub meta_title: Option<String>,
    /// SEO description
    pub meta_description: Option<String>,
    /// Initial blocks in page order
    pub blocks: Vec<NewBlock>,
}

impl NewPage {
    /// A draft page without blocks.
    pub fn new(title: impl Into<String>, slug: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            slug: slug.into(),
            ..Self::default()
        }
    }
}

fn block_from_model(model: page_block::Model) -> Result<Block> {
    let configuration = match model.configuration {
        Value::Object(map) => map,
        Value::Null => Configuration::new(),
        other => {
            warn!(
                "Block {} has non-object configuration {other}, using empty settings",
                model.id
            );
            Configuration::new()
        }
    };
    Ok(Block {
        id: BlockId(model.id),
        block_type: model.block_type,
        order: usize::try_from(model.block_order)?,
        is_visible: model.is_visible,
        configuration,
    })
}

fn page_from_models(model: entities::PageModel, blocks: Vec<page_block::Model>) -> Result<Page> {
    let mut blocks = blocks
        .into_iter()
        .map(block_from_model)
        .collect::<Result<Vec<_>>>()?;
    blocks.sort_by_key(|block| (block.order, block.id));

    let mut page = Page {
        id: PageId(model.id),
        title: model.title,
        slug: model.slug,
        publication: if model.is_published {
            PublicationState::Published
        } else {
            PublicationState::Draft
        },
        show_in_menu: model.show_in_menu,
        menu_position: model.menu_position,
        menu_label: model.menu_label,
        meta_title: model.meta_title,
        meta_description: model.meta_description,
        blocks,
    };
    if !page::has_dense_order(&page) {
        warn!("Page {} has gaps in its block order, renumbering", page.id);
        for (index, block) in page.blocks.iter_mut().enumerate() {
            block.order = index;
        }
    }
    Ok(page)
}

async fn find_page_model<C>(db: &C, page_id: PageId) -> Result<entities::PageModel>
where
    C: ConnectionTrait,
{
    entities::Page::find_by_id(page_id.0)
        .one(db)
        .await?
        .ok_or_else(|| Error::PageNotFound {
            id: page_id.to_string(),
        })
}

async fn hydrate<C>(db: &C, model: entities::PageModel) -> Result<Page>
where
    C: ConnectionTrait,
{
    let blocks = PageBlock::find()
        .filter(page_block::Column::PageId.eq(model.id))
        .order_by_asc(page_block::Column::BlockOrder)
        .order_by_asc(page_block::Column::Id)
        .all(db)
        .await?;
    page_from_models(model, blocks)
}

async fn load_page<C>(db: &C, page_id: PageId) -> Result<Page>
where
    C: ConnectionTrait,
{
    let model = find_page_model(db, page_id).await?;
    hydrate(db, model).await
}

/// Writes the block state of `page` back: changed rows are updated and rows
/// no longer on the page are deleted.
async fn sync_blocks<C>(db: &C, page: &Page) -> Result<()>
where
    C: ConnectionTrait,
{
    let stored = PageBlock::find()
        .filter(page_block::Column::PageId.eq(page.id.0))
        .all(db)
        .await?;
    let now = Utc::now();

    for model in stored {
        let Some(block) = page.block(BlockId(model.id)) else {
            debug!("Deleting block {} from page {}", model.id, page.id);
            PageBlock::delete_by_id(model.id).exec(db).await?;
            continue;
        };

        let order = i32::try_from(block.order)?;
        let configuration = Value::Object(block.configuration.clone());
        if model.block_order == order
            && model.is_visible == block.is_visible
            && model.configuration == configuration
        {
            continue;
        }

        let mut active_model: page_block::ActiveModel = model.into();
        active_model.block_order = Set(order);
        active_model.is_visible = Set(block.is_visible);
        active_model.configuration = Set(configuration);
        active_model.updated_at = Set(now);
        active_model.update(db).await?;
    }
    Ok(())
}

async fn touch_page<C>(db: &C, page_id: PageId) -> Result<()>
where
    C: ConnectionTrait,
{
    let mut active_model: entities::page::ActiveModel =
        find_page_model(db, page_id).await?.into();
    active_model.updated_at = Set(Utc::now());
    active_model.update(db).await?;
    Ok(())
}

async fn insert_block<C>(
    db: &C,
    page_id: PageId,
    block_type: BlockType,
    order: usize,
    is_visible: bool,
    configuration: Configuration,
) -> Result<page_block::Model>
where
    C: ConnectionTrait,
{
    let now = Utc::now();
    let block = page_block::ActiveModel {
        page_id: Set(page_id.0),
        block_type: Set(block_type.as_str().to_string()),
        block_order: Set(i32::try_from(order)?),
        is_visible: Set(is_visible),
        configuration: Set(Value::Object(configuration)),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    Ok(block.insert(db).await?)
}

/// Loads a page, applies `operation` to it and persists the result.
async fn apply<F>(db: &DatabaseConnection, page_id: PageId, operation: F) -> Result<Page>
where
    F: FnOnce(&Page) -> Result<Page>,
{
    let txn = db.begin().await?;
    let before = load_page(&txn, page_id).await?;
    let after = operation(&before)?;

    sync_blocks(&txn, &after).await?;
    if after != before {
        touch_page(&txn, page_id).await?;
    }

    txn.commit().await?;
    Ok(after)
}

/// Creates a page with optional initial blocks, numbered `0..n`.
///
/// The slug is validated and must not be used by another page.
pub async fn create_page(db: &DatabaseConnection, new_page: NewPage) -> Result<Page> {
    // Validates title and slug
    let draft = Page::draft(PageId(0), &new_page.title, &new_page.slug)?;

    let txn = db.begin().await?;
    let taken = entities::Page::find()
        .filter(entities::PageColumn::Slug.eq(draft.slug.as_str()))
        .one(&txn)
        .await?
        .is_some();
    if taken {
        return Err(Error::SlugTaken { slug: draft.slug });
    }

    let now = Utc::now();
    let page = entities::page::ActiveModel {
        slug: Set(draft.slug),
        title: Set(draft.title),
        show_in_menu: Set(new_page.show_in_menu),
        menu_position: Set(new_page.menu_position),
        menu_label: Set(new_page.menu_label),
        meta_title: Set(new_page.meta_title),
        meta_description: Set(new_page.meta_description),
        is_published: Set(new_page.publish),
        published_at: Set(new_page.publish.then_some(now)),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    let page = page.insert(&txn).await?;
    let page_id = PageId(page.id);

    for (order, block) in new_page.blocks.into_iter().enumerate() {
        let configuration = block
            .configuration
            .unwrap_or_else(|| default_configuration(block.block_type));
        insert_block(
            &txn,
            page_id,
            block.block_type,
            order,
            block.is_visible,
            configuration,
        )
        .await?;
    }

    let created = hydrate(&txn, page).await?;
    txn.commit().await?;

    info!(
        "Created page '{}' ({}) with {} blocks",
        created.slug,
        created.id,
        created.blocks.len()
    );
    Ok(created)
}

/// Loads a page with its blocks.
pub async fn get_page(db: &DatabaseConnection, page_id: PageId) -> Result<Page> {
    load_page(db, page_id).await
}

/// Loads a page by slug.
pub async fn get_page_by_slug(db: &DatabaseConnection, slug: &str) -> Result<Page> {
    let model = entities::Page::find()
        .filter(entities::PageColumn::Slug.eq(slug))
        .one(db)
        .await?
        .ok_or_else(|| Error::PageNotFound {
            id: slug.to_string(),
        })?;
    hydrate(db, model).await
}

async fn all_pages(db: &DatabaseConnection) -> Result<Vec<Page>> {
    let models = entities::Page::find()
        .order_by_asc(entities::PageColumn::Id)
        .all(db)
        .await?;

    let mut pages = Vec::with_capacity(models.len());
    for model in models {
        pages.push(hydrate(db, model).await?);
    }
    Ok(pages)
}

/// One result page of the admin page list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageList {
    /// Pages on this result page, with their blocks
    pub pages: Vec<Page>,
    /// Pages matching the filters
    pub total: u64,
    /// One-based result page number
    pub page: u64,
    /// Pages per result page
    pub page_size: u64,
    /// Result pages needed for `total`
    pub total_pages: u64,
}

/// Lists pages for the admin panel.
///
/// Pages are ordered by menu position, newest first within one position.
/// `page` and `page_size` are clamped to their valid ranges.
pub async fn list_pages(db: &DatabaseConnection, query: &PageQuery) -> Result<PageList> {
    let page_size = query.page_size.clamp(1, MAX_PAGE_SIZE);
    let page_number = query.page.max(1);

    let mut select = entities::Page::find();
    if let Some(term) = query.search.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
        // SQLite's LIKE ignores ASCII case
        select = select.filter(
            Condition::any()
                .add(entities::PageColumn::Title.contains(term))
                .add(entities::PageColumn::Slug.contains(term)),
        );
    }
    if query.published_only {
        select = select.filter(entities::PageColumn::IsPublished.eq(true));
    }

    let paginator = select
        .order_by_asc(entities::PageColumn::MenuPosition)
        .order_by_desc(entities::PageColumn::CreatedAt)
        .order_by_desc(entities::PageColumn::Id)
        .paginate(db, page_size);
    let totals = paginator.num_items_and_pages().await?;
    let models = paginator.fetch_page(page_number - 1).await?;

    let mut pages = Vec::with_capacity(models.len());
    for model in models {
        pages.push(hydrate(db, model).await?);
    }
    debug!(
        "Listed {} of {} pages (result page {page_number})",
        pages.len(),
        totals.number_of_items
    );
    Ok(PageList {
        pages,
        total: totals.number_of_items,
        page: page_number,
        page_size,
        total_pages: totals.number_of_pages,
    })
}

/// Applies a metadata patch. The slug never changes.
pub async fn update_page(
    db: &DatabaseConnection,
    page_id: PageId,
    update: &PageUpdate,
) -> Result<Page> {
    let txn = db.begin().await?;
    let model = find_page_model(&txn, page_id).await?;
    let before = hydrate(&txn, model.clone()).await?;
    let after = page::update_details(&before, update)?;

    let mut active_model: entities::page::ActiveModel = model.into();
    active_model.title = Set(after.title.clone());
    active_model.show_in_menu = Set(after.show_in_menu);
    active_model.menu_position = Set(after.menu_position);
    active_model.menu_label = Set(after.menu_label.clone());
    active_model.meta_title = Set(after.meta_title.clone());
    active_model.meta_description = Set(after.meta_description.clone());
    active_model.updated_at = Set(Utc::now());
    active_model.update(&txn).await?;

    txn.commit().await?;
    Ok(after)
}

/// Deletes a page together with all of its blocks.
pub async fn delete_page(db: &DatabaseConnection, page_id: PageId) -> Result<()> {
    let txn = db.begin().await?;
    let model = find_page_model(&txn, page_id).await?;

    let removed = PageBlock::delete_many()
        .filter(page_block::Column::PageId.eq(model.id))
        .exec(&txn)
        .await?;
    entities::Page::delete_by_id(model.id).exec(&txn).await?;
    txn.commit().await?;

    info!(
        "Deleted page '{}' and {} blocks",
        model.slug, removed.rows_affected
    );
    Ok(())
}

/// Appends a block; `configuration` defaults to the block template.
///
/// Returns the updated page and the id storage assigned to the new block.
pub async fn add_block(
    db: &DatabaseConnection,
    page_id: PageId,
    block_type: BlockType,
    configuration: Option<Configuration>,
) -> Result<(Page, BlockId)> {
    let configuration = configuration.unwrap_or_else(|| default_configuration(block_type));

    let txn = db.begin().await?;
    let before = load_page(&txn, page_id).await?;
    let inserted = insert_block(
        &txn,
        page_id,
        block_type,
        before.blocks.len(),
        true,
        configuration.clone(),
    )
    .await?;

    let block_id = BlockId(inserted.id);
    let after = page::push_block(&before, Block::new(block_id, block_type, 0, configuration));
    sync_blocks(&txn, &after).await?;
    touch_page(&txn, page_id).await?;
    txn.commit().await?;

    debug!("Added {block_type} block {block_id} to page {page_id}");
    Ok((after, block_id))
}

/// Removes a block and closes the gap in the order.
pub async fn remove_block(
    db: &DatabaseConnection,
    page_id: PageId,
    block_id: BlockId,
) -> Result<Page> {
    apply(db, page_id, |current| page::remove_block(current, block_id)).await
}

/// Swaps a block with its neighbour; a no-op at either end.
pub async fn move_block(
    db: &DatabaseConnection,
    page_id: PageId,
    block_id: BlockId,
    direction: MoveDirection,
) -> Result<Page> {
    apply(db, page_id, |current| {
        page::move_block(current, block_id, direction)
    })
    .await
}

/// Puts all blocks of the page into the given order.
pub async fn reorder_blocks(
    db: &DatabaseConnection,
    page_id: PageId,
    order: &[BlockId],
) -> Result<Page> {
    apply(db, page_id, |current| page::reorder_blocks(current, order)).await
}

/// Shows or hides a block.
pub async fn set_block_visibility(
    db: &DatabaseConnection,
    page_id: PageId,
    block_id: BlockId,
    visible: bool,
) -> Result<Page> {
    apply(db, page_id, |current| {
        page::set_visibility(current, block_id, visible)
    })
    .await
}

/// Replaces a block's configuration (last write wins).
pub async fn update_block_configuration(
    db: &DatabaseConnection,
    page_id: PageId,
    block_id: BlockId,
    configuration: Configuration,
) -> Result<Page> {
    apply(db, page_id, |current| {
        page::update_configuration(current, block_id, configuration)
    })
    .await
}

async fn set_publication(
    db: &DatabaseConnection,
    page_id: PageId,
    transition: fn(&Page) -> Page,
) -> Result<Page> {
    let txn = db.begin().await?;
    let model = find_page_model(&txn, page_id).await?;
    let before = hydrate(&txn, model.clone()).await?;
    let after = transition(&before);

    if after.publication != before.publication {
        let now = Utc::now();
        let mut active_model: entities::page::ActiveModel = model.into();
        active_model.is_published = Set(after.is_published());
        if after.is_published() {
            active_model.published_at = Set(Some(now));
        }
        active_model.updated_at = Set(now);
        active_model.update(&txn).await?;
        info!("Page '{}' is now {:?}", after.slug, after.publication);
    }

    txn.commit().await?;
    Ok(after)
}

/// Publishes a draft. Publishing a published page changes nothing.
pub async fn publish(db: &DatabaseConnection, page_id: PageId) -> Result<Page> {
    set_publication(db, page_id, page::publish).await
}

/// Takes a page back to draft. Unpublishing a draft changes nothing.
pub async fn unpublish(db: &DatabaseConnection, page_id: PageId) -> Result<Page> {
    set_publication(db, page_id, page::unpublish).await
}

/// The public view of a published page.
///
/// Drafts are reported as [`Error::PageNotPublished`].
pub async fn public_page(db: &DatabaseConnection, slug: &str) -> Result<PublicPage> {
    let page = get_page_by_slug(db, slug).await?;
    page::public_view(&page)
}

/// The navigation menu built from all published menu pages.
pub async fn menu(db: &DatabaseConnection) -> Result<Vec<MenuEntry>> {
    let pages = all_pages(db).await?;
    Ok(page::menu_entries(&pages))
}

/// When a page was last published, if ever.
pub async fn published_at(
    db: &DatabaseConnection,
    page_id: PageId,
) -> Result<Option<chrono::DateTime<Utc>>> {
    Ok(find_page_model(db, page_id).await?.published_at)
}
