//! Page block model - pages as ordered block sequences.
//!
//! Every operation takes the current page snapshot and returns a new one;
//! the caller keeps the current snapshot and persists each change. After
//! every operation block `order` values are exactly `0..n` in sequence
//! order, without gaps or duplicates.

use crate::core::block::{Block, BlockId, BlockType, Configuration};
use crate::core::slug::validate_page_slug;
use crate::errors::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Identifier of a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PageId(pub i64);

impl fmt::Display for PageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Publication state; only published pages are served publicly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PublicationState {
    /// Newly created pages start here
    #[default]
    Draft,
    /// Visible to the public renderer
    Published,
}

/// Direction for [`move_block`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoveDirection {
    /// Towards order 0
    Up,
    /// Towards the end of the page
    Down,
}

/// A named, ordered document of blocks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    /// Page identifier
    pub id: PageId,
    /// Display title
    pub title: String,
    /// URL slug, immutable after creation
    pub slug: String,
    /// Draft or published
    pub publication: PublicationState,
    /// Whether the page appears in the navigation menu
    pub show_in_menu: bool,
    /// Menu sort key, lower comes first
    pub menu_position: i32,
    /// Overrides the title in the menu
    pub menu_label: Option<String>,
    /// SEO title, falls back to `title`
    pub meta_title: Option<String>,
    /// SEO description
    pub meta_description: Option<String>,
    /// Blocks in display order
    pub blocks: Vec<Block>,
}

impl Page {
    /// Creates an empty draft page after validating title and slug.
    ///
    /// # Errors
    /// Returns a validation error for an empty title or an invalid slug.
    pub fn draft(id: PageId, title: &str, slug: &str) -> Result<Self> {
        let title = title.trim();
        if title.is_empty() {
            return Err(Error::Validation {
                message: "Page title cannot be empty".to_string(),
            });
        }
        validate_page_slug(slug)?;
        Ok(Self {
            id,
            title: title.to_string(),
            slug: slug.to_string(),
            publication: PublicationState::Draft,
            show_in_menu: false,
            menu_position: 0,
            menu_label: None,
            meta_title: None,
            meta_description: None,
            blocks: Vec::new(),
        })
    }

    /// True when the public renderer may serve this page.
    #[must_use]
    pub fn is_published(&self) -> bool {
        self.publication == PublicationState::Published
    }

    /// Looks up a block by id.
    #[must_use]
    pub fn block(&self, block_id: BlockId) -> Option<&Block> {
        self.blocks.iter().find(|block| block.id == block_id)
    }

    fn position_of(&self, block_id: BlockId) -> Result<usize> {
        self.blocks
            .iter()
            .position(|block| block.id == block_id)
            .ok_or(Error::BlockNotFound {
                page_id: self.id,
                block_id,
            })
    }
}

/// Metadata patch; `None` leaves a field untouched. The slug cannot change.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageUpdate {
    /// New title
    pub title: Option<String>,
    /// New menu flag
    pub show_in_menu: Option<bool>,
    /// New menu position
    pub menu_position: Option<i32>,
    /// New menu label; `Some(None)` clears it
    pub menu_label: Option<Option<String>>,
    /// New SEO title; `Some(None)` clears it
    pub meta_title: Option<Option<String>>,
    /// New SEO description; `Some(None)` clears it
    pub meta_description: Option<Option<String>>,
}

/// One navigation menu entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuEntry {
    /// Menu label, or the page title when no label is set
    pub label: String,
    /// Target page slug
    pub slug: String,
    /// Sort key
    pub position: i32,
}

/// What the public renderer receives for a published page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublicPage {
    /// Page title
    pub title: String,
    /// Page slug
    pub slug: String,
    /// SEO title, the page title when unset
    pub meta_title: String,
    /// SEO description
    pub meta_description: Option<String>,
    /// Visible blocks only, in order
    pub blocks: Vec<Block>,
}

fn renumber(blocks: &mut [Block]) {
    for (index, block) in blocks.iter_mut().enumerate() {
        block.order = index;
    }
}

/// Id for a block created in memory: one past the largest id on the page.
#[must_use]
pub fn next_block_id(page: &Page) -> BlockId {
    BlockId(page.blocks.iter().map(|block| block.id.0).max().unwrap_or(0) + 1)
}

/// Appends a visible block of `kind` with `order = block count`.
#[must_use]
pub fn add_block(page: &Page, kind: BlockType, configuration: Configuration) -> (Page, BlockId) {
    let id = next_block_id(page);
    (push_block(page, Block::new(id, kind, 0, configuration)), id)
}

/// Appends an already identified block, fixing its order to the page end.
///
/// Used when the block id comes from storage.
#[must_use]
pub fn push_block(page: &Page, block: Block) -> Page {
    let mut updated = page.clone();
    updated.blocks.push(block);
    renumber(&mut updated.blocks);
    updated
}

/// Removes a block and closes the gap it leaves.
///
/// # Errors
/// Returns [`Error::BlockNotFound`] if the block is not on the page.
pub fn remove_block(page: &Page, block_id: BlockId) -> Result<Page> {
    let index = page.position_of(block_id)?;
    let mut updated = page.clone();
    updated.blocks.remove(index);
    renumber(&mut updated.blocks);
    Ok(updated)
}

/// Swaps a block with its neighbour. Moving past either end is a no-op.
///
/// # Errors
/// Returns [`Error::BlockNotFound`] if the block is not on the page.
pub fn move_block(page: &Page, block_id: BlockId, direction: MoveDirection) -> Result<Page> {
    let index = page.position_of(block_id)?;
    let neighbour = match direction {
        MoveDirection::Up => index.checked_sub(1),
        MoveDirection::Down => Some(index + 1).filter(|next| *next < page.blocks.len()),
    };
    let mut updated = page.clone();
    if let Some(neighbour) = neighbour {
        updated.blocks.swap(index, neighbour);
        renumber(&mut updated.blocks);
    }
    Ok(updated)
}

/// Puts the blocks into the given order.
///
/// # Errors
/// Returns a validation error unless `order` names every block of the page
/// exactly once.
pub fn reorder_blocks(page: &Page, order: &[BlockId]) -> Result<Page> {
    let unique: HashSet<BlockId> = order.iter().copied().collect();
    let is_permutation = order.len() == page.blocks.len()
        && unique.len() == order.len()
        && page.blocks.iter().all(|block| unique.contains(&block.id));
    if !is_permutation {
        return Err(Error::Validation {
            message: format!(
                "Block order for page {} must list each of its {} blocks exactly once",
                page.id,
                page.blocks.len()
            ),
        });
    }

    let mut updated = page.clone();
    updated.blocks = order
        .iter()
        .filter_map(|id| page.block(*id).cloned())
        .collect();
    renumber(&mut updated.blocks);
    Ok(updated)
}

fn with_block(page: &Page, block_id: BlockId, edit: impl FnOnce(&mut Block)) -> Result<Page> {
    let index = page.position_of(block_id)?;
    let mut updated = page.clone();
    if let Some(block) = updated.blocks.get_mut(index) {
        edit(block);
    }
    Ok(updated)
}

/// Shows or hides a block without touching its position.
///
/// # Errors
/// Returns [`Error::BlockNotFound`] if the block is not on the page.
pub fn set_visibility(page: &Page, block_id: BlockId, visible: bool) -> Result<Page> {
    with_block(page, block_id, |block| block.is_visible = visible)
}

/// Replaces a block's configuration wholesale (last write wins).
///
/// # Errors
/// Returns [`Error::BlockNotFound`] if the block is not on the page.
pub fn update_configuration(
    page: &Page,
    block_id: BlockId,
    configuration: Configuration,
) -> Result<Page> {
    with_block(page, block_id, |block| block.configuration = configuration)
}

/// Draft to published; already published pages come back unchanged.
#[must_use]
pub fn publish(page: &Page) -> Page {
    Page {
        publication: PublicationState::Published,
        ..page.clone()
    }
}

/// Published to draft; drafts come back unchanged.
#[must_use]
pub fn unpublish(page: &Page) -> Page {
    Page {
        publication: PublicationState::Draft,
        ..page.clone()
    }
}

/// Applies a metadata patch.
///
/// # Errors
/// Returns a validation error if the new title is blank.
pub fn update_details(page: &Page, update: &PageUpdate) -> Result<Page> {
    let mut updated = page.clone();
    if let Some(title) = &update.title {
        let title = title.trim();
        if title.is_empty() {
            return Err(Error::Validation {
                message: "Page title cannot be empty".to_string(),
            });
        }
        updated.title = title.to_string();
    }
    if let Some(show) = update.show_in_menu {
        updated.show_in_menu = show;
    }
    if let Some(position) = update.menu_position {
        updated.menu_position = position;
    }
    if let Some(label) = &update.menu_label {
        updated.menu_label.clone_from(label);
    }
    if let Some(meta_title) = &update.meta_title {
        updated.meta_title.clone_from(meta_title);
    }
    if let Some(meta_description) = &update.meta_description {
        updated.meta_description.clone_from(meta_description);
    }
    Ok(updated)
}

/// Navigation menu: published pages flagged for the menu, by position.
#[must_use]
pub fn menu_entries(pages: &[Page]) -> Vec<MenuEntry> {
    let mut entries: Vec<MenuEntry> = pages
        .iter()
        .filter(|page| page.is_published() && page.show_in_menu)
        .map(|page| MenuEntry {
            label: page
                .menu_label
                .clone()
                .filter(|label| !label.trim().is_empty())
                .unwrap_or_else(|| page.title.clone()),
            slug: page.slug.clone(),
            position: page.menu_position,
        })
        .collect();
    entries.sort_by_key(|entry| entry.position);
    entries
}

/// The public view of a page: visible blocks and resolved SEO title.
///
/// # Errors
/// Returns [`Error::PageNotPublished`] for drafts.
pub fn public_view(page: &Page) -> Result<PublicPage> {
    if !page.is_published() {
        return Err(Error::PageNotPublished {
            slug: page.slug.clone(),
        });
    }
    Ok(PublicPage {
        title: page.title.clone(),
        slug: page.slug.clone(),
        meta_title: page
            .meta_title
            .clone()
            .unwrap_or_else(|| page.title.clone()),
        meta_description: page.meta_description.clone(),
        blocks: page
            .blocks
            .iter()
            .filter(|block| block.is_visible)
            .cloned()
            .collect(),
    })
}

/// True when block orders are exactly `0..n` in sequence order.
#[must_use]
pub fn has_dense_order(page: &Page) -> bool {
    page.blocks
        .iter()
        .enumerate()
        .all(|(index, block)| block.order == index)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::test_page;

    fn ids(page: &Page) -> Vec<i64> {
        page.blocks.iter().map(|block| block.id.0).collect()
    }

    fn orders(page: &Page) -> Vec<usize> {
        page.blocks.iter().map(|block| block.order).collect()
    }

    #[test]
    fn test_draft_validates_input() {
        let page = Page::draft(PageId(1), " Über uns ", "ueber-uns").unwrap();
        assert_eq!(page.title, "Über uns");
        assert_eq!(page.publication, PublicationState::Draft);
        assert!(page.blocks.is_empty());

        assert!(Page::draft(PageId(1), "  ", "ok").is_err());
        assert!(Page::draft(PageId(1), "Title", "Not A Slug").is_err());
    }

    #[test]
    fn test_add_block_appends_at_end() {
        let page = test_page(&[BlockType::Hero, BlockType::Text]);
        let (updated, id) = add_block(&page, BlockType::Faq, Configuration::new());

        assert_eq!(id, BlockId(3));
        assert_eq!(updated.blocks.len(), 3);
        assert_eq!(updated.blocks[2].id, id);
        assert_eq!(updated.blocks[2].order, 2);
        assert!(updated.blocks[2].is_visible);
        // Snapshot in, snapshot out
        assert_eq!(page.blocks.len(), 2);
    }

    #[test]
    fn test_remove_block_renumbers() {
        let page = test_page(&[BlockType::Hero, BlockType::Text, BlockType::Cta]);
        let updated = remove_block(&page, BlockId(2)).unwrap();

        assert_eq!(ids(&updated), vec![1, 3]);
        assert_eq!(orders(&updated), vec![0, 1]);
    }

    #[test]
    fn test_remove_unknown_block_fails() {
        let page = test_page(&[BlockType::Hero]);
        let err = remove_block(&page, BlockId(99)).unwrap_err();
        assert!(matches!(
            err,
            Error::BlockNotFound {
                block_id: BlockId(99),
                ..
            }
        ));
    }

    #[test]
    fn test_move_block_swaps_neighbours() {
        let page = test_page(&[BlockType::Hero, BlockType::Text, BlockType::Cta]);

        let down = move_block(&page, BlockId(1), MoveDirection::Down).unwrap();
        assert_eq!(ids(&down), vec![2, 1, 3]);
        assert_eq!(orders(&down), vec![0, 1, 2]);

        let up = move_block(&page, BlockId(3), MoveDirection::Up).unwrap();
        assert_eq!(ids(&up), vec![1, 3, 2]);
    }

    #[test]
    fn test_move_block_at_boundary_is_noop() {
        let page = test_page(&[BlockType::Hero, BlockType::Text]);

        assert_eq!(move_block(&page, BlockId(1), MoveDirection::Up).unwrap(), page);
        assert_eq!(
            move_block(&page, BlockId(2), MoveDirection::Down).unwrap(),
            page
        );
        assert!(move_block(&page, BlockId(5), MoveDirection::Up).is_err());
    }

    #[test]
    fn test_reorder_blocks_requires_permutation() {
        let page = test_page(&[BlockType::Hero, BlockType::Text, BlockType::Cta]);

        let updated = reorder_blocks(&page, &[BlockId(3), BlockId(1), BlockId(2)]).unwrap();
        assert_eq!(ids(&updated), vec![3, 1, 2]);
        assert_eq!(orders(&updated), vec![0, 1, 2]);

        assert!(reorder_blocks(&page, &[BlockId(3), BlockId(1)]).is_err());
        assert!(reorder_blocks(&page, &[BlockId(1), BlockId(1), BlockId(2)]).is_err());
        assert!(reorder_blocks(&page, &[BlockId(1), BlockId(2), BlockId(9)]).is_err());
    }

    #[test]
    fn test_visibility_and_configuration() {
        let page = test_page(&[BlockType::Hero, BlockType::Text]);

        let hidden = set_visibility(&page, BlockId(2), false).unwrap();
        assert!(!hidden.blocks[1].is_visible);
        assert_eq!(orders(&hidden), orders(&page));

        let mut config = Configuration::new();
        config.insert("content".to_string(), "<p>Neu</p>".into());
        let updated = update_configuration(&hidden, BlockId(2), config.clone()).unwrap();
        assert_eq!(updated.blocks[1].configuration, config);

        assert!(set_visibility(&page, BlockId(9), true).is_err());
        assert!(update_configuration(&page, BlockId(9), config).is_err());
    }

    #[test]
    fn test_publication_is_idempotent() {
        let page = test_page(&[BlockType::Hero]);
        let published = publish(&page);
        assert!(published.is_published());
        assert_eq!(publish(&published), published);

        let draft = unpublish(&published);
        assert!(!draft.is_published());
        assert_eq!(unpublish(&draft), draft);
        assert_eq!(draft.blocks, page.blocks);
    }

    #[test]
    fn test_update_details_keeps_slug() {
        let page = test_page(&[]);
        let update = PageUpdate {
            title: Some("Kontakt".to_string()),
            menu_label: Some(Some("Hilfe".to_string())),
            meta_title: Some(None),
            ..PageUpdate::default()
        };
        let updated = update_details(&page, &update).unwrap();
        assert_eq!(updated.title, "Kontakt");
        assert_eq!(updated.menu_label.as_deref(), Some("Hilfe"));
        assert_eq!(updated.slug, page.slug);

        let blank = PageUpdate {
            title: Some(" ".to_string()),
            ..PageUpdate::default()
        };
        assert!(update_details(&page, &blank).is_err());
    }

    #[test]
    fn test_menu_entries() {
        let mut about = publish(&test_page(&[]));
        about.slug = "ueber-uns".to_string();
        about.title = "Über uns".to_string();
        about.show_in_menu = true;
        about.menu_position = 2;

        let mut contact = about.clone();
        contact.slug = "kontakt".to_string();
        contact.menu_label = Some("Kontakt".to_string());
        contact.menu_position = 1;

        let mut hidden = about.clone();
        hidden.slug = "intern".to_string();
        hidden.show_in_menu = false;

        let draft = unpublish(&about);

        let menu = menu_entries(&[about, contact, hidden, draft]);
        let labels: Vec<_> = menu.iter().map(|entry| entry.label.as_str()).collect();
        assert_eq!(labels, vec!["Kontakt", "Über uns"]);
    }

    #[test]
    fn test_public_view() {
        let page = test_page(&[BlockType::Hero, BlockType::Text, BlockType::Cta]);
        assert!(matches!(
            public_view(&page),
            Err(Error::PageNotPublished { .. })
        ));

        let page = publish(&set_visibility(&page, BlockId(2), false).unwrap());
        let view = public_view(&page).unwrap();
        assert_eq!(view.meta_title, page.title);
        assert_eq!(
            view.blocks.iter().map(|b| b.id.0).collect::<Vec<_>>(),
            vec![1, 3]
        );
    }
}
