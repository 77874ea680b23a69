//! Persistence layer - the database side of pages and the catalog.
//!
//! The pure operations in [`crate::core`] decide what changes; the functions
//! here load the current snapshot, apply them and write the result back.

pub mod catalog;
pub mod pages;
pub mod seed;

pub use catalog::{
    ProductView, VariantSelection, combinations_for, get_article, insert_article,
    insert_combination, leaf_articles, open_product, select_variant,
};
pub use pages::{
    MAX_PAGE_SIZE, NewBlock, NewPage, PageList, PageQuery, add_block, create_page, delete_page,
    get_page, get_page_by_slug, list_pages, menu, move_block, public_page, publish, remove_block,
    reorder_blocks, set_block_visibility, unpublish, update_block_configuration, update_page,
};
pub use seed::{SeedReport, seed_from_config};
