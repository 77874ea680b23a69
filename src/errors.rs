//! Unified error types and result handling.

use crate::core::block::BlockId;
use crate::core::page::PageId;
use thiserror::Error;

/// Every failure the storefront core and its persistence layer can report.
///
/// Unresolved variant selections and unknown block types are not errors;
/// they are ordinary return values of the resolver and the renderer.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration could not be read or parsed
    #[error("Configuration error: {message}")]
    Config {
        /// Human-readable description
        message: String,
    },

    /// Input rejected before touching any state
    #[error("Validation error: {message}")]
    Validation {
        /// Human-readable description
        message: String,
    },

    /// Underlying `SeaORM` failure
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// No page with this id or slug
    #[error("Page not found: {id}")]
    PageNotFound {
        /// Page id or slug that was looked up
        id: String,
    },

    /// The block id does not belong to the page
    #[error("Block {block_id} not found on page {page_id}")]
    BlockNotFound {
        /// Page that was searched
        page_id: PageId,
        /// Block that was requested
        block_id: BlockId,
    },

    /// Slugs are unique across all pages
    #[error("A page with slug '{slug}' already exists")]
    SlugTaken {
        /// The conflicting slug
        slug: String,
    },

    /// Public rendering was requested for a draft page
    #[error("Page '{slug}' is not published")]
    PageNotPublished {
        /// Slug of the draft page
        slug: String,
    },

    /// No article with this number in the catalog
    #[error("Article not found: {article_number}")]
    ArticleNotFound {
        /// The missing article number
        article_number: String,
    },

    /// A stored JSON column did not have the expected shape
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Integer narrowing failed (block order, prices)
    #[error("Integer conversion error: {0}")]
    IntConversion(#[from] std::num::TryFromIntError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
