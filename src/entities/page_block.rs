//! Page block entity - one content block of a page.
//!
//! `block_type` is stored as text so blocks of retired types still load;
//! `configuration` is the block's JSON settings object.
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Page block database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "page_blocks")]
pub struct Model {
    /// Unique identifier for the block
    #[sea_orm(primary_key)]
    pub id: i64,
    /// ID of the page owning this block
    pub page_id: i64,
    /// Block type name, e.g. `"hero"` or `"feature_grid"`
    pub block_type: String,
    /// Zero-based position within the page
    pub block_order: i32,
    /// Hidden blocks are kept but not rendered publicly
    pub is_visible: bool,
    /// Type-specific settings as a JSON object
    pub configuration: Json,
    /// When the block was created
    pub created_at: DateTimeUtc,
    /// When the block was last modified
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between PageBlock and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each block belongs to one page and is deleted with it
    #[sea_orm(
        belongs_to = "super::page::Entity",
        from = "Column::PageId",
        to = "super::page::Column::Id",
        on_delete = "Cascade"
    )]
    Page,
}

impl Related<super::page::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Page.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
