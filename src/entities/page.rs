//! Page entity - CMS pages composed of ordered blocks.
//!
//! A page is created as a draft. `published_at` records the last transition
//! to published; unpublishing keeps it for reference.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Page database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "pages")]
pub struct Model {
    /// Unique identifier for the page
    #[sea_orm(primary_key)]
    pub id: i64,
    /// URL slug, unique and immutable after creation
    #[sea_orm(unique)]
    pub slug: String,
    /// Display title
    pub title: String,
    /// Whether the page is listed in the navigation menu
    pub show_in_menu: bool,
    /// Menu sort key, lower comes first
    pub menu_position: i32,
    /// Optional menu label overriding the title
    pub menu_label: Option<String>,
    /// SEO title
    pub meta_title: Option<String>,
    /// SEO description
    pub meta_description: Option<String>,
    /// Only published pages are served publicly
    pub is_published: bool,
    /// When the page was last published
    pub published_at: Option<DateTimeUtc>,
    /// When the page was created
    pub created_at: DateTimeUtc,
    /// When the page was last modified
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between Page and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One page has many blocks
    #[sea_orm(has_many = "super::page_block::Entity")]
    Blocks,
}

impl Related<super::page_block::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Blocks.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
