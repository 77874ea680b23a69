//! Variation combination entity - raw variation rows as the catalog delivers them.
//!
//! Up to three `(type, value)` slots per leaf article; any slot may be empty.
//! Rows are normalized by [`crate::core::catalog::normalize_combinations`]
//! before the resolver sees them.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Variation combination database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "variation_combinations")]
pub struct Model {
    /// Unique identifier for the row
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Father article the combination belongs to
    pub father_article: String,
    /// Leaf article this combination resolves to
    #[sea_orm(unique)]
    pub article_number: String,
    /// First attribute type
    pub variation1: Option<String>,
    /// First attribute value
    pub variation_value1: Option<String>,
    /// Second attribute type
    pub variation2: Option<String>,
    /// Second attribute value
    pub variation_value2: Option<String>,
    /// Third attribute type
    pub variation3: Option<String>,
    /// Third attribute value
    pub variation_value3: Option<String>,
}

/// Combinations have no modelled relations
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
