//! Article entity - catalog articles, both father articles and leaf SKUs.
//!
//! Prices are stored in minor units (`price_cents`) next to a currency code.
//! `images` is a JSON array of URLs, `attributes` a JSON object such as
//! `{"Farbe": "Schwarz", "Größe": "M"}`.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Article database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "articles")]
pub struct Model {
    /// Article number, the catalog key
    #[sea_orm(primary_key, auto_increment = false)]
    pub article_number: String,
    /// Product name
    pub name: String,
    /// Price in cents
    pub price_cents: i64,
    /// ISO currency code, e.g. `"EUR"`
    pub currency: String,
    /// Manufacturer name
    pub manufacturer: Option<String>,
    /// Father article of a leaf SKU
    pub father_article: Option<String>,
    /// Whether this article is a variation template
    pub is_father_article: bool,
    /// Image URLs in display order
    pub images: Json,
    /// Attribute name to value
    pub attributes: Json,
}

/// Articles have no modelled relations
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
