//! Seed data loading from config.toml
//!
//! This module loads the pages, catalog articles and variation combinations
//! declared in a TOML file. They seed the database on first run; entries
//! that already exist are left alone (see [`crate::db::seed`]).

use crate::core::block::Configuration;
use crate::core::catalog::{DEFAULT_CURRENCY, RawVariation};
use crate::errors::{Error, Result};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

/// Seed file used when `SEED_CONFIG` is not set.
pub const DEFAULT_SEED_PATH: &str = "config.toml";

/// Configuration structure representing the entire seed file
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// CMS pages to create
    #[serde(default)]
    pub pages: Vec<PageConfig>,
    /// Catalog articles to insert
    #[serde(default)]
    pub articles: Vec<ArticleConfig>,
    /// Variation rows to insert
    #[serde(default)]
    pub combinations: Vec<CombinationConfig>,
}

/// Configuration for a single page
#[derive(Debug, Deserialize, Clone)]
pub struct PageConfig {
    /// URL slug
    pub slug: String,
    /// Page title
    pub title: String,
    /// Publish right away
    #[serde(default)]
    pub published: bool,
    /// List in the navigation menu
    #[serde(default)]
    pub show_in_menu: bool,
    /// Menu sort key
    #[serde(default)]
    pub menu_position: i32,
    /// Menu label override
    pub menu_label: Option<String>,
    /// SEO title
    pub meta_title: Option<String>,
    /// SEO description
    pub meta_description: Option<String>,
    /// Blocks in page order
    #[serde(default)]
    pub blocks: Vec<BlockConfig>,
}

const fn visible_by_default() -> bool {
    true
}

/// Configuration for a single block of a page
#[derive(Debug, Deserialize, Clone)]
pub struct BlockConfig {
    /// Block type name, e.g. `"hero"`
    #[serde(rename = "type")]
    pub block_type: String,
    /// Whether the block is shown
    #[serde(default = "visible_by_default")]
    pub visible: bool,
    /// Settings; the block template's defaults when omitted
    pub configuration: Option<Configuration>,
}

fn default_currency() -> String {
    DEFAULT_CURRENCY.to_string()
}

/// Configuration for a single catalog article
#[derive(Debug, Deserialize, Clone)]
pub struct ArticleConfig {
    /// Article number
    pub article_number: String,
    /// Product name
    pub name: String,
    /// Unit price, e.g. `"1299.00"`
    pub price: Decimal,
    /// ISO currency code
    #[serde(default = "default_currency")]
    pub currency: String,
    /// Manufacturer name
    pub manufacturer: Option<String>,
    /// Father article of a leaf SKU
    pub father_article: Option<String>,
    /// Whether this article is a variation template
    #[serde(default)]
    pub is_father_article: bool,
    /// Image URLs
    #[serde(default)]
    pub images: Vec<String>,
    /// Attribute values
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
}

/// Configuration for a single variation combination row
#[derive(Debug, Deserialize, Clone)]
pub struct CombinationConfig {
    /// Father article
    pub father_article: String,
    /// Leaf article the row resolves to
    pub article_number: String,
    /// Up to three `(type, value)` slots
    #[serde(default)]
    pub variations: Vec<RawVariation>,
}

/// Loads seed configuration from a TOML file
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid
/// - Required fields are missing
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config> {
    let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| Error::Config {
        message: format!(
            "Failed to read seed file {}: {e}",
            path.as_ref().display()
        ),
    })?;

    toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse {}: {e}", path.as_ref().display()),
    })
}

/// Path of the seed file: `SEED_CONFIG`, or `config.toml`.
#[must_use]
pub fn seed_path() -> String {
    std::env::var("SEED_CONFIG").unwrap_or_else(|_| DEFAULT_SEED_PATH.to_string())
}

/// Loads seed configuration from the default location
pub fn load_default_config() -> Result<Config> {
    load_config(seed_path())
}
