//! Shared test utilities for `RinosShop`.
//!
//! This module provides common helper functions for setting up test databases
//! and creating pages, articles and combinations with sensible defaults.

#![allow(clippy::unwrap_used)]

use crate::{
    core::{
        block::{Block, BlockId, BlockType, Configuration},
        catalog::{Article, ArticleNumber, Money, RawCombination, RawVariation},
        page::{Page, PageId},
        variation::{Combination, Selection},
    },
    db::{
        catalog::{insert_article, insert_combination},
        pages::{NewBlock, NewPage, create_page},
    },
    errors::Result,
};
use rust_decimal::Decimal;
use sea_orm::DatabaseConnection;

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Three bike variants over `Farbe` and `Größe`.
///
/// * `A1`: Schwarz, M
/// * `A2`: Schwarz, L
/// * `A3`: Weiß, M
pub fn bike_combinations() -> Vec<Combination> {
    vec![
        Combination::new("A1", [("Farbe", "Schwarz"), ("Größe", "M")]),
        Combination::new("A2", [("Farbe", "Schwarz"), ("Größe", "L")]),
        Combination::new("A3", [("Farbe", "Weiß"), ("Größe", "M")]),
    ]
}

/// Builds a selection from `(type, value)` pairs.
pub fn selection(pairs: &[(&str, &str)]) -> Selection {
    pairs
        .iter()
        .map(|(kind, value)| ((*kind).to_string(), (*value).to_string()))
        .collect()
}

/// Creates an article with sensible defaults.
///
/// # Defaults
/// * `name`: "Artikel {number}"
/// * `price`: 999.00 EUR
/// * no images, manufacturer or attributes
pub fn test_article(number: &str, is_father: bool) -> Article {
    Article {
        article_number: ArticleNumber::new(number),
        name: format!("Artikel {number}"),
        price: Money::eur(Decimal::new(99_900, 2)),
        images: Vec::new(),
        manufacturer: None,
        attributes: std::collections::BTreeMap::new(),
        is_father_article: is_father,
        father_article: None,
    }
}

/// Creates a leaf article below `father` carrying `attributes`.
pub fn test_leaf(number: &str, father: &str, attributes: &[(&str, &str)]) -> Article {
    Article {
        father_article: Some(ArticleNumber::new(father)),
        attributes: attributes
            .iter()
            .map(|(kind, value)| ((*kind).to_string(), (*value).to_string()))
            .collect(),
        ..test_article(number, false)
    }
}

/// A draft page "Test Seite" with one visible, unconfigured block per kind.
///
/// Block ids run from 1 and orders from 0.
pub fn test_page(kinds: &[BlockType]) -> Page {
    let mut page = Page::draft(PageId(1), "Test Seite", "test-seite").unwrap();
    page.blocks = kinds
        .iter()
        .enumerate()
        .map(|(index, kind)| {
            let id = i64::try_from(index).unwrap() + 1;
            Block::new(BlockId(id), *kind, index, Configuration::new())
        })
        .collect();
    page
}

/// Stores a draft page with hero, text and CTA blocks using template defaults.
pub async fn create_test_page(db: &DatabaseConnection, slug: &str) -> Result<Page> {
    let new_page = NewPage {
        blocks: vec![
            NewBlock::new(BlockType::Hero),
            NewBlock::new(BlockType::Text),
            NewBlock::new(BlockType::Cta),
        ],
        ..NewPage::new("Test Seite", slug)
    };
    create_page(db, new_page).await
}

/// Seeds the `GAIA2` bike with three variants and returns its number.
///
/// `GAIA2-S-L` costs 1349.00 EUR, everything else 1299.00 EUR. Only the
/// father carries an image.
pub async fn seed_test_catalog(db: &DatabaseConnection) -> Result<ArticleNumber> {
    let father = ArticleNumber::new("GAIA2");
    let mut gaia = test_article("GAIA2", true);
    gaia.name = "RINOS Gaia 2".to_string();
    gaia.price = Money::eur(Decimal::new(129_900, 2));
    gaia.images = vec!["/img/gaia2.jpg".to_string()];
    insert_article(db, &gaia).await?;

    let variants = [
        ("GAIA2-S-M", "Schwarz", "M", 129_900),
        ("GAIA2-S-L", "Schwarz", "L", 134_900),
        ("GAIA2-W-M", "Weiß", "M", 129_900),
    ];
    for (number, color, size, cents) in variants {
        let mut leaf = test_leaf(number, "GAIA2", &[("Farbe", color), ("Größe", size)]);
        leaf.price = Money::eur(Decimal::new(cents, 2));
        insert_article(db, &leaf).await?;

        let row = RawCombination {
            article_number: Some(number.to_string()),
            variations: vec![
                Some(RawVariation {
                    kind: Some("Farbe".to_string()),
                    value: Some(color.to_string()),
                }),
                Some(RawVariation {
                    kind: Some("Größe".to_string()),
                    value: Some(size.to_string()),
                }),
            ],
        };
        insert_combination(db, &father, &row).await?;
    }
    Ok(father)
}
