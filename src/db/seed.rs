//! Database seeding from the TOML seed file.
//!
//! Seeding is idempotent: pages whose slug exists, and articles or
//! combination rows whose article number exists, are skipped.

use crate::config::seed::{ArticleConfig, Config, PageConfig};
use crate::core::block::BlockType;
use crate::core::catalog::{Article, ArticleNumber, Money, RawCombination};
use crate::db::catalog::{get_article, insert_article, insert_combination};
use crate::db::pages::{NewBlock, NewPage, create_page};
use crate::entities::{self, VariationCombination};
use crate::errors::{Error, Result};
use sea_orm::prelude::*;
use tracing::{debug, info, instrument};

/// What a seeding run did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    /// Pages created
    pub pages_created: usize,
    /// Pages skipped because their slug exists
    pub pages_skipped: usize,
    /// Articles inserted
    pub articles_created: usize,
    /// Articles skipped because they exist
    pub articles_skipped: usize,
    /// Combination rows inserted
    pub combinations_created: usize,
    /// Combination rows skipped because they exist
    pub combinations_skipped: usize,
}

fn new_page(config: &PageConfig) -> Result<NewPage> {
    let blocks = config
        .blocks
        .iter()
        .map(|block| {
            let block_type =
                BlockType::parse(&block.block_type).ok_or_else(|| Error::Config {
                    message: format!(
                        "Unknown block type '{}' on page '{}'",
                        block.block_type, config.slug
                    ),
                })?;
            Ok(NewBlock {
                block_type,
                is_visible: block.visible,
                configuration: block.configuration.clone(),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(NewPage {
        title: config.title.clone(),
        slug: config.slug.clone(),
        publish: config.published,
        show_in_menu: config.show_in_menu,
        menu_position: config.menu_position,
        menu_label: config.menu_label.clone(),
        meta_title: config.meta_title.clone(),
        meta_description: config.meta_description.clone(),
        blocks,
    })
}

fn article(config: &ArticleConfig) -> Article {
    Article {
        article_number: ArticleNumber::new(config.article_number.trim()),
        name: config.name.clone(),
        price: Money::new(config.price, config.currency.clone()),
        images: config.images.clone(),
        manufacturer: config.manufacturer.clone(),
        attributes: config.attributes.clone(),
        is_father_article: config.is_father_article,
        father_article: config.father_article.as_deref().map(ArticleNumber::from),
    }
}

/// Seeds pages, articles and combination rows that are not stored yet.
#[instrument(skip_all)]
pub async fn seed_from_config(db: &DatabaseConnection, config: &Config) -> Result<SeedReport> {
    info!(
        "Seeding {} pages, {} articles and {} combinations",
        config.pages.len(),
        config.articles.len(),
        config.combinations.len()
    );
    let mut report = SeedReport::default();

    for page_config in &config.pages {
        let exists = entities::Page::find()
            .filter(entities::PageColumn::Slug.eq(page_config.slug.as_str()))
            .one(db)
            .await?
            .is_some();
        if exists {
            debug!("Page '{}' already exists, skipping", page_config.slug);
            report.pages_skipped += 1;
            continue;
        }
        create_page(db, new_page(page_config)?).await?;
        report.pages_created += 1;
    }

    for article_config in &config.articles {
        let article = article(article_config);
        if get_article(db, &article.article_number).await?.is_some() {
            debug!("Article {} already exists, skipping", article.article_number);
            report.articles_skipped += 1;
            continue;
        }
        insert_article(db, &article).await?;
        report.articles_created += 1;
    }

    for combination in &config.combinations {
        let number = combination.article_number.trim();
        let exists = VariationCombination::find()
            .filter(entities::VariationCombinationColumn::ArticleNumber.eq(number))
            .one(db)
            .await?
            .is_some();
        if exists {
            report.combinations_skipped += 1;
            continue;
        }
        let raw = RawCombination {
            article_number: Some(combination.article_number.clone()),
            variations: combination.variations.iter().cloned().map(Some).collect(),
        };
        insert_combination(db, &ArticleNumber::new(combination.father_article.trim()), &raw)
            .await?;
        report.combinations_created += 1;
    }

    info!("Seeding finished: {report:?}");
    Ok(report)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::db::{catalog::combinations_for, pages};
    use crate::test_utils::setup_test_db;

    const SEED: &str = r#"
        [[pages]]
        slug = "ueber-uns"
        title = "Über uns"
        published = true
        show_in_menu = true

        [[pages.blocks]]
        type = "hero"
        configuration = { title = "Willkommen" }

        [[pages.blocks]]
        type = "text"

        [[articles]]
        article_number = "GAIA2"
        name = "RINOS Gaia 2"
        price = "1299.00"
        is_father_article = true

        [[articles]]
        article_number = "GAIA2-S-M"
        name = "RINOS Gaia 2 Schwarz M"
        price = "1299.00"
        father_article = "GAIA2"

        [[combinations]]
        father_article = "GAIA2"
        article_number = "GAIA2-S-M"
        variations = [{ type = "Farbe", value = "Schwarz" }, { type = "Größe", value = "M" }]
    "#;

    #[tokio::test]
    async fn test_seed_is_idempotent() -> Result<()> {
        let db = setup_test_db().await?;
        let config: Config = toml::from_str(SEED).unwrap();

        let first = seed_from_config(&db, &config).await?;
        assert_eq!(first.pages_created, 1);
        assert_eq!(first.articles_created, 2);
        assert_eq!(first.combinations_created, 1);

        let second = seed_from_config(&db, &config).await?;
        assert_eq!(second.pages_created, 0);
        assert_eq!(second.pages_skipped, 1);
        assert_eq!(second.articles_skipped, 2);
        assert_eq!(second.combinations_skipped, 1);

        let page = pages::get_page_by_slug(&db, "ueber-uns").await?;
        assert!(page.is_published());
        assert_eq!(page.blocks.len(), 2);
        assert_eq!(page.blocks[0].configuration["title"], "Willkommen");
        // Omitted configuration falls back to the template
        assert!(page.blocks[1].configuration.contains_key("content"));

        let combinations = combinations_for(&db, &ArticleNumber::new("GAIA2")).await?;
        assert_eq!(combinations.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_seed_rejects_unknown_block_type() -> Result<()> {
        let db = setup_test_db().await?;
        let config: Config = toml::from_str(
            r#"
            [[pages]]
            slug = "alt"
            title = "Alt"

            [[pages.blocks]]
            type = "slider"
            "#,
        )
        .unwrap();

        let result = seed_from_config(&db, &config).await;
        assert!(matches!(result, Err(Error::Config { .. })));
        Ok(())
    }
}
