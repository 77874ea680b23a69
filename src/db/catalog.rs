//! Catalog persistence - articles, variation rows and variant selection.

use crate::core::catalog::{
    Article, ArticleNumber, Money, ProductDisplay, RawCombination, RawVariation,
    canonical_combinations, variant_display,
};
use crate::core::variation::{
    self, Combination, Resolution, Selection, VariationOptions, compute_options,
};
use crate::entities::{self, VariationCombination, article, variation_combination};
use crate::errors::{Error, Result};
use sea_orm::{QueryOrder, Set, prelude::*};
use serde::Serialize;
use tracing::{debug, warn};

/// Variation slots a combination row can hold.
pub const MAX_VARIATION_SLOTS: usize = 3;

fn article_from_model(model: article::Model) -> Result<Article> {
    Ok(Article {
        article_number: ArticleNumber::new(model.article_number),
        name: model.name,
        price: Money::from_cents(model.price_cents, model.currency),
        images: serde_json::from_value(model.images)?,
        manufacturer: model.manufacturer,
        attributes: serde_json::from_value(model.attributes)?,
        is_father_article: model.is_father_article,
        father_article: model.father_article.map(ArticleNumber::new),
    })
}

fn raw_from_model(model: variation_combination::Model) -> RawCombination {
    let slot = |kind: Option<String>, value: Option<String>| {
        (kind.is_some() || value.is_some()).then_some(RawVariation { kind, value })
    };
    RawCombination {
        article_number: Some(model.article_number),
        variations: vec![
            slot(model.variation1, model.variation_value1),
            slot(model.variation2, model.variation_value2),
            slot(model.variation3, model.variation_value3),
        ],
    }
}

/// Inserts an article.
pub async fn insert_article(db: &DatabaseConnection, article: &Article) -> Result<()> {
    let model = article::ActiveModel {
        article_number: Set(article.article_number.as_str().to_string()),
        name: Set(article.name.clone()),
        price_cents: Set(article.price.to_cents()?),
        currency: Set(article.price.currency.clone()),
        manufacturer: Set(article.manufacturer.clone()),
        father_article: Set(article
            .father_article
            .as_ref()
            .map(|father| father.as_str().to_string())),
        is_father_article: Set(article.is_father_article),
        images: Set(serde_json::to_value(&article.images)?),
        attributes: Set(serde_json::to_value(&article.attributes)?),
    };
    entities::Article::insert(model).exec(db).await?;
    debug!("Inserted article {}", article.article_number);
    Ok(())
}

/// Finds an article by number, returning None if it does not exist.
pub async fn get_article(
    db: &DatabaseConnection,
    article_number: &ArticleNumber,
) -> Result<Option<Article>> {
    entities::Article::find_by_id(article_number.as_str())
        .one(db)
        .await?
        .map(article_from_model)
        .transpose()
}

async fn require_article(
    db: &DatabaseConnection,
    article_number: &ArticleNumber,
) -> Result<Article> {
    get_article(db, article_number)
        .await?
        .ok_or_else(|| Error::ArticleNotFound {
            article_number: article_number.to_string(),
        })
}

/// All leaf articles of a father article, by article number.
pub async fn leaf_articles(
    db: &DatabaseConnection,
    father: &ArticleNumber,
) -> Result<Vec<Article>> {
    entities::Article::find()
        .filter(entities::ArticleColumn::FatherArticle.eq(father.as_str()))
        .filter(entities::ArticleColumn::IsFatherArticle.eq(false))
        .order_by_asc(entities::ArticleColumn::ArticleNumber)
        .all(db)
        .await?
        .into_iter()
        .map(article_from_model)
        .collect()
}

/// Stores a raw combination row for `father`.
///
/// Missing slots are stored as NULL; cleaning happens when reading.
pub async fn insert_combination(
    db: &DatabaseConnection,
    father: &ArticleNumber,
    combination: &RawCombination,
) -> Result<()> {
    let article_number = combination
        .article_number
        .as_deref()
        .map(str::trim)
        .filter(|number| !number.is_empty())
        .ok_or_else(|| Error::Validation {
            message: format!("Combination for {father} has no article number"),
        })?;
    if combination.variations.len() > MAX_VARIATION_SLOTS {
        return Err(Error::Validation {
            message: format!(
                "Combination {article_number} has {} variations, at most {MAX_VARIATION_SLOTS} are stored",
                combination.variations.len()
            ),
        });
    }

    let slot = |index: usize| {
        let variation = combination.variations.get(index).cloned().flatten();
        let (kind, value) = variation.map_or((None, None), |v| (v.kind, v.value));
        (Set(kind), Set(value))
    };
    let (variation1, variation_value1) = slot(0);
    let (variation2, variation_value2) = slot(1);
    let (variation3, variation_value3) = slot(2);

    let model = variation_combination::ActiveModel {
        father_article: Set(father.as_str().to_string()),
        article_number: Set(article_number.to_string()),
        variation1,
        variation_value1,
        variation2,
        variation_value2,
        variation3,
        variation_value3,
        ..Default::default()
    };
    model.insert(db).await?;
    Ok(())
}

/// Raw combination rows of a father article in insertion order.
pub async fn raw_combinations(
    db: &DatabaseConnection,
    father: &ArticleNumber,
) -> Result<Vec<RawCombination>> {
    Ok(VariationCombination::find()
        .filter(variation_combination::Column::FatherArticle.eq(father.as_str()))
        .order_by_asc(variation_combination::Column::Id)
        .all(db)
        .await?
        .into_iter()
        .map(raw_from_model)
        .collect())
}

/// The canonical combination list of a father article.
///
/// Stored rows are normalized; when none are usable the leaf articles'
/// attributes are used instead.
pub async fn combinations_for(
    db: &DatabaseConnection,
    father: &ArticleNumber,
) -> Result<Vec<Combination>> {
    let raw = raw_combinations(db, father).await?;
    let leaves = leaf_articles(db, father).await?;
    let combinations = canonical_combinations(&raw, &leaves);
    if combinations.is_empty() {
        debug!("Article {father} has no variations");
    }
    Ok(combinations)
}

/// Outcome of a variant selection on a product page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VariantSelection {
    /// The selection as chosen
    pub selection: Selection,
    /// Whether it names exactly one article
    pub resolution: Resolution,
    /// What to show: the resolved variant, or the father while unresolved
    pub display: ProductDisplay,
}

/// Everything a product page needs on first load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductView {
    /// Legal values per attribute
    pub options: VariationOptions,
    /// Canonical combinations
    pub combinations: Vec<Combination>,
    /// Initially selected variant
    pub current: VariantSelection,
}

async fn display_for(
    db: &DatabaseConnection,
    father: &Article,
    resolution: &Resolution,
) -> Result<ProductDisplay> {
    let variant = match resolution.article_number() {
        Some(number) => {
            let variant = get_article(db, number).await?;
            if variant.is_none() {
                warn!("Combination points to missing article {number}");
            }
            variant
        }
        None => None,
    };
    Ok(variant_display(father, variant.as_ref()))
}

/// Resolves `selection` for a father article and looks up price and images.
///
/// An unresolved selection is a normal result; the father is shown then.
pub async fn select_variant(
    db: &DatabaseConnection,
    father_number: &ArticleNumber,
    selection: Selection,
) -> Result<VariantSelection> {
    let father = require_article(db, father_number).await?;
    let combinations = combinations_for(db, father_number).await?;
    let resolution = variation::resolve(&combinations, &selection);
    let display = display_for(db, &father, &resolution).await?;

    Ok(VariantSelection {
        selection,
        resolution,
        display,
    })
}

/// Opens a product page, preselecting `requested` (the `?variant=`
/// parameter) or the first combination.
pub async fn open_product(
    db: &DatabaseConnection,
    father_number: &ArticleNumber,
    requested: Option<&str>,
) -> Result<ProductView> {
    let father = require_article(db, father_number).await?;
    let combinations = combinations_for(db, father_number).await?;
    let selection = variation::initial_combination(&combinations, requested)
        .map(Combination::selection)
        .unwrap_or_default();
    let resolution = if combinations.is_empty() {
        Resolution::Resolved {
            article_number: father.article_number.clone(),
        }
    } else {
        variation::resolve(&combinations, &selection)
    };
    let display = display_for(db, &father, &resolution).await?;

    Ok(ProductView {
        options: compute_options(&combinations),
        combinations,
        current: VariantSelection {
            selection,
            resolution,
            display,
        },
    })
}
