//! Catalog data model and the normalization step at the catalog boundary.
//!
//! The catalog delivers variation data in two shapes: explicit combination rows
//! (with nullable type/value slots) and, for older products, only leaf articles
//! carrying their attributes. Both are turned into one canonical
//! [`Combination`] list here so the resolver never has to know about fallbacks.

use crate::core::variation::{Combination, VariationPair};
use crate::errors::{Error, Result};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fmt;
use tracing::{debug, warn};

/// Currency used when the catalog does not name one.
pub const DEFAULT_CURRENCY: &str = "EUR";

/// Unique key of an article (SKU), e.g. `RINOS24GRX400`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArticleNumber(String);

impl ArticleNumber {
    /// Wraps a raw article number.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Borrowed view of the number.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ArticleNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ArticleNumber {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for ArticleNumber {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// A currency-tagged decimal amount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
    /// Amount in major units (euros)
    pub amount: Decimal,
    /// ISO 4217 code
    pub currency: String,
}

impl Money {
    /// Creates an amount in the given currency.
    pub fn new(amount: Decimal, currency: impl Into<String>) -> Self {
        Self {
            amount,
            currency: currency.into(),
        }
    }

    /// Creates a euro amount.
    #[must_use]
    pub fn eur(amount: Decimal) -> Self {
        Self::new(amount, DEFAULT_CURRENCY)
    }

    /// Builds an amount from minor units as stored in the database.
    pub fn from_cents(cents: i64, currency: impl Into<String>) -> Self {
        Self::new(Decimal::new(cents, 2), currency)
    }

    /// Minor units, rounded half away from zero.
    ///
    /// # Errors
    /// Returns a validation error when the amount does not fit an `i64`.
    pub fn to_cents(&self) -> Result<i64> {
        (self.amount * Decimal::ONE_HUNDRED)
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
            .to_i64()
            .ok_or_else(|| Error::Validation {
                message: format!("Price {} is out of range", self.amount),
            })
    }
}

impl fmt::Display for Money {
    /// German formatting: `1.299,00 €`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rounded = self.amount
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        let plain = format!("{:.2}", rounded.abs());
        let (whole, fraction) = plain.split_once('.').unwrap_or((plain.as_str(), "00"));

        let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
        for (i, digit) in whole.chars().enumerate() {
            if i > 0 && (whole.len() - i) % 3 == 0 {
                grouped.push('.');
            }
            grouped.push(digit);
        }

        let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
            "-"
        } else {
            ""
        };
        let symbol = if self.currency == DEFAULT_CURRENCY {
            "€"
        } else {
            self.currency.as_str()
        };
        write!(f, "{sign}{grouped},{fraction} {symbol}")
    }
}

/// A catalog article, either a father (template) or a purchasable leaf.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    /// Unique key
    pub article_number: ArticleNumber,
    /// Display name
    pub name: String,
    /// Unit price
    pub price: Money,
    /// Image URLs, primary image first
    #[serde(default)]
    pub images: Vec<String>,
    /// Brand
    #[serde(default)]
    pub manufacturer: Option<String>,
    /// Attribute values such as `Farbe -> Schwarz`
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
    /// True for templates exposing selectable variations
    #[serde(default)]
    pub is_father_article: bool,
    /// Father of a leaf article
    #[serde(default)]
    pub father_article: Option<ArticleNumber>,
}

impl Article {
    /// True for purchasable SKUs.
    #[must_use]
    pub const fn is_leaf(&self) -> bool {
        !self.is_father_article
    }

    /// First image, if any.
    #[must_use]
    pub fn primary_image(&self) -> Option<&str> {
        self.images.first().map(String::as_str)
    }
}

/// A `(type, value)` slot exactly as the catalog delivers it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawVariation {
    /// Attribute type, may be missing
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    /// Attribute value, may be missing
    #[serde(default)]
    pub value: Option<String>,
}

/// A combination row exactly as the catalog delivers it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawCombination {
    /// Leaf article, may be missing on broken rows
    #[serde(alias = "articlenr", default)]
    pub article_number: Option<String>,
    /// Slots, some of which may be null
    #[serde(default)]
    pub variations: Vec<Option<RawVariation>>,
}

/// Price, name and images to show for the current selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductDisplay {
    /// Article the cart should receive
    pub article_number: ArticleNumber,
    /// Display name
    pub name: String,
    /// Unit price
    pub price: Money,
    /// Images to show
    pub images: Vec<String>,
}

fn clean(value: Option<&String>) -> Option<String> {
    value
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Adds `combination` unless its article number or variation set is taken.
fn push_unique(
    out: &mut Vec<Combination>,
    seen_sets: &mut HashSet<Vec<VariationPair>>,
    combination: Combination,
) {
    if combination.variations.is_empty() {
        debug!(
            "Dropping combination {} without variations",
            combination.article_number
        );
        return;
    }
    if out
        .iter()
        .any(|c| c.article_number == combination.article_number)
    {
        warn!(
            "Dropping repeated combination row for {}",
            combination.article_number
        );
        return;
    }
    if !seen_sets.insert(combination.variation_key()) {
        warn!(
            "Dropping combination {}: its variation set is already used",
            combination.article_number
        );
        return;
    }
    out.push(combination);
}

fn type_set(combination: &Combination) -> BTreeSet<&str> {
    combination
        .variations
        .iter()
        .map(|pair| pair.kind.as_str())
        .collect()
}

/// Keeps only combinations carrying the attribute types most rows share.
///
/// All variants of one father expose the same types. A row that lost a slot
/// would otherwise be a subset of its siblings and could never resolve on
/// its own. Ties go to the type set seen first.
fn keep_common_types(candidates: Vec<Combination>) -> Vec<Combination> {
    let mut counts: Vec<(BTreeSet<&str>, usize)> = Vec::new();
    for candidate in candidates.iter().filter(|c| !c.variations.is_empty()) {
        let types = type_set(candidate);
        match counts.iter_mut().find(|(seen, _)| *seen == types) {
            Some((_, count)) => *count += 1,
            None => counts.push((types, 1)),
        }
    }
    let Some(common) = counts
        .iter()
        .fold(None::<&(BTreeSet<&str>, usize)>, |best, entry| match best {
            Some(best) if best.1 >= entry.1 => Some(best),
            _ => Some(entry),
        })
        .map(|(types, _)| types.iter().map(|kind| (*kind).to_string()).collect::<BTreeSet<_>>())
    else {
        return candidates;
    };

    candidates
        .into_iter()
        .filter(|candidate| {
            if candidate.variations.is_empty() {
                return true;
            }
            let matches = type_set(candidate)
                .into_iter()
                .eq(common.iter().map(String::as_str));
            if !matches {
                warn!(
                    "Dropping combination {}: attribute types {:?} differ from {:?}",
                    candidate.article_number,
                    type_set(candidate),
                    common
                );
            }
            matches
        })
        .collect()
}

/// Drops empty and repeated combinations, keeping source order.
fn dedupe(candidates: Vec<Combination>) -> Vec<Combination> {
    let mut out = Vec::with_capacity(candidates.len());
    let mut seen_sets = HashSet::new();
    for candidate in keep_common_types(candidates) {
        push_unique(&mut out, &mut seen_sets, candidate);
    }
    out
}

/// Cleans raw combination rows.
///
/// Null or blank slots are removed and rows without an article number are
/// dropped. Rows whose attribute types differ from their siblings' are
/// dropped too, and a variation set that occurs twice keeps only its first
/// row so that selection -> article stays a function. Source order is
/// preserved.
#[must_use]
pub fn normalize_combinations(raw: &[RawCombination]) -> Vec<Combination> {
    let mut candidates = Vec::with_capacity(raw.len());

    for row in raw {
        let Some(article_number) = clean(row.article_number.as_ref()) else {
            debug!("Dropping combination row without article number");
            continue;
        };
        let variations = row
            .variations
            .iter()
            .flatten()
            .filter_map(|slot| {
                Some(VariationPair::new(
                    clean(slot.kind.as_ref())?,
                    clean(slot.value.as_ref())?,
                ))
            })
            .collect();

        candidates.push(Combination {
            article_number: ArticleNumber::new(article_number),
            variations,
        });
    }
    dedupe(candidates)
}

/// Derives combinations from leaf articles' own attributes.
#[must_use]
pub fn combinations_from_leaves(leaves: &[Article]) -> Vec<Combination> {
    let mut candidates = Vec::with_capacity(leaves.len());

    for leaf in leaves.iter().filter(|a| a.is_leaf()) {
        let variations = leaf
            .attributes
            .iter()
            .filter_map(|(kind, value)| {
                Some(VariationPair::new(
                    clean(Some(kind))?,
                    clean(Some(value))?,
                ))
            })
            .collect();
        candidates.push(Combination {
            article_number: leaf.article_number.clone(),
            variations,
        });
    }
    dedupe(candidates)
}

/// The single canonical combination list for one father article.
///
/// Explicit combination rows win; leaf attributes are only used when the rows
/// yield nothing usable.
#[must_use]
pub fn canonical_combinations(raw: &[RawCombination], leaves: &[Article]) -> Vec<Combination> {
    let combinations = normalize_combinations(raw);
    if combinations.is_empty() {
        debug!("No usable combination rows, deriving combinations from leaf attributes");
        combinations_from_leaves(leaves)
    } else {
        combinations
    }
}

/// What to show for a father article and the currently resolved variant.
///
/// Without a variant the father itself is shown. A variant without images
/// keeps showing the father's images.
#[must_use]
pub fn variant_display(father: &Article, variant: Option<&Article>) -> ProductDisplay {
    let shown = variant.unwrap_or(father);
    let images = if shown.images.is_empty() {
        father.images.clone()
    } else {
        shown.images.clone()
    };

    ProductDisplay {
        article_number: shown.article_number.clone(),
        name: shown.name.clone(),
        price: shown.price.clone(),
        images,
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::core::variation::{initial_combination, resolve};
    use crate::test_utils::{test_article, test_leaf};
    use rust_decimal::Decimal;

    fn raw(article: Option<&str>, slots: &[(Option<&str>, Option<&str>)]) -> RawCombination {
        RawCombination {
            article_number: article.map(str::to_string),
            variations: slots
                .iter()
                .map(|(kind, value)| {
                    Some(RawVariation {
                        kind: kind.map(str::to_string),
                        value: value.map(str::to_string),
                    })
                })
                .collect(),
        }
    }

    #[test]
    fn test_money_german_format() {
        assert_eq!(Money::eur(Decimal::new(129_900, 2)).to_string(), "1.299,00 €");
        assert_eq!(Money::eur(Decimal::new(4_995, 2)).to_string(), "49,95 €");
        assert_eq!(Money::eur(Decimal::ZERO).to_string(), "0,00 €");
        assert_eq!(
            Money::new(Decimal::new(-123_456_789, 2), "CHF").to_string(),
            "-1.234.567,89 CHF"
        );
    }

    #[test]
    fn test_money_cents_round_trip() {
        let price = Money::from_cents(249_900, DEFAULT_CURRENCY);
        assert_eq!(price.amount, Decimal::new(2499, 0));
        assert_eq!(price.to_cents().unwrap(), 249_900);

        let odd = Money::eur(Decimal::new(10_005, 3));
        assert_eq!(odd.to_cents().unwrap(), 1001);
    }

    #[test]
    fn test_normalize_drops_null_slots_and_rows() {
        let rows = vec![
            raw(
                Some("A1"),
                &[(Some("Farbe"), Some("Schwarz")), (None, None), (Some("Größe"), Some("M"))],
            ),
            raw(None, &[(Some("Farbe"), Some("Rot"))]),
            raw(Some("A2"), &[(None, None), (Some("Größe"), Some("L")), (Some("Farbe"), Some("Weiß"))]),
        ];

        let combinations = normalize_combinations(&rows);
        assert_eq!(combinations.len(), 2);
        assert_eq!(combinations[0].article_number.as_str(), "A1");
        assert_eq!(combinations[0].variations.len(), 2);
        assert_eq!(combinations[1].value_of("Farbe"), Some("Weiß"));
    }

    #[test]
    fn test_normalize_drops_rows_missing_an_attribute_type() {
        let rows = vec![
            raw(Some("A1"), &[(Some("Farbe"), Some("Schwarz")), (Some("Größe"), Some("M"))]),
            raw(Some("A2"), &[(Some("Farbe"), Some(" ")), (Some("Größe"), Some("M"))]),
            raw(Some("A3"), &[(Some("Farbe"), Some("Weiß")), (Some("Größe"), Some("M"))]),
        ];

        let combinations = normalize_combinations(&rows);
        let numbers: Vec<_> = combinations.iter().map(|c| c.article_number.as_str()).collect();
        assert_eq!(numbers, vec!["A1", "A3"]);

        // Every remaining variant is reachable from its own full selection
        for combination in &combinations {
            let resolution = resolve(&combinations, &combination.selection());
            assert_eq!(resolution.article_number(), Some(&combination.article_number));
        }
        // A dropped variant requested by URL falls back to the first one
        let initial = initial_combination(&combinations, Some("A2")).unwrap();
        assert_eq!(initial.article_number.as_str(), "A1");
    }

    #[test]
    fn test_normalize_keeps_the_type_set_most_rows_share() {
        let rows = vec![
            raw(
                Some("ODD"),
                &[(Some("Farbe"), Some("Rot")), (Some("Größe"), Some("S")), (Some("Rahmen"), Some("48"))],
            ),
            raw(Some("A1"), &[(Some("Farbe"), Some("Schwarz")), (Some("Größe"), Some("M"))]),
            raw(Some("A2"), &[(Some("Größe"), Some("L")), (Some("Farbe"), Some("Schwarz"))]),
        ];

        let combinations = normalize_combinations(&rows);
        let numbers: Vec<_> = combinations.iter().map(|c| c.article_number.as_str()).collect();
        assert_eq!(numbers, vec!["A1", "A2"]);
    }

    #[test]
    fn test_normalize_keeps_first_of_duplicate_sets() {
        let rows = vec![
            raw(Some("A1"), &[(Some("Farbe"), Some("Schwarz")), (Some("Größe"), Some("M"))]),
            raw(Some("A9"), &[(Some("Größe"), Some("M")), (Some("Farbe"), Some("Schwarz"))]),
            raw(Some("A1"), &[(Some("Farbe"), Some("Weiß"))]),
        ];

        let combinations = normalize_combinations(&rows);
        assert_eq!(combinations.len(), 1);
        assert_eq!(combinations[0].article_number.as_str(), "A1");
    }

    #[test]
    fn test_raw_combination_accepts_catalog_field_names() {
        let json = serde_json::json!({
            "articlenr": "RINOS24GRX400-S",
            "variations": [
                {"type": "Größe", "value": "S"},
                null,
                {"type": null, "value": null}
            ]
        });
        let row: RawCombination = serde_json::from_value(json).unwrap();
        let combinations = normalize_combinations(&[row]);
        assert_eq!(combinations.len(), 1);
        assert_eq!(combinations[0].value_of("Größe"), Some("S"));
    }

    #[test]
    fn test_canonical_falls_back_to_leaf_attributes() {
        let leaves = vec![
            test_leaf("L1", "FATHER", &[("Farbe", "Schwarz"), ("Größe", "M")]),
            test_leaf("L2", "FATHER", &[("Farbe", "Schwarz"), ("Größe", "L")]),
            test_article("FATHER", true),
        ];

        let from_empty_rows = canonical_combinations(&[raw(Some("X"), &[(None, None)])], &leaves);
        assert_eq!(from_empty_rows.len(), 2);
        assert_eq!(from_empty_rows[1].value_of("Größe"), Some("L"));

        let mut partial = leaves.clone();
        partial.push(test_leaf("L3", "FATHER", &[("Farbe", "Weiß")]));
        assert_eq!(combinations_from_leaves(&partial).len(), 2);

        let explicit = canonical_combinations(
            &[raw(Some("R1"), &[(Some("Farbe"), Some("Rot"))])],
            &leaves,
        );
        assert_eq!(explicit.len(), 1);
        assert_eq!(explicit[0].article_number.as_str(), "R1");
    }

    #[test]
    fn test_variant_display_falls_back_to_father_images() {
        let mut father = test_article("FATHER", true);
        father.images = vec!["father.jpg".to_string()];
        let mut variant = test_leaf("L1", "FATHER", &[("Farbe", "Schwarz")]);
        variant.price = Money::eur(Decimal::new(199_900, 2));

        let display = variant_display(&father, Some(&variant));
        assert_eq!(display.article_number.as_str(), "L1");
        assert_eq!(display.price.amount, Decimal::new(1999, 0));
        assert_eq!(display.images, vec!["father.jpg".to_string()]);

        variant.images = vec!["black.jpg".to_string(), "black-side.jpg".to_string()];
        let display = variant_display(&father, Some(&variant));
        assert_eq!(display.images.len(), 2);
        assert_eq!(display.images[0], "black.jpg");

        let plain = variant_display(&father, None);
        assert_eq!(plain.article_number.as_str(), "FATHER");
    }
}
