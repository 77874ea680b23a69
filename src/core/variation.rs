//! Variation resolver - maps attribute selections to concrete articles.
//!
//! A father article exposes one [`Combination`] per purchasable leaf article.
//! Shoppers choose attribute values one at a time; the resolver looks for the
//! single combination carrying every chosen `(type, value)` pair. All functions
//! are pure and work on an already-normalized combination list, see
//! [`crate::core::catalog::canonical_combinations`].

use crate::core::catalog::ArticleNumber;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Chosen attribute values keyed by attribute type (may be partial).
pub type Selection = BTreeMap<String, String>;

/// Legal values per attribute type, values in first-seen order.
pub type VariationOptions = BTreeMap<String, Vec<String>>;

/// One `(type, value)` pair such as `Farbe = Schwarz`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VariationPair {
    /// Attribute type, e.g. `Farbe` or `Größe`
    #[serde(rename = "type")]
    pub kind: String,
    /// Attribute value, e.g. `Schwarz` or `M`
    pub value: String,
}

impl VariationPair {
    /// Creates a pair from anything string-like.
    pub fn new(kind: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            value: value.into(),
        }
    }
}

/// One point of a father article's attribute cross-product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Combination {
    /// Leaf article this combination resolves to
    pub article_number: ArticleNumber,
    /// Pairs that together identify this combination within its father
    pub variations: Vec<VariationPair>,
}

impl Combination {
    /// Builds a combination from `(type, value)` tuples.
    pub fn new<I, K, V>(article_number: impl Into<ArticleNumber>, pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            article_number: article_number.into(),
            variations: pairs
                .into_iter()
                .map(|(kind, value)| VariationPair::new(kind, value))
                .collect(),
        }
    }

    /// Value this combination carries for `kind`, if any.
    #[must_use]
    pub fn value_of(&self, kind: &str) -> Option<&str> {
        self.variations
            .iter()
            .find(|pair| pair.kind == kind)
            .map(|pair| pair.value.as_str())
    }

    /// True when every chosen pair of `selection` is carried by this combination.
    ///
    /// Attributes missing from the selection are unconstrained.
    #[must_use]
    pub fn matches(&self, selection: &Selection) -> bool {
        selection.iter().all(|(kind, value)| {
            self.variations
                .iter()
                .any(|pair| &pair.kind == kind && &pair.value == value)
        })
    }

    /// The full selection that picks exactly this combination.
    #[must_use]
    pub fn selection(&self) -> Selection {
        self.variations
            .iter()
            .map(|pair| (pair.kind.clone(), pair.value.clone()))
            .collect()
    }

    /// Order-independent identity of the variation set.
    pub(crate) fn variation_key(&self) -> Vec<VariationPair> {
        let mut key = self.variations.clone();
        key.sort();
        key.dedup();
        key
    }
}

/// Why a selection did not map to exactly one combination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnresolvedReason {
    /// No combination carries all chosen pairs
    NoMatch,
    /// More than one combination fits; the selection must be narrowed
    Ambiguous {
        /// Number of combinations that fit
        candidates: usize,
    },
}

/// Outcome of [`resolve`]. Failure to resolve is an ordinary value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Resolution {
    /// Exactly one combination matched
    Resolved {
        /// The matched leaf article
        article_number: ArticleNumber,
    },
    /// Zero or several combinations matched
    Unresolved {
        /// Which of the two
        reason: UnresolvedReason,
    },
}

impl Resolution {
    /// The resolved article number, if any.
    #[must_use]
    pub const fn article_number(&self) -> Option<&ArticleNumber> {
        match self {
            Self::Resolved { article_number } => Some(article_number),
            Self::Unresolved { .. } => None,
        }
    }

    /// Shorthand for `article_number().is_some()`.
    #[must_use]
    pub const fn is_resolved(&self) -> bool {
        matches!(self, Self::Resolved { .. })
    }
}

/// Result of [`apply_attribute_change`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeChange {
    /// The selection after the change; the changed value is always kept
    pub selection: Selection,
    /// Resolution of the new selection
    pub resolution: Resolution,
    /// Previously chosen attributes that no longer combine with the new value.
    /// Empty whenever the selection resolves.
    pub conflicts: Vec<String>,
}

/// Collects every attribute type and its distinct values across `combinations`.
#[must_use]
pub fn compute_options(combinations: &[Combination]) -> VariationOptions {
    let mut options = VariationOptions::new();
    for pair in combinations.iter().flat_map(|c| &c.variations) {
        let values = options.entry(pair.kind.clone()).or_default();
        if !values.contains(&pair.value) {
            values.push(pair.value.clone());
        }
    }
    options
}

/// Maps a (possibly partial) selection to the single matching combination.
///
/// Does not fall back to a default: an empty selection only resolves when the
/// catalog has exactly one combination. Use [`default_combination`] for the
/// designated first combination.
#[must_use]
pub fn resolve(combinations: &[Combination], selection: &Selection) -> Resolution {
    let mut matching = combinations.iter().filter(|c| c.matches(selection));
    match (matching.next(), matching.count()) {
        (None, _) => Resolution::Unresolved {
            reason: UnresolvedReason::NoMatch,
        },
        (Some(combination), 0) => Resolution::Resolved {
            article_number: combination.article_number.clone(),
        },
        (Some(_), rest) => Resolution::Unresolved {
            reason: UnresolvedReason::Ambiguous {
                candidates: rest + 1,
            },
        },
    }
}

/// Overwrites one attribute of `current` and resolves the result.
///
/// The new value is kept even when it makes the selection unresolvable, so the
/// control reflects the click; `conflicts` names the attributes the caller has
/// to ask the shopper to re-select.
#[must_use]
pub fn apply_attribute_change(
    combinations: &[Combination],
    current: &Selection,
    changed_type: &str,
    new_value: &str,
) -> AttributeChange {
    let mut selection = current.clone();
    selection.insert(changed_type.to_string(), new_value.to_string());

    let resolution = resolve(combinations, &selection);
    let conflicts = if resolution.is_resolved() {
        Vec::new()
    } else {
        conflicting_attributes(combinations, &selection, changed_type)
    };

    AttributeChange {
        selection,
        resolution,
        conflicts,
    }
}

/// The catalog's designated first combination (ordinal 0).
#[must_use]
pub fn default_combination(combinations: &[Combination]) -> Option<&Combination> {
    combinations.first()
}

/// The combination to preselect when a product page opens.
///
/// A requested variant (e.g. from a `?variant=` link) wins when it exists in
/// the catalog; otherwise the default combination is used.
#[must_use]
pub fn initial_combination<'a>(
    combinations: &'a [Combination],
    requested: Option<&str>,
) -> Option<&'a Combination> {
    requested
        .and_then(|number| {
            combinations
                .iter()
                .find(|c| c.article_number.as_str() == number)
        })
        .or_else(|| default_combination(combinations))
}

/// Values of `kind` that still resolve together with the other chosen attributes.
#[must_use]
pub fn compatible_values(
    combinations: &[Combination],
    selection: &Selection,
    kind: &str,
) -> Vec<String> {
    let mut constraints = selection.clone();
    constraints.remove(kind);

    let mut values: Vec<String> = Vec::new();
    for combination in combinations.iter().filter(|c| c.matches(&constraints)) {
        if let Some(value) = combination.value_of(kind) {
            if !values.iter().any(|v| v == value) {
                values.push(value.to_string());
            }
        }
    }
    values
}

/// Attributes of `selection` whose value never occurs together with the value
/// chosen for `changed_type`.
#[must_use]
pub fn conflicting_attributes(
    combinations: &[Combination],
    selection: &Selection,
    changed_type: &str,
) -> Vec<String> {
    let Some(changed_value) = selection.get(changed_type) else {
        return Vec::new();
    };

    selection
        .iter()
        .filter(|(kind, _)| kind.as_str() != changed_type)
        .filter(|(kind, value)| {
            let pair: Selection = [
                (changed_type.to_string(), changed_value.clone()),
                ((*kind).clone(), (*value).clone()),
            ]
            .into_iter()
            .collect();
            !combinations.iter().any(|c| c.matches(&pair))
        })
        .map(|(kind, _)| kind.clone())
        .collect()
}
