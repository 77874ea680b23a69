//! URL slugs for pages, products and categories.

use crate::errors::{Error, Result};
use regex::Regex;
use std::sync::LazyLock;

#[allow(clippy::expect_used)]
static PAGE_SLUG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)*$").expect("valid regex"));

#[allow(clippy::expect_used)]
static ARTICLE_NUMBER_SEGMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^[a-z]+\d+[a-z]*\d*$").expect("valid regex"));

/// Longest slug accepted for a page.
pub const MAX_SLUG_LEN: usize = 255;

/// Checks that `slug` is usable as a page URL segment.
///
/// Slugs are lowercase ASCII letters and digits separated by single hyphens.
///
/// # Errors
/// Returns a validation error describing the first problem found.
pub fn validate_page_slug(slug: &str) -> Result<()> {
    if slug.is_empty() {
        return Err(Error::Validation {
            message: "Slug cannot be empty".to_string(),
        });
    }
    if slug.len() > MAX_SLUG_LEN {
        return Err(Error::Validation {
            message: format!("Slug is longer than {MAX_SLUG_LEN} characters"),
        });
    }
    if !PAGE_SLUG.is_match(slug) {
        return Err(Error::Validation {
            message: format!(
                "Invalid slug '{slug}': use lowercase letters, digits and single hyphens"
            ),
        });
    }
    Ok(())
}

fn fold_char(c: char) -> Option<char> {
    let folded = match c {
        'ä' | 'à' | 'á' | 'â' | 'ã' | 'å' => 'a',
        'ö' | 'ò' | 'ó' | 'ô' | 'õ' => 'o',
        'ü' | 'ù' | 'ú' | 'û' => 'u',
        'é' | 'è' | 'ê' | 'ë' => 'e',
        'í' | 'ì' | 'î' | 'ï' => 'i',
        'ç' => 'c',
        'ñ' => 'n',
        c if c.is_ascii_alphanumeric() || c == '-' => c,
        c if c.is_whitespace() || c == '_' => ' ',
        _ => return None,
    };
    Some(folded)
}

fn slugify(text: &str) -> String {
    let folded: String = text.to_lowercase().chars().filter_map(fold_char).collect();
    folded
        .split(|c: char| c == ' ' || c == '-')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

/// SEO slug for a product: name plus article number.
///
/// `("RINOS Gaia 2 Gravel Bike", "RINOS24GRX400")` becomes
/// `rinos-gaia-2-gravel-bike-rinos24grx400`.
#[must_use]
pub fn generate_product_slug(name: &str, article_number: &str) -> String {
    let base = slugify(name);
    let number = article_number.trim().to_lowercase();
    match (base.is_empty(), number.is_empty()) {
        (true, _) => number,
        (false, true) => base,
        (false, false) => format!("{base}-{number}"),
    }
}

/// Slug for a category name, e.g. `Gravel Bikes` -> `gravel-bikes`.
#[must_use]
pub fn generate_category_slug(name: &str) -> String {
    slugify(name)
}

/// Recovers the article number from a product slug.
///
/// The article number is looked for in the last three hyphen-separated
/// segments; bare article numbers pass through upper-cased.
#[must_use]
pub fn article_number_from_slug(slug: &str) -> String {
    if !slug.is_empty() && slug.chars().all(|c| c.is_ascii_alphanumeric()) {
        return slug.to_uppercase();
    }

    let parts: Vec<&str> = slug.split('-').collect();
    let lowest = parts.len().saturating_sub(3);
    (lowest..parts.len())
        .rev()
        .map(|start| parts[start..].concat())
        .find(|segment| ARTICLE_NUMBER_SEGMENT.is_match(segment))
        .unwrap_or_else(|| slug.to_string())
        .to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_page_slug() {
        assert!(validate_page_slug("ueber-uns").is_ok());
        assert!(validate_page_slug("sommer-sale-2025").is_ok());

        assert!(validate_page_slug("").is_err());
        assert!(validate_page_slug("Über-uns").is_err());
        assert!(validate_page_slug("double--hyphen").is_err());
        assert!(validate_page_slug("-leading").is_err());
        assert!(validate_page_slug("with space").is_err());
        assert!(validate_page_slug(&"a".repeat(MAX_SLUG_LEN + 1)).is_err());
    }

    #[test]
    fn test_generate_product_slug() {
        assert_eq!(
            generate_product_slug("RINOS Gaia 2 Gravel Bike", "RINOS24GRX400"),
            "rinos-gaia-2-gravel-bike-rinos24grx400"
        );
        assert_eq!(
            generate_product_slug("Größe & Gewicht: Räder", "X1"),
            "groe-gewicht-rader-x1"
        );
        assert_eq!(generate_product_slug("", "ABC123"), "abc123");
        assert_eq!(generate_product_slug("  --Trail__Bike-- ", ""), "trail-bike");
    }

    #[test]
    fn test_generate_category_slug() {
        assert_eq!(generate_category_slug("Gravel Bikes"), "gravel-bikes");
        assert_eq!(generate_category_slug("Zubehör"), "zubehor");
    }

    #[test]
    fn test_article_number_from_slug() {
        assert_eq!(
            article_number_from_slug("rinos-gaia-2-gravel-bike-rinos24grx400"),
            "RINOS24GRX400"
        );
        assert_eq!(article_number_from_slug("rinos24grx400"), "RINOS24GRX400");
        assert_eq!(article_number_from_slug("ueber-uns"), "UEBER-UNS");
    }
}
