//! Catalog products and the listing filter.
//!
//! The storefront fetches the whole catalog on every listing request and
//! narrows it in memory. Filtering never reorders: results keep catalog order.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{Price, ProductId};

/// A product as exposed by the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub title: String,
    pub price: Decimal,
    pub description: String,
    pub category: String,
    /// Absolute image URL.
    pub image: String,
    pub rating: Option<Rating>,
}

impl Product {
    /// The product price in the catalog currency.
    #[must_use]
    pub const fn display_price(&self) -> Price {
        Price::usd(self.price)
    }
}

/// Aggregate customer rating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rating {
    /// Average rating (0-5).
    pub rate: Decimal,
    /// Number of ratings.
    pub count: u32,
}

/// Price bucket used by the listing's price dropdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PriceBand {
    #[default]
    All,
    /// Under $100.
    Low,
    /// $100 to $500 inclusive.
    Mid,
    /// Over $500.
    High,
}

impl PriceBand {
    /// Every band, in dropdown order.
    pub const ALL: [Self; 4] = [Self::All, Self::Low, Self::Mid, Self::High];

    /// Query-string value for the band.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Low => "low",
            Self::Mid => "mid",
            Self::High => "high",
        }
    }

    /// Human-readable dropdown label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::All => "All prices",
            Self::Low => "Under $100",
            Self::Mid => "$100 - $500",
            Self::High => "Over $500",
        }
    }

    /// Whether a price falls inside this band.
    #[must_use]
    pub fn contains(self, price: Decimal) -> bool {
        let hundred = Decimal::ONE_HUNDRED;
        let five_hundred = Decimal::new(500, 0);
        match self {
            Self::All => true,
            Self::Low => price < hundred,
            Self::Mid => price >= hundred && price <= five_hundred,
            Self::High => price > five_hundred,
        }
    }

    /// Parse a query value, falling back to [`PriceBand::All`] for anything
    /// unrecognized.
    #[must_use]
    pub fn parse_lenient(value: &str) -> Self {
        value.parse().unwrap_or_default()
    }
}

impl FromStr for PriceBand {
    type Err = UnknownPriceBand;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" | "" => Ok(Self::All),
            "low" => Ok(Self::Low),
            "mid" => Ok(Self::Mid),
            "high" => Ok(Self::High),
            other => Err(UnknownPriceBand(other.to_string())),
        }
    }
}

/// Returned when a price band string is not one of `all|low|mid|high`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown price band: {0}")]
pub struct UnknownPriceBand(pub String);

/// Criteria for narrowing the product listing.
///
/// All criteria combine: a product must satisfy search, category and price.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductFilter {
    /// Case-insensitive substring matched against the title.
    pub search: Option<String>,
    /// Exact category name. `"all"` means no constraint.
    pub category: Option<String>,
    pub price: PriceBand,
}

impl ProductFilter {
    /// Normalized search needle, if any.
    fn needle(&self) -> Option<String> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase)
    }

    /// Active category constraint, if any.
    #[must_use]
    pub fn active_category(&self) -> Option<&str> {
        self.category
            .as_deref()
            .filter(|c| !c.is_empty() && *c != "all")
    }

    /// Whether a single product passes the filter.
    #[must_use]
    pub fn matches(&self, product: &Product) -> bool {
        self.matches_with(product, self.needle().as_deref())
    }

    fn matches_with(&self, product: &Product, needle: Option<&str>) -> bool {
        if let Some(needle) = needle
            && !product.title.to_lowercase().contains(needle)
        {
            return false;
        }
        if let Some(category) = self.active_category()
            && product.category != category
        {
            return false;
        }
        self.price.contains(product.price)
    }

    /// Products passing the filter, in catalog order.
    #[must_use]
    pub fn apply<'a>(&self, products: &'a [Product]) -> Vec<&'a Product> {
        let needle = self.needle();
        products
            .iter()
            .filter(|p| self.matches_with(p, needle.as_deref()))
            .collect()
    }
}

/// Distinct categories in the order they first appear.
#[must_use]
pub fn categories(products: &[Product]) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    for product in products {
        if !seen.iter().any(|c| *c == product.category) {
            seen.push(product.category.clone());
        }
    }
    seen
}

/// Category name with its first character uppercased.
#[must_use]
pub fn category_label(category: &str) -> String {
    let mut chars = category.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

/// Cut a title to `max` characters, appending `...` when anything was cut.
#[must_use]
pub fn truncate_title(title: &str, max: usize) -> String {
    if title.chars().count() > max {
        let mut cut: String = title.chars().take(max).collect();
        cut.push_str("...");
        cut
    } else {
        title.to_string()
    }
}

/// The first `words` whitespace-separated words of a title.
#[must_use]
pub fn short_title(title: &str, words: usize) -> String {
    title.split_whitespace().take(words).collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(id: i32, title: &str, price: Decimal, category: &str) -> Product {
        Product {
            id: ProductId::new(id),
            title: title.to_string(),
            price,
            description: String::new(),
            category: category.to_string(),
            image: format!("https://img.example/{id}.jpg"),
            rating: None,
        }
    }

    fn catalog() -> Vec<Product> {
        vec![
            product(1, "Fjallraven Backpack", Decimal::new(10995, 2), "men's clothing"),
            product(2, "Slim Fit T-Shirt", Decimal::new(2230, 2), "men's clothing"),
            product(3, "WD 2TB Portable Drive", Decimal::new(64, 0), "electronics"),
            product(4, "Samsung 49-Inch Monitor", Decimal::new(99999, 2), "electronics"),
            product(5, "Gold Chain Bracelet", Decimal::new(695, 0), "jewelery"),
            product(6, "Exactly One Hundred", Decimal::ONE_HUNDRED, "jewelery"),
            product(7, "Exactly Five Hundred", Decimal::new(500, 0), "jewelery"),
        ]
    }

    fn ids(products: &[&Product]) -> Vec<i32> {
        products.iter().map(|p| p.id.as_i32()).collect()
    }

    #[test]
    fn test_empty_filter_keeps_everything_in_order() {
        let products = catalog();
        let filtered = ProductFilter::default().apply(&products);
        assert_eq!(ids(&filtered), vec![1, 2, 3, 4, 5, 6, 7]);
    }

    #[test]
    fn test_search_is_case_insensitive_substring() {
        let products = catalog();
        let filter = ProductFilter {
            search: Some("  backPACK ".to_string()),
            ..Default::default()
        };
        assert_eq!(ids(&filter.apply(&products)), vec![1]);
    }

    #[test]
    fn test_blank_search_is_no_constraint() {
        let products = catalog();
        let filter = ProductFilter {
            search: Some("   ".to_string()),
            ..Default::default()
        };
        assert_eq!(filter.apply(&products).len(), products.len());
    }

    #[test]
    fn test_category_all_is_no_constraint() {
        let products = catalog();
        let filter = ProductFilter {
            category: Some("all".to_string()),
            ..Default::default()
        };
        assert_eq!(filter.apply(&products).len(), products.len());
        assert_eq!(filter.active_category(), None);
    }

    #[test]
    fn test_category_is_exact_match() {
        let products = catalog();
        let filter = ProductFilter {
            category: Some("electronics".to_string()),
            ..Default::default()
        };
        assert_eq!(ids(&filter.apply(&products)), vec![3, 4]);
    }

    #[test]
    fn test_price_band_boundaries() {
        assert!(PriceBand::Low.contains(Decimal::new(9999, 2)));
        assert!(!PriceBand::Low.contains(Decimal::ONE_HUNDRED));
        assert!(PriceBand::Mid.contains(Decimal::ONE_HUNDRED));
        assert!(PriceBand::Mid.contains(Decimal::new(500, 0)));
        assert!(!PriceBand::Mid.contains(Decimal::new(50001, 2)));
        assert!(PriceBand::High.contains(Decimal::new(50001, 2)));
        assert!(!PriceBand::High.contains(Decimal::new(500, 0)));
    }

    #[test]
    fn test_price_filters() {
        let products = catalog();
        let by_band = |price| ProductFilter {
            price,
            ..Default::default()
        };
        assert_eq!(ids(&by_band(PriceBand::Low).apply(&products)), vec![2, 3]);
        assert_eq!(ids(&by_band(PriceBand::Mid).apply(&products)), vec![1, 6, 7]);
        assert_eq!(ids(&by_band(PriceBand::High).apply(&products)), vec![4, 5]);
    }

    #[test]
    fn test_filters_combine() {
        let products = catalog();
        let filter = ProductFilter {
            search: Some("exactly".to_string()),
            category: Some("jewelery".to_string()),
            price: PriceBand::Mid,
        };
        assert_eq!(ids(&filter.apply(&products)), vec![6, 7]);
        assert!(!filter.matches(&products[4]));
    }

    #[test]
    fn test_price_band_parsing() {
        assert_eq!(PriceBand::parse_lenient("LOW"), PriceBand::Low);
        assert_eq!(PriceBand::parse_lenient("mid"), PriceBand::Mid);
        assert_eq!(PriceBand::parse_lenient("high"), PriceBand::High);
        assert_eq!(PriceBand::parse_lenient("bogus"), PriceBand::All);
        assert!("bogus".parse::<PriceBand>().is_err());
    }

    #[test]
    fn test_categories_are_distinct_in_first_seen_order() {
        assert_eq!(
            categories(&catalog()),
            vec!["men's clothing", "electronics", "jewelery"]
        );
        assert!(categories(&[]).is_empty());
    }

    #[test]
    fn test_category_label() {
        assert_eq!(category_label("electronics"), "Electronics");
        assert_eq!(category_label("men's clothing"), "Men's clothing");
        assert_eq!(category_label(""), "");
    }

    #[test]
    fn test_truncate_title() {
        let long = "a".repeat(60);
        let cut = truncate_title(&long, 50);
        assert_eq!(cut.len(), 53);
        assert!(cut.ends_with("..."));
        assert_eq!(truncate_title("short", 50), "short");
        assert_eq!(truncate_title(&"b".repeat(50), 50), "b".repeat(50));
    }

    #[test]
    fn test_truncate_title_counts_characters_not_bytes() {
        let title = "é".repeat(51);
        let cut = truncate_title(&title, 50);
        assert_eq!(cut.chars().count(), 53);
    }

    #[test]
    fn test_short_title() {
        assert_eq!(
            short_title("Fjallraven - Foldsack No. 1 Backpack, Fits 15 Laptops", 4),
            "Fjallraven - Foldsack No."
        );
        assert_eq!(short_title("Mug", 4), "Mug");
    }
}
