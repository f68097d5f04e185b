//! Ebook catalog: records, filtering and data sources.
//!
//! The catalog is loaded once at startup and never mutated afterwards.
//! Browsing is a pure filter over its items (see [`filter`]).

pub mod filter;
pub mod item;
pub mod seed;
pub mod source;

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use filter::{filter, CatalogQuery, CategorySelector, ALL_CATEGORIES};
pub use item::{CatalogItem, Category, ItemId, Price};
pub use source::{BuiltinSource, CatalogSource, HttpSource, JsonFileSource};

/// Errors raised while assembling a catalog
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CatalogError {
    #[error("Duplicate catalog id: {0}")]
    DuplicateId(ItemId),

    #[error("Rating for item {id} out of range 0-5: {rating}")]
    RatingOutOfRange { id: ItemId, rating: f32 },

    #[error("Featured entry refers to unknown item: {0}")]
    UnknownFeatured(ItemId),
}

/// A highlighted book with the price shown on the landing view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeaturedBook {
    pub item_id: ItemId,
    pub list_price: Price,
}

impl FeaturedBook {
    pub fn new(item_id: ItemId, list_price: Price) -> Self {
        Self {
            item_id,
            list_price,
        }
    }
}

/// Immutable collection of catalog items
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    items: Vec<CatalogItem>,
    featured: Vec<FeaturedBook>,
}

impl Catalog {
    /// Build a catalog, rejecting duplicate ids and out-of-range ratings
    pub fn new(items: Vec<CatalogItem>) -> Result<Self, CatalogError> {
        let mut seen = HashSet::with_capacity(items.len());

        for item in &items {
            if !seen.insert(item.id) {
                return Err(CatalogError::DuplicateId(item.id));
            }
            if !(0.0..=5.0).contains(&item.rating) {
                return Err(CatalogError::RatingOutOfRange {
                    id: item.id,
                    rating: item.rating,
                });
            }
        }

        Ok(Self {
            items,
            featured: Vec::new(),
        })
    }

    /// Attach featured entries; every entry must name an existing item
    pub fn with_featured(mut self, featured: Vec<FeaturedBook>) -> Result<Self, CatalogError> {
        if let Some(missing) = featured.iter().find(|f| self.get(f.item_id).is_none()) {
            return Err(CatalogError::UnknownFeatured(missing.item_id));
        }
        self.featured = featured;
        Ok(self)
    }

    /// The catalog compiled into the binary
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::new(seed::builtin_items())?.with_featured(seed::builtin_featured())
    }

    pub fn items(&self) -> &[CatalogItem] {
        &self.items
    }

    /// Get an item by ID
    pub fn get(&self, id: ItemId) -> Option<&CatalogItem> {
        self.items.iter().find(|i| i.id == id)
    }

    /// Filter by free-text query and category selector
    pub fn filter(&self, query: &str, category: &str) -> Vec<&CatalogItem> {
        filter(&self.items, query, category)
    }

    /// Category selectors in display order: "all", then each category
    /// in order of first appearance
    pub fn categories(&self) -> Vec<String> {
        let mut selectors = vec![ALL_CATEGORIES.to_string()];
        for item in &self.items {
            let name = item.category.as_str();
            if !selectors.iter().any(|s| s == name) {
                selectors.push(name.to_string());
            }
        }
        selectors
    }

    /// Featured books resolved against the catalog
    pub fn featured(&self) -> Vec<(&CatalogItem, Price)> {
        self.featured
            .iter()
            .filter_map(|f| self.get(f.item_id).map(|item| (item, f.list_price)))
            .collect()
    }

    /// Get the number of items
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if the catalog is empty
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_catalog() {
        let catalog = Catalog::builtin().unwrap();
        assert_eq!(catalog.len(), 6);
        assert_eq!(catalog.get(ItemId(2)).unwrap().author, "Michael Chen");
        assert!(catalog.get(ItemId(99)).is_none());
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let items = vec![
            CatalogItem::new(1, "A", "X", Category::Design),
            CatalogItem::new(1, "B", "Y", Category::Design),
        ];
        assert_eq!(
            Catalog::new(items).unwrap_err(),
            CatalogError::DuplicateId(ItemId(1))
        );
    }

    #[test]
    fn test_rating_range_checked() {
        let items = vec![CatalogItem::new(1, "A", "X", Category::Design).with_rating(5.5)];
        assert!(matches!(
            Catalog::new(items),
            Err(CatalogError::RatingOutOfRange { .. })
        ));
    }

    #[test]
    fn test_categories_in_display_order() {
        let catalog = Catalog::builtin().unwrap();
        assert_eq!(
            catalog.categories(),
            vec!["all", "Business", "Technology", "Design", "Finance"]
        );
    }

    #[test]
    fn test_featured_prices() {
        let catalog = Catalog::builtin().unwrap();
        let featured: Vec<_> = catalog
            .featured()
            .into_iter()
            .map(|(item, price)| (item.id.get(), price.to_string()))
            .collect();

        assert_eq!(
            featured,
            vec![
                (1, "$9.99".to_string()),
                (2, "$12.99".to_string()),
                (3, "$14.99".to_string())
            ]
        );
    }

    #[test]
    fn test_featured_must_exist() {
        let catalog = Catalog::new(vec![CatalogItem::new(1, "A", "X", Category::Design)]).unwrap();
        let result = catalog.with_featured(vec![FeaturedBook::new(ItemId(9), Price(100))]);
        assert_eq!(result.unwrap_err(), CatalogError::UnknownFeatured(ItemId(9)));
    }
}
