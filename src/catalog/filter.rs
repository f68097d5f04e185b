//! Free-text and category filtering over catalog items.
//!
//! Filtering never fails: an unknown category or a query nothing contains
//! simply yields an empty result. Matching order is the input order.

use super::item::CatalogItem;

/// Selector value that matches every category
pub const ALL_CATEGORIES: &str = "all";

/// Category criterion parsed from its selector text
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CategorySelector {
    All,
    /// Exact, case-sensitive category name
    Only(String),
}

impl CategorySelector {
    pub fn parse(selector: &str) -> Self {
        if selector == ALL_CATEGORIES {
            Self::All
        } else {
            Self::Only(selector.to_string())
        }
    }

    pub fn matches(&self, item: &CatalogItem) -> bool {
        match self {
            Self::All => true,
            Self::Only(name) => item.category.as_str() == name,
        }
    }
}

impl Default for CategorySelector {
    fn default() -> Self {
        Self::All
    }
}

/// Both browse criteria, pre-normalized for repeated matching
#[derive(Debug, Clone, Default)]
pub struct CatalogQuery {
    /// Lowercased search text; empty matches everything
    query_lower: String,
    category: CategorySelector,
}

impl CatalogQuery {
    pub fn new(query: &str, category: &str) -> Self {
        Self {
            query_lower: query.to_lowercase(),
            category: CategorySelector::parse(category),
        }
    }

    /// Check the text criterion against title, author and tags
    pub fn matches_text(&self, item: &CatalogItem) -> bool {
        if self.query_lower.is_empty() {
            return true;
        }

        item.title.to_lowercase().contains(&self.query_lower)
            || item.author.to_lowercase().contains(&self.query_lower)
            || item
                .tags
                .iter()
                .any(|t| t.to_lowercase().contains(&self.query_lower))
    }

    pub fn matches(&self, item: &CatalogItem) -> bool {
        self.category.matches(item) && self.matches_text(item)
    }

    /// Keep the matching items, in their original order
    pub fn apply<'a>(&self, items: &'a [CatalogItem]) -> Vec<&'a CatalogItem> {
        items.iter().filter(|item| self.matches(item)).collect()
    }
}

/// Filter `items` by free-text `query` and `category` selector.
pub fn filter<'a>(items: &'a [CatalogItem], query: &str, category: &str) -> Vec<&'a CatalogItem> {
    CatalogQuery::new(query, category).apply(items)
}
