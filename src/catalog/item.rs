//! Catalog records: items, identifiers, categories and prices.

use serde::{Deserialize, Serialize};

/// Unique catalog identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub u32);

impl ItemId {
    pub fn get(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for ItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for ItemId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(ItemId)
    }
}

/// Fixed set of catalog categories.
///
/// Serialized and displayed with the capitalized name used for filtering,
/// e.g. `"Technology"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Business,
    Technology,
    Design,
    Finance,
}

impl Category {
    /// Every category, in storefront display order
    pub const ALL: [Category; 4] = [
        Category::Business,
        Category::Technology,
        Category::Design,
        Category::Finance,
    ];

    /// Exact name used for matching a category selector
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Business => "Business",
            Category::Technology => "Technology",
            Category::Design => "Design",
            Category::Finance => "Finance",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Category {
    type Err = anyhow::Error;

    /// Case-sensitive, mirroring how selectors are matched
    fn from_str(s: &str) -> anyhow::Result<Self> {
        Category::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| anyhow::anyhow!("Unknown category: {}", s))
    }
}

/// Amount in US cents
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(pub u32);

impl Price {
    pub const fn from_cents(cents: u32) -> Self {
        Self(cents)
    }

    pub fn cents(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for Price {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "${}.{:02}", self.0 / 100, self.0 % 100)
    }
}

/// A single downloadable ebook
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogItem {
    /// Unique identifier within the catalog
    pub id: ItemId,

    pub title: String,

    pub author: String,

    pub category: Category,

    /// Average reader rating, 0 to 5
    pub rating: f32,

    /// Lifetime download count
    pub downloads: u64,

    pub description: String,

    /// Free-text labels, searched alongside title and author
    #[serde(default)]
    pub tags: Vec<String>,
}

impl CatalogItem {
    /// Create a new catalog item with no rating, downloads or tags
    pub fn new(
        id: u32,
        title: impl Into<String>,
        author: impl Into<String>,
        category: Category,
    ) -> Self {
        Self {
            id: ItemId(id),
            title: title.into(),
            author: author.into(),
            category,
            rating: 0.0,
            downloads: 0,
            description: String::new(),
            tags: Vec::new(),
        }
    }

    pub fn with_rating(mut self, rating: f32) -> Self {
        self.rating = rating;
        self
    }

    pub fn with_downloads(mut self, downloads: u64) -> Self {
        self.downloads = downloads;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Add a tag
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    /// Add multiple tags
    pub fn with_tags(mut self, tags: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.tags.extend(tags.into_iter().map(Into::into));
        self
    }
}
