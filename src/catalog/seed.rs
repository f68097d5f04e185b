//! Built-in catalog shipped with the storefront.

use super::item::{CatalogItem, Category, ItemId, Price};
use super::FeaturedBook;

/// The six ebooks available out of the box
pub fn builtin_items() -> Vec<CatalogItem> {
    vec![
        CatalogItem::new(1, "Digital Marketing Mastery", "Sarah Johnson", Category::Business)
            .with_rating(4.8)
            .with_downloads(1234)
            .with_description("Complete guide to modern digital marketing strategies and tactics.")
            .with_tags(["Marketing", "Digital", "Strategy"]),
        CatalogItem::new(2, "Python Programming Guide", "Michael Chen", Category::Technology)
            .with_rating(4.9)
            .with_downloads(2156)
            .with_description("From beginner to advanced Python programming concepts.")
            .with_tags(["Python", "Programming", "Code"]),
        CatalogItem::new(3, "Business Strategy 2024", "Amanda Rodriguez", Category::Business)
            .with_rating(4.7)
            .with_downloads(987)
            .with_description("Strategic planning and execution for modern businesses.")
            .with_tags(["Strategy", "Business", "Planning"]),
        CatalogItem::new(4, "UI/UX Design Principles", "David Kim", Category::Design)
            .with_rating(4.6)
            .with_downloads(1543)
            .with_description("Essential principles for creating beautiful user interfaces.")
            .with_tags(["Design", "UI", "UX"]),
        CatalogItem::new(5, "Data Science Fundamentals", "Emily Watson", Category::Technology)
            .with_rating(4.8)
            .with_downloads(1876)
            .with_description("Introduction to data science and analytics.")
            .with_tags(["Data", "Science", "Analytics"]),
        CatalogItem::new(6, "Personal Finance Mastery", "Robert Brown", Category::Finance)
            .with_rating(4.5)
            .with_downloads(2341)
            .with_description("Build wealth and achieve financial freedom.")
            .with_tags(["Finance", "Money", "Investment"]),
    ]
}

/// Landing-page highlights with their list prices
pub fn builtin_featured() -> Vec<FeaturedBook> {
    vec![
        FeaturedBook::new(ItemId(1), Price::from_cents(999)),
        FeaturedBook::new(ItemId(2), Price::from_cents(1299)),
        FeaturedBook::new(ItemId(3), Price::from_cents(1499)),
    ]
}
