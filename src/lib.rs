//! ebookvault - Ebook storefront
//!
//! Catalog browsing with free-text search and category filtering, a
//! simulated sign-in whose session lives in a key-value store, and a
//! simulated checkout with explicit success and failure outcomes.
//!
//! # Architecture
//!
//! - Browsing is a pure, order-preserving filter over an immutable catalog
//! - Session state is an explicit value; transitions return the next state
//! - Persistence is an injected key-value store
//! - Payments are background tasks resolving to a receipt or an error
//!
//! # Modules
//!
//! - `catalog`: Items, filtering, and catalog sources (built-in, file, HTTP)
//! - `store`: Key-value persistence (memory, JSON file)
//! - `session`: Application state and persist/restore
//! - `payment`: Card validation, processors, payment tasks
//! - `storefront`: Browse, sign-in, purchase, sign-out
//! - `cli`: Command-line interface
//!
//! # Usage
//!
//! ```bash
//! # Search the catalog
//! ebookvault browse --query python --category Technology
//!
//! # Sign in (charges the monthly subscription)
//! ebookvault login --name "Jane" --email jane@example.com \
//!     --card-number 4242424242424242 --expiry 12/30 --cvv 123
//!
//! # Buy a download
//! ebookvault buy 2 --card-number 4242424242424242 --expiry 12/30 --cvv 123
//! ```

pub mod catalog;
pub mod cli;
pub mod config;
pub mod payment;
pub mod session;
pub mod store;
pub mod storefront;

// Re-export main types at crate root for convenience
pub use catalog::{filter, Catalog, CatalogItem, CatalogQuery, Category, ItemId, Price};
pub use payment::{CardDetails, PaymentError, PaymentKind, PaymentProcessor, PaymentTask, Receipt};
pub use session::{AppState, User};
pub use store::{FileStore, KeyValueStore, MemoryStore};
pub use storefront::{Storefront, StorefrontError};
