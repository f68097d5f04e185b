//! Where the catalog comes from.
//!
//! The storefront only needs a loaded [`Catalog`]; sources hide whether it
//! was compiled in, read from a JSON file, or fetched over HTTP.
//!
//! Both external formats accept either a bare array of items or a document
//! with `items` and optional `featured` entries.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use tokio::fs;
use tracing::{debug, info};

use super::{Catalog, CatalogItem, FeaturedBook};

/// Default timeout for remote catalog fetches
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Trait for catalog data sources
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Human-readable source description
    fn describe(&self) -> String;

    /// Load and validate the catalog
    async fn load(&self) -> Result<Catalog>;
}

/// On-disk / over-the-wire catalog shape
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CatalogDocument {
    Items(Vec<CatalogItem>),
    Full {
        items: Vec<CatalogItem>,
        #[serde(default)]
        featured: Vec<FeaturedBook>,
    },
}

impl CatalogDocument {
    fn into_catalog(self) -> Result<Catalog> {
        let (items, featured) = match self {
            CatalogDocument::Items(items) => (items, Vec::new()),
            CatalogDocument::Full { items, featured } => (items, featured),
        };

        let catalog = Catalog::new(items)?.with_featured(featured)?;
        Ok(catalog)
    }
}

/// Parse a catalog from JSON text
pub fn parse_catalog(json: &str) -> Result<Catalog> {
    let document: CatalogDocument =
        serde_json::from_str(json).context("Failed to parse catalog JSON")?;
    document.into_catalog()
}

/// The catalog compiled into the binary
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinSource;

#[async_trait]
impl CatalogSource for BuiltinSource {
    fn describe(&self) -> String {
        "built-in".to_string()
    }

    async fn load(&self) -> Result<Catalog> {
        Ok(Catalog::builtin()?)
    }
}

/// Catalog stored as a local JSON file
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl CatalogSource for JsonFileSource {
    fn describe(&self) -> String {
        format!("file {}", self.path.display())
    }

    async fn load(&self) -> Result<Catalog> {
        let content = fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("Failed to read catalog: {}", self.path.display()))?;

        let catalog = parse_catalog(&content)
            .with_context(|| format!("Invalid catalog file: {}", self.path.display()))?;

        debug!(items = catalog.len(), "Loaded catalog from file");
        Ok(catalog)
    }
}

/// Catalog fetched from a remote endpoint returning catalog JSON
pub struct HttpSource {
    url: String,
    timeout: Duration,
    client: reqwest::Client,
}

impl HttpSource {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            timeout: DEFAULT_FETCH_TIMEOUT,
            client: reqwest::Client::new(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[async_trait]
impl CatalogSource for HttpSource {
    fn describe(&self) -> String {
        format!("url {} (timeout {}s)", self.url, self.timeout.as_secs())
    }

    async fn load(&self) -> Result<Catalog> {
        info!(url = %self.url, "Fetching remote catalog");

        let response = self
            .client
            .get(&self.url)
            .timeout(self.timeout)
            .send()
            .await
            .with_context(|| format!("Failed to fetch catalog from {}", self.url))?;

        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("Catalog fetch from {} failed with status {}", self.url, status);
        }

        let body = response
            .text()
            .await
            .context("Failed to read catalog response body")?;

        parse_catalog(&body).with_context(|| format!("Invalid catalog from {}", self.url))
    }
}

/// Pick a source from configuration: a URL wins over a path, and with
/// neither the built-in catalog is used
pub fn source_for(
    path: Option<PathBuf>,
    url: Option<String>,
    fetch_timeout: Duration,
) -> Box<dyn CatalogSource> {
    match (url, path) {
        (Some(url), _) => Box::new(HttpSource::new(url).with_timeout(fetch_timeout)),
        (None, Some(path)) => Box::new(JsonFileSource::new(path)),
        (None, None) => Box::new(BuiltinSource),
    }
}
