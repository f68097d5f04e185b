//! Configuration for ebookvault.
//!
//! Configuration sources (highest priority first):
//! 1. Environment variables (EBOOKVAULT_HOME, EBOOKVAULT_CATALOG)
//! 2. Config file (.ebookvault/config.yaml)
//! 3. Defaults (~/.ebookvault, built-in catalog, original prices)
//!
//! Config file discovery:
//! - Searches current directory and parents for .ebookvault/config.yaml
//! - `paths.home` is relative to the .ebookvault/ directory,
//!   `catalog.path` to the project root (parent of .ebookvault/)

use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::catalog::source::DEFAULT_FETCH_TIMEOUT;
use crate::catalog::Price;
use crate::payment::simulated::{DEFAULT_DECLINE_CARD, DEFAULT_DELAY};
use crate::payment::task::DEFAULT_PAYMENT_TIMEOUT;
use crate::payment::Pricing;

/// Directory name searched for and used under $HOME
pub const CONFIG_DIR: &str = ".ebookvault";

/// Global cached configuration (stores Result to handle init errors)
static CONFIG: OnceLock<Result<ResolvedConfig, String>> = OnceLock::new();

/// Raw config file schema (matches YAML structure)
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigFile {
    pub version: String,
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub catalog: Option<CatalogConfig>,
    #[serde(default)]
    pub pricing: Option<PricingConfig>,
    #[serde(default)]
    pub payment: Option<PaymentConfig>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PathsConfig {
    /// State directory (relative to .ebookvault/)
    pub home: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CatalogConfig {
    /// Catalog JSON file (relative to project root)
    pub path: Option<String>,
    /// Remote catalog endpoint; takes precedence over `path`
    pub url: Option<String>,
    /// Fetch timeout for `url`
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PricingConfig {
    pub subscription_cents: Option<u32>,
    pub download_cents: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PaymentConfig {
    pub processing_delay_ms: Option<u64>,
    pub timeout_seconds: Option<u64>,
    pub decline_cards: Option<Vec<String>>,
}

/// Resolved configuration with absolute paths
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    /// State directory (holds storage.json)
    pub home: PathBuf,
    /// Catalog JSON file, if not using the built-in catalog
    pub catalog_path: Option<PathBuf>,
    /// Remote catalog URL
    pub catalog_url: Option<String>,
    /// Deadline for fetching `catalog_url`
    pub catalog_timeout: Duration,
    /// Path to config file (if found)
    pub config_file: Option<PathBuf>,
    pub pricing: Pricing,
    pub payment: PaymentSettings,
}

#[derive(Debug, Clone)]
pub struct PaymentSettings {
    pub processing_delay: Duration,
    pub timeout: Duration,
    pub decline_cards: Vec<String>,
}

impl Default for PaymentSettings {
    fn default() -> Self {
        Self {
            processing_delay: DEFAULT_DELAY,
            timeout: DEFAULT_PAYMENT_TIMEOUT,
            decline_cards: vec![DEFAULT_DECLINE_CARD.to_string()],
        }
    }
}

impl ResolvedConfig {
    /// Key-value store file
    pub fn storage_path(&self) -> PathBuf {
        self.home.join("storage.json")
    }
}

/// Find config file by searching current directory and parents
fn find_config_file() -> Option<PathBuf> {
    let mut current = std::env::current_dir().ok()?;

    loop {
        let config_path = current.join(CONFIG_DIR).join("config.yaml");
        if config_path.exists() {
            return Some(config_path);
        }

        if !current.pop() {
            break;
        }
    }

    None
}

/// Load and parse config file
fn load_config_file(path: &Path) -> Result<ConfigFile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Resolve a path that may be relative to the config file's parent
fn resolve_path(base: &Path, path_str: &str) -> PathBuf {
    let path = PathBuf::from(path_str);
    if path.is_absolute() {
        path
    } else {
        base.join(path)
            .canonicalize()
            .unwrap_or_else(|_| base.join(path_str))
    }
}

fn pricing_from(config: Option<&PricingConfig>) -> Pricing {
    let defaults = Pricing::default();
    Pricing {
        subscription: config
            .and_then(|p| p.subscription_cents)
            .map(Price::from_cents)
            .unwrap_or(defaults.subscription),
        download: config
            .and_then(|p| p.download_cents)
            .map(Price::from_cents)
            .unwrap_or(defaults.download),
    }
}

fn payment_from(config: Option<&PaymentConfig>) -> PaymentSettings {
    let defaults = PaymentSettings::default();
    PaymentSettings {
        processing_delay: config
            .and_then(|p| p.processing_delay_ms)
            .map(Duration::from_millis)
            .unwrap_or(defaults.processing_delay),
        timeout: config
            .and_then(|p| p.timeout_seconds)
            .map(Duration::from_secs)
            .unwrap_or(defaults.timeout),
        decline_cards: config
            .and_then(|p| p.decline_cards.clone())
            .unwrap_or(defaults.decline_cards),
    }
}

/// Combine an optional config file with env overrides and defaults
fn resolve(
    config_file: Option<PathBuf>,
    default_home: PathBuf,
    env_home: Option<String>,
    env_catalog: Option<String>,
) -> Result<ResolvedConfig> {
    let Some(config_path) = config_file else {
        let home = env_home.map(PathBuf::from).unwrap_or(default_home);
        return Ok(ResolvedConfig {
            home,
            catalog_path: env_catalog.map(PathBuf::from),
            catalog_url: None,
            catalog_timeout: DEFAULT_FETCH_TIMEOUT,
            config_file: None,
            pricing: Pricing::default(),
            payment: PaymentSettings::default(),
        });
    };

    let config = load_config_file(&config_path)?;

    let config_dir = config_path.parent().unwrap_or(Path::new("."));
    // Project root is the parent of .ebookvault/
    let base_dir = config_dir.parent().unwrap_or(Path::new("."));

    let home = if let Some(env_home) = env_home {
        PathBuf::from(env_home)
    } else if let Some(ref home_path) = config.paths.home {
        resolve_path(config_dir, home_path)
    } else {
        default_home
    };

    let catalog_path = if let Some(env_catalog) = env_catalog {
        Some(PathBuf::from(env_catalog))
    } else {
        config
            .catalog
            .as_ref()
            .and_then(|c| c.path.as_deref())
            .map(|p| resolve_path(base_dir, p))
    };

    let catalog_url = config.catalog.as_ref().and_then(|c| c.url.clone());
    let catalog_timeout = config
        .catalog
        .as_ref()
        .and_then(|c| c.timeout_seconds)
        .map(Duration::from_secs)
        .unwrap_or(DEFAULT_FETCH_TIMEOUT);

    Ok(ResolvedConfig {
        home,
        catalog_path,
        catalog_url,
        catalog_timeout,
        pricing: pricing_from(config.pricing.as_ref()),
        payment: payment_from(config.payment.as_ref()),
        config_file: Some(config_path),
    })
}

/// Load configuration from all sources
fn load_config() -> Result<ResolvedConfig> {
    let default_home = dirs::home_dir()
        .context("Failed to determine home directory")?
        .join(CONFIG_DIR);

    resolve(
        find_config_file(),
        default_home,
        std::env::var("EBOOKVAULT_HOME").ok(),
        std::env::var("EBOOKVAULT_CATALOG").ok(),
    )
}

/// Get the global configuration (loads once, then cached)
pub fn config() -> Result<&'static ResolvedConfig> {
    let result = CONFIG.get_or_init(|| load_config().map_err(|e| format!("{:#}", e)));

    match result {
        Ok(config) => Ok(config),
        Err(e) => anyhow::bail!("{}", e),
    }
}
