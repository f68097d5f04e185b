//! The storefront: browsing, sign-in with subscription, and downloads.
//!
//! Session state is passed in and returned explicitly; the storefront only
//! persists it through the injected store after a transition succeeds.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{info, instrument};

use crate::catalog::source::source_for;
use crate::catalog::{Catalog, CatalogItem, ItemId};
use crate::config::ResolvedConfig;
use crate::payment::task::DEFAULT_PAYMENT_TIMEOUT;
use crate::payment::{
    CardDetails, PaymentError, PaymentKind, PaymentProcessor, PaymentTask, Pricing, Receipt,
    SimulatedProcessor,
};
use crate::session::{self, AppState, SessionError, User};
use crate::store::{FileStore, KeyValueStore};

/// Errors from storefront operations
#[derive(Debug, Error)]
pub enum StorefrontError {
    #[error("Sign in to download ebooks")]
    NotSignedIn,

    #[error("No ebook with id {0}")]
    UnknownItem(ItemId),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Payment(#[from] PaymentError),
}

pub struct Storefront<S: KeyValueStore> {
    catalog: Catalog,
    store: S,
    processor: Arc<dyn PaymentProcessor>,
    pricing: Pricing,
    payment_timeout: Duration,
}

impl Storefront<FileStore> {
    /// Assemble the storefront described by `config`
    pub async fn from_config(config: &ResolvedConfig) -> anyhow::Result<Self> {
        let source = source_for(
            config.catalog_path.clone(),
            config.catalog_url.clone(),
            config.catalog_timeout,
        );
        let catalog = source
            .load()
            .await
            .with_context(|| format!("Failed to load catalog ({})", source.describe()))?;
        info!(source = %source.describe(), items = catalog.len(), "Catalog loaded");

        let processor = SimulatedProcessor::new()
            .with_delay(config.payment.processing_delay)
            .with_decline_cards(&config.payment.decline_cards);

        Ok(Self::new(catalog, FileStore::new(config.storage_path()), Arc::new(processor))
            .with_pricing(config.pricing)
            .with_payment_timeout(config.payment.timeout))
    }
}

impl<S: KeyValueStore> Storefront<S> {
    pub fn new(catalog: Catalog, store: S, processor: Arc<dyn PaymentProcessor>) -> Self {
        Self {
            catalog,
            store,
            processor,
            pricing: Pricing::default(),
            payment_timeout: DEFAULT_PAYMENT_TIMEOUT,
        }
    }

    pub fn with_pricing(mut self, pricing: Pricing) -> Self {
        self.pricing = pricing;
        self
    }

    pub fn with_payment_timeout(mut self, timeout: Duration) -> Self {
        self.payment_timeout = timeout;
        self
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn pricing(&self) -> Pricing {
        self.pricing
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Current session as persisted in the store
    pub fn state(&self) -> Result<AppState, StorefrontError> {
        Ok(session::restore(&self.store)?)
    }

    /// Catalog items matching the search text and category selector
    pub fn browse(&self, query: &str, category: &str) -> Vec<&CatalogItem> {
        self.catalog.filter(query, category)
    }

    /// Start a background charge for `kind`
    pub fn start_payment(&self, kind: PaymentKind, card: CardDetails) -> PaymentTask {
        let request = self.pricing.request(kind, card);
        PaymentTask::spawn(self.processor.clone(), request, self.payment_timeout)
    }

    /// Sign in, charging the subscription first.
    ///
    /// The session is only written once the charge succeeds; on failure the
    /// stored session is left as it was.
    #[instrument(skip_all)]
    pub async fn sign_in(
        &self,
        state: &AppState,
        name: impl AsRef<str>,
        email: impl AsRef<str>,
        card: CardDetails,
        now: DateTime<Utc>,
    ) -> Result<(AppState, Receipt), StorefrontError> {
        let user = User::new(name, email, now)?;

        let receipt = self
            .start_payment(PaymentKind::Subscription, card)
            .wait()
            .await?;

        let next = state.login(user, now);
        session::persist(&next, &self.store)?;
        info!(transaction_id = %receipt.transaction_id, "Signed in");

        Ok((next, receipt))
    }

    /// Buy a single download; requires a signed-in session
    #[instrument(skip(self, state, card))]
    pub async fn purchase(
        &self,
        state: &AppState,
        item_id: ItemId,
        card: CardDetails,
    ) -> Result<(&CatalogItem, Receipt), StorefrontError> {
        if !state.is_logged_in() {
            return Err(StorefrontError::NotSignedIn);
        }

        let item = self
            .catalog
            .get(item_id)
            .ok_or(StorefrontError::UnknownItem(item_id))?;

        let receipt = self
            .start_payment(PaymentKind::Download { item_id }, card)
            .wait()
            .await?;
        info!(title = %item.title, transaction_id = %receipt.transaction_id, "Download purchased");

        Ok((item, receipt))
    }

    /// Sign out and clear the stored session
    pub fn sign_out(&self, state: &AppState, now: DateTime<Utc>) -> Result<AppState, StorefrontError> {
        let next = state.logout(now);
        session::persist(&next, &self.store)?;
        info!("Signed out");
        Ok(next)
    }
}
