//! Simulated checkout.
//!
//! A charge is an explicit asynchronous operation with an explicit outcome:
//! [`PaymentProcessor::charge`] resolves to a [`Receipt`] or a
//! [`PaymentError`]. [`PaymentTask`] runs a charge in the background with a
//! deadline.

pub mod card;
pub mod simulated;
pub mod task;

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::catalog::{ItemId, Price};

pub use card::CardDetails;
pub use simulated::SimulatedProcessor;
pub use task::PaymentTask;

/// Why a charge did not go through
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PaymentError {
    #[error("Cardholder name is required")]
    MissingCardholder,

    #[error("Card number must be 13-19 digits")]
    InvalidCardNumber,

    #[error("Card number failed checksum")]
    ChecksumMismatch,

    #[error("Expiry must be MM/YY, got '{0}'")]
    InvalidExpiry(String),

    #[error("Card expired: {0}")]
    CardExpired(String),

    #[error("CVV must be 3 or 4 digits")]
    InvalidCvv,

    #[error("Payment declined: {reason}")]
    Declined { reason: String },

    #[error("Payment timed out after {0:?}")]
    TimedOut(Duration),

    #[error("Payment task aborted: {0}")]
    Aborted(String),
}

impl PaymentError {
    /// Whether the reader can fix this by correcting the form
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            PaymentError::MissingCardholder
                | PaymentError::InvalidCardNumber
                | PaymentError::ChecksumMismatch
                | PaymentError::InvalidExpiry(_)
                | PaymentError::CardExpired(_)
                | PaymentError::InvalidCvv
        )
    }
}

/// What is being paid for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum PaymentKind {
    /// Monthly library access, charged at sign-in
    Subscription,

    /// A single ebook download
    Download { item_id: ItemId },
}

impl PaymentKind {
    pub fn description(&self) -> &'static str {
        match self {
            PaymentKind::Subscription => "Monthly access to EbookVault library",
            PaymentKind::Download { .. } => "Single ebook download",
        }
    }
}

/// Prices for each kind of charge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pricing {
    pub subscription: Price,
    pub download: Price,
}

impl Default for Pricing {
    fn default() -> Self {
        Self {
            subscription: Price::from_cents(999),
            download: Price::from_cents(299),
        }
    }
}

impl Pricing {
    pub fn price_of(&self, kind: PaymentKind) -> Price {
        match kind {
            PaymentKind::Subscription => self.subscription,
            PaymentKind::Download { .. } => self.download,
        }
    }

    /// Build a request charging the configured price for `kind`
    pub fn request(&self, kind: PaymentKind, card: CardDetails) -> PaymentRequest {
        PaymentRequest {
            kind,
            amount: self.price_of(kind),
            card,
        }
    }
}

/// A single charge to attempt
#[derive(Debug, Clone)]
pub struct PaymentRequest {
    pub kind: PaymentKind,
    pub amount: Price,
    pub card: CardDetails,
}

/// Proof of a successful charge. Holds no raw card data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    pub transaction_id: Uuid,
    pub kind: PaymentKind,
    pub amount: Price,
    pub card_last4: String,
    pub card_fingerprint: String,
    pub processed_at: DateTime<Utc>,
}

impl Receipt {
    /// Receipt for an approved request
    pub fn approve(request: &PaymentRequest, processed_at: DateTime<Utc>) -> Self {
        Self {
            transaction_id: Uuid::new_v4(),
            kind: request.kind,
            amount: request.amount,
            card_last4: request.card.last4(),
            card_fingerprint: request.card.fingerprint(),
            processed_at,
        }
    }

    /// Message shown to the reader once the charge succeeds
    pub fn confirmation(&self) -> &'static str {
        match self.kind {
            PaymentKind::Subscription => {
                "Welcome to EbookVault! You now have full access to our library."
            }
            PaymentKind::Download { .. } => "Your ebook download is starting now.",
        }
    }
}

/// Trait for payment backends
#[async_trait]
pub trait PaymentProcessor: Send + Sync {
    /// Human-readable processor name
    fn name(&self) -> &str;

    /// Attempt the charge
    async fn charge(&self, request: &PaymentRequest) -> Result<Receipt, PaymentError>;
}
