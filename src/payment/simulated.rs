//! Stand-in processor: validates the card, waits, then approves.
//!
//! Cards on the decline list are refused after the same delay, so callers
//! exercise the failure path exactly like a real decline.

use std::collections::HashSet;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use tracing::{info, warn};

use super::{PaymentError, PaymentProcessor, PaymentRequest, Receipt};

/// Default processing delay
pub const DEFAULT_DELAY: Duration = Duration::from_millis(2000);

/// Card number that is always declined unless configured otherwise
pub const DEFAULT_DECLINE_CARD: &str = "4000000000000002";

pub struct SimulatedProcessor {
    delay: Duration,
    decline_cards: HashSet<String>,
}

impl Default for SimulatedProcessor {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedProcessor {
    pub fn new() -> Self {
        Self {
            delay: DEFAULT_DELAY,
            decline_cards: [DEFAULT_DECLINE_CARD.to_string()].into_iter().collect(),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Replace the decline list; numbers may contain spaces or dashes
    pub fn with_decline_cards(mut self, cards: impl IntoIterator<Item = impl AsRef<str>>) -> Self {
        self.decline_cards = cards
            .into_iter()
            .map(|c| {
                c.as_ref()
                    .chars()
                    .filter(|ch| ch.is_ascii_digit())
                    .collect()
            })
            .collect();
        self
    }
}

#[async_trait]
impl PaymentProcessor for SimulatedProcessor {
    fn name(&self) -> &str {
        "simulated"
    }

    async fn charge(&self, request: &PaymentRequest) -> Result<Receipt, PaymentError> {
        request.card.validate(Utc::now().date_naive())?;

        info!(
            amount = %request.amount,
            last4 = %request.card.last4(),
            "Processing payment"
        );
        tokio::time::sleep(self.delay).await;

        if self.decline_cards.contains(&request.card.digits()) {
            warn!(last4 = %request.card.last4(), "Payment declined");
            return Err(PaymentError::Declined {
                reason: "card declined by issuer".to_string(),
            });
        }

        let receipt = Receipt::approve(request, Utc::now());
        info!(transaction_id = %receipt.transaction_id, "Payment approved");
        Ok(receipt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payment::{CardDetails, PaymentKind, Pricing};

    fn request(number: &str) -> PaymentRequest {
        Pricing::default().request(
            PaymentKind::Subscription,
            CardDetails::new("John Doe", number, "12/99", "123"),
        )
    }

    #[tokio::test]
    async fn test_approves_valid_card() {
        let processor = SimulatedProcessor::new().with_delay(Duration::from_millis(5));
        let receipt = processor.charge(&request("4242424242424242")).await.unwrap();
        assert_eq!(receipt.card_last4, "4242");
    }

    #[tokio::test]
    async fn test_declines_listed_card() {
        let processor = SimulatedProcessor::new().with_delay(Duration::from_millis(5));
        let result = processor.charge(&request("4000 0000 0000 0002")).await;
        assert!(matches!(result, Err(PaymentError::Declined { .. })));
    }

    #[tokio::test]
    async fn test_custom_decline_list() {
        let processor = SimulatedProcessor::new()
            .with_delay(Duration::ZERO)
            .with_decline_cards(["4242-4242-4242-4242"]);

        assert!(processor.charge(&request("4242424242424242")).await.is_err());
        assert!(processor.charge(&request("4000000000000002")).await.is_ok());
    }

    #[tokio::test]
    async fn test_invalid_card_rejected_before_delay() {
        let processor = SimulatedProcessor::new().with_delay(Duration::from_secs(60));
        let start = std::time::Instant::now();
        let result = processor.charge(&request("1234")).await;

        assert_eq!(result, Err(PaymentError::InvalidCardNumber));
        assert!(start.elapsed() < Duration::from_secs(1));
    }
}
