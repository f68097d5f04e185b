//! Background charge with a deadline.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing::warn;

use super::{PaymentError, PaymentProcessor, PaymentRequest, Receipt};

/// Default deadline for a single charge
pub const DEFAULT_PAYMENT_TIMEOUT: Duration = Duration::from_secs(30);

/// A charge running on the tokio runtime
pub struct PaymentTask {
    handle: JoinHandle<Result<Receipt, PaymentError>>,
}

impl PaymentTask {
    /// Start charging `request`; the result is available from [`PaymentTask::wait`]
    pub fn spawn(
        processor: Arc<dyn PaymentProcessor>,
        request: PaymentRequest,
        deadline: Duration,
    ) -> Self {
        let handle = tokio::spawn(async move {
            match timeout(deadline, processor.charge(&request)).await {
                Ok(result) => result,
                Err(_) => {
                    warn!(processor = processor.name(), ?deadline, "Payment timed out");
                    Err(PaymentError::TimedOut(deadline))
                }
            }
        });

        Self { handle }
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Cancel the charge; `wait` then reports it as aborted
    pub fn abort(&self) {
        self.handle.abort();
    }

    /// Wait for the outcome
    pub async fn wait(self) -> Result<Receipt, PaymentError> {
        match self.handle.await {
            Ok(result) => result,
            Err(e) => Err(PaymentError::Aborted(e.to_string())),
        }
    }
}
