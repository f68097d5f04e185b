//! Card details entered at checkout and their validation.

use chrono::{Datelike, NaiveDate};
use sha2::{Digest, Sha256};

use super::PaymentError;

/// Card form fields as entered by the reader
#[derive(Clone, PartialEq, Eq)]
pub struct CardDetails {
    pub cardholder: String,
    pub number: String,
    /// `MM/YY`
    pub expiry: String,
    pub cvv: String,
}

// Never print the full number or CVV
impl std::fmt::Debug for CardDetails {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CardDetails")
            .field("cardholder", &self.cardholder)
            .field("last4", &self.last4())
            .field("expiry", &self.expiry)
            .finish_non_exhaustive()
    }
}

impl CardDetails {
    pub fn new(
        cardholder: impl Into<String>,
        number: impl Into<String>,
        expiry: impl Into<String>,
        cvv: impl Into<String>,
    ) -> Self {
        Self {
            cardholder: cardholder.into(),
            number: number.into(),
            expiry: expiry.into(),
            cvv: cvv.into(),
        }
    }

    /// Card number with spaces and dashes removed
    pub fn digits(&self) -> String {
        self.number
            .chars()
            .filter(|c| *c != ' ' && *c != '-')
            .collect()
    }

    /// Last four digits, or fewer for very short input
    pub fn last4(&self) -> String {
        let digits = self.digits();
        let start = digits.len().saturating_sub(4);
        digits.get(start..).unwrap_or_default().to_string()
    }

    /// Stable identifier for the card that does not reveal the number
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.digits().as_bytes());
        let digest = hasher.finalize();
        hex::encode(&digest[..8])
    }

    /// Check every field; `today` decides whether the card has expired
    pub fn validate(&self, today: NaiveDate) -> Result<(), PaymentError> {
        if self.cardholder.trim().is_empty() {
            return Err(PaymentError::MissingCardholder);
        }

        let digits = self.digits();
        if !(13..=19).contains(&digits.len()) || !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(PaymentError::InvalidCardNumber);
        }
        if !luhn_valid(&digits) {
            return Err(PaymentError::ChecksumMismatch);
        }

        let (month, year) = parse_expiry(&self.expiry)
            .ok_or_else(|| PaymentError::InvalidExpiry(self.expiry.clone()))?;
        // Cards are valid through the last day of the expiry month
        if (year, month) < (today.year(), today.month()) {
            return Err(PaymentError::CardExpired(self.expiry.clone()));
        }

        let cvv = self.cvv.trim();
        if !(3..=4).contains(&cvv.len()) || !cvv.chars().all(|c| c.is_ascii_digit()) {
            return Err(PaymentError::InvalidCvv);
        }

        Ok(())
    }
}

/// Parse `MM/YY` into (month, four-digit year)
fn parse_expiry(expiry: &str) -> Option<(u32, i32)> {
    let (mm, yy) = expiry.trim().split_once('/')?;
    let two_digits = |s: &str| s.len() == 2 && s.bytes().all(|b| b.is_ascii_digit());
    if !two_digits(mm) || !two_digits(yy) {
        return None;
    }

    let month: u32 = mm.parse().ok()?;
    let year: i32 = yy.parse().ok()?;
    if !(1..=12).contains(&month) {
        return None;
    }

    Some((month, 2000 + year))
}

/// Luhn mod-10 checksum over an all-digit string
fn luhn_valid(digits: &str) -> bool {
    let sum: u32 = digits
        .chars()
        .rev()
        .filter_map(|c| c.to_digit(10))
        .enumerate()
        .map(|(i, d)| {
            if i % 2 == 1 {
                let doubled = d * 2;
                if doubled > 9 {
                    doubled - 9
                } else {
                    doubled
                }
            } else {
                d
            }
        })
        .sum();

    sum % 10 == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 15).unwrap()
    }

    fn card(number: &str, expiry: &str, cvv: &str) -> CardDetails {
        CardDetails::new("John Doe", number, expiry, cvv)
    }

    #[test]
    fn test_valid_card() {
        assert!(card("4242 4242 4242 4242", "12/27", "123")
            .validate(today())
            .is_ok());
        assert!(card("3782-822463-10005", "06/25", "1234")
            .validate(today())
            .is_ok());
    }

    #[test]
    fn test_luhn() {
        assert!(luhn_valid("4111111111111111"));
        assert!(luhn_valid("5555555555554444"));
        assert!(!luhn_valid("4242424242424241"));
    }

    #[test]
    fn test_field_errors() {
        let t = today();
        assert_eq!(
            CardDetails::new(" ", "4242424242424242", "12/27", "123").validate(t),
            Err(PaymentError::MissingCardholder)
        );
        assert_eq!(
            card("4242", "12/27", "123").validate(t),
            Err(PaymentError::InvalidCardNumber)
        );
        assert_eq!(
            card("4242x42424242424", "12/27", "123").validate(t),
            Err(PaymentError::InvalidCardNumber)
        );
        assert_eq!(
            card("4242424242424241", "12/27", "123").validate(t),
            Err(PaymentError::ChecksumMismatch)
        );
        assert_eq!(
            card("4242424242424242", "13/27", "123").validate(t),
            Err(PaymentError::InvalidExpiry("13/27".to_string()))
        );
        assert_eq!(
            card("4242424242424242", "+1/27", "123").validate(t),
            Err(PaymentError::InvalidExpiry("+1/27".to_string()))
        );
        assert_eq!(
            card("4242424242424242", "12/+7", "123").validate(t),
            Err(PaymentError::InvalidExpiry("12/+7".to_string()))
        );
        assert_eq!(
            card("4242424242424242", "1227", "123").validate(t),
            Err(PaymentError::InvalidExpiry("1227".to_string()))
        );
        assert_eq!(
            card("4242424242424242", "05/25", "123").validate(t),
            Err(PaymentError::CardExpired("05/25".to_string()))
        );
        assert_eq!(
            card("4242424242424242", "12/27", "12").validate(t),
            Err(PaymentError::InvalidCvv)
        );
    }

    #[test]
    fn test_masking() {
        let c = card("4242 4242 4242 4242", "12/27", "987");
        assert_eq!(c.last4(), "4242");
        assert_eq!(c.fingerprint().len(), 16);
        assert_eq!(c.fingerprint(), card("4242424242424242", "01/30", "000").fingerprint());

        let debug = format!("{:?}", c);
        assert!(!debug.contains("4242 4242"));
        assert!(!debug.contains("987"));
    }
}
