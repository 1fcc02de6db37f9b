use crate::digit::last_digit;
use crate::error::TickError;

/// One accepted quote from the feed. Never mutated after construction.
#[derive(Debug, Clone, PartialEq)]
pub struct Tick {
    pub quote: f64,
    pub raw_quote: String,
    /// Feed epoch in seconds.
    pub epoch: u64,
    /// Local wall-clock receipt time. Settlement windows are measured against this.
    pub timestamp_ms: u64,
    pub digit: u8,
}

impl Tick {
    /// Validate a raw quote and derive its digit. Non-finite quotes and quotes
    /// without a digit are rejected.
    pub fn from_raw_quote(
        raw_quote: &str,
        epoch: Option<u64>,
        timestamp_ms: u64,
    ) -> Result<Self, TickError> {
        let quote: f64 = raw_quote
            .trim()
            .parse()
            .map_err(|_| TickError::NonFinite(raw_quote.to_string()))?;
        if !quote.is_finite() {
            return Err(TickError::NonFinite(raw_quote.to_string()));
        }
        let digit = last_digit(raw_quote)?;
        Ok(Self {
            quote,
            raw_quote: raw_quote.trim().to_string(),
            epoch: epoch.unwrap_or(timestamp_ms / 1000),
            timestamp_ms,
            digit,
        })
    }

    /// Synthetic tick carrying only a digit (replay and tests).
    pub fn from_digit(digit: u8, timestamp_ms: u64) -> Self {
        let digit = digit % 10;
        Self {
            quote: f64::from(digit),
            raw_quote: digit.to_string(),
            epoch: timestamp_ms / 1000,
            timestamp_ms,
            digit,
        }
    }
}
