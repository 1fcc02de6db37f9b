use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;

use crate::error::TickError;
use crate::model::tick::Tick;

/// Tick stream subscription request (`{"ticks":"R_75","subscribe":1}`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubscribeRequest {
    pub ticks: String,
    pub subscribe: u8,
}

impl SubscribeRequest {
    pub fn new(symbol: &str) -> Self {
        Self {
            ticks: symbol.to_string(),
            subscribe: 1,
        }
    }
}

/// Envelope of any message on the feed. Only `tick` and `error` are acted on.
#[derive(Debug, Deserialize)]
pub struct FeedEnvelope<'a> {
    #[serde(borrow, default)]
    pub tick: Option<FeedTick<'a>>,
    #[serde(default)]
    pub error: Option<FeedErrorBody>,
    #[serde(default)]
    pub msg_type: Option<String>,
}

/// Deriv tick payload. `quote` is kept as raw JSON so its exact text survives
/// whether it arrives as a number or a string.
#[derive(Debug, Deserialize)]
pub struct FeedTick<'a> {
    #[serde(borrow)]
    pub quote: &'a RawValue,
    #[serde(default)]
    pub epoch: Option<f64>,
    #[serde(default)]
    pub symbol: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FeedErrorBody {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FeedMessage {
    Tick(Tick),
    Error(FeedErrorBody),
    /// Acks, pings and anything else without a tick.
    Other(Option<String>),
}

/// Exact source text of a quote: JSON numbers verbatim, JSON strings unescaped.
pub fn raw_quote_text(quote: &RawValue) -> Result<String, TickError> {
    let raw = quote.get().trim();
    match raw.as_bytes().first() {
        Some(b'"') => serde_json::from_str::<String>(raw)
            .map_err(|e| TickError::Malformed(format!("quote string: {}", e))),
        Some(b'-') | Some(b'0'..=b'9') => Ok(raw.to_string()),
        _ => Err(TickError::Malformed(format!("unsupported quote value {}", raw))),
    }
}

/// Decode one text frame. `received_at_ms` becomes the tick's timestamp.
pub fn parse_feed_message(text: &str, received_at_ms: u64) -> Result<FeedMessage, TickError> {
    let envelope: FeedEnvelope<'_> =
        serde_json::from_str(text).map_err(|e| TickError::Malformed(e.to_string()))?;

    if let Some(error) = envelope.error {
        return Ok(FeedMessage::Error(error));
    }
    let Some(tick) = envelope.tick else {
        return Ok(FeedMessage::Other(envelope.msg_type));
    };

    let raw_quote = raw_quote_text(tick.quote)?;
    let epoch = tick
        .epoch
        .filter(|e| e.is_finite() && *e > 0.0)
        .map(|e| e as u64);
    Tick::from_raw_quote(&raw_quote, epoch, received_at_ms).map(FeedMessage::Tick)
}
