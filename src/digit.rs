use crate::error::TickError;

/// Last ASCII digit of a quote's source text, scanning right to left.
///
/// The parsed `f64` must not be used here: `1234.50` parses to `1234.5` and
/// would report the wrong digit.
pub fn last_digit(raw_quote: &str) -> Result<u8, TickError> {
    raw_quote
        .trim()
        .bytes()
        .rev()
        .find(u8::is_ascii_digit)
        .map(|b| b - b'0')
        .ok_or_else(|| TickError::NoDigitFound(raw_quote.to_string()))
}
