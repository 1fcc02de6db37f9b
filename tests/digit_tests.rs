use digit_oracle::digit::last_digit;
use digit_oracle::error::TickError;
use digit_oracle::model::tick::Tick;

#[test]
/// Trailing zeros in the quote text are significant.
fn last_digit_reads_exact_text() {
    assert_eq!(last_digit("1234.50"), Ok(0));
    assert_eq!(last_digit("1234.5"), Ok(5));
    assert_eq!(last_digit("812.379"), Ok(9));
    assert_eq!(last_digit("7"), Ok(7));
    assert_eq!(last_digit("99"), Ok(9));
}

#[test]
fn last_digit_skips_trailing_non_digits() {
    assert_eq!(last_digit(" 98.21 "), Ok(1));
    assert_eq!(last_digit("-3.14"), Ok(4));
}

#[test]
fn last_digit_without_any_digit_fails() {
    assert!(matches!(last_digit(""), Err(TickError::NoDigitFound(_))));
    assert!(matches!(last_digit("-."), Err(TickError::NoDigitFound(_))));
    assert!(matches!(last_digit("abc"), Err(TickError::NoDigitFound(_))));
}

#[test]
fn tick_rejects_non_finite_quotes() {
    for raw in ["NaN", "inf", "-inf", "abc"] {
        assert!(
            matches!(Tick::from_raw_quote(raw, None, 0), Err(TickError::NonFinite(_))),
            "{raw} should be rejected"
        );
    }
}

#[test]
fn tick_epoch_falls_back_to_receipt_time() {
    let tick = Tick::from_raw_quote("100.25", None, 1_700_000_123_456).unwrap();
    assert_eq!(tick.epoch, 1_700_000_123);
    assert_eq!(tick.timestamp_ms, 1_700_000_123_456);
    assert_eq!(tick.digit, 5);
    assert!((tick.quote - 100.25).abs() < f64::EPSILON);
}
