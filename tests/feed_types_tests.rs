use digit_oracle::deriv::types::{parse_feed_message, FeedMessage, SubscribeRequest};
use digit_oracle::error::TickError;

#[test]
fn subscribe_request_serializes_in_wire_order() {
    let json = serde_json::to_string(&SubscribeRequest::new("R_100")).unwrap();
    assert_eq!(json, r#"{"ticks":"R_100","subscribe":1}"#);
}

#[test]
/// A full Deriv tick frame keeps the exact quote text.
fn parses_deriv_tick_frame() {
    let text = r#"{
        "echo_req": {"subscribe": 1, "ticks": "R_75"},
        "msg_type": "tick",
        "subscription": {"id": "c84a793b-8a87-7999-ce10-9b22f7ceead3"},
        "tick": {
            "ask": 84163.2846,
            "bid": 84162.9846,
            "epoch": 1700000002,
            "id": "c84a793b-8a87-7999-ce10-9b22f7ceead3",
            "pip_size": 4,
            "quote": 84163.1340,
            "symbol": "R_75"
        }
    }"#;
    let FeedMessage::Tick(tick) = parse_feed_message(text, 5_000).unwrap() else {
        panic!("expected a tick");
    };
    assert_eq!(tick.raw_quote, "84163.1340");
    assert_eq!(tick.digit, 0);
    assert_eq!(tick.epoch, 1_700_000_002);
    assert_eq!(tick.timestamp_ms, 5_000);
}

#[test]
fn tick_without_epoch_uses_receipt_time() {
    let text = r#"{"tick":{"quote":"101.23"}}"#;
    let FeedMessage::Tick(tick) = parse_feed_message(text, 42_999).unwrap() else {
        panic!("expected a tick");
    };
    assert_eq!(tick.epoch, 42);
    assert_eq!(tick.digit, 3);
}

#[test]
fn non_tick_messages_are_other() {
    assert_eq!(
        parse_feed_message(r#"{"msg_type":"ping","ping":"pong"}"#, 0).unwrap(),
        FeedMessage::Other(Some("ping".to_string()))
    );
    assert_eq!(
        parse_feed_message("{}", 0).unwrap(),
        FeedMessage::Other(None)
    );
}

#[test]
fn error_body_is_surfaced() {
    let text = r#"{"error":{"code":"MarketIsClosed","message":"closed"},"msg_type":"ticks"}"#;
    let FeedMessage::Error(error) = parse_feed_message(text, 0).unwrap() else {
        panic!("expected an error");
    };
    assert_eq!(error.code, "MarketIsClosed");
    assert_eq!(error.message, "closed");
}

#[test]
fn rejects_unusable_frames() {
    assert!(matches!(
        parse_feed_message("not json", 0),
        Err(TickError::Malformed(_))
    ));
    assert!(matches!(
        parse_feed_message(r#"{"tick":{"quote":null}}"#, 0),
        Err(TickError::Malformed(_))
    ));
    assert!(matches!(
        parse_feed_message(r#"{"tick":{"epoch":1}}"#, 0),
        Err(TickError::Malformed(_))
    ));
    assert!(matches!(
        parse_feed_message(r#"{"tick":{"quote":"NaN"}}"#, 0),
        Err(TickError::NonFinite(_))
    ));
}
