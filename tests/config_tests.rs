use std::path::Path;

use digit_oracle::config::Config;

#[test]
/// The shipped config file must parse and validate.
fn shipped_default_config_is_valid() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("config/default.toml");
    let config = Config::load_from_path(&path).expect("config/default.toml should parse");
    config.validate().expect("config/default.toml should validate");

    assert_eq!(config.feed.symbol, "R_75");
    assert_eq!(config.feed.reconnect_delay_ms, 3000);
    assert_eq!(config.predictor.interval_ms, 15_000);
    assert_eq!(config.predictor.min_history, 20);
    assert_eq!(config.settlement.window_ms, 15_000);
    assert_eq!(config.storage.key, "ph_digit_predictor_stats");
    assert_eq!(config.ui.display_ticks, 50);
}

#[test]
fn empty_toml_falls_back_to_defaults() {
    let config = Config::from_toml_str("").expect("empty config should use defaults");
    assert_eq!(config.feed.symbol, "R_75");
    assert_eq!(config.feed.app_id, "1089");
    assert_eq!(config.logging.level, "info");
    assert_eq!(config.ui.refresh_rate_ms, 100);
    assert_eq!(config.ui.log_rows, 20);
}

#[test]
fn endpoint_url_appends_app_id() {
    let config = Config::from_toml_str(
        r#"
[feed]
ws_url = "wss://ws.derivws.com/websockets/v3"
app_id = "4242"
"#,
    )
    .unwrap();
    let url = config.feed.endpoint_url().unwrap();
    assert_eq!(
        url.as_str(),
        "wss://ws.derivws.com/websockets/v3?app_id=4242"
    );
}

#[test]
fn partial_predictor_section_keeps_remaining_defaults() {
    let config = Config::from_toml_str(
        r#"
[predictor]
min_history = 30
hot_boost = 1.5
"#,
    )
    .unwrap();
    assert_eq!(config.predictor.min_history, 30);
    assert!((config.predictor.hot_boost - 1.5).abs() < f64::EPSILON);
    assert_eq!(config.predictor.short_window, 20);
    assert!((config.predictor.short_weight - 0.6).abs() < f64::EPSILON);
}

#[test]
fn rejects_unknown_symbol() {
    let err = Config::from_toml_str(
        r#"
[feed]
symbol = "BTCUSDT"
"#,
    )
    .unwrap_err();
    assert!(format!("{:#}", err).contains("symbol catalog"));
}

#[test]
fn rejects_non_websocket_scheme() {
    let result = Config::from_toml_str(
        r#"
[feed]
ws_url = "https://ws.derivws.com/websockets/v3"
"#,
    );
    assert!(result.is_err());
}

#[test]
fn rejects_zero_reconnect_delay_and_bad_weights() {
    assert!(Config::from_toml_str("[feed]\nreconnect_delay_ms = 0\n").is_err());
    assert!(Config::from_toml_str("[predictor]\nshort_weight = 0.9\n").is_err());
    assert!(Config::from_toml_str("[settlement]\nwindow_ms = 0\n").is_err());
    assert!(Config::from_toml_str("[storage]\nkey = \"  \"\n").is_err());
}

#[test]
/// History requirements beyond the rolling buffer could never be met.
fn rejects_history_longer_than_buffer() {
    let err = Config::from_toml_str("[predictor]\nmin_history = 500\n").unwrap_err();
    assert!(format!("{:#}", err).contains("min_history"));
    assert!(Config::from_toml_str("[predictor]\nmin_history = 100\n").is_ok());

    let err = Config::from_toml_str("[predictor]\nlong_window = 250\n").unwrap_err();
    assert!(format!("{:#}", err).contains("look back"));
    assert!(Config::from_toml_str("[predictor]\ntransition_window = 100\n").is_err());
}

#[test]
fn rejects_zero_refresh_rate() {
    let err = Config::from_toml_str("[ui]\nrefresh_rate_ms = 0\n").unwrap_err();
    assert!(format!("{:#}", err).contains("refresh_rate_ms"));
}
