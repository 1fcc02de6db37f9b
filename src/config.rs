use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use url::Url;

use crate::predictor::PredictorConfig;
use crate::symbol_catalog;

const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub feed: FeedConfig,
    #[serde(default)]
    pub predictor: PredictorConfig,
    #[serde(default)]
    pub settlement: SettlementConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub ui: UiConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    pub ws_url: String,
    pub app_id: String,
    pub symbol: String,
    pub reconnect_delay_ms: u64,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            ws_url: "wss://ws.derivws.com/websockets/v3".to_string(),
            app_id: "1089".to_string(),
            symbol: symbol_catalog::DEFAULT_SYMBOL.to_string(),
            reconnect_delay_ms: 3_000,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SettlementConfig {
    /// A prediction settles on the first tick at or after `issued_at + window_ms`.
    pub window_ms: u64,
}

impl Default for SettlementConfig {
    fn default() -> Self {
        Self { window_ms: 15_000 }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub path: PathBuf,
    pub key: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("data/digit_oracle.sqlite"),
            key: "ph_digit_predictor_stats".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    pub refresh_rate_ms: u64,
    pub display_ticks: usize,
    pub log_rows: usize,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            refresh_rate_ms: 100,
            display_ticks: 50,
            log_rows: 20,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl FeedConfig {
    /// Feed endpoint with the `app_id` query parameter attached.
    pub fn endpoint_url(&self) -> Result<Url> {
        let base = Url::parse(&self.ws_url)
            .with_context(|| format!("invalid feed.ws_url '{}'", self.ws_url))?;
        if !matches!(base.scheme(), "ws" | "wss") {
            bail!(
                "invalid feed.ws_url '{}': scheme must be ws or wss",
                self.ws_url
            );
        }
        let mut url = base;
        if !self.app_id.trim().is_empty() {
            url.query_pairs_mut()
                .append_pair("app_id", self.app_id.trim());
        }
        Ok(url)
    }
}

fn config_path() -> PathBuf {
    std::env::var("DIGIT_ORACLE_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH))
}

impl Config {
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        let path = config_path();
        let mut config = Self::load_from_path(&path)?;

        if let Ok(app_id) = std::env::var("DERIV_APP_ID") {
            if !app_id.trim().is_empty() {
                config.feed.app_id = app_id.trim().to_string();
            }
        }

        config.validate()?;
        Ok(config)
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let config_str = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        toml::from_str(&config_str).with_context(|| format!("failed to parse {}", path.display()))
    }

    pub fn from_toml_str(toml_str: &str) -> Result<Self> {
        let config: Config = toml::from_str(toml_str).context("failed to parse config toml")?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !symbol_catalog::is_known(&self.feed.symbol) {
            bail!("feed.symbol '{}' is not in the symbol catalog", self.feed.symbol);
        }
        if self.feed.reconnect_delay_ms == 0 {
            bail!("feed.reconnect_delay_ms must be > 0");
        }
        self.feed
            .endpoint_url()
            .context("feed endpoint is invalid")?;
        self.predictor
            .validate()
            .context("predictor section is invalid")?;
        if self.settlement.window_ms == 0 {
            bail!("settlement.window_ms must be > 0");
        }
        if self.storage.key.trim().is_empty() {
            bail!("storage.key must not be empty");
        }
        if self.ui.display_ticks == 0 {
            bail!("ui.display_ticks must be > 0");
        }
        if self.ui.refresh_rate_ms == 0 {
            bail!("ui.refresh_rate_ms must be > 0");
        }
        Ok(())
    }
}
