use std::io::Write;

use tokio::sync::watch;

use crate::error::PredictError;
use crate::model::ledger::SettlementRecord;
use crate::model::prediction::Prediction;
use crate::model::tick::Tick;
use crate::stream_client::ConnectionState;

/// Everything a renderer needs after a state change.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub symbol: String,
    pub symbol_label: String,
    pub connection_state: ConnectionState,
    pub live: bool,
    /// Oldest first.
    pub recent_ticks: Vec<Tick>,
    pub history_len: usize,
    pub digit_frequency: [usize; 10],
    /// Outstanding, unsettled prediction.
    pub current_prediction: Option<Prediction>,
    /// Most recently issued prediction, kept for display after it settles.
    pub last_prediction: Option<Prediction>,
    pub forecast_error: Option<PredictError>,
    pub countdown_secs: u64,
    pub wins: u32,
    pub total: u32,
    pub losses: u32,
    pub win_rate_percent: u32,
    /// Newest first.
    pub recent_settlements: Vec<SettlementRecord>,
    pub dropped_messages: u64,
}

impl Snapshot {
    pub fn empty(symbol: &str) -> Self {
        Self {
            symbol: symbol.to_string(),
            symbol_label: crate::symbol_catalog::display_name(symbol),
            connection_state: ConnectionState::Disconnected,
            live: true,
            recent_ticks: Vec::new(),
            history_len: 0,
            digit_frequency: [0; 10],
            current_prediction: None,
            last_prediction: None,
            forecast_error: None,
            countdown_secs: 0,
            wins: 0,
            total: 0,
            losses: 0,
            win_rate_percent: 0,
            recent_settlements: Vec::new(),
            dropped_messages: 0,
        }
    }

    pub fn last_tick(&self) -> Option<&Tick> {
        self.recent_ticks.last()
    }
}

/// Receives a snapshot after every state change. Fire-and-forget.
pub trait Renderer: Send {
    fn render(&mut self, snapshot: &Snapshot);
}

/// Cue played when a new prediction is issued. Failures are the implementor's
/// problem and never reach the caller.
pub trait FeedbackNotifier: Send {
    fn notify(&mut self);
}

#[derive(Debug, Default)]
pub struct NullRenderer;

impl Renderer for NullRenderer {
    fn render(&mut self, _snapshot: &Snapshot) {}
}

#[derive(Debug, Default)]
pub struct NoopNotifier;

impl FeedbackNotifier for NoopNotifier {
    fn notify(&mut self) {}
}

/// Publishes snapshots to the terminal UI through a watch channel.
#[derive(Debug)]
pub struct WatchRenderer {
    tx: watch::Sender<Snapshot>,
}

impl WatchRenderer {
    pub fn new(tx: watch::Sender<Snapshot>) -> Self {
        Self { tx }
    }
}

impl Renderer for WatchRenderer {
    fn render(&mut self, snapshot: &Snapshot) {
        self.tx.send_replace(snapshot.clone());
    }
}

/// Rings the terminal bell.
#[derive(Debug, Default)]
pub struct BellNotifier;

impl FeedbackNotifier for BellNotifier {
    fn notify(&mut self) {
        let mut out = std::io::stdout();
        let _ = out.write_all(b"\x07").and_then(|_| out.flush());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn watch_renderer_replaces_latest_snapshot() {
        let (tx, rx) = watch::channel(Snapshot::empty("R_75"));
        let mut renderer = WatchRenderer::new(tx);
        let mut snapshot = Snapshot::empty("R_50");
        snapshot.total = 3;
        renderer.render(&snapshot);
        assert_eq!(rx.borrow().symbol, "R_50");
        assert_eq!(rx.borrow().total, 3);
    }

    #[test]
    fn null_sinks_accept_everything() {
        let mut renderer = NullRenderer;
        let mut notifier = NoopNotifier;
        renderer.render(&Snapshot::empty("R_10"));
        notifier.notify();
    }

    #[test]
    fn empty_snapshot_uses_catalog_label() {
        let snapshot = Snapshot::empty("R_100");
        assert_eq!(snapshot.symbol_label, "Volatility 100 (R_100)");
        assert!(snapshot.last_tick().is_none());
    }
}
