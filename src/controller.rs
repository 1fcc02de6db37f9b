use crate::config::Config;
use crate::deriv::types::{parse_feed_message, FeedMessage};
use crate::error::PredictError;
use crate::event::ControllerEvent;
use crate::input::UiCommand;
use crate::model::ledger::StatsLedger;
use crate::model::prediction::Prediction;
use crate::model::tick::Tick;
use crate::predictor::{DigitPredictor, PredictorConfig};
use crate::settlement::SettlementTracker;
use crate::snapshot::{FeedbackNotifier, Renderer, Snapshot};
use crate::stats_store::StatsStore;
use crate::stream_client::{StreamClient, StreamCommand, StreamEvent};
use crate::symbol_catalog;
use crate::tick_buffer::{TickBuffer, TICK_HISTORY_CAPACITY};

#[derive(Debug, Clone)]
pub struct ControllerSettings {
    pub symbol: String,
    pub reconnect_delay_ms: u64,
    pub predictor: PredictorConfig,
    pub settlement_window_ms: u64,
    pub history_capacity: usize,
    pub display_ticks: usize,
    pub log_rows: usize,
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

impl From<&Config> for ControllerSettings {
    fn from(config: &Config) -> Self {
        Self {
            symbol: symbol_catalog::normalize_symbol(&config.feed.symbol),
            reconnect_delay_ms: config.feed.reconnect_delay_ms,
            predictor: config.predictor,
            settlement_window_ms: config.settlement.window_ms,
            history_capacity: TICK_HISTORY_CAPACITY,
            display_ticks: config.ui.display_ticks,
            log_rows: config.ui.log_rows,
        }
    }
}

/// Sole owner of the tick history, the pending prediction and the ledger.
/// All mutation goes through [`Controller::handle`], one event at a time.
pub struct Controller {
    stream: StreamClient,
    buffer: TickBuffer,
    predictor: DigitPredictor,
    settlement: SettlementTracker,
    store: StatsStore,
    ledger: StatsLedger,
    renderer: Box<dyn Renderer>,
    notifier: Box<dyn FeedbackNotifier>,
    next_prediction_at_ms: u64,
    last_prediction: Option<Prediction>,
    forecast_error: Option<PredictError>,
    dropped_messages: u64,
    display_ticks: usize,
    log_rows: usize,
}

impl Controller {
    pub fn new(
        settings: ControllerSettings,
        store: StatsStore,
        renderer: Box<dyn Renderer>,
        notifier: Box<dyn FeedbackNotifier>,
        now_ms: u64,
    ) -> Self {
        let ledger = store.read();
        tracing::info!(
            wins = ledger.wins,
            total = ledger.total,
            "Loaded stats ledger"
        );
        Self {
            stream: StreamClient::new(&settings.symbol, settings.reconnect_delay_ms),
            buffer: TickBuffer::new(settings.history_capacity),
            predictor: DigitPredictor::new(settings.predictor),
            settlement: SettlementTracker::new(settings.settlement_window_ms),
            store,
            ledger,
            renderer,
            notifier,
            next_prediction_at_ms: now_ms.saturating_add(settings.predictor.interval_ms),
            last_prediction: None,
            forecast_error: None,
            dropped_messages: 0,
            display_ticks: settings.display_ticks,
            log_rows: settings.log_rows,
        }
    }

    /// Open the first connection.
    pub fn start(&mut self, now_ms: u64) -> Vec<StreamCommand> {
        self.stream.connect();
        self.publish(now_ms);
        self.stream.take_commands()
    }

    /// Process one event to completion and return the I/O it requires.
    pub fn handle(&mut self, event: ControllerEvent, now_ms: u64) -> Vec<StreamCommand> {
        match event {
            ControllerEvent::Stream(stream_event) => self.on_stream_event(stream_event, now_ms),
            ControllerEvent::PredictionDue => {
                let _ = self.run_prediction_cycle(now_ms);
            }
            ControllerEvent::CountdownTick => {}
            ControllerEvent::Command(command) => self.on_command(command),
        }
        self.publish(now_ms);
        self.stream.take_commands()
    }

    fn on_stream_event(&mut self, event: StreamEvent, now_ms: u64) {
        let Some(text) = self.stream.on_event(event, now_ms) else {
            return;
        };
        match parse_feed_message(&text, now_ms) {
            Ok(FeedMessage::Tick(tick)) => self.on_tick(tick),
            Ok(FeedMessage::Error(error)) => {
                tracing::warn!(
                    symbol = %self.stream.symbol(),
                    code = %error.code,
                    message = %error.message,
                    "Feed returned an error"
                );
            }
            Ok(FeedMessage::Other(msg_type)) => {
                tracing::trace!(msg_type = ?msg_type, "Ignoring non-tick message");
            }
            Err(e) => {
                self.dropped_messages = self.dropped_messages.saturating_add(1);
                tracing::debug!(error = %e, "Dropped feed message");
            }
        }
    }

    /// Append an accepted tick and settle the pending prediction if it is due.
    pub fn on_tick(&mut self, tick: Tick) {
        self.buffer.append(tick.clone());
        if let Some(record) = self.settlement.on_tick(&tick, &mut self.ledger) {
            self.store.write(&self.ledger);
            tracing::info!(
                predicted = record.predicted_digit,
                actual = record.actual_digit,
                win = record.win,
                wins = self.ledger.wins,
                total = self.ledger.total,
                "Prediction settled"
            );
        }
    }

    /// Score the current history and install the result as the pending
    /// prediction. An unsettled predecessor is discarded.
    pub fn run_prediction_cycle(&mut self, now_ms: u64) -> Result<Prediction, PredictError> {
        self.next_prediction_at_ms = now_ms.saturating_add(self.predictor.config().interval_ms);
        let digits = self.buffer.digit_sequence(self.buffer.capacity());
        let forecast = match self.predictor.forecast(&digits) {
            Ok(forecast) => forecast,
            Err(e) => {
                tracing::debug!(error = %e, "Skipping prediction cycle");
                self.forecast_error = Some(e);
                return Err(e);
            }
        };
        let prediction = forecast.into_prediction(now_ms);
        if let Some(discarded) = self.settlement.arm(prediction) {
            tracing::info!(
                digit = discarded.digit,
                issued_at_ms = discarded.issued_at_ms,
                "Discarded unsettled prediction"
            );
        }
        self.forecast_error = None;
        self.last_prediction = Some(prediction);
        tracing::info!(
            symbol = %self.stream.symbol(),
            digit = prediction.digit,
            confidence = prediction.confidence,
            history = digits.len(),
            "Prediction issued"
        );
        self.notifier.notify();
        Ok(prediction)
    }

    fn on_command(&mut self, command: UiCommand) {
        match command {
            UiCommand::NextSymbol => {
                let next = symbol_catalog::next_symbol(self.stream.symbol());
                self.switch_symbol(next);
            }
            UiCommand::PrevSymbol => {
                let prev = symbol_catalog::prev_symbol(self.stream.symbol());
                self.switch_symbol(prev);
            }
            UiCommand::SwitchSymbol(symbol) => self.switch_symbol(&symbol),
            UiCommand::ToggleLive => {
                let enabled = !self.stream.is_live();
                self.stream.set_live(enabled);
            }
            UiCommand::SetLive(enabled) => self.stream.set_live(enabled),
            UiCommand::ResetStats => {
                self.ledger = self.store.reset();
                tracing::info!("Stats ledger reset");
            }
            UiCommand::Quit => {}
        }
    }

    /// Resubscribe to `symbol` with an empty history. A pending prediction
    /// belongs to the old instrument and is dropped.
    pub fn switch_symbol(&mut self, symbol: &str) {
        if !symbol_catalog::is_known(symbol) {
            tracing::warn!(symbol = %symbol, "Ignoring switch to unknown symbol");
            return;
        }
        self.stream.switch_symbol(symbol);
        self.buffer.clear();
        self.forecast_error = None;
        if let Some(dropped) = self.settlement.clear() {
            tracing::info!(digit = dropped.digit, "Dropped pending prediction on symbol switch");
        }
    }

    pub fn countdown_secs(&self, now_ms: u64) -> u64 {
        self.next_prediction_at_ms.saturating_sub(now_ms).div_ceil(1000)
    }

    pub fn snapshot(&self, now_ms: u64) -> Snapshot {
        let symbol = self.stream.symbol();
        Snapshot {
            symbol: symbol.to_string(),
            symbol_label: symbol_catalog::display_name(symbol),
            connection_state: self.stream.state(),
            live: self.stream.is_live(),
            recent_ticks: self.buffer.recent(self.display_ticks),
            history_len: self.buffer.len(),
            digit_frequency: self.buffer.digit_frequency(self.buffer.capacity()),
            current_prediction: self.settlement.pending().copied(),
            last_prediction: self.last_prediction,
            forecast_error: self.forecast_error,
            countdown_secs: self.countdown_secs(now_ms),
            wins: self.ledger.wins,
            total: self.ledger.total,
            losses: self.ledger.losses(),
            win_rate_percent: self.ledger.win_rate_percent(),
            recent_settlements: self.ledger.recent(self.log_rows),
            dropped_messages: self.dropped_messages,
        }
    }

    fn publish(&mut self, now_ms: u64) {
        let snapshot = self.snapshot(now_ms);
        self.renderer.render(&snapshot);
    }

    pub fn buffer(&self) -> &TickBuffer {
        &self.buffer
    }

    pub fn ledger(&self) -> &StatsLedger {
        &self.ledger
    }

    pub fn pending_prediction(&self) -> Option<&Prediction> {
        self.settlement.pending()
    }

    pub fn stream(&self) -> &StreamClient {
        &self.stream
    }
}
