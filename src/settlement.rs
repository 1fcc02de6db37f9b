use crate::model::ledger::{SettlementRecord, StatsLedger};
use crate::model::prediction::Prediction;
use crate::model::tick::Tick;

pub const SETTLEMENT_WINDOW_MS: u64 = 15_000;

/// Holds the one outstanding prediction and scores it against the first tick
/// that arrives after its validity window has elapsed.
#[derive(Debug, Clone)]
pub struct SettlementTracker {
    pending: Option<Prediction>,
    window_ms: u64,
}

impl Default for SettlementTracker {
    fn default() -> Self {
        Self::new(SETTLEMENT_WINDOW_MS)
    }
}

impl SettlementTracker {
    pub fn new(window_ms: u64) -> Self {
        Self {
            pending: None,
            window_ms,
        }
    }

    pub fn pending(&self) -> Option<&Prediction> {
        self.pending.as_ref()
    }

    pub fn window_ms(&self) -> u64 {
        self.window_ms
    }

    /// Install a new pending prediction. Returns the unsettled one it replaces,
    /// which is discarded without scoring.
    pub fn arm(&mut self, prediction: Prediction) -> Option<Prediction> {
        self.pending.replace(prediction)
    }

    pub fn clear(&mut self) -> Option<Prediction> {
        self.pending.take()
    }

    /// Earliest tick timestamp that may settle the pending prediction.
    pub fn due_at_ms(&self) -> Option<u64> {
        self.pending
            .as_ref()
            .map(|p| p.issued_at_ms.saturating_add(self.window_ms))
    }

    /// Score the pending prediction against `tick` if its window has elapsed.
    /// On settlement the ledger is updated and the prediction is cleared; the
    /// caller persists the ledger.
    pub fn on_tick(&mut self, tick: &Tick, ledger: &mut StatsLedger) -> Option<SettlementRecord> {
        let due = self.due_at_ms()?;
        if tick.timestamp_ms < due {
            return None;
        }
        let prediction = self.pending.take()?;
        let record = SettlementRecord::new(tick.timestamp_ms, prediction.digit, tick.digit);
        ledger.record(record);
        Some(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prediction(digit: u8, issued_at_ms: u64) -> Prediction {
        Prediction {
            digit,
            confidence: 50,
            issued_at_ms,
            distribution: [0.1; 10],
        }
    }

    #[test]
    fn waits_for_window_before_settling() {
        let mut tracker = SettlementTracker::default();
        let mut ledger = StatsLedger::default();
        tracker.arm(prediction(4, 1_000));

        assert!(tracker.on_tick(&Tick::from_digit(4, 15_999), &mut ledger).is_none());
        assert_eq!(ledger.total, 0);
        assert!(tracker.pending().is_some());

        let record = tracker
            .on_tick(&Tick::from_digit(4, 16_000), &mut ledger)
            .unwrap();
        assert!(record.win);
        assert_eq!(ledger.total, 1);
        assert_eq!(ledger.wins, 1);
        assert!(tracker.pending().is_none());
    }

    #[test]
    fn settles_exactly_once() {
        let mut tracker = SettlementTracker::default();
        let mut ledger = StatsLedger::default();
        tracker.arm(prediction(2, 0));
        assert!(tracker.on_tick(&Tick::from_digit(8, 20_000), &mut ledger).is_some());
        assert!(tracker.on_tick(&Tick::from_digit(2, 21_000), &mut ledger).is_none());
        assert_eq!(ledger.total, 1);
        assert_eq!(ledger.wins, 0);
    }

    #[test]
    fn arming_replaces_unsettled_prediction() {
        let mut tracker = SettlementTracker::default();
        assert!(tracker.arm(prediction(1, 0)).is_none());
        let discarded = tracker.arm(prediction(9, 15_000)).unwrap();
        assert_eq!(discarded.digit, 1);
        assert_eq!(tracker.due_at_ms(), Some(30_000));
    }
}
