use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

pub const LEDGER_LOG_CAPACITY: usize = 100;

/// One scored prediction. Field names match the persisted JSON layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementRecord {
    #[serde(rename = "t")]
    pub timestamp_ms: u64,
    #[serde(rename = "pred")]
    pub predicted_digit: u8,
    #[serde(rename = "actual")]
    pub actual_digit: u8,
    pub win: bool,
}

impl SettlementRecord {
    pub fn new(timestamp_ms: u64, predicted_digit: u8, actual_digit: u8) -> Self {
        Self {
            timestamp_ms,
            predicted_digit,
            actual_digit,
            win: predicted_digit == actual_digit,
        }
    }
}

/// Running win/total counters plus a capped settlement log.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsLedger {
    pub wins: u32,
    pub total: u32,
    #[serde(default)]
    pub log: VecDeque<SettlementRecord>,
}

impl StatsLedger {
    pub fn record(&mut self, record: SettlementRecord) {
        self.total = self.total.saturating_add(1);
        if record.win {
            self.wins = self.wins.saturating_add(1);
        }
        self.log.push_back(record);
        self.trim_log();
    }

    pub fn trim_log(&mut self) {
        while self.log.len() > LEDGER_LOG_CAPACITY {
            self.log.pop_front();
        }
    }

    /// Counters in order and every logged digit in 0..=9.
    pub fn is_consistent(&self) -> bool {
        self.wins <= self.total
            && self
                .log
                .iter()
                .all(|r| r.predicted_digit <= 9 && r.actual_digit <= 9)
    }

    pub fn losses(&self) -> u32 {
        self.total - self.wins.min(self.total)
    }

    /// Rounded win percentage, 0 when nothing has settled yet.
    pub fn win_rate_percent(&self) -> u32 {
        if self.total == 0 {
            0
        } else {
            ((f64::from(self.wins) * 100.0) / f64::from(self.total)).round() as u32
        }
    }

    /// Newest `n` records, newest first.
    pub fn recent(&self, n: usize) -> Vec<SettlementRecord> {
        self.log.iter().rev().take(n).copied().collect()
    }
}
