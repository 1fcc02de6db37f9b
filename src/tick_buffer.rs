use std::collections::VecDeque;

use crate::model::tick::Tick;

pub const TICK_HISTORY_CAPACITY: usize = 100;

/// Fixed-capacity rolling history, oldest evicted first.
#[derive(Debug, Clone)]
pub struct TickBuffer {
    ticks: VecDeque<Tick>,
    capacity: usize,
}

impl Default for TickBuffer {
    fn default() -> Self {
        Self::new(TICK_HISTORY_CAPACITY)
    }
}

impl TickBuffer {
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "TickBuffer capacity must be > 0");
        Self {
            ticks: VecDeque::with_capacity(capacity + 1),
            capacity,
        }
    }

    pub fn append(&mut self, tick: Tick) {
        self.ticks.push_back(tick);
        while self.ticks.len() > self.capacity {
            self.ticks.pop_front();
        }
    }

    pub fn clear(&mut self) {
        self.ticks.clear();
    }

    /// Last `min(n, len)` digits in arrival order.
    pub fn digit_sequence(&self, n: usize) -> Vec<u8> {
        let skip = self.ticks.len().saturating_sub(n);
        self.ticks.iter().skip(skip).map(|t| t.digit).collect()
    }

    /// Last `min(n, len)` ticks in arrival order.
    pub fn recent(&self, n: usize) -> Vec<Tick> {
        let skip = self.ticks.len().saturating_sub(n);
        self.ticks.iter().skip(skip).cloned().collect()
    }

    /// Occurrence count per digit over the last `n` ticks.
    pub fn digit_frequency(&self, n: usize) -> [usize; 10] {
        let mut freq = [0usize; 10];
        let skip = self.ticks.len().saturating_sub(n);
        for tick in self.ticks.iter().skip(skip) {
            freq[usize::from(tick.digit % 10)] += 1;
        }
        freq
    }

    pub fn last(&self) -> Option<&Tick> {
        self.ticks.back()
    }

    pub fn len(&self) -> usize {
        self.ticks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ticks.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
