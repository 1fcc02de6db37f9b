use anyhow::{bail, Result};
use serde::Deserialize;

use crate::error::PredictError;
use crate::model::prediction::{Distribution, Prediction};
use crate::tick_buffer::TICK_HISTORY_CAPACITY;

pub const PREDICTION_INTERVAL_MS: u64 = 15_000;
pub const MIN_HISTORY: usize = 20;

const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

/// Tunables for the digit scoring heuristic. The defaults are the
/// time-gated scheme; see `config/default.toml`.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct PredictorConfig {
    pub interval_ms: u64,
    pub min_history: usize,
    pub epsilon: f64,
    pub short_window: usize,
    pub medium_window: usize,
    pub long_window: usize,
    pub short_weight: f64,
    pub medium_weight: f64,
    pub long_weight: f64,
    pub transition_window: usize,
    pub transition_weight: f64,
    pub hot_window: usize,
    pub hot_count: usize,
    pub hot_boost: f64,
    pub cold_threshold: usize,
    pub cold_boost: f64,
}

impl Default for PredictorConfig {
    fn default() -> Self {
        Self {
            interval_ms: PREDICTION_INTERVAL_MS,
            min_history: MIN_HISTORY,
            epsilon: 1e-9,
            short_window: 20,
            medium_window: 50,
            long_window: 100,
            short_weight: 0.6,
            medium_weight: 0.3,
            long_weight: 0.1,
            transition_window: 50,
            transition_weight: 0.25,
            hot_window: 10,
            hot_count: 3,
            hot_boost: 1.2,
            cold_threshold: 15,
            cold_boost: 1.1,
        }
    }
}

impl PredictorConfig {
    pub fn validate(&self) -> Result<()> {
        if self.interval_ms == 0 {
            bail!("interval_ms must be > 0");
        }
        if self.min_history == 0 || self.min_history > TICK_HISTORY_CAPACITY {
            bail!(
                "min_history must be in 1..={} (got {})",
                TICK_HISTORY_CAPACITY,
                self.min_history
            );
        }
        if !(self.epsilon > 0.0 && self.epsilon.is_finite()) {
            bail!("epsilon must be a small positive number");
        }
        if self.short_window == 0 || self.medium_window == 0 || self.long_window == 0 {
            bail!("frequency windows must be > 0");
        }
        let weights = [self.short_weight, self.medium_weight, self.long_weight];
        if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
            bail!("frequency weights must be finite and non-negative");
        }
        let sum: f64 = weights.iter().sum();
        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            bail!("frequency weights must sum to 1 (got {:.6})", sum);
        }
        if !self.transition_weight.is_finite() || self.transition_weight < 0.0 {
            bail!("transition_weight must be finite and non-negative");
        }
        if self.hot_window == 0 || self.hot_count == 0 || self.hot_count > self.hot_window {
            bail!(
                "hot streak needs 0 < hot_count <= hot_window (got {} in {})",
                self.hot_count,
                self.hot_window
            );
        }
        if !(self.hot_boost > 1.0 && self.hot_boost.is_finite()) {
            bail!("hot_boost must be > 1");
        }
        if self.cold_threshold == 0 {
            bail!("cold_threshold must be > 0");
        }
        if !(self.cold_boost > 1.0 && self.cold_boost.is_finite()) {
            bail!("cold_boost must be > 1");
        }
        if self.lookback() > TICK_HISTORY_CAPACITY {
            bail!(
                "windows look back {} ticks but only {} are kept",
                self.lookback(),
                TICK_HISTORY_CAPACITY
            );
        }
        Ok(())
    }

    /// Longest history any term looks at.
    pub fn lookback(&self) -> usize {
        self.short_window
            .max(self.medium_window)
            .max(self.long_window)
            .max(self.transition_window + 1)
            .max(self.hot_window)
    }
}

/// Result of one scoring pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Forecast {
    pub digit: u8,
    pub confidence: u8,
    pub distribution: Distribution,
}

impl Forecast {
    pub fn into_prediction(self, issued_at_ms: u64) -> Prediction {
        Prediction {
            digit: self.digit,
            confidence: self.confidence,
            issued_at_ms,
            distribution: self.distribution,
        }
    }
}

#[derive(Debug, Clone)]
pub struct DigitPredictor {
    config: PredictorConfig,
}

impl Default for DigitPredictor {
    fn default() -> Self {
        Self::new(PredictorConfig::default())
    }
}

impl DigitPredictor {
    pub fn new(config: PredictorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PredictorConfig {
        &self.config
    }

    /// Score the history (oldest first) and pick the likeliest next digit.
    pub fn forecast(&self, digits: &[u8]) -> Result<Forecast, PredictError> {
        let cfg = &self.config;
        if digits.len() < cfg.min_history {
            return Err(PredictError::InsufficientData {
                have: digits.len(),
                need: cfg.min_history,
            });
        }

        let mut scores = [cfg.epsilon; 10];

        let f_short = window_frequency(digits, cfg.short_window);
        let f_medium = window_frequency(digits, cfg.medium_window);
        let f_long = window_frequency(digits, cfg.long_window);
        for d in 0..10 {
            scores[d] += cfg.short_weight * f_short[d]
                + cfg.medium_weight * f_medium[d]
                + cfg.long_weight * f_long[d];
        }

        let follow = transition_probabilities(digits, cfg.transition_window);
        for d in 0..10 {
            scores[d] += cfg.transition_weight * follow[d];
        }

        let hot = tail(digits, cfg.hot_window);
        let mut hot_counts = [0usize; 10];
        for &d in hot {
            hot_counts[usize::from(d % 10)] += 1;
        }
        for d in 0..10 {
            if hot_counts[d] >= cfg.hot_count {
                scores[d] *= cfg.hot_boost;
            }
        }

        let gaps = ticks_since_last(digits);
        for d in 0..10 {
            let cold = match gaps[d] {
                Some(gap) => gap >= cfg.cold_threshold,
                None => true,
            };
            if cold {
                scores[d] *= cfg.cold_boost;
            }
        }

        let distribution = normalize(scores);
        let (digit, confidence) = select(&distribution);
        Ok(Forecast {
            digit,
            confidence,
            distribution,
        })
    }
}

fn tail(digits: &[u8], n: usize) -> &[u8] {
    &digits[digits.len().saturating_sub(n)..]
}

/// Share of each digit among the last `window` entries (or fewer if the
/// history is shorter).
fn window_frequency(digits: &[u8], window: usize) -> [f64; 10] {
    let slice = tail(digits, window);
    let mut freq = [0.0; 10];
    if slice.is_empty() {
        return freq;
    }
    for &d in slice {
        freq[usize::from(d % 10)] += 1.0;
    }
    let n = slice.len() as f64;
    for f in &mut freq {
        *f /= n;
    }
    freq
}

/// `P(next = d | previous = last digit)` over the last `window` transitions.
/// All zero when no transition starts from the last digit.
fn transition_probabilities(digits: &[u8], window: usize) -> [f64; 10] {
    let mut out = [0.0; 10];
    let Some(&last) = digits.last() else {
        return out;
    };
    let pairs = tail(digits, window + 1);
    let mut counts = [0usize; 10];
    for pair in pairs.windows(2) {
        if pair[0] == last {
            counts[usize::from(pair[1] % 10)] += 1;
        }
    }
    let total: usize = counts.iter().sum();
    if total == 0 {
        return out;
    }
    for d in 0..10 {
        out[d] = counts[d] as f64 / total as f64;
    }
    out
}

/// Distance from the newest tick back to each digit's latest occurrence;
/// `None` for digits absent from the history.
fn ticks_since_last(digits: &[u8]) -> [Option<usize>; 10] {
    let mut gaps = [None; 10];
    for (age, &d) in digits.iter().rev().enumerate() {
        let slot = &mut gaps[usize::from(d % 10)];
        if slot.is_none() {
            *slot = Some(age);
        }
    }
    gaps
}

fn normalize(scores: [f64; 10]) -> Distribution {
    let sum: f64 = scores.iter().sum();
    if sum <= 0.0 || !sum.is_finite() {
        return [0.1; 10];
    }
    scores.map(|s| s / sum)
}

/// Argmax with ties going to the lowest digit, plus the margin-weighted
/// confidence `best + (best - second)` expressed in percent.
fn select(distribution: &Distribution) -> (u8, u8) {
    let mut best = 0usize;
    for d in 1..10 {
        if distribution[d] > distribution[best] {
            best = d;
        }
    }
    let mut sorted = *distribution;
    sorted.sort_by(|a, b| b.total_cmp(a));
    let best_p = sorted[0];
    let second = sorted[1];
    let confidence = (100.0 * (best_p + (best_p - second))).round().clamp(0.0, 100.0) as u8;
    (best as u8, confidence)
}
