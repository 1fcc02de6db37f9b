/// Normalized probability per digit, index = digit.
pub type Distribution = [f64; 10];

/// The single outstanding forecast awaiting settlement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prediction {
    pub digit: u8,
    /// 0..=100
    pub confidence: u8,
    pub issued_at_ms: u64,
    pub distribution: Distribution,
}

impl Prediction {
    pub fn probability(&self, digit: u8) -> f64 {
        self.distribution
            .get(usize::from(digit))
            .copied()
            .unwrap_or(0.0)
    }
}
