use thiserror::Error;

/// Reasons an inbound feed message does not become a [`Tick`](crate::model::tick::Tick).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TickError {
    #[error("malformed feed message: {0}")]
    Malformed(String),

    #[error("quote is not a finite number: {0:?}")]
    NonFinite(String),

    #[error("no digit found in quote text {0:?}")]
    NoDigitFound(String),
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PredictError {
    #[error("insufficient tick history: have {have}, need {need}")]
    InsufficientData { have: usize, need: usize },
}
