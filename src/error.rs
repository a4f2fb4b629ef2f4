use crate::round::RoundStatus;
use thiserror::Error;

pub type GameResult<T> = std::result::Result<T, GameError>;

#[derive(Debug, Clone, Eq, PartialEq, Error)]
pub enum GameError {
    #[error("insufficient balance: requested {requested}, available {available}")]
    InsufficientFunds { requested: u64, available: u64 },

    /// The intent is not legal in the current round state. Nothing was mutated.
    #[error("{intent} not allowed while {status}")]
    InvalidGuard {
        intent: &'static str,
        status: RoundStatus,
    },

    #[error("unknown icon '{0}'")]
    UnknownIcon(String),

    #[error("amount must be positive")]
    InvalidAmount,

    #[error("refund of {requested} exceeds wagered total {wagered}")]
    RefundExceedsWagered { requested: u64, wagered: u64 },
}

impl GameError {
    pub(crate) fn guard(intent: &'static str, status: RoundStatus) -> Self {
        GameError::InvalidGuard { intent, status }
    }

    /// Guard rejections are expected when the UI races a phase change; callers
    /// usually treat them as no-ops.
    pub fn is_guard(&self) -> bool {
        matches!(self, GameError::InvalidGuard { .. })
    }
}
