use thiserror::Error;

use crate::workflow::{Phase, RequestSlot};

/// User-facing message for a failed extraction
pub const EXTRACTION_FAILED_MESSAGE: &str = "データの読み取りに失敗しました。もう一度お試しください。";

/// User-facing message for a failed eligibility check
pub const ELIGIBILITY_FAILED_MESSAGE: &str = "診断に失敗しました";

/// Failures talking to the extraction or eligibility service
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    Network(#[from] reqwest::Error),
    #[error("server returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("JSON parse error: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("request timed out after {seconds}s")]
    Timeout { seconds: u64 },
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            ApiError::Network(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

/// Why the workflow refused an event
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("{event} is not allowed while {phase}")]
    NotAllowed { event: &'static str, phase: Phase },
    #[error("ignoring {slot} response for generation {generation} (current is {current})")]
    Superseded {
        slot: RequestSlot,
        generation: u64,
        current: u64,
    },
}

impl TransitionError {
    pub fn is_superseded(&self) -> bool {
        matches!(self, TransitionError::Superseded { .. })
    }
}
