//! Planner error types

use std::time::Duration;

use thiserror::Error;

/// Errors that can occur while talking to the planning service
#[derive(Debug, Error)]
pub enum PlannerError {
    #[error("Not signed in")]
    NotSignedIn,

    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Timeout after {0:?}")]
    Timeout(Duration),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl PlannerError {
    /// Check if the failure indicates a rejected or expired credential
    pub fn is_auth(&self) -> bool {
        match self {
            PlannerError::NotSignedIn => true,
            PlannerError::Api { status, .. } => matches!(status, 401 | 403),
            _ => false,
        }
    }

    /// Check if this error is retryable
    pub fn is_retryable(&self) -> bool {
        match self {
            PlannerError::Api { status, .. } => *status == 429 || *status >= 500,
            PlannerError::Network(_) => true,
            PlannerError::Timeout(_) => true,
            PlannerError::NotSignedIn => false,
            PlannerError::InvalidResponse(_) => false,
            PlannerError::Json(_) => false,
        }
    }
}
