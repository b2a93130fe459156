use thiserror::Error;

/// Failure of a single request against the analytics API.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("unexpected status {status}: {body}")]
    Status { status: u16, body: String },
}

/// Why a poll attempt did not produce a snapshot. Every variant is retried.
#[derive(Debug, Error)]
pub enum AttemptError {
    #[error("transport failure: {}", .0.join(", "))]
    Transport(Vec<String>),

    #[error("not ready: {0}")]
    NotReady(String),

    #[error("malformed payload from {endpoint}: {reason}")]
    Malformed { endpoint: String, reason: String },
}

impl AttemptError {
    pub fn malformed(endpoint: impl Into<String>, reason: impl ToString) -> Self {
        Self::Malformed {
            endpoint: endpoint.into(),
            reason: reason.to_string(),
        }
    }

    /// Malformed payloads usually mean the backend schema drifted; the other
    /// variants are expected while the backend warms up.
    pub fn is_expected(&self) -> bool {
        !matches!(self, Self::Malformed { .. })
    }
}
