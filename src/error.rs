use thiserror::Error;

/// Failures of a single content-store call. None of these are retried here;
/// callers decide whether to offer a retry.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("content store unreachable: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("content store returned {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("document '{uid}' not found")]
    NotFound { uid: String },
    #[error("invalid content store response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("continuation token does not belong to the configured repository: {0}")]
    ForeignToken(String),
    #[error("invalid Prismic endpoint: {0}")]
    Endpoint(String),
    #[error("repository exposes no master ref")]
    NoMasterRef,
}

impl FetchError {
    /// True for failures of the transport itself (unreachable or non-success
    /// status), as opposed to a missing document or an unusable payload.
    pub fn is_transport(&self) -> bool {
        matches!(self, FetchError::Transport(_) | FetchError::Status { .. })
    }
}
