/// Convenience result type used across quadfx.
pub type QuadfxResult<T> = Result<T, QuadfxError>;

/// Top-level error taxonomy used by pipeline APIs.
#[derive(thiserror::Error, Debug)]
pub enum QuadfxError {
    /// Invalid user-provided configuration or frame data.
    #[error("validation error: {0}")]
    Validation(String),

    /// The source could not be opened, probed or decoded.
    #[error("demux error: {0}")]
    Demux(String),

    /// A variant could not be encoded.
    #[error("encode error: {0}")]
    Encode(String),

    /// The external remux tool failed.
    #[error("remux error: {0}")]
    Remux(String),

    /// Work stopped because the shared cancel token was raised.
    #[error("cancelled: {0}")]
    Cancelled(String),

    /// Filesystem or pipe error.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Configuration (de)serialization error.
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// Wrapped lower-level error from dependencies.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl QuadfxError {
    /// Build a [`QuadfxError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`QuadfxError::Demux`] value.
    pub fn demux(msg: impl Into<String>) -> Self {
        Self::Demux(msg.into())
    }

    /// Build a [`QuadfxError::Encode`] value.
    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    /// Build a [`QuadfxError::Remux`] value.
    pub fn remux(msg: impl Into<String>) -> Self {
        Self::Remux(msg.into())
    }

    /// Build a [`QuadfxError::Cancelled`] value.
    pub fn cancelled(msg: impl Into<String>) -> Self {
        Self::Cancelled(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
