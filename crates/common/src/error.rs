//! Error types shared across Kickbot crates.

/// Top-level error type for Kickbot operations.
///
/// A detection below the confidence threshold is not an error; only
/// collaborator failures and misconfiguration are.
#[derive(Debug, thiserror::Error)]
pub enum KickbotError {
    #[error("Capture error: {message}")]
    Capture { message: String },

    #[error("Inference error: {message}")]
    Inference { message: String },

    #[error("Pointer error: {message}")]
    Pointer { message: String },

    #[error("Frame transform error: {message}")]
    Transform { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Tracking thread error: {message}")]
    Thread { message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias using KickbotError.
pub type KickbotResult<T> = Result<T, KickbotError>;

impl KickbotError {
    pub fn capture(msg: impl Into<String>) -> Self {
        Self::Capture {
            message: msg.into(),
        }
    }

    pub fn inference(msg: impl Into<String>) -> Self {
        Self::Inference {
            message: msg.into(),
        }
    }

    pub fn pointer(msg: impl Into<String>) -> Self {
        Self::Pointer {
            message: msg.into(),
        }
    }

    pub fn transform(msg: impl Into<String>) -> Self {
        Self::Transform {
            message: msg.into(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    pub fn thread(msg: impl Into<String>) -> Self {
        Self::Thread {
            message: msg.into(),
        }
    }

    /// Whether this error came from an external collaborator call.
    pub fn is_collaborator_failure(&self) -> bool {
        matches!(
            self,
            Self::Capture { .. } | Self::Inference { .. } | Self::Pointer { .. }
        )
    }
}
