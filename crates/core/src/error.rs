/// Result alias that carries the custom [`BeatcutError`] type.
pub type Result<T> = std::result::Result<T, BeatcutError>;

/// Common error type for the core crate.
///
/// The scheduler itself never fails; these errors come from loading inputs,
/// building pacing policies and exporting render plans.
#[derive(Debug, thiserror::Error)]
pub enum BeatcutError {
    /// Free-form message surfaced directly to the user.
    #[error("{0}")]
    Message(String),
    /// Caller-supplied data that cannot be used as given.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// Wrapper around standard IO errors.
    #[error("{0}")]
    Io(#[from] std::io::Error),
    /// Malformed manifest, config or edit document.
    #[error("{0}")]
    Json(#[from] serde_json::Error),
}

impl BeatcutError {
    /// Creates a new error that simply wraps the provided message.
    pub fn msg<T: Into<String>>(msg: T) -> Self {
        Self::Message(msg.into())
    }

    pub fn invalid<T: Into<String>>(msg: T) -> Self {
        Self::InvalidInput(msg.into())
    }
}

impl From<&str> for BeatcutError {
    fn from(value: &str) -> Self {
        Self::msg(value)
    }
}

impl From<String> for BeatcutError {
    fn from(value: String) -> Self {
        Self::Message(value)
    }
}
