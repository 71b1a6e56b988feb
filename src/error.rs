use thiserror::Error;

/// Everything that can go wrong building a board. Once a session is running
/// nothing can fail: advancing and resetting are total.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BoardError {
    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: &'static str, reason: String },
}

impl BoardError {
    pub(crate) fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        BoardError::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }

    /// which parameter was rejected
    pub fn parameter(&self) -> &'static str {
        match self {
            BoardError::InvalidParameter { name, .. } => name,
        }
    }
}
