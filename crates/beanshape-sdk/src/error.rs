//! Error types raised by host member capabilities

/// Result type for member reads and writes
pub type AccessResult<T> = Result<T, AccessError>;

/// Errors raised by a member's read or write capability
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AccessError {
    /// The capability was invoked with an instance of another type
    #[error("Wrong instance: expected {expected}, got {got}")]
    WrongInstance {
        /// Expected host type name
        expected: String,
        /// Actual host type name
        got: String,
    },

    /// The value handed to a write capability has the wrong shape
    #[error("Type mismatch: expected {expected}, got {got}")]
    TypeMismatch {
        /// Expected value kind
        expected: String,
        /// Actual value kind
        got: String,
    },

    /// The host member itself failed
    #[error("{0}")]
    Failed(String),

    /// The capability does not exist on this member
    #[error("Unsupported access: {0}")]
    Unsupported(String),
}

impl From<String> for AccessError {
    fn from(s: String) -> Self {
        AccessError::Failed(s)
    }
}

impl From<&str> for AccessError {
    fn from(s: &str) -> Self {
        AccessError::Failed(s.to_string())
    }
}
