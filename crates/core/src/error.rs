//! Error types for the Civic Assistant.
//!
//! A single error enum covers configuration, I/O, generation, prompt and
//! access-control failures. Access failures carry no secret material: their
//! messages name the tenant at most, never the expected or presented token.

use thiserror::Error;

/// Unified error type for the Civic Assistant.
///
/// All fallible functions in the workspace return `Result<T, AppError>`.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O and filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// LLM provider errors (transport, status, decoding)
    #[error("LLM error: {0}")]
    Llm(String),

    /// Prompt system errors
    #[error("Prompt error: {0}")]
    Prompt(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// No tenant matches the requested key
    #[error("Unknown city: {0}")]
    UnknownTenant(String),

    /// The presented token is missing or wrong
    #[error("Access denied: invalid token")]
    InvalidToken,

    /// Runtime access is disabled or the tenant is outside its active window
    #[error("Access denied: service suspended")]
    ServiceSuspended,

    /// The operator credential did not match
    #[error("Operator authorization failed")]
    OperatorUnauthorized,

    /// The generation collaborator failed; details are only logged
    #[error("Answer generation failed: {0}")]
    Generation(String),

    /// Generic errors
    #[error("{0}")]
    Other(String),
}

impl AppError {
    /// True for the authorization failures a caller surfaces as "access denied".
    pub fn is_access_denied(&self) -> bool {
        matches!(
            self,
            AppError::InvalidToken | AppError::ServiceSuspended | AppError::OperatorUnauthorized
        )
    }

    /// True when the requested tenant does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, AppError::UnknownTenant(_))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(err: serde_yaml::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_access_denied_classification() {
        assert!(AppError::InvalidToken.is_access_denied());
        assert!(AppError::ServiceSuspended.is_access_denied());
        assert!(AppError::OperatorUnauthorized.is_access_denied());
        assert!(!AppError::UnknownTenant("x".to_string()).is_access_denied());
        assert!(AppError::UnknownTenant("x".to_string()).is_not_found());
    }

    #[test]
    fn test_access_messages_carry_no_detail() {
        assert_eq!(AppError::InvalidToken.to_string(), "Access denied: invalid token");
        assert_eq!(
            AppError::ServiceSuspended.to_string(),
            "Access denied: service suspended"
        );
    }
}
