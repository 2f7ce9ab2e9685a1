//! # Workshop Error Types
//!
//! Typed error handling for the checkout workshop.
//! Every processor call, store operation and webhook step returns
//! `Result<T, WorkshopError>`; vendor and transport errors are mapped into
//! these variants at the boundary.

use thiserror::Error;

/// Core error type for all workshop operations
#[derive(Debug, Error)]
pub enum WorkshopError {
    /// Configuration errors (missing keys, invalid config)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Notification envelope could not be parsed
    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    /// Notification HMAC signature did not match
    #[error("Signature invalid: {0}")]
    SignatureInvalid(String),

    /// The signature validator itself failed (bad key, etc.)
    #[error("Signature validation error: {0}")]
    SignatureValidation(String),

    /// Payment processor API returned an error
    #[error("Upstream error [{provider}]: {message}")]
    UpstreamApi {
        provider: String,
        status: Option<u16>,
        message: String,
    },

    /// Network/HTTP error communicating with the processor
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Stored token not present in the token store
    #[error("Token not found: {token_id}")]
    TokenNotFound { token_id: String },

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Internal error (should not happen)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl WorkshopError {
    /// Returns the HTTP status code appropriate for this error
    pub fn status_code(&self) -> u16 {
        match self {
            WorkshopError::Configuration(_) => 500,
            WorkshopError::InvalidRequest(_) => 400,
            WorkshopError::MalformedPayload(_) => 400,
            WorkshopError::SignatureInvalid(_) => 422,
            WorkshopError::SignatureValidation(_) => 500,
            WorkshopError::UpstreamApi { .. } => 502,
            WorkshopError::NetworkError(_) => 503,
            WorkshopError::TokenNotFound { .. } => 404,
            WorkshopError::Serialization(_) => 500,
            WorkshopError::Internal(_) => 500,
        }
    }

    /// Returns true if the error originated at the payment processor
    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            WorkshopError::UpstreamApi { .. } | WorkshopError::NetworkError(_)
        )
    }
}

/// Result type alias for workshop operations
pub type WorkshopResult<T> = Result<T, WorkshopError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upstream_errors() {
        assert!(WorkshopError::NetworkError("timeout".into()).is_upstream());
        assert!(WorkshopError::UpstreamApi {
            provider: "adyen".into(),
            status: Some(422),
            message: "Invalid card number".into(),
        }
        .is_upstream());
        assert!(!WorkshopError::SignatureInvalid("mismatch".into()).is_upstream());
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            WorkshopError::MalformedPayload("eof".into()).status_code(),
            400
        );
        assert_eq!(
            WorkshopError::SignatureInvalid("mismatch".into()).status_code(),
            422
        );
        assert_eq!(
            WorkshopError::SignatureValidation("bad key".into()).status_code(),
            500
        );
        assert_eq!(
            WorkshopError::TokenNotFound {
                token_id: "x".into()
            }
            .status_code(),
            404
        );
    }
}
