//! Error types for transaction construction and submission.
//!
//! Every fallible operation in the crate returns [`AptosResult`]. The
//! variants fall into four groups: encoding failures, signing failures,
//! structural mismatches between a multi-agent envelope and its
//! authenticator, and collaborator failures surfaced by the ledger or the
//! transport. Collaborator errors are passed through untouched; nothing in the
//! core retries them.

use std::fmt;
use thiserror::Error;

/// A specialized Result type for SDK operations.
pub type AptosResult<T> = Result<T, AptosError>;

/// The main error type for the SDK.
#[derive(Error, Debug)]
pub enum AptosError {
    /// A value could not be rendered in canonical binary form
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// A signer failed to produce a signature
    #[error("Signing error: {0}")]
    Signing(String),

    /// A transaction could not be assembled from the parts given
    #[error("Transaction error: {0}")]
    Transaction(String),

    /// Secondary signers disagree with the multi-agent envelope
    #[error("Structural mismatch: expected {expected}, got {actual}")]
    StructuralMismatch {
        /// What the transaction envelope declares
        expected: String,
        /// What the authenticator carries
        actual: String,
    },

    /// Error occurred during HTTP communication
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Error occurred during JSON decoding of a node response
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Error occurred during URL parsing
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    /// The node returned an error response
    #[error("API error ({status_code}): {message}")]
    Api {
        /// HTTP status code
        status_code: u16,
        /// Error message from the node
        message: String,
        /// Optional error code from the node
        error_code: Option<String>,
        /// Optional VM error code
        vm_error_code: Option<u64>,
    },

    /// The node answered with a body we could not make sense of
    #[error("Invalid node response: {0}")]
    InvalidResponse(String),

    /// A resource, account or table item does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Transaction was not committed before the deadline
    #[error("Transaction {hash} timed out after {timeout_secs} seconds")]
    TransactionTimeout {
        /// The hash of the transaction being waited on
        hash: String,
        /// How long we waited
        timeout_secs: u64,
    },

    /// Transaction was committed but aborted during execution
    #[error("Execution failed: {vm_status}")]
    ExecutionFailed {
        /// The VM status reported by the node
        vm_status: String,
    },

    /// A network-bound step did not finish within its time budget
    #[error("Request timed out: {0}")]
    RequestTimeout(String),

    /// The caller cancelled a network-bound step
    #[error("Operation cancelled: {0}")]
    Cancelled(String),

    /// Error occurred during hex decoding
    #[error("Hex error: {0}")]
    Hex(#[from] hex::FromHexError),

    /// Invalid account address
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    /// Invalid public key
    #[error("Invalid public key: {0}")]
    InvalidPublicKey(String),

    /// Invalid private key
    #[error("Invalid private key: {0}")]
    InvalidPrivateKey(String),

    /// Invalid signature bytes
    #[error("Invalid signature: {0}")]
    InvalidSignature(String),

    /// Signature did not verify against the signing message
    #[error("Signature verification failed")]
    SignatureVerificationFailed,

    /// Invalid hash value
    #[error("Invalid hash: {0}")]
    InvalidHash(String),

    /// Invalid type tag string
    #[error("Invalid type tag: {0}")]
    InvalidTypeTag(String),

    /// Invalid Move identifier
    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Maximum length for error messages handed to loggers.
const MAX_ERROR_MESSAGE_LENGTH: usize = 1000;

/// Fragments that suggest key material leaked into a message.
const SENSITIVE_PATTERNS: &[&str] = &["private_key", "secret", "seed", "authorization"];

impl AptosError {
    /// Creates a new encoding error
    pub fn encoding<E: fmt::Display>(err: E) -> Self {
        Self::Encoding(err.to_string())
    }

    /// Creates a new signing error
    pub fn signing<E: fmt::Display>(err: E) -> Self {
        Self::Signing(err.to_string())
    }

    /// Creates a new transaction assembly error
    pub fn transaction(msg: impl Into<String>) -> Self {
        Self::Transaction(msg.into())
    }

    /// Creates a structural mismatch error
    pub fn mismatch(expected: impl Into<String>, actual: impl Into<String>) -> Self {
        Self::StructuralMismatch {
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// Creates a new API error from response details
    pub fn api(status_code: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status_code,
            message: message.into(),
            error_code: None,
            vm_error_code: None,
        }
    }

    /// Creates a new API error with additional details
    pub fn api_with_details(
        status_code: u16,
        message: impl Into<String>,
        error_code: Option<String>,
        vm_error_code: Option<u64>,
    ) -> Self {
        Self::Api {
            status_code,
            message: message.into(),
            error_code,
            vm_error_code,
        }
    }

    /// Returns true if the error came from the ledger or transport rather
    /// than from local construction.
    pub fn is_collaborator(&self) -> bool {
        matches!(
            self,
            Self::Http(_)
                | Self::Json(_)
                | Self::Api { .. }
                | Self::InvalidResponse(_)
                | Self::NotFound(_)
                | Self::TransactionTimeout { .. }
                | Self::ExecutionFailed { .. }
                | Self::RequestTimeout(_)
                | Self::Cancelled(_)
        )
    }

    /// Returns true if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::NotFound(_)
                | Self::Api {
                    status_code: 404,
                    ..
                }
        )
    }

    /// Returns true if this is a timeout error
    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            Self::TransactionTimeout { .. } | Self::RequestTimeout(_)
        )
    }

    /// Returns true if this is a transient transport error.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Http(e) => e.is_timeout() || e.is_connect(),
            Self::Api { status_code, .. } => {
                matches!(status_code, 408 | 429 | 500 | 502 | 503 | 504)
            }
            _ => false,
        }
    }

    /// Returns the error message with control characters removed, long
    /// messages truncated and anything resembling key material redacted.
    pub fn sanitized_message(&self) -> String {
        let cleaned: String = self
            .to_string()
            .chars()
            .filter(|c| !c.is_control() || *c == '\n' || *c == '\t')
            .collect();

        let lower = cleaned.to_lowercase();
        if let Some(pattern) = SENSITIVE_PATTERNS.iter().find(|p| lower.contains(*p)) {
            return format!("[REDACTED: message contained sensitive pattern '{pattern}']");
        }

        if cleaned.len() > MAX_ERROR_MESSAGE_LENGTH {
            let cut = (0..=MAX_ERROR_MESSAGE_LENGTH)
                .rev()
                .find(|i| cleaned.is_char_boundary(*i))
                .unwrap_or(0);
            format!(
                "{}... [truncated, total length: {}]",
                &cleaned[..cut],
                cleaned.len()
            )
        } else {
            cleaned
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encoding_error_display() {
        let err = AptosError::encoding("value too wide for u8");
        assert_eq!(err.to_string(), "Encoding error: value too wide for u8");
        assert!(!err.is_collaborator());
    }

    #[test]
    fn test_mismatch_display() {
        let err = AptosError::mismatch("2 secondary signers", "1 secondary signer");
        assert!(matches!(err, AptosError::StructuralMismatch { .. }));
        assert!(err.to_string().contains("expected 2 secondary signers"));
    }

    #[test]
    fn test_api_error_classification() {
        let not_found = AptosError::api(404, "Resource not found");
        assert!(not_found.is_not_found());
        assert!(not_found.is_collaborator());
        assert!(!not_found.is_retryable());

        let unavailable = AptosError::api(503, "Service unavailable");
        assert!(unavailable.is_retryable());
        assert!(!unavailable.is_not_found());
    }

    #[test]
    fn test_timeout_is_collaborator() {
        let err = AptosError::TransactionTimeout {
            hash: "0xabc".to_string(),
            timeout_secs: 10,
        };
        assert!(err.is_timeout());
        assert!(err.is_collaborator());
    }

    #[test]
    fn test_sanitized_message_redacts() {
        let err = AptosError::InvalidPrivateKey("private_key=deadbeef".to_string());
        assert!(err.sanitized_message().starts_with("[REDACTED"));
    }

    #[test]
    fn test_sanitized_message_truncates() {
        let err = AptosError::Config("x".repeat(MAX_ERROR_MESSAGE_LENGTH * 2));
        let msg = err.sanitized_message();
        assert!(msg.contains("[truncated"));
        assert!(msg.len() < MAX_ERROR_MESSAGE_LENGTH + 100);
    }

    #[test]
    fn test_sanitized_message_strips_control_chars() {
        let err = AptosError::Config("bad\u{0007}value".to_string());
        assert_eq!(err.sanitized_message(), "Configuration error: badvalue");
    }
}
