//! Error types for webhook PKI operations

use thiserror::Error;

/// PKI errors
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PkiError {
    /// Service identity is missing a required component
    #[error("invalid service identity: {0}")]
    InvalidIdentity(String),

    /// Key generation failed
    #[error("key generation failed: {0}")]
    KeyGenerationFailed(String),

    /// Signing request construction failed
    #[error("CSR build failed: {0}")]
    CsrBuildFailed(String),

    /// Certificate PEM could not be decoded
    #[error("certificate decode error: {0}")]
    CertDecodeFailed(String),

    /// Certificate DER could not be parsed as X.509
    #[error("certificate parsing error: {0}")]
    CertParseFailed(String),

    /// Configuration is invalid or unreadable
    #[error("configuration error: {0}")]
    Config(String),

    /// Serialization/deserialization error
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl PkiError {
    /// Create an invalid identity error with the given message
    pub fn invalid_identity(msg: impl Into<String>) -> Self {
        Self::InvalidIdentity(msg.into())
    }

    /// Create a configuration error with the given message
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a CSR build error with the given message
    pub fn csr(msg: impl Into<String>) -> Self {
        Self::CsrBuildFailed(msg.into())
    }
}

/// Result type for PKI operations
pub type Result<T> = std::result::Result<T, PkiError>;
