//! Error types for the CLI

use std::path::PathBuf;

/// CLI Result type
pub type Result<T> = std::result::Result<T, Error>;

/// CLI errors
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Pki(#[from] webhook_pki::PkiError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("certificate rotation required: {reason}")]
    RotationRequired { reason: String },
}

impl Error {
    pub fn rotation_required(reason: impl Into<String>) -> Self {
        Error::RotationRequired {
            reason: reason.into(),
        }
    }

    /// Process exit code; rotation is reported apart from hard failures
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::RotationRequired { .. } => 2,
            _ => 1,
        }
    }
}
