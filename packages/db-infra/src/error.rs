use thiserror::Error;

use crate::bootstrap::plan::BootstrapStep;

#[derive(Debug, Error)]
pub enum DbInfraError {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Secret '{secret_id}' unavailable: {detail}")]
    SecretUnavailable { secret_id: String, detail: String },

    #[error("Could not connect after {attempts} attempts: {last_error}")]
    ConnectionExhausted { attempts: u32, last_error: String },

    #[error("Bootstrap step '{step}' failed: {detail}")]
    StatementExecutionFailed { step: BootstrapStep, detail: String },

    #[error("Failed to write s3://{bucket}/{key}: {detail}")]
    ArtifactWriteFailed {
        bucket: String,
        key: String,
        detail: String,
    },

    #[error("Invalid lifecycle event: {detail}")]
    InvalidEvent { detail: String },
}

impl DbInfraError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    pub fn secret_unavailable(secret_id: &str, detail: impl Into<String>) -> Self {
        Self::SecretUnavailable {
            secret_id: secret_id.to_string(),
            detail: detail.into(),
        }
    }

    /// Stable code used in logs and counters.
    pub fn code(&self) -> &'static str {
        match self {
            DbInfraError::Config { .. } => "CONFIG_ERROR",
            DbInfraError::SecretUnavailable { .. } => "SECRET_UNAVAILABLE",
            DbInfraError::ConnectionExhausted { .. } => "CONNECTION_EXHAUSTED",
            DbInfraError::StatementExecutionFailed { .. } => "STATEMENT_EXECUTION_FAILED",
            DbInfraError::ArtifactWriteFailed { .. } => "ARTIFACT_WRITE_FAILED",
            DbInfraError::InvalidEvent { .. } => "INVALID_EVENT",
        }
    }
}
