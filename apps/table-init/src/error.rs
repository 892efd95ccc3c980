use std::path::PathBuf;

use db_infra::DbInfraError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Could not read event from {}: {source}", path.display())]
    ReadEvent {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Event is not valid JSON: {0}")]
    ParseEvent(#[from] serde_json::Error),

    #[error("Lifecycle request failed: {reason}")]
    LifecycleFailed { reason: String },

    #[error(transparent)]
    Infra(#[from] DbInfraError),
}
