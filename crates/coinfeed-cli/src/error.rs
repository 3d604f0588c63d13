use thiserror::Error;

use coinfeed_core::{ConfigError, GatewayError, IngestError, ValidationError};

/// CLI-level error categories mapped to exit codes.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Ingest(#[from] IngestError),

    #[error(transparent)]
    Checkpoint(#[from] GatewayError),

    #[error("interrupted")]
    Interrupted,

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Validation(_) => 2,
            Self::Config(_) => 2,
            Self::Ingest(IngestError::Validation(_)) => 2,
            Self::Ingest(IngestError::Checkpoint { .. }) => 3,
            Self::Checkpoint(_) => 3,
            Self::Serialization(_) => 4,
            Self::Io(_) => 10,
            Self::Interrupted => 130,
        }
    }
}
