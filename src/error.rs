// Error types for collectors and probes

use std::time::Duration;

use thiserror::Error;

/// Why a collector or probe produced no value.
#[derive(Debug, Error)]
pub enum CollectorError {
    #[error("blocking task failed: {0}")]
    Join(#[from] tokio::task::JoinError),

    #[error("failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} exited with {status}: {stderr}")]
    CommandFailed {
        program: String,
        status: std::process::ExitStatus,
        stderr: String,
    },

    #[error("timed out after {0:?}")]
    Timeout(Duration),

    #[error("unexpected output from {what}: {reason}")]
    Parse { what: &'static str, reason: String },

    #[error("docker: {0}")]
    Docker(#[from] bollard::errors::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("source panicked: {0}")]
    Panic(String),
}

/// Result of one collector or probe call.
pub type Collected<T> = Result<T, CollectorError>;
