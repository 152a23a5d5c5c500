//! CLI errors and their exit codes.
//!
//! Exit code scheme:
//! - 0:  success
//! - 2:  clap arg parse error (automatic, before our code runs)
//! - 10: engine error (unknown engine, invalid params, bad dimensions)
//! - 11: I/O error (PNG write)
//! - 12: input error (bad JSON params, bad color, bad point)
//! - 13: serialization error

use thiserror::Error;
use topography_core::EngineError;

/// Errors produced by CLI operations, each mapped to a distinct exit code.
#[derive(Debug, Error)]
pub enum CliError {
    /// An engine-level error (unknown engine, invalid params, bad dimensions).
    #[error("{0}")]
    Engine(EngineError),
    /// An I/O error (PNG write).
    #[error("{0}")]
    Io(String),
    /// A user input error (bad JSON params, bad color).
    #[error("{0}")]
    Input(String),
    /// A serialization error (JSON output failure).
    #[error("{0}")]
    Serialization(String),
}

impl CliError {
    /// Returns the process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Engine(_) => 10,
            CliError::Io(_) => 11,
            CliError::Input(_) => 12,
            CliError::Serialization(_) => 13,
        }
    }
}

impl From<EngineError> for CliError {
    fn from(e: EngineError) -> Self {
        match e {
            EngineError::Io(msg) => CliError::Io(msg),
            EngineError::InvalidColor(msg) => CliError::Input(format!("invalid color: {msg}")),
            other => CliError::Engine(other),
        }
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        CliError::Serialization(e.to_string())
    }
}
