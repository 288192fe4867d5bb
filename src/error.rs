//! Error taxonomy shared by every stage of a launch.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum InvokeError {
    #[error("config file not found: {}", .path.display())]
    ConfigNotFound { path: PathBuf },

    #[error("config file must end in .yaml or .yml: {}", .path.display())]
    ConfigExtensionInvalid { path: PathBuf },

    #[error("could not parse config {}: {reason}", .path.display())]
    ConfigParse { path: PathBuf, reason: String },

    #[error("could not build arguments: {0}")]
    Synthesis(String),

    #[error("entry point not found: {}", .path.display())]
    ScriptNotFound { path: PathBuf },

    #[error("failed to start {program}: {reason}")]
    SpawnFailure { program: String, reason: String },

    #[error("no process registered for '{script}' ({})", .path.display())]
    NotRegistered { script: String, path: PathBuf },

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, InvokeError>;

/// Attach a short description to an io failure, like `anyhow::Context` but typed.
pub trait IoContext<T> {
    fn io_context<F, S>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> S,
        S: Into<String>;
}

impl<T> IoContext<T> for std::io::Result<T> {
    fn io_context<F, S>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> S,
        S: Into<String>,
    {
        self.map_err(|source| InvokeError::Io {
            context: f().into(),
            source,
        })
    }
}
