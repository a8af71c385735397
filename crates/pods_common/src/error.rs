//! Error types for pods resolution.

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, PodsError>;

#[derive(Error, Debug)]
pub enum PodsError {
    /// Neither root carries a base (or display variant) compose file
    #[error("No compose file found for service {0}")]
    MissingBaseFile(String),

    #[error("Unknown service '{name}'")]
    UnknownService {
        name: String,
        available: Vec<String>,
    },

    #[error("Invalid config {}: {reason}", path.display())]
    Config { path: PathBuf, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl PodsError {
    /// Process exit code for this failure
    pub fn code(&self) -> i32 {
        match self {
            PodsError::UnknownService { .. } => 2,
            PodsError::MissingBaseFile(_) => 3,
            PodsError::Config { .. } => 4,
            PodsError::Io(_) => 1,
        }
    }
}
