//! Domain error types
//!
//! Provider errors are recovered inside the provider layer. Pipeline errors
//! are the only ones that reach `main`.

use std::fmt;
use std::path::PathBuf;

/// Failure talking to a catalog service
#[derive(Debug)]
pub enum ProviderError {
    /// Connection, timeout or body read failure
    Transport(String),
    /// Service answered with a non-success status code
    Status(u16),
    /// Payload could not be decoded
    Decode(String),
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderError::Transport(msg) => write!(f, "Transport error: {}", msg),
            ProviderError::Status(code) => write!(f, "Service returned status: {}", code),
            ProviderError::Decode(msg) => write!(f, "Failed to parse JSON: {}", msg),
        }
    }
}

impl std::error::Error for ProviderError {}

impl From<reqwest::Error> for ProviderError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            ProviderError::Decode(e.to_string())
        } else {
            ProviderError::Transport(e.to_string())
        }
    }
}

impl From<serde_json::Error> for ProviderError {
    fn from(e: serde_json::Error) -> Self {
        ProviderError::Decode(e.to_string())
    }
}

/// Failure of the batch as a whole
#[derive(Debug)]
pub enum PipelineError {
    /// A file could not be read or written
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Invalid configuration value
    Config(String),
    /// Output could not be serialized
    Output(String),
}

impl PipelineError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        PipelineError::Io {
            path: path.into(),
            source,
        }
    }
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineError::Io { path, source } => {
                write!(f, "I/O error on {}: {}", path.display(), source)
            }
            PipelineError::Config(msg) => write!(f, "Configuration error: {}", msg),
            PipelineError::Output(msg) => write!(f, "Output error: {}", msg),
        }
    }
}

impl std::error::Error for PipelineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PipelineError::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<csv::Error> for PipelineError {
    fn from(e: csv::Error) -> Self {
        PipelineError::Output(format!("CSV error: {}", e))
    }
}

impl From<serde_json::Error> for PipelineError {
    fn from(e: serde_json::Error) -> Self {
        PipelineError::Output(format!("JSON error: {}", e))
    }
}
