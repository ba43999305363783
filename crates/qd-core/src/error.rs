use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum QdError {
    #[error("invalid notification payload")]
    Payload(#[source] serde_json::Error),

    #[error("{0}")]
    Environment(String),

    #[error("{tool} exited with status {code}")]
    ToolFailed { tool: String, code: i32 },

    #[error("file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("directory already exists: {}", .0.display())]
    ProjectExists(PathBuf),

    #[error("config file not found: {}", .0.display())]
    ConfigNotFound(PathBuf),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}

impl QdError {
    /// Missing dependencies, missing inputs, declined installs, and
    /// unsupported platforms. Everything except a tool that ran and failed.
    pub fn is_environment_failure(&self) -> bool {
        matches!(self, QdError::Environment(_) | QdError::FileNotFound(_))
    }
}

pub type Result<T> = std::result::Result<T, QdError>;
