//! Error types for envgraph
//!
//! All modules use `EnvResult<T>` as their return type.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for envgraph operations
pub type EnvResult<T> = Result<T, EnvError>;

/// All errors that can occur while compiling an environment
#[derive(Error, Debug)]
pub enum EnvError {
    // Configuration errors
    #[error("Invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    #[error("Failed to create config directory {path}: {source}")]
    ConfigDirCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid environment file {path}: {reason}")]
    EnvironmentInvalid { path: PathBuf, reason: String },

    #[error("Invalid extension identifier '{id}': {reason}")]
    InvalidExtension { id: String, reason: String },

    #[error("Unsupported platform: {0}. Supported: linux/amd64, linux/arm64")]
    UnsupportedPlatform(String),

    // Collaborator errors
    #[error("Failed to fetch extension {extension}: {reason}")]
    PluginFetch { extension: String, reason: String },

    #[error("Failed to clone {url}: {reason}")]
    FrameworkClone { url: String, reason: String },

    /// A graph assembly step failed; carries the step name for context
    #[error("{step}: {source}")]
    Step {
        step: &'static str,
        #[source]
        source: Box<EnvError>,
    },

    // IO errors
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    // Process errors
    #[error("Command failed: {command}")]
    CommandFailed {
        command: String,
        #[source]
        source: std::io::Error,
    },

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    // General errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl EnvError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create a command failed error
    pub fn command_failed(command: impl Into<String>, source: std::io::Error) -> Self {
        Self::CommandFailed {
            command: command.into(),
            source,
        }
    }

    /// Tag an error with the assembly step it came from
    pub fn step(step: &'static str, source: EnvError) -> Self {
        Self::Step {
            step,
            source: Box::new(source),
        }
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::InvalidExtension { .. } => {
                Some("Extensions are written as publisher.name-version, e.g. ms-python.python-2021.12.1559732655")
            }
            Self::UnsupportedPlatform(_) => Some("Set build.platform to linux/amd64 or linux/arm64"),
            Self::FrameworkClone { .. } => Some("Check that git is installed and the network is reachable"),
            Self::Step { source, .. } => source.hint(),
            _ => None,
        }
    }
}
