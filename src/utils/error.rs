use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DownstreamError {
    #[error("Failed to read manifest {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse manifest {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to list directory {path}: {source}")]
    ListDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Could not determine git origin fetch url for {dir}")]
    OriginNotFound { dir: PathBuf },

    #[error("Remote query failed in {dir}: {stderr}")]
    RemoteQuery { dir: PathBuf, stderr: String },

    #[error("Malformed origin url '{url}': {reason}")]
    MalformedOrigin { url: String, reason: String },

    #[error("Failed to create build directory {path}: {source}")]
    BuildRoot {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Clone of {url} failed: {stderr}")]
    Clone { url: String, stderr: String },

    #[error("Install in {dir} failed: {stderr}")]
    Install { dir: PathBuf, stderr: String },

    #[error("Failed to start '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{path} is not a module directory (no package.json)")]
    NotAModule { path: PathBuf },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid configuration value for '{field}': '{value}' ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Manifest,
    Discovery,
    Origin,
    ExternalTool,
    Environment,
    Configuration,
}

impl DownstreamError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Read { .. } | Self::Parse { .. } => ErrorCategory::Manifest,
            Self::ListDirectory { .. } | Self::NotAModule { .. } => ErrorCategory::Discovery,
            Self::OriginNotFound { .. } | Self::RemoteQuery { .. } | Self::MalformedOrigin { .. } => {
                ErrorCategory::Origin
            }
            Self::Clone { .. } | Self::Install { .. } | Self::Spawn { .. } => {
                ErrorCategory::ExternalTool
            }
            Self::BuildRoot { .. } => ErrorCategory::Environment,
            Self::ConfigError { .. } | Self::InvalidConfigValueError { .. } => {
                ErrorCategory::Configuration
            }
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            Self::Read { .. } => "Check that the package.json exists and is readable",
            Self::Parse { .. } => "Fix the JSON syntax of the sibling package.json",
            Self::ListDirectory { .. } => "Check permissions on the parent directory",
            Self::OriginNotFound { .. } => "Add an 'origin' remote to the downstream repository",
            Self::RemoteQuery { .. } => "Make sure the downstream directory is a git repository",
            Self::MalformedOrigin { .. } => "Use a URL-style origin such as https://host/org/repo.git",
            Self::BuildRoot { .. } => "Check write permissions on the working directory",
            Self::Clone { .. } => "Check network access and credentials for the remote",
            Self::Install { .. } => "Re-run the install by hand in the checkout to see the full output",
            Self::Spawn { .. } => "Make sure the tool is installed and on PATH",
            Self::NotAModule { .. } => "Run downstream from a directory containing package.json",
            Self::ConfigError { .. } | Self::InvalidConfigValueError { .. } => {
                "Review the .downstream.toml configuration file"
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, DownstreamError>;
