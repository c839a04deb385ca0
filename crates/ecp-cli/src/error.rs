//! CLI error types.

use std::path::PathBuf;

use thiserror::Error;

/// CLI-specific errors.
#[derive(Debug, Error)]
pub enum CliError {
    /// Verb outside the supported vocabulary.
    #[error("Unknown verb '{0}', expecting one of: get, create, delete, stop, login")]
    UnknownVerb(String),

    /// Resource outside the supported vocabulary.
    #[error(
        "Unknown resource '{0}', expecting one of: cred(s), param(s), config(s), app(s), deployment(s), logs, destroylogs, status"
    )]
    UnknownResource(String),

    /// A deployment-scoped resource was requested without a deployment name.
    #[error("'{0}' requires a deployment name, try --help for usage")]
    MissingName(String),

    /// `create` was invoked without a request body.
    #[error("create requires a JSON request body, pass one with --file")]
    MissingBody,

    /// The request body file does not contain JSON.
    #[error("request body in '{}' is not valid JSON: {reason}", path.display())]
    InvalidBody {
        /// Body file path.
        path: PathBuf,
        /// Parser message.
        reason: String,
    },

    /// Reading or writing a named file failed.
    #[error("failed to access '{}': {source}", path.display())]
    File {
        /// File that could not be accessed.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Network or HTTP-level failure.
    #[error("transport error: {0}")]
    Transport(String),

    /// Response body is not structured data.
    #[error("could not decode response: {0}")]
    Decode(String),

    /// Per-deployment status lookup failed.
    #[error("status lookup failed: {0}")]
    StatusLookup(String),

    /// Credential exchange was rejected.
    #[error("authentication failed with status {status}: {message}")]
    Auth {
        /// HTTP status returned by the authentication endpoint.
        status: u16,
        /// Response body.
        message: String,
    },

    /// Invalid configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// Output formatting error.
    #[error("format error: {0}")]
    Format(String),
}

impl CliError {
    /// Usage-level errors are reported without failing the process.
    #[must_use]
    pub const fn is_usage(&self) -> bool {
        matches!(
            self,
            Self::UnknownVerb(_)
                | Self::UnknownResource(_)
                | Self::MissingName(_)
                | Self::MissingBody
                | Self::InvalidBody { .. }
        )
    }

    pub(crate) fn file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::File {
            path: path.into(),
            source,
        }
    }
}

impl From<reqwest::Error> for CliError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err.to_string())
    }
}
