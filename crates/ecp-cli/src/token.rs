//! Bearer token resolution and persistence.
//!
//! Resolution order:
//! 1. an explicit token file passed with `--token`
//! 2. the `ECP_TOKEN` environment value
//! 3. the default token file, if it exists
//! 4. an empty token (the portal will reject the request)

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::CliError;

/// Opaque bearer credential.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Token(String);

impl Token {
    /// Wrap a raw token string, dropping any newlines.
    #[must_use]
    pub fn new(raw: &str) -> Self {
        Self(raw.replace('\n', ""))
    }

    /// Token text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether no token is available.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            f.write_str("Token(<empty>)")
        } else {
            f.write_str("Token(<redacted>)")
        }
    }
}

/// Reads and writes bearer tokens.
#[derive(Debug, Clone)]
pub struct TokenStore {
    default_path: Option<PathBuf>,
    env_token: Option<String>,
}

impl TokenStore {
    /// Create a store over the default token file and an optional
    /// environment-sourced token.
    #[must_use]
    pub fn new(default_path: Option<PathBuf>, env_token: Option<String>) -> Self {
        Self {
            default_path,
            env_token,
        }
    }

    /// Default token file.
    #[must_use]
    pub fn default_path(&self) -> Option<&Path> {
        self.default_path.as_deref()
    }

    /// Resolve the token for this invocation.
    ///
    /// # Errors
    ///
    /// Returns [`CliError::File`] if the explicit file or an existing default
    /// file cannot be read.
    pub fn resolve(&self, explicit_path: Option<&Path>) -> Result<Token, CliError> {
        if let Some(path) = explicit_path {
            debug!(path = %path.display(), "Reading token from explicit file");
            return read_token(path);
        }

        if let Some(token) = &self.env_token {
            debug!("Using token from environment");
            return Ok(Token::new(token));
        }

        if let Some(path) = self.default_path.as_deref().filter(|p| p.is_file()) {
            debug!(path = %path.display(), "Reading token from default file");
            return read_token(path);
        }

        debug!("No token available, requests will be unauthenticated");
        Ok(Token::default())
    }

    /// Overwrite the default token file with `token`.
    ///
    /// # Errors
    ///
    /// Returns an error if no default file is configured or the write fails.
    pub fn persist(&self, token: &Token) -> Result<(), CliError> {
        let path = self
            .default_path
            .as_deref()
            .ok_or_else(|| CliError::Config("no home directory for the token file".into()))?;

        fs::write(path, format!("{}\n", token.as_str())).map_err(|e| CliError::file(path, e))?;
        debug!(path = %path.display(), "Token persisted");
        Ok(())
    }
}

fn read_token(path: &Path) -> Result<Token, CliError> {
    let content = fs::read_to_string(path).map_err(|e| CliError::file(path, e))?;
    Ok(Token::new(&content))
}
