//! Portal endpoints and token file location.

use std::path::PathBuf;

use crate::error::CliError;

/// Default portal API base.
pub const DEFAULT_API_BASE: &str = "https://api.portal.tsi.ebi.ac.uk";

/// Default authentication endpoint for the credential exchange.
pub const DEFAULT_AUTH_URL: &str = "https://api.aai.ebi.ac.uk/auth";

/// Environment variable holding a bearer token override.
pub const TOKEN_ENV_VAR: &str = "ECP_TOKEN";

/// File name of the default token file inside the home directory.
pub const TOKEN_FILE_NAME: &str = ".ecp_token";

/// Explicit configuration for a single invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortalConfig {
    /// API base URL, without trailing slash.
    pub api_base: String,
    /// Authentication endpoint URL.
    pub auth_url: String,
    /// Default token file; `None` when no home directory is known.
    pub token_path: Option<PathBuf>,
}

impl PortalConfig {
    /// Create a configuration with the given endpoints and the default token file.
    #[must_use]
    pub fn new(api_base: impl Into<String>, auth_url: impl Into<String>) -> Self {
        Self {
            api_base: api_base.into().trim_end_matches('/').to_string(),
            auth_url: auth_url.into(),
            token_path: default_token_path(),
        }
    }

    /// Validate endpoint URLs.
    ///
    /// # Errors
    ///
    /// Returns an error if either URL is not `http://` or `https://`.
    pub fn validate(&self) -> Result<(), CliError> {
        for url in [&self.api_base, &self.auth_url] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(CliError::Config(format!(
                    "invalid URL: {url}, must start with http:// or https://"
                )));
            }
        }
        Ok(())
    }
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self::new(DEFAULT_API_BASE, DEFAULT_AUTH_URL)
    }
}

/// `$HOME/.ecp_token`, if a home directory can be determined.
#[must_use]
pub fn default_token_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(TOKEN_FILE_NAME))
}
