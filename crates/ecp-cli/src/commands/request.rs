//! Resource request command implementation.
//!
//! Handles `get`, `create`, `delete` and `stop`: resolve the URL, load the
//! request body, dispatch, then render the response.

use std::fs;
use std::io::Write;
use std::path::Path;

use serde_json::Value;
use tracing::debug;

use crate::cli::Invocation;
use crate::client::{PortalClient, Transport};
use crate::error::CliError;
use crate::output::{OutputFormat, Renderer};
use crate::resource::{UrlResolver, Verb};

/// Handler for resource verbs.
pub struct RequestCommand<'a, T> {
    client: &'a PortalClient<T>,
    resolver: &'a UrlResolver,
}

impl<'a, T: Transport> RequestCommand<'a, T> {
    /// Creates a new request command handler.
    #[must_use]
    pub const fn new(client: &'a PortalClient<T>, resolver: &'a UrlResolver) -> Self {
        Self { client, resolver }
    }

    /// Executes `invocation`, writing the rendered response to `out`.
    ///
    /// For `create`, the body is read from `body_file` and checked to be JSON
    /// before any request is made.
    ///
    /// # Errors
    ///
    /// Returns error if the URL cannot be resolved, the body cannot be
    /// loaded, the request fails, or output fails.
    pub async fn execute<W: Write>(
        &self,
        out: &mut W,
        format: &OutputFormat,
        invocation: &Invocation,
        body_file: Option<&Path>,
    ) -> Result<(), CliError> {
        let url = self.resolver.resolve(invocation.kind, &invocation.name)?;

        let body = if invocation.verb == Verb::Create {
            Some(load_body(body_file.ok_or(CliError::MissingBody)?)?)
        } else {
            None
        };

        let response = self.client.dispatch(invocation.verb, &url, body).await?;

        Renderer::new(self.client, format.clone())
            .render(out, &response, invocation.kind, invocation.verb)
            .await
    }
}

/// Read a request body and check that it is JSON.
///
/// # Errors
///
/// Returns [`CliError::File`] if the file cannot be read, or
/// [`CliError::InvalidBody`] if it is not JSON.
pub fn load_body(path: &Path) -> Result<String, CliError> {
    let content = fs::read_to_string(path).map_err(|e| CliError::file(path, e))?;
    serde_json::from_str::<Value>(&content).map_err(|e| CliError::InvalidBody {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    debug!(path = %path.display(), bytes = content.len(), "Loaded request body");
    Ok(content)
}
