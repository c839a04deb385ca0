//! Command-line argument parsing with clap.
//!
//! The verb and resource are taken as free-form positionals and validated by
//! [`Cli::action`], so that unknown words produce the portal's usage messages
//! rather than clap's.

use std::path::PathBuf;

use clap::Parser;

use crate::config::{DEFAULT_API_BASE, DEFAULT_AUTH_URL, PortalConfig};
use crate::error::CliError;
use crate::resource::{ResourceKind, Verb};

/// EBI Cloud Portal CLI.
#[derive(Parser, Debug, Clone)]
#[command(name = "ecp")]
#[command(version, about = "EBI Cloud Portal CLI", long_about = None)]
pub struct Cli {
    /// Action to perform on resource, one of: get/create/delete/stop(deployments only)/login.
    pub verb: String,

    /// Resource type to perform action on, one of: cred/param/config/app/deployment/logs/destroylogs/status.
    pub resource: Option<String>,

    /// Resource name to perform action on; can be omitted for 'get' action to list all.
    pub name: Option<String>,

    /// File containing JSON to post.
    #[arg(short, long)]
    pub file: Option<PathBuf>,

    /// File containing JWT identity token, is sourced from ECP_TOKEN env var by default.
    #[arg(short, long)]
    pub token: Option<PathBuf>,

    /// Print raw JSON responses.
    #[arg(short, long)]
    pub json: bool,

    /// Username for login action.
    #[arg(short, long)]
    pub user: Option<String>,

    /// Password for login action.
    #[arg(short, long)]
    pub password: Option<String>,

    /// Portal API base URL.
    #[arg(long, env = "ECP_API_URL", default_value = DEFAULT_API_BASE, hide_default_value = true)]
    pub api_url: String,

    /// Authentication endpoint used by login.
    #[arg(long, env = "ECP_AUTH_URL", default_value = DEFAULT_AUTH_URL, hide_default_value = true)]
    pub auth_url: String,
}

/// A validated resource request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// Requested verb; never [`Verb::Login`].
    pub verb: Verb,
    /// Target resource kind.
    pub kind: ResourceKind,
    /// Resource name, empty for a whole collection.
    pub name: String,
}

/// What the command line asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Exchange credentials for a token.
    Login {
        /// Username, prompted for if absent.
        user: Option<String>,
        /// Password, prompted for if absent.
        password: Option<String>,
    },
    /// Issue a resource request.
    Request(Invocation),
}

impl Cli {
    /// Validate the positionals.
    ///
    /// `stop <name>` is shorthand for `stop deployment <name>`.
    ///
    /// # Errors
    ///
    /// Returns a usage error for an unknown verb or resource, or a missing
    /// deployment name for `stop`.
    pub fn action(&self) -> Result<Action, CliError> {
        let verb: Verb = self.verb.parse()?;

        if verb == Verb::Login {
            return Ok(Action::Login {
                user: self.user.clone().filter(|u| !u.is_empty()),
                password: self.password.clone().filter(|p| !p.is_empty()),
            });
        }

        let name = self.name.clone().unwrap_or_default();
        let (resource, name) = match (verb, self.resource.as_deref()) {
            (Verb::Stop, Some(keyword @ ("deployment" | "deployments"))) => (keyword, name),
            (Verb::Stop, shorthand) => ("deployment", shorthand.unwrap_or_default().to_string()),
            (_, resource) => (resource.unwrap_or_default(), name),
        };

        let kind: ResourceKind = resource.parse()?;

        if name.is_empty() && verb == Verb::Stop {
            return Err(CliError::MissingName(verb.to_string()));
        }

        Ok(Action::Request(Invocation { verb, kind, name }))
    }

    /// Endpoint configuration for this invocation.
    #[must_use]
    pub fn portal_config(&self) -> PortalConfig {
        PortalConfig::new(&self.api_url, &self.auth_url)
    }
}
