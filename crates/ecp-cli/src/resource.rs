//! Verb and resource vocabulary, and resource URL resolution.
//!
//! Every portal object is addressed as `{api_base}{path}{name}` where `path`
//! depends only on the [`ResourceKind`]. The deployment-scoped kinds
//! ([`ResourceKind::Logs`], [`ResourceKind::DestroyLogs`], [`ResourceKind::Status`])
//! are sub-resources of a named deployment and cannot be listed.

use std::fmt;
use std::str::FromStr;

use crate::error::CliError;

/// Action requested on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verb {
    /// Fetch one resource or list a collection.
    Get,
    /// Create a resource from a JSON body.
    Create,
    /// Delete a named resource.
    Delete,
    /// Stop a running deployment.
    Stop,
    /// Exchange credentials for a bearer token.
    Login,
}

impl Verb {
    /// Lowercase command-line spelling.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "get",
            Self::Create => "create",
            Self::Delete => "delete",
            Self::Stop => "stop",
            Self::Login => "login",
        }
    }
}

impl FromStr for Verb {
    type Err = CliError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "get" => Ok(Self::Get),
            "create" => Ok(Self::Create),
            "delete" => Ok(Self::Delete),
            "stop" => Ok(Self::Stop),
            "login" => Ok(Self::Login),
            other => Err(CliError::UnknownVerb(other.to_string())),
        }
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Category of portal object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    /// Cloud provider parameters (credentials).
    Credential,
    /// Deployment parameter sets.
    Parameter,
    /// Configurations binding credentials, parameters and an SSH key.
    Configuration,
    /// Registered applications.
    Application,
    /// Deployments of applications.
    Deployment,
    /// Output of a deployment's provisioning run.
    Logs,
    /// Output of a deployment's teardown run.
    DestroyLogs,
    /// Current status of a deployment.
    Status,
}

impl ResourceKind {
    /// All kinds, in usage order.
    pub const ALL: [Self; 8] = [
        Self::Credential,
        Self::Parameter,
        Self::Configuration,
        Self::Application,
        Self::Deployment,
        Self::Logs,
        Self::DestroyLogs,
        Self::Status,
    ];

    /// Short command-line spelling.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Credential => "cred",
            Self::Parameter => "param",
            Self::Configuration => "config",
            Self::Application => "app",
            Self::Deployment => "deployment",
            Self::Logs => "logs",
            Self::DestroyLogs => "destroylogs",
            Self::Status => "status",
        }
    }

    /// Whether the kind addresses a sub-resource of a named deployment.
    #[must_use]
    pub const fn is_deployment_scoped(self) -> bool {
        matches!(self, Self::Logs | Self::DestroyLogs | Self::Status)
    }

    const fn collection_path(self) -> &'static str {
        match self {
            Self::Credential => "/cloudproviderparameters/",
            Self::Parameter => "/configuration/deploymentparameters/",
            Self::Configuration => "/configuration/",
            Self::Application => "/application/",
            Self::Deployment | Self::Logs | Self::DestroyLogs | Self::Status => "/deployment/",
        }
    }

    const fn sub_resource(self) -> Option<&'static str> {
        match self {
            Self::Logs => Some("logs"),
            Self::DestroyLogs => Some("destroylogs"),
            Self::Status => Some("status"),
            _ => None,
        }
    }
}

impl FromStr for ResourceKind {
    type Err = CliError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cred" | "creds" | "credential" | "credentials" => Ok(Self::Credential),
            "param" | "params" | "parameter" | "parameters" => Ok(Self::Parameter),
            "config" | "configs" | "configuration" | "configurations" => Ok(Self::Configuration),
            "app" | "apps" | "application" | "applications" => Ok(Self::Application),
            "deployment" | "deployments" => Ok(Self::Deployment),
            "logs" => Ok(Self::Logs),
            "destroylogs" => Ok(Self::DestroyLogs),
            "status" => Ok(Self::Status),
            other => Err(CliError::UnknownResource(other.to_string())),
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Maps `(kind, name)` pairs to request URLs under a fixed API base.
#[derive(Debug, Clone)]
pub struct UrlResolver {
    base: String,
}

impl UrlResolver {
    /// Create a resolver rooted at `base` (trailing slashes are dropped).
    #[must_use]
    pub fn new(base: impl Into<String>) -> Self {
        let base = base.into();
        Self {
            base: base.trim_end_matches('/').to_string(),
        }
    }

    /// Resolve the URL for `name` of the given `kind`.
    ///
    /// An empty `name` addresses the whole collection for list kinds.
    ///
    /// # Errors
    ///
    /// Returns [`CliError::MissingName`] if a deployment-scoped kind is given
    /// an empty name.
    pub fn resolve(&self, kind: ResourceKind, name: &str) -> Result<String, CliError> {
        if kind.is_deployment_scoped() && name.is_empty() {
            return Err(CliError::MissingName(kind.to_string()));
        }
        let path = kind.collection_path();
        match kind.sub_resource() {
            Some(sub) => Ok(format!("{}{path}{name}/{sub}", self.base)),
            None => Ok(format!("{}{path}{name}", self.base)),
        }
    }
}
