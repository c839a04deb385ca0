//! Portal HTTP client.
//!
//! [`PortalClient`] turns verbs into HTTP calls and performs the login
//! credential exchange. The wire is behind the [`Transport`] trait so the
//! dispatcher and renderer can be exercised without a network.
//!
//! # Example
//!
//! ```rust,no_run
//! use ecp_cli::client::{HttpTransport, PortalClient};
//! use ecp_cli::resource::Verb;
//! use ecp_cli::token::Token;
//!
//! # async fn example() -> Result<(), ecp_cli::CliError> {
//! let client = PortalClient::new(HttpTransport::new()?, Token::new("jwt"));
//! let response = client
//!     .dispatch(Verb::Get, "https://api.portal.tsi.ebi.ac.uk/deployment/", None)
//!     .await?;
//! println!("{}", response.body);
//! # Ok(())
//! # }
//! ```

use std::future::Future;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use reqwest::Method;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use serde_json::Value;
use tracing::{debug, trace, warn};

use crate::error::CliError;
use crate::resource::Verb;
use crate::token::Token;

/// A fully prepared HTTP request.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    /// HTTP method.
    pub method: Method,
    /// Absolute URL.
    pub url: String,
    /// Request headers.
    pub headers: HeaderMap,
    /// Request body.
    pub body: Option<String>,
}

/// Status and body of a completed HTTP exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response body text.
    pub body: String,
}

impl RawResponse {
    /// Create a response.
    #[must_use]
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Whether the status is 2xx.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }

    /// Decode the body as JSON.
    ///
    /// # Errors
    ///
    /// Returns [`CliError::Decode`] if the body is not valid JSON.
    pub fn json(&self) -> Result<Value, CliError> {
        serde_json::from_str(&self.body).map_err(|e| CliError::Decode(e.to_string()))
    }
}

/// Performs HTTP exchanges.
pub trait Transport: Send + Sync {
    /// Send a request and return the response regardless of its status.
    ///
    /// # Errors
    ///
    /// Returns [`CliError::Transport`] if the exchange cannot be completed.
    fn send(&self, request: ApiRequest) -> impl Future<Output = Result<RawResponse, CliError>> + Send;
}

/// `reqwest`-backed transport.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Create a transport with reqwest's default settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the TLS backend cannot be initialised.
    pub fn new() -> Result<Self, CliError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("ecp-cli/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }
}

impl Transport for HttpTransport {
    async fn send(&self, request: ApiRequest) -> Result<RawResponse, CliError> {
        let mut builder = self
            .client
            .request(request.method, &request.url)
            .headers(request.headers);
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        Ok(RawResponse { status, body })
    }
}

/// Portal API client.
#[derive(Debug)]
pub struct PortalClient<T> {
    transport: T,
    token: Token,
}

impl<T: Transport> PortalClient<T> {
    /// Create a client that authenticates with `token`.
    #[must_use]
    pub const fn new(transport: T, token: Token) -> Self {
        Self { transport, token }
    }

    /// Underlying transport.
    #[must_use]
    pub const fn transport(&self) -> &T {
        &self.transport
    }

    fn headers(&self) -> Result<HeaderMap, CliError> {
        let bearer = HeaderValue::from_str(&format!("Bearer {}", self.token.as_str()))
            .map_err(|_| CliError::Config("token contains characters not allowed in a header".into()))?;

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, bearer);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Ok(headers)
    }

    /// Perform `verb` against `url`.
    ///
    /// `stop` is sent as `PUT {url}/stop`. `create` posts `body`.
    ///
    /// # Errors
    ///
    /// - [`CliError::UnknownVerb`] for `login`, which has no resource request
    /// - [`CliError::MissingBody`] for `create` without a body
    /// - [`CliError::Transport`] if the exchange fails
    pub async fn dispatch(
        &self,
        verb: Verb,
        url: &str,
        body: Option<String>,
    ) -> Result<RawResponse, CliError> {
        let (method, url, body) = match verb {
            Verb::Get => (Method::GET, url.to_string(), None),
            Verb::Create => (Method::POST, url.to_string(), Some(body.ok_or(CliError::MissingBody)?)),
            Verb::Delete => (Method::DELETE, url.to_string(), None),
            Verb::Stop => (Method::PUT, format!("{url}/stop"), None),
            Verb::Login => return Err(CliError::UnknownVerb(verb.to_string())),
        };

        let request = ApiRequest {
            method,
            url,
            headers: self.headers()?,
            body,
        };
        self.send(request).await
    }

    /// `GET` an absolute URL with the portal headers.
    ///
    /// # Errors
    ///
    /// Returns [`CliError::Transport`] if the exchange fails.
    pub async fn get(&self, url: &str) -> Result<RawResponse, CliError> {
        self.dispatch(Verb::Get, url, None).await
    }

    /// Exchange a username and password for a bearer token.
    ///
    /// # Errors
    ///
    /// Returns [`CliError::Auth`] if the endpoint answers with a non-success
    /// status, or [`CliError::Transport`] if the exchange fails.
    pub async fn exchange_credentials(
        &self,
        auth_url: &str,
        username: &str,
        password: &str,
    ) -> Result<Token, CliError> {
        let encoded = STANDARD.encode(format!("{username}:{password}"));
        let basic = HeaderValue::from_str(&format!("Basic {encoded}"))
            .map_err(|_| CliError::Config("credentials cannot be sent as a header".into()))?;

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, basic);

        let request = ApiRequest {
            method: Method::GET,
            url: auth_url.to_string(),
            headers,
            body: None,
        };
        let response = self.send(request).await?;

        if !response.is_success() {
            return Err(CliError::Auth {
                status: response.status,
                message: response.body.trim().to_string(),
            });
        }

        Ok(Token::new(response.body.trim()))
    }

    async fn send(&self, request: ApiRequest) -> Result<RawResponse, CliError> {
        debug!(method = %request.method, url = %request.url, "Sending request");
        trace!(has_body = request.body.is_some(), "Request details");

        let response = self.transport.send(request).await?;

        if response.is_success() {
            debug!(status = response.status, "Received response");
        } else {
            warn!(status = response.status, "Portal returned an error status");
        }
        Ok(response)
    }
}
