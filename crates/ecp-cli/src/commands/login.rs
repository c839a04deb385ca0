//! Login command implementation.
//!
//! Exchanges a username and password for a bearer token, stores it in the
//! default token file and echoes it to the prompt stream.

use std::io::{BufRead, Write};

use tracing::debug;

use crate::client::{PortalClient, Transport};
use crate::error::CliError;
use crate::token::{Token, TokenStore};

/// Handler for the login verb.
pub struct LoginCommand<'a, T> {
    client: &'a PortalClient<T>,
    store: &'a TokenStore,
    auth_url: &'a str,
}

impl<'a, T: Transport> LoginCommand<'a, T> {
    /// Creates a new login command handler.
    #[must_use]
    pub const fn new(client: &'a PortalClient<T>, store: &'a TokenStore, auth_url: &'a str) -> Self {
        Self {
            client,
            store,
            auth_url,
        }
    }

    /// Executes the login.
    ///
    /// Missing credentials are asked for on `prompt` and read from `input`.
    ///
    /// # Errors
    ///
    /// Returns error if prompting, the credential exchange, or persisting the
    /// token fails.
    pub async fn execute<R: BufRead, W: Write>(
        &self,
        input: &mut R,
        prompt: &mut W,
        user: Option<&str>,
        password: Option<&str>,
    ) -> Result<Token, CliError> {
        let user = match user {
            Some(user) => user.to_string(),
            None => ask(input, prompt, "Please enter your username: ")?,
        };
        let password = match password {
            Some(password) => password.to_string(),
            None => ask(input, prompt, "Please enter your password: ")?,
        };

        debug!(user = %user, url = %self.auth_url, "Exchanging credentials");
        let token = self
            .client
            .exchange_credentials(self.auth_url, &user, &password)
            .await?;

        self.store.persist(&token)?;
        writeln!(prompt, "{}", token.as_str())?;
        Ok(token)
    }
}

fn ask<R: BufRead, W: Write>(input: &mut R, prompt: &mut W, question: &str) -> Result<String, CliError> {
    write!(prompt, "{question}")?;
    prompt.flush()?;

    let mut answer = String::new();
    input.read_line(&mut answer)?;
    Ok(answer.trim_end_matches(['\r', '\n']).to_string())
}
