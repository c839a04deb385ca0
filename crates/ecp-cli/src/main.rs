//! EBI Cloud Portal CLI binary entrypoint.
//!
//! This is the main entry point for the `ecp` command-line tool.

use std::io;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use ecp_cli::cli::{Action, Cli};
use ecp_cli::client::{HttpTransport, PortalClient};
use ecp_cli::commands::{LoginCommand, RequestCommand};
use ecp_cli::config::TOKEN_ENV_VAR;
use ecp_cli::output::OutputFormat;
use ecp_cli::resource::UrlResolver;
use ecp_cli::token::{Token, TokenStore};
use ecp_cli::CliError;

fn main() -> ExitCode {
    // Logs go to stderr; stdout carries rendered responses
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Failed to create async runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(run(cli)) {
        Ok(()) => ExitCode::SUCCESS,
        // Usage mistakes are reported but do not fail the process.
        Err(e) if e.is_usage() => {
            eprintln!("{e}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let action = cli.action()?;

    let config = cli.portal_config();
    config.validate()?;

    let store = TokenStore::new(config.token_path.clone(), std::env::var(TOKEN_ENV_VAR).ok());
    let transport = HttpTransport::new()?;

    match action {
        Action::Login { user, password } => {
            let client = PortalClient::new(transport, Token::default());
            let mut input = io::stdin().lock();
            let mut prompt = io::stderr().lock();
            LoginCommand::new(&client, &store, &config.auth_url)
                .execute(&mut input, &mut prompt, user.as_deref(), password.as_deref())
                .await?;
        }
        Action::Request(invocation) => {
            let token = store.resolve(cli.token.as_deref())?;
            let client = PortalClient::new(transport, token);
            let resolver = UrlResolver::new(&config.api_base);
            let format = OutputFormat::from_json_flag(cli.json);
            let mut stdout = io::stdout().lock();
            RequestCommand::new(&client, &resolver)
                .execute(&mut stdout, &format, &invocation, cli.file.as_deref())
                .await?;
        }
    }

    Ok(())
}
