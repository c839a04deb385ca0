//! # ecp-cli
//!
//! Command-line client for the EBI Cloud Portal REST API.
//!
//! Provides commands for:
//! - Logging in and storing a bearer token
//! - Listing and fetching credentials, parameters, configurations,
//!   applications and deployments
//! - Creating and deleting resources from JSON documents
//! - Stopping deployments and reading their logs and status
//!
//! # Architecture
//!
//! ```text
//! ┌─────────┐   ┌────────────┐   ┌─────────────┐   ┌──────────────┐   ┌──────────┐
//! │   cli   │──►│ TokenStore │──►│ UrlResolver │──►│ PortalClient │──►│ Renderer │
//! └─────────┘   └────────────┘   └─────────────┘   └──────────────┘   └──────────┘
//!                                                     (Transport)      status lookups
//! ```
//!
//! The [`client::Transport`] trait separates request dispatch from HTTP so
//! rendering and dispatch can be tested without a portal.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod cli;
pub mod client;
pub mod commands;
pub mod config;
pub mod error;
pub mod output;
pub mod resource;
pub mod token;

pub use cli::{Action, Cli, Invocation};
pub use client::{HttpTransport, PortalClient, RawResponse, Transport};
pub use config::PortalConfig;
pub use error::CliError;
pub use output::{Format, OutputFormat, Renderer};
pub use resource::{ResourceKind, UrlResolver, Verb};
pub use token::{Token, TokenStore};
