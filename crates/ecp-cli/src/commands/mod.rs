//! CLI command implementations.
//!
//! - [`login`] - Credential exchange and token storage
//! - [`request`] - Resource verbs (`get`, `create`, `delete`, `stop`)

pub mod login;
pub mod request;

pub use login::LoginCommand;
pub use request::{RequestCommand, load_body};
