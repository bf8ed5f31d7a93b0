mod constants;
mod utils;

pub mod auth;
pub mod config;
pub mod domain;
pub mod enums;
pub mod gateway;
pub mod inspect;
pub mod runner;

pub use crate::auth::{AuthError, ClientCredentialsAuthenticator, TokenSource};
pub use crate::config::{ApimConfig, ConfigError, Credentials};
pub use crate::domain::{AccessToken, ChatCompletionRequest, GatewayResponse, TokenClaims};
pub use crate::gateway::GatewayClient;
pub use crate::runner::{run, RunOutcome};
