use anyhow::Result;
use log::{info, warn};

use crate::auth::TokenSource;
use crate::config::ApimConfig;
use crate::constants::NO_TOKEN_MESSAGE;
use crate::domain::GatewayResponse;
use crate::enums::Validity;
use crate::gateway::GatewayClient;
use crate::inspect;

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum RunOutcome {
    NoToken,
    Called(GatewayResponse),
}

///
/// One pass of the flow: acquire a token, optionally inspect it, call the gateway once and print the result.
/// Failing to get a token ends the run quietly. Gateway transport errors are returned to the caller.
///
pub async fn run<S: TokenSource>(
    config: &ApimConfig,
    token_source: &S,
    gateway: &GatewayClient,
) -> Result<RunOutcome> {
    let token = match token_source.acquire_token().await {
        Ok(token) => token,
        Err(error) => {
            println!("Failed to acquire token: {error}");
            println!("{NO_TOKEN_MESSAGE}");
            return Ok(RunOutcome::NoToken);
        }
    };

    if config.inspect_token {
        inspect::inspect(token.secret());
    } else if let Some(claims) = token.claims {
        let validity = Validity::from_exp(claims.exp, chrono::Local::now().timestamp());
        if validity.is_expired() {
            warn!("Access token is already expired: {:?}", validity);
        }
    }

    info!("Calling gateway endpoint {}", gateway.endpoint());
    let response = gateway.call(token.secret()).await?;

    if !response.is_success() {
        warn!("Gateway returned non-success status {}", response.status);
    }

    println!("{}", response.status);
    println!("{}", response.body);

    Ok(RunOutcome::Called(response))
}
