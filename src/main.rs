use anyhow::Result;

use apim_caller::{run, ApimConfig, ClientCredentialsAuthenticator, GatewayClient};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    env_logger::init();

    let config = ApimConfig::from_env()?;

    let authenticator = ClientCredentialsAuthenticator::from_config(&config);
    let gateway = GatewayClient::from_config(&config);

    run(&config, &authenticator, &gateway).await?;

    Ok(())
}
