use anyhow::{Context, Result};
use log::{debug, info};
use reqwest::{header, Client};

use crate::config::ApimConfig;
use crate::constants::{APIM_API_VERSION, CHAT_COMPLETIONS_PATH, SUBSCRIPTION_KEY_HEADER};
use crate::domain::{ChatCompletionRequest, GatewayResponse};

///
/// Builds the chat completions url for the gateway. This is plain concatenation,
/// an empty base yields `/chat/completions?api-version=...`.
///
pub fn chat_completions_endpoint(api_base_url: &str) -> String {
    format!("{api_base_url}/{CHAT_COMPLETIONS_PATH}?api-version={APIM_API_VERSION}")
}

/// Calls the APIM gateway in front of the hosted model.
pub struct GatewayClient {
    endpoint: String,
    subscription_key: String,
    client: Client,
}

impl GatewayClient {
    pub fn new(api_base_url: &str, subscription_key: &str) -> Self {
        GatewayClient {
            endpoint: chat_completions_endpoint(api_base_url),
            subscription_key: subscription_key.to_string(),
            client: Client::new(),
        }
    }

    pub fn from_config(config: &ApimConfig) -> Self {
        Self::new(&config.api_base_url, &config.subscription_key)
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    ///
    /// Sends the default chat completions request with the bearer token.
    ///
    pub async fn call(&self, bearer_token: &str) -> Result<GatewayResponse> {
        self.send(bearer_token, &ChatCompletionRequest::default())
            .await
    }

    ///
    /// Issues exactly one POST. Any HTTP status is returned as a `GatewayResponse`,
    /// only transport failures are errors.
    ///
    pub async fn send(
        &self,
        bearer_token: &str,
        body: &ChatCompletionRequest,
    ) -> Result<GatewayResponse> {
        debug!("[debug] Gateway request body: {:#?}", body);

        let mut request = self
            .client
            .post(&self.endpoint)
            .header(header::CONTENT_TYPE, "application/json")
            .bearer_auth(bearer_token)
            .json(body);

        if !self.subscription_key.is_empty() {
            request = request.header(SUBSCRIPTION_KEY_HEADER, &self.subscription_key);
        }

        let response = request
            .send()
            .await
            .with_context(|| format!("Gateway request to {} failed", self.endpoint))?;

        let response_status = response.status();
        let response_text = response
            .text()
            .await
            .with_context(|| format!("Unable to read gateway response from {}", self.endpoint))?;

        info!("Gateway responded with {}", response_status);

        Ok(GatewayResponse {
            status: response_status.as_u16(),
            body: response_text,
        })
    }
}
