use log::{debug, warn};
use thiserror::Error;

use crate::constants::{APIM_ENV_FILE, DEFAULT_AUTHORITY_HOST};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{name} must be a boolean (1/0, true/false, yes/no, on/off), got `{value}`")]
    InvalidFlag { name: String, value: String },
}

/// Application credentials registered with the identity provider.
#[derive(Clone, Default, Eq, PartialEq)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: String,
    pub tenant_id: String,
    pub scope: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[redacted]")
            .field("tenant_id", &self.tenant_id)
            .field("scope", &self.scope)
            .finish()
    }
}

/// Everything the run needs, read once at startup.
#[derive(Clone, Debug)]
pub struct ApimConfig {
    pub credentials: Credentials,
    pub authority_host: String,
    pub subscription_key: String,
    pub api_base_url: String,
    pub inspect_token: bool,
}

impl ApimConfig {
    ///
    /// Loads the env file (if any) into the process environment and reads the configuration from it.
    /// Variables already set in the process take precedence over the file.
    ///
    pub fn from_env() -> Result<Self, ConfigError> {
        match dotenvy::from_filename(APIM_ENV_FILE.as_str()) {
            Ok(path) => debug!("Loaded environment from {}", path.display()),
            Err(error) if error.not_found() => {
                debug!("No env file at {}, using process environment", *APIM_ENV_FILE)
            }
            Err(error) => warn!("Unable to load env file {}: {}", *APIM_ENV_FILE, error),
        }
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    ///
    /// Builds the configuration from any variable lookup. Missing variables become empty strings,
    /// validation of credentials is left to the authenticator.
    ///
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).unwrap_or_default();

        let authority_host = lookup("AUTHORITY_HOST")
            .filter(|host| !host.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_AUTHORITY_HOST.to_string());

        let inspect_token = match lookup("INSPECT_TOKEN") {
            Some(value) => parse_flag("INSPECT_TOKEN", &value)?,
            None => false,
        };

        Ok(ApimConfig {
            credentials: Credentials {
                client_id: var("CLIENT_ID"),
                client_secret: var("CLIENT_SECRET"),
                tenant_id: var("TENANT_ID"),
                scope: var("scope"),
            },
            authority_host,
            subscription_key: var("APIM_SUBSCRIPTION_KEY"),
            api_base_url: var("API_BASE_URL"),
            inspect_token,
        })
    }

    /// `https://login.microsoftonline.com/<tenant>`
    pub fn authority(&self) -> String {
        format!(
            "{}/{}",
            self.authority_host.trim_end_matches('/'),
            self.credentials.tenant_id.trim()
        )
    }
}

fn parse_flag(name: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_lowercase().as_str() {
        "" | "0" | "false" | "no" | "off" => Ok(false),
        "1" | "true" | "yes" | "on" => Ok(true),
        _ => Err(ConfigError::InvalidFlag {
            name: name.to_string(),
            value: value.to_string(),
        }),
    }
}
