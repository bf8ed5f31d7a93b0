use lazy_static::lazy_static;

lazy_static! {
    pub(crate) static ref APIM_ENV_FILE: String =
        std::env::var("APIM_ENV_FILE").unwrap_or(".env.apim".to_string());
}

//Entra ID (Azure AD) docs: https://learn.microsoft.com/en-us/entra/identity-platform/v2-oauth2-client-creds-grant-flow
pub(crate) const DEFAULT_AUTHORITY_HOST: &str = "https://login.microsoftonline.com";
pub(crate) const TOKEN_ENDPOINT_PATH: &str = "oauth2/v2.0/token";
pub(crate) const CLIENT_CREDENTIALS_GRANT: &str = "client_credentials";

//Azure AI model inference API version exposed through APIM
pub(crate) const APIM_API_VERSION: &str = "2024-05-01-preview";
pub(crate) const CHAT_COMPLETIONS_PATH: &str = "chat/completions";
pub(crate) const SUBSCRIPTION_KEY_HEADER: &str = "api-key";

pub(crate) const DEFAULT_MODEL: &str = "DeepSeek-R1";
pub(crate) const DEFAULT_SYSTEM_MESSAGE: &str = "You are a helpful assistant";
pub(crate) const DEFAULT_USER_MESSAGE: &str = "How are you?";
pub(crate) const DEFAULT_MAX_TOKENS: usize = 2048;

pub(crate) const NO_TOKEN_MESSAGE: &str = "No token available to call the API.";
