use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::constants::{
    DEFAULT_MAX_TOKENS, DEFAULT_MODEL, DEFAULT_SYSTEM_MESSAGE, DEFAULT_USER_MESSAGE,
};
use crate::enums::ChatRole;

//Entra ID token endpoint success response
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct TokenResponse {
    #[serde(default)]
    pub access_token: String,
    pub token_type: Option<String>,
    pub expires_in: Option<u64>,
    pub ext_expires_in: Option<u64>,
}

//Entra ID token endpoint error response
//Docs: https://learn.microsoft.com/en-us/entra/identity-platform/v2-oauth2-client-creds-grant-flow#error-response
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct TokenErrorResponse {
    pub error: String,
    pub error_description: Option<String>,
    pub error_codes: Option<Vec<u64>>,
    pub timestamp: Option<String>,
    pub trace_id: Option<String>,
    pub correlation_id: Option<String>,
}

/// Standard time claims carried in a JWT payload. All values are epoch seconds.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, Default, Eq, PartialEq)]
pub struct TokenClaims {
    pub iat: Option<i64>,
    pub nbf: Option<i64>,
    pub exp: Option<i64>,
}

impl TokenClaims {
    pub(crate) fn from_payload(payload: &Map<String, Value>) -> Self {
        let claim = |name: &str| payload.get(name).and_then(numeric_date);
        TokenClaims {
            iat: claim("iat"),
            nbf: claim("nbf"),
            exp: claim("exp"),
        }
    }
}

//NumericDate may carry a fraction (RFC 7519 section 2), the fraction is dropped
fn numeric_date(value: &Value) -> Option<i64> {
    value.as_i64().or_else(|| {
        value
            .as_f64()
            .filter(|secs| secs.is_finite() && *secs >= i64::MIN as f64 && *secs < i64::MAX as f64)
            .map(|secs| secs.trunc() as i64)
    })
}

/// A bearer token returned by the identity provider.
#[derive(Clone)]
pub struct AccessToken {
    secret: String,
    pub token_type: Option<String>,
    pub expires_in: Option<u64>,
    /// Present when the token is a decodable JWT
    pub claims: Option<TokenClaims>,
}

impl AccessToken {
    pub fn new(secret: String) -> Self {
        AccessToken {
            secret,
            token_type: None,
            expires_in: None,
            claims: None,
        }
    }

    pub fn secret(&self) -> &str {
        &self.secret
    }
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessToken")
            .field("secret", &"[redacted]")
            .field("token_type", &self.token_type)
            .field("expires_in", &self.expires_in)
            .field("claims", &self.claims)
            .finish()
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, Eq, PartialEq)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: ChatRole, content: &str) -> Self {
        ChatMessage {
            role,
            content: content.to_string(),
        }
    }
}

//Azure AI model inference chat completions request body
#[derive(Deserialize, Serialize, Debug, Clone, Eq, PartialEq)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub max_tokens: usize,
}

impl Default for ChatCompletionRequest {
    fn default() -> Self {
        ChatCompletionRequest {
            model: DEFAULT_MODEL.to_string(),
            messages: vec![
                ChatMessage::new(ChatRole::System, DEFAULT_SYSTEM_MESSAGE),
                ChatMessage::new(ChatRole::User, DEFAULT_USER_MESSAGE),
            ],
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }
}

/// Status and raw body of the gateway response. The body is never parsed.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct GatewayResponse {
    pub status: u16,
    pub body: String,
}

impl GatewayResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}
