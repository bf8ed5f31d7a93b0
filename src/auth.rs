use async_trait::async_trait;
use log::{debug, error, info};
use reqwest::{header, Client, StatusCode, Url};
use thiserror::Error;

use crate::config::{ApimConfig, Credentials};
use crate::constants::{CLIENT_CREDENTIALS_GRANT, TOKEN_ENDPOINT_PATH};
use crate::domain::{AccessToken, TokenErrorResponse, TokenResponse};
use crate::inspect;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid credentials: {0}")]
    InvalidCredentials(String),
    #[error("{error}: {}", .description.as_deref().unwrap_or("no description provided"))]
    Provider {
        error: String,
        description: Option<String>,
    },
    #[error("unexpected token response: {0}")]
    MalformedResponse(String),
    #[error("token request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

///This trait defines anything that can hand out a bearer token for the gateway call
#[async_trait(?Send)]
pub trait TokenSource {
    async fn acquire_token(&self) -> Result<AccessToken, AuthError>;
}

/// Client-credentials grant against an Entra ID (Azure AD) tenant.
pub struct ClientCredentialsAuthenticator {
    credentials: Credentials,
    authority: String,
    client: Client,
}

impl ClientCredentialsAuthenticator {
    pub fn new(credentials: Credentials, authority: &str) -> Self {
        ClientCredentialsAuthenticator {
            credentials,
            authority: authority.trim_end_matches('/').to_string(),
            client: Client::new(),
        }
    }

    pub fn from_config(config: &ApimConfig) -> Self {
        Self::new(config.credentials.clone(), &config.authority())
    }

    pub fn token_endpoint(&self) -> String {
        format!("{}/{}", self.authority, TOKEN_ENDPOINT_PATH)
    }

    ///
    /// Checks the credentials before anything is sent over the wire.
    ///
    pub fn validate(&self) -> Result<(), AuthError> {
        let credentials = &self.credentials;
        let fields = [
            ("CLIENT_ID", &credentials.client_id),
            ("CLIENT_SECRET", &credentials.client_secret),
            ("TENANT_ID", &credentials.tenant_id),
            ("scope", &credentials.scope),
        ];
        for (name, value) in fields {
            if value.trim().is_empty() {
                return Err(AuthError::InvalidCredentials(format!("{name} is empty")));
            }
        }

        //A single scope, e.g. `api://<app id>/.default`
        let scope = credentials.scope.trim();
        if scope.split_whitespace().count() != 1 {
            return Err(AuthError::InvalidCredentials(format!(
                "scope must be a single value, got `{scope}`"
            )));
        }
        Url::parse(scope).map_err(|error| {
            AuthError::InvalidCredentials(format!("scope `{scope}` is not a valid URI: {error}"))
        })?;

        Ok(())
    }

    async fn request_token(&self) -> Result<AccessToken, AuthError> {
        self.validate()?;

        let credentials = &self.credentials;
        let params = [
            ("grant_type", CLIENT_CREDENTIALS_GRANT),
            ("client_id", credentials.client_id.trim()),
            ("client_secret", credentials.client_secret.trim()),
            ("scope", credentials.scope.trim()),
        ];

        let response = self
            .client
            .post(self.token_endpoint())
            .header(header::ACCEPT, "application/json")
            .form(&params)
            .send()
            .await?;

        let status = response.status();
        let response_text = response.text().await?;

        parse_token_response(status, &response_text)
    }
}

#[async_trait(?Send)]
impl TokenSource for ClientCredentialsAuthenticator {
    ///
    /// Performs the client-credentials grant. Every failure is logged here and returned as `Err`,
    /// the caller treats it as "no usable token".
    ///
    async fn acquire_token(&self) -> Result<AccessToken, AuthError> {
        match self.request_token().await {
            Ok(token) => {
                println!("Access Token acquired successfully.");
                info!(
                    "Token type {:?}, expires in {:?}s",
                    token.token_type, token.expires_in
                );
                Ok(token)
            }
            Err(auth_error) => {
                error!("Failed to acquire token.");
                match &auth_error {
                    AuthError::Provider { error, description } => {
                        error!("Error: {}", error);
                        error!(
                            "Error Description: {}",
                            description.as_deref().unwrap_or_default()
                        );
                    }
                    other => error!("An error occurred: {}", other),
                }
                Err(auth_error)
            }
        }
    }
}

fn parse_token_response(status: StatusCode, response_text: &str) -> Result<AccessToken, AuthError> {
    if status.is_success() {
        if let Ok(token_response) = serde_json::from_str::<TokenResponse>(response_text) {
            if !token_response.access_token.is_empty() {
                debug!(
                    "[debug] Token response: [{}] token_type={:?} expires_in={:?} ext_expires_in={:?}",
                    status,
                    token_response.token_type,
                    token_response.expires_in,
                    token_response.ext_expires_in
                );
                return Ok(into_access_token(token_response));
            }
        }
    }

    //Either an error status or a body without a usable token
    match serde_json::from_str::<TokenErrorResponse>(response_text) {
        Ok(error_response) => {
            debug!(
                "[debug] Token error response: [{}] codes={:?} correlation_id={:?}",
                status, error_response.error_codes, error_response.correlation_id
            );
            Err(AuthError::Provider {
                error: error_response.error,
                description: error_response.error_description,
            })
        }
        Err(_) if status.is_success() => Err(AuthError::MalformedResponse(format!(
            "[{status}] response did not contain an access token"
        ))),
        Err(_) => Err(AuthError::Provider {
            error: status.to_string(),
            description: Some(response_text.to_string()).filter(|body| !body.is_empty()),
        }),
    }
}

fn into_access_token(token_response: TokenResponse) -> AccessToken {
    //Opaque tokens are fine, claims are only attached when the token is a JWT
    let claims = inspect::decode(&token_response.access_token)
        .ok()
        .map(|decoded| decoded.claims());

    let mut token = AccessToken::new(token_response.access_token);
    token.token_type = token_response.token_type;
    token.expires_in = token_response.expires_in;
    token.claims = claims;
    token
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inspect::tests::encode_jwt;
    use httpmock::prelude::*;
    use serde_json::json;

    fn credentials() -> Credentials {
        Credentials {
            client_id: "test-client".to_string(),
            client_secret: "test-secret".to_string(),
            tenant_id: "test-tenant".to_string(),
            scope: "api://gateway/.default".to_string(),
        }
    }

    fn authenticator(server: &MockServer, credentials: Credentials) -> ClientCredentialsAuthenticator {
        let authority = format!("{}/{}", server.base_url(), credentials.tenant_id);
        ClientCredentialsAuthenticator::new(credentials, &authority)
    }

    #[test]
    fn test_token_endpoint() {
        let auth = ClientCredentialsAuthenticator::new(
            credentials(),
            "https://login.microsoftonline.com/test-tenant/",
        );
        assert_eq!(
            auth.token_endpoint(),
            "https://login.microsoftonline.com/test-tenant/oauth2/v2.0/token"
        );
    }

    #[tokio::test]
    async fn test_acquire_token_success() {
        let server = MockServer::start();
        let jwt = encode_jwt(
            &json!({"alg": "RS256", "typ": "JWT"}),
            &json!({"iat": 100, "nbf": 100, "exp": 3_700}),
        );

        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/test-tenant/oauth2/v2.0/token")
                .header("content-type", "application/x-www-form-urlencoded")
                .body_includes("grant_type=client_credentials")
                .body_includes("client_id=test-client")
                .body_includes("client_secret=test-secret")
                .body_includes("scope=api%3A%2F%2Fgateway%2F.default");
            then.status(200)
                .header("content-type", "application/json")
                .json_body(json!({
                    "token_type": "Bearer",
                    "expires_in": 3599,
                    "ext_expires_in": 3599,
                    "access_token": jwt
                }));
        });

        let token = authenticator(&server, credentials())
            .acquire_token()
            .await
            .unwrap();

        assert_eq!(token.secret(), jwt);
        assert_eq!(token.token_type.as_deref(), Some("Bearer"));
        assert_eq!(token.expires_in, Some(3599));
        assert_eq!(token.claims.and_then(|claims| claims.exp), Some(3_700));
        mock.assert();
    }

    #[tokio::test]
    async fn test_opaque_token_has_no_claims() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST).path("/test-tenant/oauth2/v2.0/token");
            then.status(200)
                .header("content-type", "application/json")
                .body(r#"{"access_token":"opaque-token","token_type":"Bearer"}"#);
        });

        let token = authenticator(&server, credentials())
            .acquire_token()
            .await
            .unwrap();

        assert_eq!(token.secret(), "opaque-token");
        assert!(token.claims.is_none());
        mock.assert();
    }

    #[tokio::test]
    async fn test_provider_error_is_reported() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST).path("/test-tenant/oauth2/v2.0/token");
            then.status(401)
                .header("content-type", "application/json")
                .json_body(json!({
                    "error": "invalid_client",
                    "error_description": "AADSTS7000215: Invalid client secret provided.",
                    "error_codes": [7000215],
                    "correlation_id": "corr-1"
                }));
        });

        let result = authenticator(&server, credentials()).acquire_token().await;

        match result {
            Err(AuthError::Provider { error, description }) => {
                assert_eq!(error, "invalid_client");
                assert!(description.unwrap().starts_with("AADSTS7000215"));
            }
            other => panic!("expected provider error, got {:?}", other),
        }
        mock.assert();
    }

    #[tokio::test]
    async fn test_unparseable_error_body() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST).path("/test-tenant/oauth2/v2.0/token");
            then.status(502).body("Bad Gateway");
        });

        let result = authenticator(&server, credentials()).acquire_token().await;

        match result {
            Err(AuthError::Provider { error, description }) => {
                assert!(error.starts_with("502"));
                assert_eq!(description.as_deref(), Some("Bad Gateway"));
            }
            other => panic!("expected provider error, got {:?}", other),
        }
        mock.assert();
    }

    #[tokio::test]
    async fn test_empty_access_token_is_rejected() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST).path("/test-tenant/oauth2/v2.0/token");
            then.status(200)
                .header("content-type", "application/json")
                .body(r#"{"access_token":"","token_type":"Bearer"}"#);
        });

        let result = authenticator(&server, credentials()).acquire_token().await;

        assert!(matches!(result, Err(AuthError::MalformedResponse(_))));
        mock.assert();
    }

    #[tokio::test]
    async fn test_empty_credentials_never_reach_the_provider() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST);
            then.status(200)
                .body(r#"{"access_token":"should-not-be-returned"}"#);
        });

        let blank_fields: [fn(&mut Credentials); 4] = [
            |c: &mut Credentials| c.client_id.clear(),
            |c: &mut Credentials| c.client_secret = "   ".to_string(),
            |c: &mut Credentials| c.tenant_id.clear(),
            |c: &mut Credentials| c.scope.clear(),
        ];
        for blank in blank_fields {
            let mut creds = credentials();
            blank(&mut creds);
            let result = authenticator(&server, creds).acquire_token().await;
            assert!(matches!(result, Err(AuthError::InvalidCredentials(_))));
        }

        mock.assert_hits(0);
    }

    #[test]
    fn test_scope_must_be_single_uri() {
        for scope in ["not a scope", "api://a/.default api://b/.default", "graph"] {
            let creds = Credentials {
                scope: scope.to_string(),
                ..credentials()
            };
            let auth = ClientCredentialsAuthenticator::new(creds, "https://login.example/t");
            assert!(
                matches!(auth.validate(), Err(AuthError::InvalidCredentials(_))),
                "scope `{scope}` should be rejected"
            );
        }
    }

    #[tokio::test]
    async fn test_transport_failure_yields_no_token() {
        //Nothing listens on port 1
        let auth = ClientCredentialsAuthenticator::new(credentials(), "http://127.0.0.1:1/t");
        let result = auth.acquire_token().await;
        assert!(matches!(result, Err(AuthError::Transport(_))));
    }
}
