use std::fmt;

use log::{debug, error};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::domain::TokenClaims;
use crate::enums::Validity;
use crate::utils::{format_duration, format_timestamp};

#[derive(Debug, Error)]
pub enum InspectError {
    #[error("token is not a three-part JWT (found {segments} segment(s))")]
    Malformed { segments: usize },
    #[error("token {part} is not valid base64url: {source}")]
    Base64 {
        part: &'static str,
        #[source]
        source: base64::DecodeError,
    },
    #[error("token {part} is not a JSON object: {source}")]
    Json {
        part: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

/// Header and payload of a JWT. The signature is never verified.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedToken {
    pub header: Map<String, Value>,
    pub payload: Map<String, Value>,
}

///
/// Splits a JWT into its segments and parses the header and payload as JSON.
///
pub fn decode(token: &str) -> Result<DecodedToken, InspectError> {
    let segments: Vec<&str> = token.trim().split('.').collect();
    if segments.len() != 3 || segments[0].is_empty() || segments[1].is_empty() {
        return Err(InspectError::Malformed {
            segments: segments.len(),
        });
    }

    Ok(DecodedToken {
        header: decode_segment(segments[0], "header")?,
        payload: decode_segment(segments[1], "payload")?,
    })
}

fn decode_segment(segment: &str, part: &'static str) -> Result<Map<String, Value>, InspectError> {
    //Some issuers keep the base64 padding, the url-safe no-pad engine rejects it
    let bytes = base64::decode_config(segment.trim_end_matches('='), base64::URL_SAFE_NO_PAD)
        .map_err(|source| InspectError::Base64 { part, source })?;
    serde_json::from_slice(&bytes).map_err(|source| InspectError::Json { part, source })
}

impl DecodedToken {
    pub fn claims(&self) -> TokenClaims {
        TokenClaims::from_payload(&self.payload)
    }

    pub fn report(&self, now: i64) -> TokenReport {
        let claims = self.claims();
        TokenReport {
            header: pretty(&self.header),
            payload: pretty(&self.payload),
            issued_at: claims.iat.map(format_timestamp),
            not_before: claims.nbf.map(format_timestamp),
            expires_at: claims.exp.map(format_timestamp),
            validity: Validity::from_exp(claims.exp, now),
        }
    }
}

fn pretty(object: &Map<String, Value>) -> String {
    serde_json::to_string_pretty(object).unwrap_or_else(|_| format!("{:?}", object))
}

/// Human readable view of a decoded token.
#[derive(Debug, Clone, PartialEq)]
pub struct TokenReport {
    pub header: String,
    pub payload: String,
    pub issued_at: Option<String>,
    pub not_before: Option<String>,
    pub expires_at: Option<String>,
    pub validity: Validity,
}

impl fmt::Display for TokenReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Token header:\n{}", self.header)?;
        writeln!(f, "Token payload:\n{}", self.payload)?;
        if let Some(iat) = &self.issued_at {
            writeln!(f, "Issued at:  {iat}")?;
        }
        if let Some(nbf) = &self.not_before {
            writeln!(f, "Not before: {nbf}")?;
        }
        if let Some(exp) = &self.expires_at {
            writeln!(f, "Expires at: {exp}")?;
        }
        match self.validity {
            Validity::Expired { since } => {
                write!(f, "Token has expired ({} ago).", format_duration(since))
            }
            Validity::Valid { remaining } => {
                write!(f, "Token is valid for: {}", format_duration(remaining))
            }
            Validity::Unknown => write!(f, "Token has no exp claim, expiry not checked."),
        }
    }
}

///
/// Decodes the token and prints its report for the current time.
/// Failures are reported and swallowed so they never affect the rest of the run.
///
pub fn inspect(token: &str) -> Option<TokenReport> {
    match decode(token) {
        Ok(decoded) => {
            let report = decoded.report(chrono::Local::now().timestamp());
            debug!("Token validity: {:?}", report.validity);
            println!("{report}");
            Some(report)
        }
        Err(error) => {
            error!("Unable to decode access token: {}", error);
            println!("Error decoding token: {error}");
            None
        }
    }
}
