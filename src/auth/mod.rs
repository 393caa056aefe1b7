//! Bearer-token validation.
//!
//! Tokens are issued by an external identity provider; this layer only
//! verifies the HS256 signature and the audience claim, then exposes the
//! decoded claims to handlers through an axum extractor.

use axum::{async_trait, extract::FromRequestParts, http::header, http::request::Parts};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::SecurityConfig;
use crate::error::ApiError;
use crate::state::AppState;

pub mod policy;

/// Decoded JWT claim set. `sub` carries the user id; it is optional at the
/// decoding layer so that a missing subject surfaces as a distinct policy
/// failure rather than a token parse error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    #[serde(default)]
    pub sub: Option<String>,
    #[serde(default)]
    pub exp: Option<i64>,
}

impl Claims {
    /// The token subject, or a `MissingSubject` failure if absent or empty.
    pub fn subject(&self) -> Result<&str, AuthError> {
        self.sub
            .as_deref()
            .filter(|s| !s.is_empty())
            .ok_or(AuthError::MissingSubject)
    }
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Authorization token is required")]
    MissingCredentials,

    #[error("Authorization header must carry a bearer token")]
    MalformedHeader,

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("User ID not found in the token")]
    MissingSubject,
}

/// Verifies bearer tokens against the server-held symmetric key.
pub struct TokenValidator {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenValidator {
    pub fn new(security: &SecurityConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[security.jwt_audience.as_str()]);
        validation.validate_exp = security.verify_expiry;
        if !security.verify_expiry {
            validation.required_spec_claims.clear();
        }
        Self {
            decoding_key: DecodingKey::from_secret(security.jwt_secret.as_bytes()),
            validation,
        }
    }

    /// Validate an `Authorization` header value and return the decoded claims.
    pub fn validate(&self, raw_header: Option<&str>) -> Result<Claims, AuthError> {
        let header = raw_header.ok_or(AuthError::MissingCredentials)?;
        let token = header
            .split_whitespace()
            .nth(1)
            .ok_or(AuthError::MalformedHeader)?;

        let data = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| AuthError::InvalidToken(e.to_string()))?;

        Ok(data.claims)
    }
}

#[async_trait]
impl FromRequestParts<AppState> for Claims {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let raw = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok());
        state.auth.validate(raw).map_err(ApiError::from)
    }
}
