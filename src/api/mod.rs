//! API handlers for Biblio REST endpoints

pub mod books;
pub mod health;
pub mod loans;
pub mod openapi;
pub mod persons;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};

use crate::{config::AuthConfig, error::AppError, AppState};

/// Extractor enforcing HTTP Basic authentication against the single
/// configured credential pair. Carries the authenticated username.
pub struct BasicAuth(pub String);

#[async_trait]
impl FromRequestParts<AppState> for BasicAuth {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::Authentication("Missing authorization header".to_string()))?;

        let username = verify_basic_header(auth_header, &state.config.auth)?;
        Ok(BasicAuth(username))
    }
}

/// Validate a Basic authorization header value against the configured
/// credentials. Returns the username on success.
fn verify_basic_header(header: &str, auth: &AuthConfig) -> Result<String, AppError> {
    let encoded = header
        .strip_prefix("Basic ")
        .ok_or_else(|| AppError::Authentication("Invalid authorization scheme".to_string()))?;

    let decoded = BASE64
        .decode(encoded.trim())
        .map_err(|_| AppError::Authentication("Invalid authorization header".to_string()))?;

    let credentials = String::from_utf8(decoded)
        .map_err(|_| AppError::Authentication("Invalid authorization header".to_string()))?;

    let (username, password) = credentials
        .split_once(':')
        .ok_or_else(|| AppError::Authentication("Invalid authorization header".to_string()))?;

    if username == auth.username && password == auth.password {
        Ok(username.to_string())
    } else {
        Err(AppError::Authentication("Invalid username or password".to_string()))
    }
}
