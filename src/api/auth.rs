//! Token exchange
//!
//! Trades a username/password pair for the API token that every other
//! call carries. Sessions are normally built from a token directly; this
//! is the path for obtaining one.

use super::http::{HttpClient, RequestBody, DEFAULT_TIMEOUT};
use crate::error::{AlanaError, Result};
use reqwest::Method;
use serde_json::json;

/// Path of the token endpoint
pub const TOKEN_AUTH_PATH: &str = "/api-token-auth/";

/// Exchange credentials for an API token
pub async fn obtain_token(base_url: &str, username: &str, password: &str) -> Result<String> {
    if username.is_empty() || password.is_empty() {
        return Err(AlanaError::InvalidArgument(
            "username and password are required".to_string(),
        ));
    }

    let url = format!("{}{}", base_url.trim().trim_end_matches('/'), TOKEN_AUTH_PATH);
    let http = HttpClient::new(DEFAULT_TIMEOUT)?;
    let body = json!({
        "username": username,
        "password": password,
    });

    let response = http
        .json(Method::POST, &url, None, RequestBody::Json(body))
        .await?;

    let token = response
        .get("token")
        .and_then(|v| v.as_str())
        .ok_or_else(|| AlanaError::malformed(&url, "missing 'token' field"))?;

    tracing::info!("Obtained API token for user {}", username);
    Ok(token.to_string())
}
