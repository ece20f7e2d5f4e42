//! Alana session
//!
//! Holds the base URL and token and exposes the uniform request primitive
//! every other module goes through.

use super::http::{add_query_params, Download, HttpClient, RequestBody, DEFAULT_TIMEOUT};
use crate::error::{AlanaError, Result};
use reqwest::multipart::Form;
use reqwest::Method;
use serde_json::Value;
use std::fmt;
use std::time::Duration;
use url::Url;

/// Authenticated connection parameters for one Alana server
#[derive(Clone)]
pub struct Session {
    http: HttpClient,
    base_url: String,
    token: String,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Security: never print the token
        f.debug_struct("Session")
            .field("base_url", &self.base_url)
            .field("token", &"<redacted>")
            .finish()
    }
}

impl Session {
    /// Create a session with the default timeout
    pub fn new(token: &str, base_url: &str) -> Result<Self> {
        Self::with_timeout(token, base_url, DEFAULT_TIMEOUT)
    }

    /// Create a session with an explicit request timeout
    pub fn with_timeout(token: &str, base_url: &str, timeout: Duration) -> Result<Self> {
        let token = token.trim();
        if token.is_empty() {
            return Err(AlanaError::Configuration("an API token is required".to_string()));
        }

        let base_url = normalize_base_url(base_url)?;
        let http = HttpClient::new(timeout)?;

        Ok(Self {
            http,
            base_url,
            token: token.to_string(),
        })
    }

    /// Base URL without trailing slash
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL for an API path
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Perform one authenticated call and return the parsed JSON body
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        query: Option<&Value>,
        body: RequestBody,
    ) -> Result<Value> {
        let url = match query {
            Some(params) => add_query_params(&self.url(path), params),
            None => self.url(path),
        };
        self.http.json(method, &url, Some(&self.token), body).await
    }

    /// GET a path with optional query parameters
    pub async fn get(&self, path: &str, query: Option<&Value>) -> Result<Value> {
        self.request(Method::GET, path, query, RequestBody::Empty).await
    }

    /// GET carrying a JSON body (used by calculation endpoints)
    pub async fn get_with_body(&self, path: &str, body: &Value) -> Result<Value> {
        self.request(Method::GET, path, None, RequestBody::Json(body.clone()))
            .await
    }

    /// POST a JSON body
    pub async fn post(&self, path: &str, body: &Value) -> Result<Value> {
        self.request(Method::POST, path, None, RequestBody::Json(body.clone()))
            .await
    }

    /// POST a multipart form
    pub async fn post_multipart(&self, path: &str, form: Form) -> Result<Value> {
        self.request(Method::POST, path, None, RequestBody::Multipart(form))
            .await
    }

    /// PUT a JSON body
    pub async fn put(&self, path: &str, body: &Value) -> Result<Value> {
        self.request(Method::PUT, path, None, RequestBody::Json(body.clone()))
            .await
    }

    /// DELETE a path, returning the status code
    pub async fn delete(&self, path: &str) -> Result<u16> {
        let url = self.url(path);
        let response = self
            .http
            .send(Method::DELETE, &url, Some(&self.token), RequestBody::Empty)
            .await?;
        Ok(response.status().as_u16())
    }

    /// GET a path as a raw file
    pub async fn download(&self, path: &str) -> Result<Download> {
        self.http.download(&self.url(path), Some(&self.token)).await
    }

    /// Fetch the workspace the token is currently bound to
    pub async fn active_workspace(&self) -> Result<Value> {
        self.get("/api/general/active_workspace/", None).await
    }
}

/// Validate a base URL and strip its trailing slash
fn normalize_base_url(base_url: &str) -> Result<String> {
    let trimmed = base_url.trim();
    if trimmed.is_empty() {
        return Err(AlanaError::Configuration("a base URL is required".to_string()));
    }

    let parsed = Url::parse(trimmed)
        .map_err(|e| AlanaError::Configuration(format!("invalid base URL '{trimmed}': {e}")))?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(AlanaError::Configuration(format!(
            "unsupported URL scheme '{}'",
            parsed.scheme()
        )));
    }

    Ok(trimmed.trim_end_matches('/').to_string())
}
