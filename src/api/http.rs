//! HTTP utilities for Alana REST API calls

use super::status::{is_success, reason_phrase};
use crate::error::{AlanaError, Result};
use reqwest::header::{AUTHORIZATION, CONTENT_DISPOSITION, CONTENT_TYPE};
use reqwest::multipart::Form;
use reqwest::{Client, Method, Response};
use serde_json::Value;
use std::time::Duration;

/// Maximum length of response body to log (to avoid logging sensitive data)
const MAX_LOG_BODY_LENGTH: usize = 200;

/// Default request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Sanitize response body for logging
/// Truncates long responses and strips control characters
fn sanitize_for_log(body: &str) -> String {
    let char_count = body.chars().count();
    let truncated = if char_count > MAX_LOG_BODY_LENGTH {
        let head: String = body.chars().take(MAX_LOG_BODY_LENGTH).collect();
        format!("{}... [truncated, {} bytes total]", head, body.len())
    } else {
        body.to_string()
    };

    truncated.replace(|c: char| !c.is_ascii_graphic() && c != ' ', "")
}

/// Request payload
#[derive(Debug, Default)]
pub enum RequestBody {
    #[default]
    Empty,
    Json(Value),
    Multipart(Form),
}

/// Raw file returned by a download endpoint
#[derive(Debug, Clone)]
pub struct Download {
    pub content_disposition: Option<String>,
    pub bytes: Vec<u8>,
}

/// HTTP client wrapper for Alana API calls
#[derive(Clone, Debug)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    /// Create a new HTTP client
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("alana/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(|e| AlanaError::Configuration(format!("failed to create HTTP client: {e}")))?;

        Ok(Self { client })
    }

    /// Send a request and check its status
    ///
    /// Any non-2xx answer becomes [`AlanaError::HttpStatus`]; failures below
    /// HTTP become [`AlanaError::Transport`].
    pub async fn send(
        &self,
        method: Method,
        url: &str,
        token: Option<&str>,
        body: RequestBody,
    ) -> Result<Response> {
        tracing::debug!("{} {}", method, url);

        let mut request = self.client.request(method.clone(), url);

        if let Some(token) = token {
            request = request.header(AUTHORIZATION, format!("Token {token}"));
        }

        request = match body {
            RequestBody::Empty if method == Method::DELETE => {
                request.header(CONTENT_TYPE, "application/json")
            },
            RequestBody::Empty => request,
            RequestBody::Json(value) => request.json(&value),
            RequestBody::Multipart(form) => request.multipart(form),
        };

        let response = request.send().await.map_err(|source| AlanaError::Transport {
            url: url.to_string(),
            source,
        })?;

        let status = response.status().as_u16();
        if !is_success(status) {
            let body = response.text().await.unwrap_or_default();
            let body = sanitize_for_log(&body);
            // Security: Only log sanitized/truncated error body to avoid leaking sensitive data
            tracing::error!("API error: {} {} - {}", status, reason_phrase(status), body);
            return Err(AlanaError::HttpStatus {
                status,
                phrase: reason_phrase(status),
                body,
            });
        }

        Ok(response)
    }

    /// Send a request and parse the JSON answer
    pub async fn json(
        &self,
        method: Method,
        url: &str,
        token: Option<&str>,
        body: RequestBody,
    ) -> Result<Value> {
        let response = self.send(method, url, token, body).await?;
        read_json(url, response).await
    }

    /// Send a GET and keep the raw bytes
    pub async fn download(&self, url: &str, token: Option<&str>) -> Result<Download> {
        let response = self.send(Method::GET, url, token, RequestBody::Empty).await?;

        let content_disposition = response
            .headers()
            .get(CONTENT_DISPOSITION)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());

        let bytes = response.bytes().await.map_err(|source| AlanaError::Transport {
            url: url.to_string(),
            source,
        })?;

        Ok(Download {
            content_disposition,
            bytes: bytes.to_vec(),
        })
    }
}

/// Parse a response body as JSON, treating an empty body as `null`
async fn read_json(url: &str, response: Response) -> Result<Value> {
    let body = response.text().await.map_err(|source| AlanaError::Transport {
        url: url.to_string(),
        source,
    })?;

    // Handle empty response
    if body.trim().is_empty() {
        return Ok(Value::Null);
    }

    serde_json::from_str(&body).map_err(|e| AlanaError::malformed(url, e.to_string()))
}

/// Append JSON parameters to a URL as a query string
///
/// Arrays expand to repeated keys, booleans render as `True`/`False` and
/// nulls are skipped, matching what the server's form parser expects.
pub fn add_query_params(url: &str, params: &Value) -> String {
    let Value::Object(map) = params else {
        return url.to_string();
    };

    let mut query_parts: Vec<String> = Vec::new();

    for (key, value) in map {
        let key = urlencoding::encode(key);
        match value {
            Value::Array(arr) => {
                for item in arr {
                    if let Some(s) = query_scalar(item) {
                        query_parts.push(format!("{}={}", key, urlencoding::encode(&s)));
                    }
                }
            },
            other => {
                if let Some(s) = query_scalar(other) {
                    query_parts.push(format!("{}={}", key, urlencoding::encode(&s)));
                }
            },
        }
    }

    if query_parts.is_empty() {
        url.to_string()
    } else if url.contains('?') {
        format!("{}&{}", url, query_parts.join("&"))
    } else {
        format!("{}?{}", url, query_parts.join("&"))
    }
}

/// Text form of a scalar for query strings and multipart fields
///
/// Booleans render as `True`/`False` and `null` yields nothing.
pub fn query_scalar(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::Bool(true) => Some("True".to_string()),
        Value::Bool(false) => Some("False".to_string()),
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        other => Some(other.to_string()),
    }
}

/// Pull the file name out of a `Content-Disposition` header value
pub fn filename_from_disposition(header: &str) -> Option<String> {
    let raw = header.rsplit("filename=").next()?;
    if raw.len() == header.len() {
        return None;
    }
    let name = raw
        .split(';')
        .next()
        .unwrap_or(raw)
        .trim()
        .trim_matches('"');

    // Security: keep only the final path segment so a header cannot escape the target directory
    let name = name.rsplit(&['/', '\\'][..]).next().unwrap_or(name);
    if name.is_empty() || name == "." || name == ".." {
        None
    } else {
        Some(name.to_string())
    }
}

/// Format an Alana API error for display
pub fn format_api_error(error: &AlanaError) -> String {
    match error {
        AlanaError::HttpStatus { status: 401, .. } => {
            "Authentication failed. Check your Alana token.".to_string()
        },
        AlanaError::HttpStatus { status: 403, .. } => {
            "Permission denied for this workspace.".to_string()
        },
        AlanaError::HttpStatus { status: 404, .. } => "Resource not found.".to_string(),
        AlanaError::HttpStatus { status: 409, .. } => {
            "Resource conflict. The record may already exist or be in use.".to_string()
        },
        AlanaError::HttpStatus { status, phrase, .. } if *status >= 500 => {
            format!("Alana server error ({status} {phrase}). Please try again.")
        },
        AlanaError::HttpStatus { status, phrase, .. } => {
            format!("Request rejected: {status} {phrase}")
        },
        AlanaError::Transport { .. } => {
            "Could not reach the Alana server. Check the URL and your network connection."
                .to_string()
        },
        other => {
            let error_str = other.to_string();
            let sanitized = error_str
                .chars()
                .filter(|c| c.is_ascii_graphic() || *c == ' ')
                .take(120)
                .collect::<String>();

            if sanitized.len() < error_str.len() {
                format!("{}...", sanitized)
            } else {
                sanitized
            }
        },
    }
}
