//! Error types for the Alana client
//!
//! Every fallible operation in the library returns [`AlanaError`]. The
//! variants follow the failure points of a request/response round trip:
//! building the session, reaching the server, the server's verdict, and
//! interpreting what came back.

use std::path::PathBuf;
use thiserror::Error;

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, AlanaError>;

/// Main error type for Alana operations
#[derive(Error, Debug)]
pub enum AlanaError {
    /// Missing or invalid token / base URL
    #[error("configuration error: {0}")]
    Configuration(String),

    /// DNS, connect, timeout or body-read failure
    #[error("transport error for {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The server answered with a non-2xx status
    #[error("HTTP {status} {phrase}")]
    HttpStatus {
        status: u16,
        phrase: &'static str,
        /// Sanitized, truncated excerpt of the response body
        body: String,
    },

    /// A name-to-id lookup missed the current cache
    #[error("{resource}: no record named '{name}'")]
    NameNotFound { resource: String, name: String },

    /// An id-to-name lookup missed the current cache
    #[error("{resource}: no record with id {id}")]
    IdNotFound { resource: String, id: i64 },

    /// Response body could not be decoded into the expected shape
    #[error("malformed response from {context}: {reason}")]
    MalformedResponse { context: String, reason: String },

    /// Resource key is not in the catalog
    #[error("unknown resource: {0}")]
    UnknownResource(String),

    /// Caller input rejected before any request was made
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Parent row was created but its children were not; the parent is left behind
    #[error("{resource} {id} was created but its cases failed: {source}")]
    OrphanedMaster {
        resource: String,
        id: i64,
        #[source]
        source: Box<AlanaError>,
    },

    /// Local file access for uploads and downloads
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl AlanaError {
    /// HTTP status code carried by this error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::HttpStatus { status, .. } => Some(*status),
            Self::OrphanedMaster { source, .. } => source.status(),
            _ => None,
        }
    }

    /// True for lookup misses (`NameNotFound` / `IdNotFound`)
    pub fn is_lookup_miss(&self) -> bool {
        matches!(self, Self::NameNotFound { .. } | Self::IdNotFound { .. })
    }

    pub(crate) fn malformed(context: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedResponse {
            context: context.into(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_status_display_includes_phrase() {
        let err = AlanaError::HttpStatus {
            status: 404,
            phrase: "Not Found",
            body: String::new(),
        };
        assert_eq!(err.to_string(), "HTTP 404 Not Found");
        assert_eq!(err.status(), Some(404));
    }

    #[test]
    fn test_orphaned_master_exposes_inner_status() {
        let err = AlanaError::OrphanedMaster {
            resource: "dcamaster".to_string(),
            id: 7,
            source: Box::new(AlanaError::HttpStatus {
                status: 400,
                phrase: "Bad Request",
                body: String::new(),
            }),
        };
        assert_eq!(err.status(), Some(400));
        assert!(err.to_string().contains("dcamaster 7"));
    }

    #[test]
    fn test_lookup_miss_classification() {
        let miss = AlanaError::NameNotFound {
            resource: "wellmaster".to_string(),
            name: "W9".to_string(),
        };
        assert!(miss.is_lookup_miss());
        assert!(!AlanaError::Configuration("x".into()).is_lookup_miss());
    }
}
