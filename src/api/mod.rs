//! Alana API interaction module
//!
//! This module provides the transport layer for talking to an Alana
//! server: the HTTP wrapper, the authenticated session, token exchange and
//! the client context that ties the session to the lookup registry.
//!
//! # Module Structure
//!
//! - [`auth`] - Exchange credentials for an API token
//! - [`client`] - Main client context owning the session and lookup caches
//! - [`http`] - HTTP utilities for REST API calls
//! - [`session`] - Base URL + token holder and the request primitive
//! - [`status`] - Fixed HTTP status phrase table
//!
//! # Example
//!
//! ```ignore
//! use alana::api::client::AlanaClient;
//!
//! async fn example() -> alana::Result<()> {
//!     let client = AlanaClient::connect("my-token", "http://127.0.0.1:8000").await?;
//!     let well_id = client.resolve_id("wellmaster", "W1").await?;
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod client;
pub mod http;
pub mod session;
pub mod status;
