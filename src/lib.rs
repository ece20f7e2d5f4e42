//! Client library for the Alana reservoir-engineering API
//!
//! Wraps the Alana REST service: token authentication, generic CRUD over
//! every `/api/{app}/{table}/` resource, name <-> id lookup caches with
//! foreign key denormalization, and thin domain facades for datasource,
//! decline-curve analysis, economics, field development plans, well types,
//! forecasts and AI/ML artifacts. Fitting and evaluation run on the server.
//!
//! # Module Structure
//!
//! - [`api`] - HTTP transport, session and the [`AlanaClient`] context
//! - [`resource`] - Resource catalog, lookups, CRUD and tabular shaping
//! - [`apps`] - Domain facades
//! - [`error`] - Error taxonomy
//!
//! # Example
//!
//! ```ignore
//! use alana::AlanaClient;
//!
//! async fn example() -> alana::Result<()> {
//!     let client = AlanaClient::connect("my-token", "http://127.0.0.1:8000").await?;
//!     let created = client
//!         .resource("wellmaster")?
//!         .create_master(&serde_json::json!({"well_name": "W1", "field_fk": 3}))
//!         .await?;
//!     assert_eq!(client.resolve_id("wellmaster", "W1").await?, created["id"]);
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod apps;
pub mod error;
pub mod resource;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use api::client::AlanaClient;
pub use api::session::Session;
pub use error::{AlanaError, Result};
