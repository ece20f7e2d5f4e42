//! Resource abstraction layer
//!
//! This module provides a data-driven approach to Alana resources. Resource
//! definitions (app segment, table segment, name field, foreign keys) are
//! loaded from JSON files at compile time, so a new resource type is a
//! catalog entry rather than new code.
//!
//! # Architecture
//!
//! - [`catalog`] - Loads resource definitions from embedded JSON
//! - [`lookup`] - Name <-> id views built from one list fetch
//! - [`registry`] - Lazily loaded, invalidatable lookup caches
//! - [`fk`] - Rewrites declared `_fk` fields to display names
//! - [`crud`] - Generic create/read/update/delete facade
//! - [`table`] - Tabular shaping of record lists
//!
//! # Resource Definitions
//!
//! Resources are defined in JSON files under `src/resources/`:
//! - `datasource.json` - Wells, fields, formations and their production tables
//! - `dca.json` - Decline-curve masters and cases
//! - `fdp.json` - Field development plans and downtime
//! - `economics.json` - Economic models, scenarios, capex, opex, price decks
//! - `models.json` - Well types, forecasts, AI/ML models, LAS files, workspaces
//!
//! # Example
//!
//! ```ignore
//! use alana::api::client::AlanaClient;
//!
//! async fn list_wells(client: &AlanaClient) -> alana::Result<serde_json::Value> {
//!     client.resource("wellmaster")?.list().await
//! }
//! ```

pub mod catalog;
pub mod crud;
pub mod fk;
pub mod lookup;
pub mod registry;
pub mod table;

pub use catalog::{get_all_resource_keys, get_resource, ForeignKeyDef, ResourceDef};
pub use crud::{Resource, Upload};
pub use lookup::LookupCache;
pub use registry::Registry;
pub use table::{extract_json_value, Table};
