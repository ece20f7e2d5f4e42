//! Domain facades
//!
//! Thin named calls over the generic CRUD layer, one per Alana app. Each
//! facade borrows an [`AlanaClient`](crate::api::client::AlanaClient) and
//! is obtained from it (`client.datasource()`, `client.dca()`, ...).
//!
//! # Module Structure
//!
//! - [`datasource`] - Wells, fields, formations, production, data import
//! - [`dca`] - Decline-curve fits, forecasts and multi-well batches
//! - [`economics`] - Economic models, scenarios, capex/opex, price decks
//! - [`fdp`] - Field development plans and downtime
//! - [`welltype`] - Well-type models and the well-type calculation
//! - [`forecast`] - Forecast masters and monthly volumes
//! - [`aiml`] - AI/ML model artifacts and LAS files
//! - [`workspace`] - Workspaces

pub mod aiml;
pub mod datasource;
pub mod dca;
pub mod economics;
pub mod fdp;
pub mod forecast;
pub mod welltype;
pub mod workspace;
