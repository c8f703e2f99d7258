//! Membership sync maintenance tools
//!
//! Read-only reporting and small text patchers for the membership backend.
//!
//! # Modules
//!
//! - `config`: Configuration management.
//! - `db`: Database pool and the `RowSource` seam.
//! - `deploy`: Deployment instructions for serverless functions.
//! - `errors`: Error handling types.
//! - `logging`: Tracing subscriber setup.
//! - `models`: Typed records decoded from delimited rows.
//! - `patch`: `created_at` rewriting and CORS injection.
//! - `queries`: The fixed report queries.
//! - `report`: Report rendering.
//! - `sync_status`: Level-2 sync classification.

pub mod config;
pub mod db;
pub mod deploy;
pub mod errors;
pub mod logging;
pub mod models;
pub mod patch;
pub mod queries;
pub mod report;
pub mod sync_status;
