//! Foreman API v2 boundary for foreman-reconcile
//!
//! This crate owns everything that touches the remote Foreman server:
//!
//! - **Resource catalogue**: [`Resource`] names every collection the
//!   reconcilers read or write, with its URL path and JSON wrapper key
//! - **Records**: [`Record`] and [`RecordId`] model the JSON objects the
//!   server returns
//! - **Remote interface**: [`ForemanApi`] has one method per remote
//!   operation and is injected into the reconciler
//! - **HTTP client**: [`HttpForeman`] implements [`ForemanApi`] over the
//!   blocking `reqwest` client
//!
//! # Architecture
//!
//! ```text
//!          foreman-cli
//!               |
//!          foreman-core   (Reconciler, KindSpec registry)
//!               |
//!          foreman-api    (ForemanApi trait, HttpForeman)
//!               |
//!        Foreman REST API v2
//! ```

pub mod api;
pub mod connection;
pub mod error;
pub mod http;
pub mod record;
pub mod resource;

pub use api::{ForemanApi, Operation};
pub use connection::Connection;
pub use error::{Error, Result};
pub use http::HttpForeman;
pub use record::{Record, RecordId, record_matches};
pub use resource::Resource;
