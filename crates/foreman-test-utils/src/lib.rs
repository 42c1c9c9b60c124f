//! Shared test utilities for the foreman-reconcile workspace.
//!
//! A dev-dependency only, never published.
//!
//! # Modules
//!
//! - [`fake`]: [`FakeForeman`], an in-memory [`foreman_api::ForemanApi`]
//!   that records every call
//! - [`server`]: [`ForemanServer`], a Foreman API v2 look-alike served over
//!   HTTP for client and end-to-end tests

pub mod fake;
pub mod server;

pub use fake::{Call, FakeForeman};
pub use server::ForemanServer;
