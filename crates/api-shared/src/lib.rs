//! # API Shared
//!
//! Shared request/response definitions for the triage APIs.
//!
//! Contains:
//! - Wire types for the REST API (`types` module)
//! - Shared services like `HealthService`
//!
//! Used by `api-rest` and the `triage-run` binary.

pub mod health;
pub mod types;

pub use health::HealthService;
pub use types::*;
