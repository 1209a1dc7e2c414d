//! ontomap Lookup - Remote mapping services
//!
//! HTTP clients for the two services a run depends on:
//! - OLS term search, one call per label and ontology, no retry
//! - OxO cross-reference mappings, one call per concept ID, retried
//!   on connection failures with exponential backoff
//!
//! Author: hephaex@gmail.com

pub mod ols;
pub mod oxo;
pub mod retry;

pub use ols::OlsClient;
pub use oxo::{CrossRefResponse, MappingRecord, OxoClient};
pub use retry::RetryPolicy;

/// Service name used in errors and logs for term search
pub const OLS_SERVICE: &str = "OLS";

/// Service name used in errors and logs for cross-reference lookups
pub const OXO_SERVICE: &str = "OxO";
