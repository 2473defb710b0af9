//! Error types for podcost
//!
//! This module defines the error handling strategy for podcost. There are three
//! error types: `CostError` (main error enum), `CatalogError` (instance catalog
//! loading) and `ConfigError` (configuration-specific).
//!
//! ## Error Handling Philosophy
//!
//! Library code uses `crate::error::Result<T>` which returns `CostError`.
//! CLI code uses `anyhow::Result<T>` for top-level error handling. The conversion
//! happens at the CLI boundary using `anyhow::Error::from` to preserve error chains.
//!
//! ## When to Use Which Error
//!
//! - `CatalogError`: the pricing catalog source is missing or unreadable
//!   - Startup fault, the CLI exits with a dedicated code
//!   - Malformed-but-present sources do NOT produce this error; they degrade
//!     to an empty or partial catalog instead
//!
//! - `NoQualifyingInstance`: no catalog entry can host a pod of the requested
//!   shape for one tier
//!   - Fails the whole cluster-model calculation; never reported as zero cost
//!
//! - `Validation`: domain constraint failures on request inputs
//!   (negative counts, unknown output format, ...)
//!
//! - `PriceList`: a price-list document has no usable unit price
//!
//! - `Overflow`: a charge does not fit the decimal range (absurd rates or
//!   fleet sizes); reported instead of panicking

use std::path::PathBuf;

use rust_decimal::Decimal;
use thiserror::Error;

use crate::profile::Tier;

/// Main error type for podcost
#[derive(Error, Debug)]
pub enum CostError {
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error(
        "No qualifying instance for {tier} tier: pod ({pod_cpu} vCPU, {pod_mem} GiB) \
         exceeds every one of {catalog_size} catalog entries"
    )]
    NoQualifyingInstance {
        tier: Tier,
        pod_cpu: Decimal,
        pod_mem: Decimal,
        catalog_size: usize,
    },

    #[error("Validation error: {field} - {reason}")]
    Validation { field: String, reason: String },

    #[error("Price list error: {0}")]
    PriceList(String),

    #[error("Cost overflow: {component} exceeds the representable decimal range")]
    Overflow { component: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Errors that prevent the instance catalog from being loaded at all
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Catalog source not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Failed to open catalog source {}: {source}", path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Configuration-specific errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("Failed to parse config: {0}")]
    ParseError(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, CostError>;

impl CostError {
    /// Shorthand for a `Validation` error
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        CostError::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Shorthand for an `Overflow` error
    pub fn overflow(component: impl Into<String>) -> Self {
        CostError::Overflow {
            component: component.into(),
        }
    }

    /// True when the error means a tier could not be sized at all
    pub fn is_no_qualifying_instance(&self) -> bool {
        matches!(self, CostError::NoQualifyingInstance { .. })
    }
}
