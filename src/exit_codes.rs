//! Exit code standardization for podcost
//!
//! Provides consistent exit codes for different error types so scripts can
//! tell bad input apart from a missing pricing catalog.
//!
//! ## Exit Code Convention
//!
//! - `0` = Success
//! - `1` = User error (invalid input, no instance fits the requested pod,
//!   charges too large to represent)
//! - `2` = System error (I/O, serialization)
//! - `3` = Configuration error (config parse error, invalid config value)
//! - `103` = Pricing catalog missing or unreadable

use crate::error::CostError;

/// Standard exit codes for podcost
pub mod codes {
    /// User error (invalid input, validation failure)
    pub const USER_ERROR: i32 = 1;
    /// System error (I/O, serialization)
    pub const SYSTEM_ERROR: i32 = 2;
    /// Configuration error
    pub const CONFIG_ERROR: i32 = 3;
    /// Pricing catalog could not be loaded at startup
    pub const CATALOG_MISSING: i32 = 103;
}

/// Map a CostError to an appropriate exit code
pub fn exit_code_for_error(error: &CostError) -> i32 {
    use CostError::*;
    match error {
        Catalog(_) => codes::CATALOG_MISSING,
        Config(_) => codes::CONFIG_ERROR,

        Validation { .. } => codes::USER_ERROR,
        NoQualifyingInstance { .. } => codes::USER_ERROR,
        PriceList(_) => codes::USER_ERROR,
        Overflow { .. } => codes::USER_ERROR,

        Io(_) => codes::SYSTEM_ERROR,
        Json(_) => codes::SYSTEM_ERROR,
        Csv(_) => codes::SYSTEM_ERROR,
    }
}

/// Exit code for an error that crossed the CLI boundary
///
/// Errors that did not originate as `CostError` are treated as system errors.
pub fn exit_code_for_anyhow(error: &anyhow::Error) -> i32 {
    error
        .chain()
        .find_map(|cause| cause.downcast_ref::<CostError>())
        .map(exit_code_for_error)
        .unwrap_or(codes::SYSTEM_ERROR)
}
