//! Collapses driver failures into `TdvqError`.
//!
//! Connect-time failures keep only the first diagnostic since they usually
//! share one root cause. Query-time failures keep every diagnostic the engine
//! reported, joined with `"; "`.

use crate::driver::DriverFailure;
use crate::error::TdvqError;

const UNKNOWN: &str = "unknown driver error";

/// Normalize a failure raised while opening a session.
pub fn connection_error(failure: DriverFailure) -> TdvqError {
    let message = match failure {
        DriverFailure::Single(message) => message,
        DriverFailure::Multi(messages) => messages
            .into_iter()
            .next()
            .unwrap_or_else(|| UNKNOWN.to_string()),
    };
    TdvqError::Connection { message }
}

/// Normalize a failure raised while executing or fetching a query.
pub fn query_error(failure: DriverFailure) -> TdvqError {
    let message = match failure {
        DriverFailure::Single(message) => message,
        DriverFailure::Multi(messages) if messages.is_empty() => UNKNOWN.to_string(),
        DriverFailure::Multi(messages) => messages.join("; "),
    };
    TdvqError::Driver { message }
}
