//! Unified error handling for the trace cleaning engine.
//!
//! Construction errors (`Validation`, `Order`) are fatal: the trace
//! is never built. Operator errors are recoverable: the operator
//! returns without mutating state (`Precondition`) or the affected
//! batch is skipped and a warning is accumulated on the trace
//! (`OsrmBatch`). `InternalInvariant` indicates a bug.

use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, TraceError>;

/// Errors produced while building or cleaning a trace.
#[derive(Error, Debug)]
pub enum TraceError {
    /// A payload field or operator parameter violates its contract.
    #[error("validation failed for '{field}'{}: {reason}", .index.map(|i| format!(" at ping {i}")).unwrap_or_default())]
    Validation {
        field: &'static str,
        index: Option<usize>,
        reason: String,
    },

    /// Input timestamps are not non-decreasing.
    #[error("timestamp at ping {index} ({current} ms) is earlier than its predecessor ({previous} ms)")]
    Order {
        index: usize,
        previous: i64,
        current: i64,
    },

    /// An OSRM match/route call failed or returned malformed JSON.
    /// Non-fatal: the affected batch is left unchanged.
    #[error("OSRM request to {url} failed: {reason}")]
    OsrmBatch { url: String, reason: String },

    /// An operator was invoked before its precondition held.
    #[error("operator '{operator}' precondition not met: {reason}")]
    Precondition {
        operator: &'static str,
        reason: String,
    },

    /// An operator result would violate a trace invariant. Fatal:
    /// indicates a bug, the trace is left as before the call.
    #[error("internal invariant violated in '{operator}': {reason}")]
    InternalInvariant {
        operator: &'static str,
        reason: String,
    },
}

impl TraceError {
    /// Shorthand for a payload/parameter validation error.
    pub(crate) fn validation(
        field: &'static str,
        index: Option<usize>,
        reason: impl Into<String>,
    ) -> Self {
        TraceError::Validation {
            field,
            index,
            reason: reason.into(),
        }
    }
}
