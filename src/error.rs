use thiserror::Error;

pub type AttendanceResult<T> = Result<T, AttendanceError>;

/// Outcomes an attendance action can fail with.
///
/// Every variant except [`System`](AttendanceError::System) is an expected,
/// user-facing rejection. Duplicate attempts are rejected deterministically
/// rather than silently repeated, so callers may retry any action manually.
#[derive(Debug, Error)]
pub enum AttendanceError {
    /// Missing or malformed input, e.g. absent coordinates on check-in.
    #[error("{0}")]
    Validation(&'static str),

    /// The supplied location is outside the configured office radius.
    #[error("You are outside the office geofence")]
    Geofence,

    /// The action was already performed today (second check-in, second
    /// check-out, break started while one is open).
    #[error("{0}")]
    DuplicateAction(&'static str),

    /// Required prior state is absent, e.g. a break without a check-in,
    /// or any action after the day's check-out.
    #[error("{0}")]
    PrecursorMissing(&'static str),

    /// Break-end with no break left open.
    #[error("No active break")]
    NoActiveBreak,

    /// Unexpected persistence failure. Logged at error level; never retried.
    #[error("storage failure: {0}")]
    System(#[from] anyhow::Error),
}
