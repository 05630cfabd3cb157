//! Error types for kalender-rs.
//!
//! Every failure in the workspace is one of a handful of recoverable kinds.
//! None of them is fatal to the process: date errors are surfaced to the
//! caller, scheduling errors skip a single alarm, and guard errors disable
//! single-instance enforcement while the application keeps running.

use thiserror::Error;

/// The top-level error type used throughout kalender-rs.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    /// Malformed or out-of-range date construction or parsing.
    #[error("invalid date: {0}")]
    InvalidDate(String),

    /// An event could not be armed; the remaining alarms are unaffected.
    #[error("cannot arm alarm for event '{event}': {reason}")]
    SchedulingFailure {
        /// Name of the event that was skipped.
        event: String,
        /// Why no trigger instant could be computed.
        reason: String,
    },

    /// The lock or wake marker could not be created or read.
    #[error("single-instance guard degraded: {0}")]
    GuardDegraded(String),

    /// A configuration value could not be interpreted.
    #[error("invalid value for {key}: {value:?}")]
    Config {
        /// The configuration key (environment variable name).
        key: String,
        /// The raw value that was rejected.
        value: String,
    },
}

impl Error {
    /// Wrap this error as the reason an event could not be scheduled.
    pub fn into_scheduling(self, event: impl Into<String>) -> Error {
        match self {
            Error::SchedulingFailure { .. } => self,
            other => Error::SchedulingFailure {
                event: event.into(),
                reason: other.to_string(),
            },
        }
    }
}

/// Shorthand `Result` type used throughout kalender-rs.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Return `Err(Error::InvalidDate(...))` if `$cond` is false.
///
/// # Example
/// ```
/// use kal_core::{ensure_date, errors::Error};
/// fn month(m: u8) -> kal_core::errors::Result<u8> {
///     ensure_date!((1..=12).contains(&m), "month {m} out of range [1, 12]");
///     Ok(m)
/// }
/// assert!(month(12).is_ok());
/// assert_eq!(
///     month(13),
///     Err(Error::InvalidDate("month 13 out of range [1, 12]".into()))
/// );
/// ```
#[macro_export]
macro_rules! ensure_date {
    ($cond:expr, $($msg:tt)*) => {
        if !$cond {
            return Err($crate::errors::Error::InvalidDate(
                format!($($msg)*)
            ));
        }
    };
}
