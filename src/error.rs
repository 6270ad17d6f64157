//! Error taxonomy for task-table operations
//!
//! Author: Moroya Sakamoto

use core::fmt;

/// Why a task-table operation was refused
///
/// A refused operation never leaves a partial write behind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// Period outside `[MIN_PERIOD, MAX_PERIOD]`
    TimeLimitExceeded,
    /// Every slot up to capacity is in use and the task is new
    CapacityExceeded,
    /// No registered task has this callback
    NotFound,
}

/// Result alias for task-table operations
pub type Result<T> = core::result::Result<T, Error>;

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::TimeLimitExceeded => f.write_str("task period outside the allowed range"),
            Error::CapacityExceeded => f.write_str("task table is full"),
            Error::NotFound => f.write_str("task is not registered"),
        }
    }
}

impl core::error::Error for Error {}
