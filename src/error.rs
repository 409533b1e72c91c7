//! Scheduler error types

use core::fmt;

/// Result type for scheduler construction and task registration
pub type Result<T> = core::result::Result<T, SchedError>;

/// Allocation-time failures
///
/// The driving step itself cannot fail; every error surfaces when a
/// scheduler or task is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedError {
    /// Time source maximum below 4
    MaxTimeTooSmall { max_time: u32 },
    /// Tick period outside `1..max_time / 2`
    InvalidTickPeriod { tick_period: u32, max_time: u32 },
    /// Heap exhausted while copying a task name
    OutOfMemory,
}

impl fmt::Display for SchedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchedError::MaxTimeTooSmall { max_time } => {
                write!(f, "max time {} is below the minimum of 4", max_time)
            }
            SchedError::InvalidTickPeriod {
                tick_period,
                max_time,
            } => write!(
                f,
                "tick period {} must be in 1..{} for max time {}",
                tick_period,
                max_time >> 1,
                max_time
            ),
            SchedError::OutOfMemory => write!(f, "out of memory"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for SchedError {}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    #[test]
    fn test_display() {
        let e = SchedError::InvalidTickPeriod {
            tick_period: 200,
            max_time: 255,
        };
        assert_eq!(
            e.to_string(),
            "tick period 200 must be in 1..127 for max time 255"
        );
        assert_eq!(SchedError::OutOfMemory.to_string(), "out of memory");
    }
}
