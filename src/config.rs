//! Scheduler configuration

use crate::error::{Result, SchedError};

/// Time base of a scheduler
///
/// `max_time` is the largest value the time source returns before rolling
/// back to 0. `tick_period` is the number of counts per task tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerConfig {
    pub max_time: u32,
    pub tick_period: u32,
}

impl SchedulerConfig {
    pub const fn new(max_time: u32, tick_period: u32) -> Self {
        Self {
            max_time,
            tick_period,
        }
    }

    /// Config for a 16-bit free-running timer
    pub const fn for_u16_counter(tick_period: u32) -> Self {
        Self::new(u16::MAX as u32, tick_period)
    }

    /// Config for a 32-bit free-running timer
    pub const fn for_u32_counter(tick_period: u32) -> Self {
        Self::new(u32::MAX, tick_period)
    }

    /// Check `max_time >= 4` and `1 <= tick_period < max_time / 2`
    pub fn validate(&self) -> Result<()> {
        if self.max_time < 4 {
            return Err(SchedError::MaxTimeTooSmall {
                max_time: self.max_time,
            });
        }
        if self.tick_period < 1 || self.tick_period >= (self.max_time >> 1) {
            return Err(SchedError::InvalidTickPeriod {
                tick_period: self.tick_period,
                max_time: self.max_time,
            });
        }
        Ok(())
    }
}
