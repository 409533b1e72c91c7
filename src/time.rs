//! Time sources — hardware-abstract counters for the scheduler
//!
//! The scheduler never touches a timer peripheral. It reads an up-counting
//! value through [`TimeSource`]. On real hardware this wraps SysTick,
//! a free-running TIMx or MTIME; for testing, [`SoftClock`] is a software
//! counter.
//!
//! A count-down peripheral should be inverted before it is returned
//! (`max - value`) so the counter appears to increase.

use alloc::rc::Rc;
use core::cell::Cell;

/// Free-running counter starting at 0 and wrapping at a declared maximum
pub trait TimeSource {
    /// Current counter value
    fn now(&mut self) -> u32;
}

impl<F> TimeSource for F
where
    F: FnMut() -> u32,
{
    #[inline]
    fn now(&mut self) -> u32 {
        self()
    }
}

/// Software counter wrapping at `max_value`
///
/// Clones share the same counter, so a test can keep a handle to advance
/// time after handing another one to the scheduler.
#[derive(Debug, Clone)]
pub struct SoftClock {
    ticks: Rc<Cell<u32>>,
    max_value: u32,
    /// Overflow count
    overflows: Rc<Cell<u32>>,
}

impl SoftClock {
    /// Create a counter at 0 running `0..=max_value`
    pub fn new(max_value: u32) -> Self {
        Self {
            ticks: Rc::new(Cell::new(0)),
            max_value,
            overflows: Rc::new(Cell::new(0)),
        }
    }

    /// Advance the counter, wrapping past `max_value`
    pub fn advance(&self, counts: u32) {
        let modulus = self.max_value as u64 + 1;
        let sum = self.ticks.get() as u64 + counts as u64;
        if sum >= modulus {
            let wraps = (sum / modulus) as u32;
            self.overflows.set(self.overflows.get().wrapping_add(wraps));
        }
        self.ticks.set((sum % modulus) as u32);
    }

    /// Jump to an absolute value (reduced into range)
    pub fn set(&self, value: u32) {
        let modulus = self.max_value as u64 + 1;
        self.ticks.set((value as u64 % modulus) as u32);
    }

    /// Current counter value
    pub fn get(&self) -> u32 {
        self.ticks.get()
    }

    pub fn max_value(&self) -> u32 {
        self.max_value
    }

    /// Number of times the counter rolled over
    pub fn overflows(&self) -> u32 {
        self.overflows.get()
    }
}

impl TimeSource for SoftClock {
    fn now(&mut self) -> u32 {
        self.ticks.get()
    }
}
