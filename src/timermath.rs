//! Wraparound-safe timer arithmetic
//!
//! Free-running counters roll over from their maximum value back to 0.
//! Comparing two raw readings across that edge needs modular arithmetic,
//! which is what this module provides to the scheduler.

/// Modular time arithmetic injected into the scheduler
pub trait Wraparound {
    /// Largest value the time source can return
    fn max_value(&self) -> u32;

    /// Shortest signed distance from `b` to `a`, i.e. `a - b`
    fn diff(&self, a: u32, b: u32) -> i32;

    /// `a + delta`, wrapped into the counter range
    fn offset(&self, a: u32, delta: u32) -> u32;
}

/// Arithmetic for a counter running `0..=max_value`
///
/// The modulus is `max_value + 1`, kept in 64 bits so a full `u32`
/// counter is representable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerMath {
    max_value: u32,
    modulus: u64,
}

impl TimerMath {
    pub const fn new(max_value: u32) -> Self {
        Self {
            max_value,
            modulus: max_value as u64 + 1,
        }
    }

    /// Counter modulus (`max_value + 1`)
    pub const fn modulus(&self) -> u64 {
        self.modulus
    }

    #[inline]
    fn reduce(&self, v: u32) -> u64 {
        v as u64 % self.modulus
    }
}

impl Wraparound for TimerMath {
    fn max_value(&self) -> u32 {
        self.max_value
    }

    fn diff(&self, a: u32, b: u32) -> i32 {
        let m = self.modulus;
        let d = (self.reduce(a) + m - self.reduce(b)) % m;
        // Anything at or past the half-way point is a backward step
        if d >= m.div_ceil(2) {
            (d as i64 - m as i64) as i32
        } else {
            d as i32
        }
    }

    fn offset(&self, a: u32, delta: u32) -> u32 {
        ((self.reduce(a) + delta as u64) % self.modulus) as u32
    }
}
