//! tickmask-sched — cooperative tick-mask task scheduler
//!
//! Multiplexes periodic and idle tasks onto one execution context, driven
//! by repeated calls from the host superloop:
//! - 32-slot tick cycle: a single set bit rotating through a `u32`
//! - Per-task tick masks (every Nth tick, or hand-placed slots)
//! - Abstract, wraparound-safe time source instead of a hardware timer
//! - Per-task execution time statistics (decaying average + maximum)
//!
//! ```ignore
//! let clock = SoftClock::new(u32::MAX);
//! let mut sched = Scheduler::new(clock.clone(), SchedulerConfig::for_u32_counter(1000))?;
//! let _blink = sched.add_task("blink", TickMask::EVERY_4, || toggle_led())?;
//! loop {
//!     sched.run();
//! }
//! ```

#![no_std]

extern crate alloc;
#[cfg(any(test, feature = "std"))]
extern crate std;

pub mod config;
pub mod error;
pub mod info;
mod registry;
pub mod scheduler;
pub mod task;
pub mod time;
pub mod timermath;

pub use config::SchedulerConfig;
pub use error::SchedError;
pub use info::{TaskInfo, TaskInfos};
pub use scheduler::{Scheduler, Step};
pub use task::{Task, TaskName, TaskStats, TickMask};
pub use time::{SoftClock, TimeSource};
pub use timermath::{TimerMath, Wraparound};
