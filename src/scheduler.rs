//! Tick-mask scheduler
//!
//! Cooperative, non-preemptive. The host superloop calls [`Scheduler::run`]
//! repeatedly; each call either crosses a tick boundary and runs the tasks
//! whose mask matches the current tick, or runs the idle tasks.
//!
//! The current tick is a single bit rotating left through a 32-bit word,
//! giving a 32-slot cycle. A mask with every Nth bit set runs every Nth tick;
//! a mask with one bit set pins a task to an exact slot.

use alloc::boxed::Box;
use alloc::rc::Rc;
use core::cell::RefCell;
use log::{debug, trace, warn};

use crate::config::SchedulerConfig;
use crate::error::Result;
use crate::info::{TaskInfo, TaskInfos};
use crate::registry::{self, Registry, SharedRegistry};
use crate::task::{Task, TaskName, TaskNode, TickMask};
use crate::time::TimeSource;
use crate::timermath::{TimerMath, Wraparound};

/// Outcome of one driving call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// A tick boundary was crossed; `slot` is the bit index (0..=31) that ran
    Tick { slot: u32 },
    /// No boundary; idle tasks ran
    Idle,
}

/// Scheduler context
///
/// Owns the run list and the time source. Dropping it detaches every task
/// still registered; the caller's [`Task`] handles remain valid.
pub struct Scheduler<T: TimeSource, W: Wraparound = TimerMath> {
    /// Active tick bit, 0 until the first run or after `reset`
    current_tick: u32,
    /// Time at which the last tick ran
    last_tick_time: u32,
    tick_period: u32,
    math: W,
    registry: SharedRegistry,
    time: T,
}

impl<T: TimeSource> Scheduler<T, TimerMath> {
    /// Create a scheduler over a counter running `0..=config.max_time`
    pub fn new(time: T, config: SchedulerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(
            time,
            TimerMath::new(config.max_time),
            config.tick_period,
        ))
    }
}

impl<T: TimeSource, W: Wraparound> Scheduler<T, W> {
    /// Create a scheduler with caller-supplied wraparound arithmetic
    pub fn with_arithmetic(time: T, math: W, tick_period: u32) -> Result<Self> {
        SchedulerConfig::new(math.max_value(), tick_period).validate()?;
        Ok(Self::build(time, math, tick_period))
    }

    fn build(time: T, math: W, tick_period: u32) -> Self {
        debug!(
            "sched: context created, max time {} tick period {}",
            math.max_value(),
            tick_period
        );
        Self {
            current_tick: 0,
            last_tick_time: 0,
            tick_period,
            math,
            registry: Rc::new(RefCell::new(Registry::default())),
            time,
        }
    }

    /// Register a task at the end of the run list
    ///
    /// `name` is copied; an empty name is allowed. On failure nothing is
    /// linked.
    pub fn add_task<F>(&self, name: &str, tick_mask: TickMask, body: F) -> Result<Task>
    where
        F: FnMut() + 'static,
    {
        let name = TaskName::new(name)?;
        let node = Rc::new(TaskNode::new(name, tick_mask, Box::new(body)));
        registry::link(&self.registry, &node);
        Ok(Task::from_node(node))
    }

    /// One driving call from the host loop
    pub fn run(&mut self) -> Step {
        let now = self.time.now();

        let execute_tick = if self.current_tick == 0 {
            self.current_tick = 1;
            self.last_tick_time = now;
            true
        } else {
            let delta = self.math.diff(now, self.last_tick_time);
            if delta < 0 {
                warn!(
                    "sched: time moved backward ({} -> {}), resyncing",
                    self.last_tick_time, now
                );
                self.last_tick_time = now;
                true
            } else if delta as u32 >= self.tick_period {
                // Advance by exactly one period so drift does not accumulate
                self.last_tick_time = self.math.offset(self.last_tick_time, self.tick_period);
                true
            } else {
                false
            }
        };

        if execute_tick {
            let tick = self.current_tick;
            trace!("sched: tick slot {} at {}", tick.trailing_zeros(), now);
            self.dispatch(|mask| mask.matches(tick));
            self.current_tick = tick.rotate_left(1);
            Step::Tick {
                slot: tick.trailing_zeros(),
            }
        } else {
            self.dispatch(TickMask::is_idle);
            Step::Idle
        }
    }

    /// Drive the scheduler forever
    pub fn run_forever(&mut self) -> ! {
        loop {
            self.run();
        }
    }

    /// Restart tick timing on the next run, e.g. after a low-power sleep
    ///
    /// Registered tasks and their statistics are untouched.
    pub fn reset(&mut self) {
        debug!("sched: reset");
        self.current_tick = 0;
    }

    /// Zero the timing statistics of every registered task
    pub fn reset_stats(&self) {
        let mut cursor = self.registry.borrow().head();
        while let Some(node) = cursor {
            node.reset_stats();
            cursor = node.successor();
        }
    }

    /// Info for the first registered task, `None` if there are none
    pub fn first_task_info(&self) -> Option<TaskInfo> {
        self.registry.borrow().head().map(TaskInfo::capture)
    }

    /// Lazy walk over every registered task in run order
    pub fn task_infos(&self) -> TaskInfos {
        TaskInfos::new(self.registry.borrow().head())
    }

    /// Number of registered tasks
    pub fn task_count(&self) -> usize {
        self.registry.borrow().len()
    }

    /// Tick bit that the next tick will run, 0 before the first run
    pub fn current_tick(&self) -> u32 {
        self.current_tick
    }

    pub fn tick_period(&self) -> u32 {
        self.tick_period
    }

    pub fn time_source_mut(&mut self) -> &mut T {
        &mut self.time
    }

    // Run every selected task in registration order, timing each one
    fn dispatch(&mut self, select: impl Fn(TickMask) -> bool) {
        let mut cursor = self.registry.borrow().head();
        while let Some(task) = cursor {
            if select(task.tick_mask) {
                let start = self.time.now();
                task.execute();
                let stop = self.time.now();
                task.record(self.math.diff(stop, start));
            }
            cursor = task.successor();
        }
    }
}
