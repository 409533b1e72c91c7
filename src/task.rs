//! Task definition — tick masks, names, timing statistics
//!
//! A task is a caller-supplied body plus the 32-bit tick mask that decides
//! which of the 32 cyclic tick slots it runs in. A mask of 0 makes it an
//! idle task. The [`Task`] handle is owned by the caller; the scheduler only
//! holds it in its run list until the handle is dropped or detached.

use alloc::boxed::Box;
use alloc::rc::{Rc, Weak};
use alloc::string::String;
use core::cell::{Cell, RefCell};
use core::fmt;
use core::ops::BitOr;

use crate::error::{Result, SchedError};
use crate::registry::{self, Registry};

/// Names shorter than this are stored inline, longer ones on the heap
pub const SHORT_NAME_LENGTH: usize = 16;

/// Task body, called with its captured state on every matching step
pub type TaskFn = Box<dyn FnMut()>;

/// Tick slots a task runs in
///
/// The scheduler's current tick is a single set bit rotating left through
/// a 32-bit word. A task runs when `mask & tick != 0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TickMask(pub u32);

impl TickMask {
    /// Run on every step that is not a tick
    pub const IDLE: TickMask = TickMask(0b00000000000000000000000000000000);
    /// Every tick
    pub const EVERY_1: TickMask = TickMask(0b11111111111111111111111111111111);
    /// Every 2nd tick
    pub const EVERY_2: TickMask = TickMask(0b10101010101010101010101010101010);
    /// Every 4th tick
    pub const EVERY_4: TickMask = TickMask(0b01000100010001000100010001000100);
    /// Every 8th tick
    pub const EVERY_8: TickMask = TickMask(0b00010000000100000001000000010000);
    /// Every 16th tick
    pub const EVERY_16: TickMask = TickMask(0b00000001000000000000000100000000);
    /// Once per 32-tick cycle
    pub const EVERY_32: TickMask = TickMask(0b00000000000000010000000000000000);

    /// Single hard-coded slot (0..=31)
    pub const fn slot(n: u32) -> Self {
        TickMask(1 << (n % 32))
    }

    pub const fn is_idle(self) -> bool {
        self.0 == 0
    }

    /// Does this mask select the given tick bit?
    pub const fn matches(self, tick: u32) -> bool {
        self.0 & tick != 0
    }

    /// Number of runs per 32-tick cycle
    pub const fn runs_per_cycle(self) -> u32 {
        self.0.count_ones()
    }
}

impl From<u32> for TickMask {
    fn from(bits: u32) -> Self {
        TickMask(bits)
    }
}

impl BitOr for TickMask {
    type Output = TickMask;

    fn bitor(self, rhs: TickMask) -> TickMask {
        TickMask(self.0 | rhs.0)
    }
}

/// Read-only task name
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskName {
    Short(heapless::String<SHORT_NAME_LENGTH>),
    Long(String),
}

impl TaskName {
    /// Copy `name`, inline if it fits, otherwise onto the heap
    pub fn new(name: &str) -> Result<Self> {
        if name.len() < SHORT_NAME_LENGTH {
            if let Ok(short) = heapless::String::try_from(name) {
                return Ok(TaskName::Short(short));
            }
        }

        let mut long = String::new();
        long.try_reserve_exact(name.len())
            .map_err(|_| SchedError::OutOfMemory)?;
        long.push_str(name);
        Ok(TaskName::Long(long))
    }

    pub fn as_str(&self) -> &str {
        match self {
            TaskName::Short(s) => s.as_str(),
            TaskName::Long(s) => s.as_str(),
        }
    }

    /// Stored without a separate heap allocation?
    pub fn is_inline(&self) -> bool {
        matches!(self, TaskName::Short(_))
    }
}

/// Execution time statistics, in time source counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TaskStats {
    /// Recency-weighted average: `avg = (avg + sample) / 2`
    pub average_time: u32,
    /// Longest observed execution
    pub max_time: u32,
}

impl TaskStats {
    /// Fold in one execution time; negative samples are dropped
    pub fn record(&mut self, exec_time: i32) {
        if exec_time < 0 {
            return;
        }
        let t = exec_time as u32;
        // Both operands are <= i32::MAX so the sum fits
        self.average_time = (self.average_time + t) >> 1;
        if t > self.max_time {
            self.max_time = t;
        }
    }

    pub fn reset(&mut self) {
        *self = TaskStats::default();
    }
}

/// Run list node shared between the caller's handle and the registry
pub(crate) struct TaskNode {
    pub(crate) tick_mask: TickMask,
    body: RefCell<TaskFn>,
    name: TaskName,
    stats: Cell<TaskStats>,

    // Owning registry, cleared on unlink or registry teardown
    pub(crate) owner: RefCell<Weak<RefCell<Registry>>>,
    pub(crate) next: RefCell<Option<Rc<TaskNode>>>,
}

impl TaskNode {
    pub(crate) fn new(name: TaskName, tick_mask: TickMask, body: TaskFn) -> Self {
        Self {
            tick_mask,
            body: RefCell::new(body),
            name,
            stats: Cell::new(TaskStats::default()),
            owner: RefCell::new(Weak::new()),
            next: RefCell::new(None),
        }
    }

    pub(crate) fn execute(&self) {
        let mut body = self.body.borrow_mut();
        (*body)();
    }

    pub(crate) fn record(&self, exec_time: i32) {
        let mut stats = self.stats.get();
        stats.record(exec_time);
        self.stats.set(stats);
    }

    pub(crate) fn reset_stats(&self) {
        self.stats.set(TaskStats::default());
    }

    pub(crate) fn stats(&self) -> TaskStats {
        self.stats.get()
    }

    pub(crate) fn name(&self) -> &str {
        self.name.as_str()
    }

    pub(crate) fn successor(&self) -> Option<Rc<TaskNode>> {
        self.next.borrow().clone()
    }

    pub(crate) fn is_attached(&self) -> bool {
        self.owner.borrow().strong_count() > 0
    }
}

/// Caller-owned task handle
///
/// Dropping the handle unregisters the task. It stays safe to drop after
/// the scheduler it was registered with is gone.
pub struct Task {
    node: Rc<TaskNode>,
}

impl Task {
    pub(crate) fn from_node(node: Rc<TaskNode>) -> Self {
        Self { node }
    }

    pub fn name(&self) -> &str {
        self.node.name()
    }

    pub fn tick_mask(&self) -> TickMask {
        self.node.tick_mask
    }

    pub fn stats(&self) -> TaskStats {
        self.node.stats()
    }

    /// Still in a scheduler's run list?
    pub fn is_attached(&self) -> bool {
        self.node.is_attached()
    }

    /// Remove from the run list without freeing the task
    pub fn detach(&self) {
        registry::unlink(&self.node);
    }

    /// Unregister and release the task
    pub fn free(self) {}
}

impl Drop for Task {
    fn drop(&mut self) {
        registry::unlink(&self.node);
    }
}

impl fmt::Debug for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task")
            .field("name", &self.name())
            .field("tick_mask", &self.tick_mask())
            .field("stats", &self.stats())
            .field("attached", &self.is_attached())
            .finish()
    }
}
