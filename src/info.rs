//! Task introspection — walk names and timing stats of registered tasks
//!
//! ```ignore
//! let mut info = sched.first_task_info();
//! while let Some(i) = info {
//!     log::info!("{}: avg {} max {}", i.name(), i.average_time, i.max_time);
//!     info = i.advance();
//! }
//! sched.reset_stats();
//! ```
//!
//! The walk follows the run list's successor links as they are when each
//! record is taken. It is a live view: registering or freeing tasks while a
//! walk is in progress may end it early or skip entries.

use alloc::rc::Rc;
use core::fmt;

use crate::task::TaskNode;

/// Snapshot of one task plus the continuation to the next
pub struct TaskInfo {
    task: Rc<TaskNode>,
    next: Option<Rc<TaskNode>>,
    /// Average execution time, in time source counts
    pub average_time: u32,
    /// Maximum execution time, in time source counts
    pub max_time: u32,
}

impl TaskInfo {
    pub(crate) fn capture(task: Rc<TaskNode>) -> Self {
        let stats = task.stats();
        let next = task.successor();
        Self {
            task,
            next,
            average_time: stats.average_time,
            max_time: stats.max_time,
        }
    }

    pub fn name(&self) -> &str {
        self.task.name()
    }

    /// Info for the following task, or `None` past the tail
    pub fn advance(self) -> Option<TaskInfo> {
        self.next.map(TaskInfo::capture)
    }
}

impl fmt::Debug for TaskInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskInfo")
            .field("name", &self.name())
            .field("average_time", &self.average_time)
            .field("max_time", &self.max_time)
            .finish()
    }
}

/// Forward-only iterator over task infos
pub struct TaskInfos {
    cursor: Option<TaskInfo>,
}

impl TaskInfos {
    pub(crate) fn new(head: Option<Rc<TaskNode>>) -> Self {
        Self {
            cursor: head.map(TaskInfo::capture),
        }
    }
}

impl Iterator for TaskInfos {
    type Item = TaskInfo;

    fn next(&mut self) -> Option<TaskInfo> {
        let current = self.cursor.take()?;
        self.cursor = current.next.clone().map(TaskInfo::capture);
        Some(current)
    }
}
