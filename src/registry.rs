//! Run list — registration-ordered chain of task nodes
//!
//! Nodes are shared between the registry and the caller's [`Task`] handle.
//! Each linked node carries a weak back-reference to the registry that owns
//! it, used only to unlink. A node with no live back-reference is not
//! reachable from any registry.
//!
//! [`Task`]: crate::task::Task

use alloc::rc::{Rc, Weak};
use core::cell::RefCell;
use log::debug;

use crate::task::TaskNode;

pub(crate) type SharedRegistry = Rc<RefCell<Registry>>;

#[derive(Default)]
pub(crate) struct Registry {
    head: Option<Rc<TaskNode>>,
    tail: Weak<TaskNode>,
    len: usize,
}

impl Registry {
    pub(crate) fn head(&self) -> Option<Rc<TaskNode>> {
        self.head.clone()
    }

    pub(crate) fn len(&self) -> usize {
        self.len
    }

    fn push_back(&mut self, node: Rc<TaskNode>) {
        match self.tail.upgrade() {
            Some(last) => *last.next.borrow_mut() = Some(Rc::clone(&node)),
            None => self.head = Some(Rc::clone(&node)),
        }
        self.tail = Rc::downgrade(&node);
        self.len += 1;
    }

    fn remove(&mut self, node: &Rc<TaskNode>) -> bool {
        let next = node.next.borrow_mut().take();

        let is_head = self
            .head
            .as_ref()
            .is_some_and(|head| Rc::ptr_eq(head, node));
        if is_head {
            self.head = next;
            if self.head.is_none() {
                self.tail = Weak::new();
            }
            self.len -= 1;
            return true;
        }

        let mut cursor = self.head.clone();
        while let Some(prev) = cursor {
            let hit = prev
                .next
                .borrow()
                .as_ref()
                .is_some_and(|n| Rc::ptr_eq(n, node));
            if hit {
                if next.is_none() {
                    self.tail = Rc::downgrade(&prev);
                }
                *prev.next.borrow_mut() = next;
                self.len -= 1;
                return true;
            }
            cursor = prev.successor();
        }
        false
    }
}

impl Drop for Registry {
    // Orphan every node so the caller's handles stay freeable
    fn drop(&mut self) {
        let mut cursor = self.head.take();
        while let Some(node) = cursor {
            *node.owner.borrow_mut() = Weak::new();
            cursor = node.next.borrow_mut().take();
        }
        self.tail = Weak::new();
        self.len = 0;
    }
}

/// Append `node` to the end of the run list
pub(crate) fn link(registry: &SharedRegistry, node: &Rc<TaskNode>) {
    *node.owner.borrow_mut() = Rc::downgrade(registry);
    *node.next.borrow_mut() = None;
    registry.borrow_mut().push_back(Rc::clone(node));
    debug!(
        "sched: registered task '{}' mask {:#010x}",
        node.name(),
        node.tick_mask.0
    );
}

/// Remove `node` from whichever run list holds it; no-op when detached
pub(crate) fn unlink(node: &Rc<TaskNode>) {
    let owner = core::mem::take(&mut *node.owner.borrow_mut());
    if let Some(registry) = owner.upgrade() {
        if registry.borrow_mut().remove(node) {
            debug!("sched: unlinked task '{}'", node.name());
        }
    }
    *node.next.borrow_mut() = None;
}
