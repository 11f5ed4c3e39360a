//! Frame requests.
//!
//! A [`FrameSource`] is the host's frame-callback primitive reduced to a pair of
//! calls: request a frame and get a handle back, or cancel a handle. The frame
//! "callback" is always the scheduler's
//! [`run_frame`](crate::scheduler::Scheduler::run_frame); whoever drives the
//! source hands it the due handles.
//!
//! [`FrameQueue`] is the in-process source used by the
//! [`Runtime`](crate::runtime::Runtime): requests are queued and
//! [`FrameQueue::take_due`] drains them at the next frame boundary.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use tracing::trace;

/// Identifies one frame request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FrameHandle(u64);

impl FrameHandle {
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    #[must_use]
    pub const fn id(self) -> u64 {
        self.0
    }
}

/// Request and cancel frame callbacks.
pub trait FrameSource {
    fn request_frame(&self) -> FrameHandle;

    /// Cancel a requested frame. Unknown or already delivered handles are
    /// ignored.
    fn cancel_frame(&self, handle: FrameHandle);
}

#[derive(Debug, Default)]
struct Queue {
    next_id: u64,
    requested: VecDeque<FrameHandle>,
}

/// A shared queue of frame requests.
///
/// Clones share the same queue, so one clone can be handed to a scheduler while
/// another is pumped by the runtime loop.
#[derive(Debug, Clone, Default)]
pub struct FrameQueue {
    inner: Rc<RefCell<Queue>>,
}

impl FrameQueue {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Drain every outstanding request, oldest first.
    #[must_use]
    pub fn take_due(&self) -> Vec<FrameHandle> {
        self.inner.borrow_mut().requested.drain(..).collect()
    }

    /// Number of outstanding requests.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.inner.borrow().requested.len()
    }
}

impl FrameSource for FrameQueue {
    fn request_frame(&self) -> FrameHandle {
        let mut queue = self.inner.borrow_mut();
        queue.next_id += 1;
        let handle = FrameHandle(queue.next_id);
        queue.requested.push_back(handle);
        trace!(frame = handle.0, "frame requested");
        handle
    }

    fn cancel_frame(&self, handle: FrameHandle) {
        let mut queue = self.inner.borrow_mut();
        let before = queue.requested.len();
        queue.requested.retain(|&h| h != handle);
        if queue.requested.len() != before {
            trace!(frame = handle.0, "frame cancelled");
        }
    }
}
