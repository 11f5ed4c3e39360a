//! The render scheduler.
//!
//! The scheduler owns the render loop state: the root component, the container
//! it renders into, the tree retained from the last frame, and the pending frame
//! handle. It is a two-state machine:
//!
//! ```text
//!            queue_render                run_frame / stop_update
//!   Idle  ───────────────▶  Pending  ─────────────────────────────▶  Idle
//!                          (queue_render is a no-op here)
//! ```
//!
//! Any number of `queue_render` calls between two frames collapse into a single
//! frame. The pending slot lives in a shared [`RenderTrigger`], so the store's
//! commit observer can arm a frame without borrowing the scheduler.

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use tracing::{debug, error, trace};

use crate::error::RenderError;
use crate::frame::{FrameHandle, FrameSource};
use crate::host::{Host, HostRef};
use crate::node::{Child, Component, Node, Props};
use crate::patch::{PatchStats, Patcher};
use crate::store::Store;

/// Whether a frame is outstanding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Idle,
    Pending,
}

/// A clonable handle that arms and cancels the scheduler's frame.
#[derive(Clone)]
pub struct RenderTrigger {
    pending: Rc<Cell<Option<FrameHandle>>>,
    frames: Rc<dyn FrameSource>,
}

impl RenderTrigger {
    pub fn new(frames: Rc<dyn FrameSource>) -> Self {
        Self {
            pending: Rc::new(Cell::new(None)),
            frames,
        }
    }

    /// Request a frame unless one is already pending.
    ///
    /// Returns `true` if this call armed a new frame.
    pub fn queue_render(&self) -> bool {
        if let Some(handle) = self.pending.get() {
            trace!(frame = handle.id(), "render already pending, coalescing");
            return false;
        }
        let handle = self.frames.request_frame();
        self.pending.set(Some(handle));
        trace!(frame = handle.id(), "render queued");
        true
    }

    /// Cancel the pending frame, if any, and go idle.
    ///
    /// Nothing re-arms the scheduler afterwards except another
    /// [`queue_render`](Self::queue_render).
    pub fn stop_update(&self) {
        if let Some(handle) = self.pending.take() {
            self.frames.cancel_frame(handle);
            debug!(frame = handle.id(), "pending render cancelled");
        }
    }

    #[must_use]
    pub fn state(&self) -> SchedulerState {
        if self.pending.get().is_some() {
            SchedulerState::Pending
        } else {
            SchedulerState::Idle
        }
    }

    fn pending(&self) -> Option<FrameHandle> {
        self.pending.get()
    }

    fn finish(&self) {
        self.pending.set(None);
    }
}

impl fmt::Debug for RenderTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderTrigger")
            .field("pending", &self.pending.get())
            .finish_non_exhaustive()
    }
}

/// Drives re-renders of a root component into a host container.
pub struct Scheduler<C> {
    root: Component<C>,
    container: HostRef,
    retained: Child<C>,
    trigger: RenderTrigger,
    frames_rendered: u64,
    last_stats: PatchStats,
}

impl<C> Scheduler<C> {
    pub fn new(root: Component<C>, container: HostRef, frames: Rc<dyn FrameSource>) -> Self {
        Self {
            root,
            container,
            retained: None,
            trigger: RenderTrigger::new(frames),
            frames_rendered: 0,
            last_stats: PatchStats::default(),
        }
    }

    /// A handle sharing this scheduler's pending slot.
    #[must_use]
    pub fn trigger(&self) -> RenderTrigger {
        self.trigger.clone()
    }

    /// Claim `store`'s commit observer slot: every commit queues a render.
    ///
    /// This replaces whatever observer the store held before.
    pub fn attach<S, P>(&self, store: &Store<S, P>) {
        let trigger = self.trigger();
        if store.register_commit_observer(move |_| {
            trigger.queue_render();
        }) {
            debug!("scheduler took over an existing commit observer");
        }
    }

    pub fn queue_render(&self) -> bool {
        self.trigger.queue_render()
    }

    pub fn stop_update(&self) {
        self.trigger.stop_update();
    }

    #[must_use]
    pub fn state(&self) -> SchedulerState {
        self.trigger.state()
    }

    /// The tree rendered by the last completed frame.
    #[must_use]
    pub fn retained(&self) -> Option<&Node<C>> {
        self.retained.as_ref()
    }

    #[must_use]
    pub fn container(&self) -> HostRef {
        self.container
    }

    #[must_use]
    pub fn frames_rendered(&self) -> u64 {
        self.frames_rendered
    }

    /// Stats of the last completed frame.
    #[must_use]
    pub fn last_stats(&self) -> PatchStats {
        self.last_stats
    }

    /// Run the frame identified by `handle`.
    ///
    /// A handle that is not the pending one (cancelled by
    /// [`stop_update`](Self::stop_update), or stale) is ignored and `Ok(false)`
    /// is returned. Otherwise the root component is re-evaluated, reconciled
    /// against the retained tree, and the new tree is retained. The scheduler
    /// is idle again afterwards, whether or not the frame succeeded.
    ///
    /// # Errors
    ///
    /// Propagates the [`RenderError`] of the reconciliation pass. The retained
    /// tree is dropped in that case and its top host node is detached from the
    /// container, so the next frame mounts from scratch into an empty container.
    pub fn run_frame<H: Host>(
        &mut self,
        handle: FrameHandle,
        host: &mut H,
        ctx: &C,
    ) -> Result<bool, RenderError> {
        if self.trigger.pending() != Some(handle) {
            trace!(frame = handle.id(), "ignoring stale frame");
            return Ok(false);
        }

        let mut next = Some(Node::component(self.root.clone(), Props::new(), Vec::new()));
        let previous = self.retained.take();
        let stale = previous.as_ref().and_then(top_host);
        let mut patcher = Patcher::new(host, ctx);
        let result = patcher.reconcile(self.container, previous, &mut next);
        let stats = patcher.stats();
        self.trigger.finish();

        if let Err(err) = result {
            error!(frame = handle.id(), %err, "render failed");
            let fresh = next.as_ref().and_then(top_host);
            self.discard(host, stale, fresh);
            return Err(err);
        }

        self.retained = next;
        self.frames_rendered += 1;
        self.last_stats = stats;
        debug!(
            frame = handle.id(),
            root = self.root.name(),
            mounted = stats.mounted,
            replaced = stats.replaced,
            removed = stats.removed,
            props_updated = stats.props_updated,
            reused = stats.reused,
            "frame rendered"
        );
        Ok(true)
    }
}

impl<C> Scheduler<C> {
    /// Detach whatever a failed frame left in the container.
    fn discard<H: Host>(&self, host: &mut H, stale: Option<HostRef>, fresh: Option<HostRef>) {
        let fresh = fresh.filter(|node| Some(*node) != stale);
        for node in [stale, fresh].into_iter().flatten() {
            match host.remove_child(self.container, node) {
                Ok(()) => debug!(node = node.id(), "detached tree of failed frame"),
                Err(err) => trace!(node = node.id(), %err, "failed frame node not attached"),
            }
        }
    }
}

/// The outermost host node bound under `node`, looking through components.
fn top_host<C>(node: &Node<C>) -> Option<HostRef> {
    if let Some(el) = node.host() {
        return Some(el);
    }
    match node {
        Node::Component(component) => component.children.first()?.as_ref().and_then(top_host),
        _ => None,
    }
}

impl<C> fmt::Debug for Scheduler<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scheduler")
            .field("root", &self.root)
            .field("container", &self.container)
            .field("state", &self.state())
            .field("frames_rendered", &self.frames_rendered)
            .finish_non_exhaustive()
    }
}
