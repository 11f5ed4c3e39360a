use std::rc::Rc;

use color_eyre::eyre::Result;
use futures::stream::StreamExt;
use tokio::time::{MissedTickBehavior, interval};
use tokio_stream::wrappers::IntervalStream;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::config::RuntimeConfig;
use crate::error::{HostError, RenderError};
use crate::frame::FrameQueue;
use crate::host::memory::MemoryHost;
use crate::host::{Host, HostRef};
use crate::node::Component;
use crate::scheduler::{RenderTrigger, Scheduler};
use crate::store::Store;

/// Binds a store, a scheduler and a host into a running application.
///
/// The runtime claims the store's commit observer slot, so every commit arms a
/// frame. Frames are delivered either by calling [`tick`](Self::tick) directly
/// or by [`run`](Self::run), which pumps them at the configured frame rate.
pub struct Runtime<S, P, H: Host> {
    store: Store<S, P>,
    scheduler: Scheduler<Store<S, P>>,
    frames: FrameQueue,
    host: H,
    config: RuntimeConfig,
}

impl<S, P, H: Host> Runtime<S, P, H> {
    pub fn new(
        host: H,
        container: HostRef,
        store: Store<S, P>,
        root: Component<Store<S, P>>,
        config: RuntimeConfig,
    ) -> Self {
        let frames = FrameQueue::new();
        let scheduler = Scheduler::new(root, container, Rc::new(frames.clone()));
        scheduler.attach(&store);
        if config.initial_render {
            scheduler.queue_render();
        }

        Self {
            store,
            scheduler,
            frames,
            host,
            config,
        }
    }

    #[must_use]
    pub fn store(&self) -> &Store<S, P> {
        &self.store
    }

    #[must_use]
    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    #[must_use]
    pub fn scheduler(&self) -> &Scheduler<Store<S, P>> {
        &self.scheduler
    }

    #[must_use]
    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// A handle that queues renders or stops updates from outside the runtime.
    #[must_use]
    pub fn trigger(&self) -> RenderTrigger {
        self.scheduler.trigger()
    }

    /// Run every frame that is due. Returns `true` if a render happened.
    ///
    /// # Errors
    ///
    /// Propagates the [`RenderError`] of a failed frame.
    pub fn tick(&mut self) -> Result<bool, RenderError> {
        let mut rendered = false;
        for handle in self.frames.take_due() {
            rendered |= self
                .scheduler
                .run_frame(handle, &mut self.host, &self.store)?;
        }
        Ok(rendered)
    }

    /// Pump frames until `shutdown` is cancelled.
    ///
    /// On shutdown the pending frame, if any, is cancelled and the runtime
    /// stops rendering.
    ///
    /// # Errors
    ///
    /// Returns the first render error; the loop stops at that point.
    pub async fn run(&mut self, shutdown: CancellationToken) -> Result<()> {
        let mut ticks = interval(self.config.frame_interval());
        ticks.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut ticks = IntervalStream::new(ticks);
        info!(frame_rate = self.config.frame_rate, "runtime started");

        loop {
            tokio::select! {
                () = shutdown.cancelled() => {
                    self.scheduler.stop_update();
                    break;
                }
                Some(_) = ticks.next() => {
                    self.tick()?;
                }
            }
        }

        debug!(frames = self.scheduler.frames_rendered(), "runtime stopped");
        Ok(())
    }
}

impl<S, P> Runtime<S, P, MemoryHost> {
    /// Deliver `event` to the listeners of `target` in the in-memory host.
    ///
    /// # Errors
    ///
    /// Returns a [`HostError`] if `target` is not a live element.
    pub fn dispatch(&self, target: HostRef, event: &str) -> Result<usize, HostError> {
        self.host.dispatch(target, event)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::children;
    use crate::node::{ComponentProps, Node, Props};
    use crate::scheduler::SchedulerState;
    use crate::store::Mutations;

    type Ctx = Store<Vec<String>, String>;

    fn todo_list() -> Component<Ctx> {
        Component::new("TodoList", |_: &ComponentProps<Ctx>, store: &Ctx| {
            let items = store
                .getter()
                .iter()
                .map(|item| Some(Node::tag("li", Props::new(), children![item.as_str()])))
                .collect();
            Node::tag("ul", Props::new(), items)
        })
    }

    fn runtime(config: RuntimeConfig) -> Runtime<Vec<String>, String, MemoryHost> {
        let mut host = MemoryHost::new();
        let root = host.create_root("main");
        let store = Store::new(
            Vec::new(),
            Mutations::new().with("add", |items: &Vec<String>, item: String| {
                let mut next = items.clone();
                next.push(item);
                next
            }),
        );
        Runtime::new(host, root, store, todo_list(), config)
    }

    fn html(runtime: &Runtime<Vec<String>, String, MemoryHost>) -> String {
        runtime.host().inner_html(runtime.scheduler().container())
    }

    #[test]
    fn test_initial_render_on_first_tick() {
        let mut runtime = runtime(RuntimeConfig::default());
        assert_eq!(runtime.scheduler().state(), SchedulerState::Pending);

        assert!(runtime.tick().unwrap());
        assert_eq!(html(&runtime), "<ul></ul>");
        assert!(!runtime.tick().unwrap());
    }

    #[test]
    fn test_initial_render_disabled() {
        let mut runtime = runtime(RuntimeConfig::default().with_initial_render(false));
        assert_eq!(runtime.scheduler().state(), SchedulerState::Idle);
        assert!(!runtime.tick().unwrap());
        assert_eq!(html(&runtime), "");
    }

    #[test]
    fn test_commits_render_on_next_tick() {
        let mut runtime = runtime(RuntimeConfig::default());
        runtime.tick().unwrap();

        runtime.store().commit("add", "milk".to_string()).unwrap();
        runtime.store().commit("add", "eggs".to_string()).unwrap();
        assert_eq!(html(&runtime), "<ul></ul>");

        assert!(runtime.tick().unwrap());
        assert_eq!(html(&runtime), "<ul><li>milk</li><li>eggs</li></ul>");
        assert_eq!(runtime.scheduler().frames_rendered(), 2);
    }

    #[tokio::test]
    async fn test_run_stops_on_cancel() {
        let mut runtime = runtime(RuntimeConfig::new(100));
        let store = runtime.store().clone();
        let shutdown = CancellationToken::new();
        let stopper = shutdown.clone();

        let driver = async move {
            tokio::time::sleep(Duration::from_millis(30)).await;
            store.commit("add", "bread".to_string()).unwrap();
            tokio::time::sleep(Duration::from_millis(30)).await;
            stopper.cancel();
        };

        let (result, ()) = tokio::join!(runtime.run(shutdown), driver);
        result.unwrap();

        assert_eq!(html(&runtime), "<ul><li>bread</li></ul>");
        assert_eq!(runtime.scheduler().state(), SchedulerState::Idle);
    }
}
