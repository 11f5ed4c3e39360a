// Integration tests for shutdown and render coalescing.

#![allow(clippy::unwrap_used)]

use std::cell::Cell;
use std::rc::Rc;

use petal::prelude::*;
use petal::scheduler::SchedulerState;
use tokio::time::{Duration, Instant, timeout};
use tokio_util::sync::CancellationToken;

type Ctx = Store<u32, ()>;

fn store() -> Ctx {
    Store::new(0, Mutations::new().with("bump", |n: &u32, ()| n + 1))
}

// Helper: a root component that counts its own renders
fn counting_root(renders: Rc<Cell<u32>>) -> Component<Ctx> {
    Component::new("Counting", move |_: &ComponentProps<Ctx>, store: &Ctx| {
        renders.set(renders.get() + 1);
        Node::tag("span", Props::new(), children![*store.getter()])
    })
}

fn runtime(renders: Rc<Cell<u32>>, config: RuntimeConfig) -> Runtime<u32, (), MemoryHost> {
    let mut host = MemoryHost::new();
    let root = host.create_root("div");
    Runtime::new(host, root, store(), counting_root(renders), config)
}

#[test]
fn test_many_commits_one_frame() {
    let renders = Rc::new(Cell::new(0));
    let mut runtime = runtime(Rc::clone(&renders), RuntimeConfig::default());
    runtime.tick().unwrap();
    assert_eq!(renders.get(), 1);

    for _ in 0..50 {
        runtime.store().commit("bump", ()).unwrap();
    }
    assert!(runtime.tick().unwrap());

    assert_eq!(renders.get(), 2);
    assert_eq!(*runtime.store().getter(), 50);
}

#[test]
fn test_stop_update_drops_pending_frame() {
    let renders = Rc::new(Cell::new(0));
    let mut runtime = runtime(Rc::clone(&renders), RuntimeConfig::default());
    runtime.tick().unwrap();

    runtime.store().commit("bump", ()).unwrap();
    runtime.trigger().stop_update();

    assert_eq!(runtime.scheduler().state(), SchedulerState::Idle);
    assert!(!runtime.tick().unwrap());
    assert_eq!(renders.get(), 1);

    // Not self re-arming: only a new request renders again.
    assert!(runtime.trigger().queue_render());
    assert!(runtime.tick().unwrap());
    assert_eq!(renders.get(), 2);
}

#[test]
fn test_foreign_observer_detaches_scheduler() {
    let renders = Rc::new(Cell::new(0));
    let mut runtime = runtime(Rc::clone(&renders), RuntimeConfig::default());
    runtime.tick().unwrap();

    let seen = Rc::new(Cell::new(0));
    let counter = Rc::clone(&seen);
    assert!(
        runtime
            .store()
            .register_commit_observer(move |n: &u32| counter.set(*n))
    );

    runtime.store().commit("bump", ()).unwrap();

    assert_eq!(seen.get(), 1);
    assert!(!runtime.tick().unwrap());
    assert_eq!(renders.get(), 1);
}

#[test]
fn test_long_running_host_stays_bounded() {
    let renders = Rc::new(Cell::new(0));
    let mut runtime = runtime(Rc::clone(&renders), RuntimeConfig::default());
    runtime.tick().unwrap();

    for _ in 0..10_000 {
        runtime.store().commit("bump", ()).unwrap();
        assert!(runtime.tick().unwrap());
    }

    let root = runtime.scheduler().container();
    assert_eq!(runtime.host().inner_html(root), "<span>10000</span>");
    assert!(runtime.host().ops().is_empty());
    // container, span and its text node
    assert_eq!(runtime.host().node_count(), 3);
}

#[tokio::test]
async fn test_shutdown_responsiveness_low_framerate() {
    // Shutdown must not wait for the next frame boundary (4 FPS = 250ms per frame)
    let renders = Rc::new(Cell::new(0));
    let mut runtime = runtime(Rc::clone(&renders), RuntimeConfig::new(4));
    let shutdown = CancellationToken::new();
    let stopper = shutdown.clone();

    let start = Instant::now();
    let stop = async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        stopper.cancel();
    };
    let result = timeout(Duration::from_millis(200), async {
        tokio::join!(runtime.run(shutdown), stop).0
    })
    .await;
    let elapsed = start.elapsed();

    assert!(result.is_ok(), "Runtime should stop within 200ms");
    assert!(result.unwrap().is_ok());
    assert!(
        elapsed < Duration::from_millis(150),
        "Should stop quickly even with low framerate"
    );
    // The first interval tick fires immediately and mounts the tree.
    assert_eq!(renders.get(), 1);
}
