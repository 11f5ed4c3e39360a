//! # Petal - virtual node reconciler with a commit store
//!
//! Petal keeps a host tree (a DOM, or anything implementing [`Host`](host::Host))
//! in sync with a declarative description of the UI. Application state lives in
//! a [`Store`](store::Store); every commit arms one coalesced frame, and the
//! frame re-renders the root component and patches only what changed.
//!
//! ## Architecture
//!
//! ```text
//! event handler → Store::commit → observer → Scheduler::queue_render
//!     → frame → root component → diff(old, new) → patch host tree
//! ```
//!
//! 1. **Node model** ([`node`]): text, tag and component nodes. Empty slots
//!    are `None`.
//! 2. **Reconciler** ([`diff`]): classifies a node pair as a kind change, a text
//!    change, a tag change, a props change, or no change.
//! 3. **Patcher** ([`patch`]): mounts trees and applies classifications to the
//!    host, recursing positionally through children.
//! 4. **Store** ([`store`]): one state value, named pure transitions, a single
//!    commit observer.
//! 5. **Scheduler** ([`scheduler`]): Idle/Pending state machine that collapses
//!    any number of render requests into one frame.
//! 6. **Runtime** ([`runtime`]): wires the pieces together and pumps frames on
//!    a tokio interval.
//!
//! ## Example
//!
//! ```
//! use petal::prelude::*;
//!
//! type Ctx = Store<i64>;
//!
//! fn counter(_: &ComponentProps<Ctx>, store: &Ctx) -> Node<Ctx> {
//!     let handle = store.clone();
//!     Node::tag(
//!         "button",
//!         Props::new().on("onClick", move |_| {
//!             if let Err(err) = handle.commit("increment", ()) {
//!                 tracing::warn!(%err, "increment failed");
//!             }
//!         }),
//!         children![*store.getter()],
//!     )
//! }
//!
//! let mut host = MemoryHost::new();
//! let root = host.create_root("main");
//! let store = Store::new(0, Mutations::new().with("increment", |n: &i64, ()| n + 1));
//! let mut runtime = Runtime::new(
//!     host,
//!     root,
//!     store,
//!     Component::new("Counter", counter),
//!     RuntimeConfig::default(),
//! );
//!
//! runtime.tick().unwrap();
//! let button = runtime.host().children(root)[0];
//! runtime.dispatch(button, "click").unwrap();
//! runtime.tick().unwrap();
//!
//! assert_eq!(runtime.host().inner_html(root), "<button>1</button>");
//! ```

pub mod config;
pub mod diff;
pub mod error;
pub mod frame;
pub mod host;
pub mod node;
pub mod patch;
pub mod prelude;
pub mod runtime;
pub mod scheduler;
pub mod store;
