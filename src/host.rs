//! The host tree capability.
//!
//! The reconciler never touches a platform tree directly. Everything it needs is
//! expressed by the [`Host`] trait: node creation, attribute and listener writes,
//! and the three child-list mutations. Host nodes are addressed through the opaque
//! [`HostRef`] handle, which a host implementation maps onto its native nodes.
//!
//! [`memory::MemoryHost`] is an in-memory implementation used by the runtime tests
//! and by headless applications.

pub mod memory;

use std::fmt;
use std::rc::Rc;

use crate::error::HostError;

/// Opaque handle to a node living in a host tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HostRef(u64);

impl HostRef {
    /// Wrap a host-specific node id.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// The host-specific node id.
    #[must_use]
    pub const fn id(self) -> u64 {
        self.0
    }
}

/// An event delivered by the host to a listener.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    /// Lower-cased event name, e.g. `click`.
    pub name: String,
    /// The element the listener was registered on.
    pub target: HostRef,
}

impl Event {
    #[must_use]
    pub fn new(name: impl Into<String>, target: HostRef) -> Self {
        Self {
            name: name.into(),
            target,
        }
    }
}

/// A shared event callback.
///
/// Handlers are reference counted so a node tree can be cloned cheaply and the
/// same closure can be registered on a host element.
#[derive(Clone)]
pub struct EventHandler(Rc<dyn Fn(&Event)>);

impl EventHandler {
    pub fn new(f: impl Fn(&Event) + 'static) -> Self {
        Self(Rc::new(f))
    }

    pub fn call(&self, event: &Event) {
        (self.0)(event);
    }

    /// Whether both handlers point at the same closure.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for EventHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("EventHandler(..)")
    }
}

/// Parse a prop key as an event binding.
///
/// Keys of the form `on` followed by a capitalized word (`onClick`,
/// `onMouseDown`) bind the lower-cased suffix as the event name. Every other key
/// is an attribute.
///
/// ```
/// use petal::host::event_name;
///
/// assert_eq!(event_name("onClick").as_deref(), Some("click"));
/// assert_eq!(event_name("onMouseDown").as_deref(), Some("mousedown"));
/// assert_eq!(event_name("online"), None);
/// assert_eq!(event_name("className"), None);
/// ```
#[must_use]
pub fn event_name(key: &str) -> Option<String> {
    let rest = key.strip_prefix("on")?;
    let first = rest.chars().next()?;
    if !first.is_ascii_uppercase() {
        return None;
    }
    if !rest.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return None;
    }
    Some(rest.to_ascii_lowercase())
}

/// Mutable host tree operations required by the mounter and patcher.
///
/// Every method is a single synchronous write. Failures are fatal for the
/// reconciliation pass that issued them.
pub trait Host {
    /// Create a detached element.
    fn create_element(&mut self, tag: &str) -> Result<HostRef, HostError>;

    /// Create a detached text node.
    fn create_text_node(&mut self, body: &str) -> Result<HostRef, HostError>;

    fn set_attribute(&mut self, el: HostRef, name: &str, value: &str) -> Result<(), HostError>;

    fn remove_attribute(&mut self, el: HostRef, name: &str) -> Result<(), HostError>;

    /// Register `handler` for `event` on `el`. Listeners are never removed.
    fn add_event_listener(
        &mut self,
        el: HostRef,
        event: &str,
        handler: EventHandler,
    ) -> Result<(), HostError>;

    /// Append `child` as the last child of `parent`.
    fn append_child(&mut self, parent: HostRef, child: HostRef) -> Result<(), HostError>;

    /// Put `new_child` at the position `old_child` occupies in `parent`.
    fn replace_child(
        &mut self,
        parent: HostRef,
        new_child: HostRef,
        old_child: HostRef,
    ) -> Result<(), HostError>;

    fn remove_child(&mut self, parent: HostRef, child: HostRef) -> Result<(), HostError>;
}
