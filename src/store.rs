//! Application state with named, pure transitions.
//!
//! A [`Store`] owns one state value and a fixed table of mutations. A mutation
//! receives the current state through a shared reference and returns the next
//! state, so it cannot modify the committed value in place. [`Store::commit`]
//! swaps in the result and then notifies the commit observer.
//!
//! # Observer slot
//!
//! The store holds **one** observer. Registering a new one replaces the previous
//! registration (last write wins). The render scheduler claims this slot when it
//! is attached to a store; anything else that registers afterwards detaches the
//! scheduler.
//!
//! # Example
//!
//! ```
//! use petal::store::{Mutations, Store};
//! use serde::Serialize;
//!
//! #[derive(Debug, Serialize)]
//! struct Counter {
//!     count: i64,
//! }
//!
//! let store = Store::new(
//!     Counter { count: 0 },
//!     Mutations::new()
//!         .with("increment", |s: &Counter, _: i64| Counter { count: s.count + 1 })
//!         .with("add", |s: &Counter, n: i64| Counter { count: s.count + n }),
//! );
//!
//! store.commit("increment", 0).unwrap();
//! store.commit("add", 5).unwrap();
//!
//! assert_eq!(store.getter().count, 6);
//! assert_eq!(store.getter().get("count"), Some(serde_json::json!(6)));
//! ```

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::ops::Deref;
use std::rc::Rc;

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::StoreError;

/// A pure transition from the current state and a payload to the next state.
pub type Mutation<S, P> = Box<dyn Fn(&S, P) -> S>;

/// Called after every commit with the newly committed state.
pub type CommitObserver<S> = Box<dyn FnMut(&S)>;

/// The fixed name → transition table of a store.
pub struct Mutations<S, P = ()> {
    table: HashMap<String, Mutation<S, P>>,
}

impl<S, P> Mutations<S, P> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            table: HashMap::new(),
        }
    }

    /// Builder-style registration. A later registration under the same name
    /// replaces the earlier one.
    #[must_use]
    pub fn with(
        mut self,
        name: impl Into<String>,
        mutation: impl Fn(&S, P) -> S + 'static,
    ) -> Self {
        self.table.insert(name.into(), Box::new(mutation));
        self
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.table.contains_key(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.table.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Registered names, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.table.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    fn get(&self, name: &str) -> Option<&Mutation<S, P>> {
        self.table.get(name)
    }
}

impl<S, P> Default for Mutations<S, P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S, P> fmt::Debug for Mutations<S, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mutations")
            .field("names", &self.names())
            .finish()
    }
}

/// A read-only snapshot of the committed state.
///
/// The snapshot stays valid across later commits; it simply keeps showing the
/// state it was taken from.
pub struct Getter<S> {
    state: Rc<S>,
}

impl<S> Deref for Getter<S> {
    type Target = S;

    fn deref(&self) -> &S {
        &self.state
    }
}

impl<S: fmt::Debug> fmt::Debug for Getter<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Getter").field(&self.state).finish()
    }
}

impl<S: Serialize> Getter<S> {
    /// Read a top-level field of the state by name.
    ///
    /// A key the state does not have is logged as a warning and reads as
    /// `None`; it never fails.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<Value> {
        let value = match serde_json::to_value(&*self.state) {
            Ok(Value::Object(mut fields)) => fields.remove(key),
            Ok(_) => {
                warn!(key, "state is not a keyed structure");
                return None;
            }
            Err(error) => {
                warn!(key, %error, "state could not be serialized");
                return None;
            }
        };
        if value.is_none() {
            warn!(key, "{key} is not a key of the state");
        }
        value
    }
}

struct Inner<S, P> {
    state: RefCell<Rc<S>>,
    mutations: Mutations<S, P>,
    observer: RefCell<Option<CommitObserver<S>>>,
    /// States committed while the observer was running, delivered in order once
    /// it returns.
    deferred: RefCell<VecDeque<Rc<S>>>,
    notifying: Cell<bool>,
    commits: Cell<u64>,
}

/// A single-threaded state container.
///
/// `Store` is a cheap handle: clones share the same state, so event handlers can
/// each hold one and commit to it.
pub struct Store<S, P = ()> {
    inner: Rc<Inner<S, P>>,
}

impl<S, P> Clone for Store<S, P> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<S: fmt::Debug, P> fmt::Debug for Store<S, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("state", &self.inner.state.borrow())
            .field("mutations", &self.inner.mutations)
            .field("commits", &self.inner.commits.get())
            .finish_non_exhaustive()
    }
}

impl<S, P> Store<S, P> {
    pub fn new(state: S, mutations: Mutations<S, P>) -> Self {
        Self {
            inner: Rc::new(Inner {
                state: RefCell::new(Rc::new(state)),
                mutations,
                observer: RefCell::new(None),
                deferred: RefCell::new(VecDeque::new()),
                notifying: Cell::new(false),
                commits: Cell::new(0),
            }),
        }
    }

    /// Apply the mutation `name` to the current state.
    ///
    /// The new state is committed before the observer runs, so an observer that
    /// reads the store sees the post-mutation value. Commits run to completion
    /// before this returns.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::UnknownMutation`] if no mutation is registered
    /// under `name`; the state is left untouched.
    pub fn commit(&self, name: &str, payload: P) -> Result<(), StoreError> {
        let mutation = self
            .inner
            .mutations
            .get(name)
            .ok_or_else(|| StoreError::UnknownMutation(name.to_string()))?;

        let current = self.snapshot();
        let next = Rc::new(mutation(&*current, payload));
        *self.inner.state.borrow_mut() = Rc::clone(&next);
        self.inner.commits.set(self.inner.commits.get() + 1);
        debug!(mutation = name, commits = self.inner.commits.get(), "committed");

        self.notify(next);
        Ok(())
    }

    /// A snapshot of the committed state.
    #[must_use]
    pub fn getter(&self) -> Getter<S> {
        Getter {
            state: self.snapshot(),
        }
    }

    /// Register the commit observer, replacing any previous one.
    ///
    /// Returns `true` if an earlier observer was replaced. Only one observer is
    /// ever held. The observer is called once per commit; a commit made from
    /// inside the observer is delivered after the running call returns.
    pub fn register_commit_observer(&self, observer: impl FnMut(&S) + 'static) -> bool {
        let replaced = self
            .inner
            .observer
            .borrow_mut()
            .replace(Box::new(observer))
            .is_some();
        if replaced {
            debug!("commit observer replaced");
        }
        replaced
    }

    /// Drop the commit observer. Returns `true` if one was registered.
    pub fn clear_commit_observer(&self) -> bool {
        self.inner.observer.borrow_mut().take().is_some()
    }

    #[must_use]
    pub fn has_commit_observer(&self) -> bool {
        self.inner.observer.borrow().is_some()
    }

    /// Number of successful commits so far.
    #[must_use]
    pub fn commit_count(&self) -> u64 {
        self.inner.commits.get()
    }

    #[must_use]
    pub fn mutations(&self) -> &Mutations<S, P> {
        &self.inner.mutations
    }

    fn snapshot(&self) -> Rc<S> {
        Rc::clone(&self.inner.state.borrow())
    }

    /// Run the observer outside of the slot borrow, so it may read the store,
    /// commit, or register a replacement. Nested commits are queued and
    /// delivered to whichever observer holds the slot once the current call
    /// returns.
    fn notify(&self, state: Rc<S>) {
        if self.inner.notifying.get() {
            self.inner.deferred.borrow_mut().push_back(state);
            return;
        }

        self.inner.notifying.set(true);
        let mut next = Some(state);
        while let Some(state) = next {
            let Some(mut observer) = self.inner.observer.borrow_mut().take() else {
                self.inner.deferred.borrow_mut().clear();
                break;
            };
            observer(&state);
            {
                let mut slot = self.inner.observer.borrow_mut();
                if slot.is_none() {
                    *slot = Some(observer);
                }
            }
            next = self.inner.deferred.borrow_mut().pop_front();
        }
        self.inner.notifying.set(false);
    }
}

/// Build a store from an initial state and its mutation table.
pub fn create_store<S, P>(state: S, mutations: Mutations<S, P>) -> Store<S, P> {
    Store::new(state, mutations)
}
