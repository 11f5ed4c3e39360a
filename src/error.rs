//! Error types for host operations, reconciliation and store commits.
//!
//! Recoverable conditions (reading an absent state key, a props update aimed at
//! a node that has no element) are logged and skipped where they occur. Everything
//! listed here is fatal for the current operation and is propagated to the caller.

use thiserror::Error;

use crate::host::HostRef;

/// Errors raised by a [`Host`](crate::host::Host) implementation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HostError {
    /// The reference does not name a live host node.
    #[error("unknown host node {0:?}")]
    UnknownNode(HostRef),

    /// The operation needs an element but the reference names a text node.
    #[error("host node {0:?} is not an element")]
    NotAnElement(HostRef),

    /// `child` is not attached to `parent`.
    #[error("host node {child:?} is not a child of {parent:?}")]
    NotAChild { parent: HostRef, child: HostRef },
}

/// Errors raised while mounting or patching a node tree.
#[derive(Debug, Error)]
pub enum RenderError {
    /// A host operation failed.
    #[error(transparent)]
    Host(#[from] HostError),

    /// A node that must already be mounted has no bound host reference.
    #[error("{0} node has no bound host reference")]
    Unmounted(&'static str),
}

/// Errors raised by [`Store::commit`](crate::store::Store::commit).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// No transition is registered under this name.
    #[error("unknown mutation `{0}`")]
    UnknownMutation(String),
}
