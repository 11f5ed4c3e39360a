//! Prelude module for convenient imports.
//!
//! ```
//! use petal::prelude::*;
//! ```
//!
//! # What's included
//!
//! - [`Node`], [`Props`], [`Component`], [`ComponentProps`] and [`create_node`]
//!   for describing UI, plus the [`children!`](crate::children) macro
//! - [`Store`] and [`Mutations`] for application state
//! - [`Runtime`] and [`RuntimeConfig`] to run an application
//! - [`Host`], [`HostRef`] and [`MemoryHost`] for the host tree

pub use crate::children;
pub use crate::config::RuntimeConfig;
pub use crate::host::memory::MemoryHost;
pub use crate::host::{Event, Host, HostRef};
pub use crate::node::{Child, Component, ComponentProps, IntoChild, Node, Props, create_node};
pub use crate::runtime::Runtime;
pub use crate::store::{Mutations, Store};
