//! In-memory host tree.
//!
//! [`MemoryHost`] keeps elements and text nodes in an arena keyed by [`HostRef`].
//! It backs the crate's tests and can drive a headless application. A host built
//! with [`MemoryHost::with_journal`] also records every write in an operation
//! journal; [`MemoryHost::new`] records nothing, so its memory stays proportional
//! to the live tree.
//!
//! # Example
//!
//! ```
//! use petal::host::{Host, memory::MemoryHost};
//!
//! let mut host = MemoryHost::new();
//! let root = host.create_root("main");
//! let p = host.create_element("p").unwrap();
//! let text = host.create_text_node("hello").unwrap();
//! host.append_child(p, text).unwrap();
//! host.append_child(root, p).unwrap();
//!
//! assert_eq!(host.to_html(root), "<main><p>hello</p></main>");
//! ```

use std::collections::{BTreeMap, HashMap};
use std::fmt::Write as _;

use crate::error::HostError;
use crate::host::{Event, EventHandler, Host, HostRef};

/// A single write recorded by [`MemoryHost`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostOp {
    CreateElement { node: HostRef, tag: String },
    CreateText { node: HostRef, body: String },
    SetAttribute {
        el: HostRef,
        name: String,
        value: String,
    },
    RemoveAttribute { el: HostRef, name: String },
    AddEventListener { el: HostRef, event: String },
    AppendChild { parent: HostRef, child: HostRef },
    ReplaceChild {
        parent: HostRef,
        new_child: HostRef,
        old_child: HostRef,
    },
    RemoveChild { parent: HostRef, child: HostRef },
}

#[derive(Debug)]
enum Content {
    Element {
        tag: String,
        attributes: BTreeMap<String, String>,
        listeners: Vec<(String, EventHandler)>,
    },
    Text(String),
}

#[derive(Debug)]
struct Slot {
    content: Content,
    parent: Option<HostRef>,
    children: Vec<HostRef>,
}

/// An arena-backed host tree with an optional operation journal.
#[derive(Debug, Default)]
pub struct MemoryHost {
    nodes: HashMap<HostRef, Slot>,
    next_id: u64,
    journal: bool,
    ops: Vec<HostOp>,
}

impl MemoryHost {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A host that records every write until [`take_ops`](Self::take_ops).
    #[must_use]
    pub fn with_journal() -> Self {
        Self {
            journal: true,
            ..Self::default()
        }
    }

    /// Create a container element to mount into. Not recorded in the journal.
    pub fn create_root(&mut self, tag: &str) -> HostRef {
        self.alloc(Content::Element {
            tag: tag.to_ascii_uppercase(),
            attributes: BTreeMap::new(),
            listeners: Vec::new(),
        })
    }

    /// Whether `node` is still alive in the arena.
    #[must_use]
    pub fn contains(&self, node: HostRef) -> bool {
        self.nodes.contains_key(&node)
    }

    /// Upper-cased tag name of an element.
    #[must_use]
    pub fn tag_name(&self, node: HostRef) -> Option<&str> {
        match &self.nodes.get(&node)?.content {
            Content::Element { tag, .. } => Some(tag),
            Content::Text(_) => None,
        }
    }

    /// Body of a text node.
    #[must_use]
    pub fn text(&self, node: HostRef) -> Option<&str> {
        match &self.nodes.get(&node)?.content {
            Content::Text(body) => Some(body),
            Content::Element { .. } => None,
        }
    }

    #[must_use]
    pub fn attribute(&self, el: HostRef, name: &str) -> Option<&str> {
        match &self.nodes.get(&el)?.content {
            Content::Element { attributes, .. } => attributes.get(name).map(String::as_str),
            Content::Text(_) => None,
        }
    }

    /// All attributes of an element, sorted by name.
    #[must_use]
    pub fn attributes(&self, el: HostRef) -> Vec<(&str, &str)> {
        match self.nodes.get(&el).map(|slot| &slot.content) {
            Some(Content::Element { attributes, .. }) => attributes
                .iter()
                .map(|(k, v)| (k.as_str(), v.as_str()))
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Number of listeners registered for `event` on `el`.
    #[must_use]
    pub fn listener_count(&self, el: HostRef, event: &str) -> usize {
        match self.nodes.get(&el).map(|slot| &slot.content) {
            Some(Content::Element { listeners, .. }) => {
                listeners.iter().filter(|(name, _)| name == event).count()
            }
            _ => 0,
        }
    }

    #[must_use]
    pub fn children(&self, node: HostRef) -> &[HostRef] {
        self.nodes
            .get(&node)
            .map(|slot| slot.children.as_slice())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn parent(&self, node: HostRef) -> Option<HostRef> {
        self.nodes.get(&node)?.parent
    }

    /// Number of live nodes in the arena, containers included.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Journal of writes since the last [`take_ops`](Self::take_ops). Always
    /// empty unless the host was built with [`with_journal`](Self::with_journal).
    #[must_use]
    pub fn ops(&self) -> &[HostOp] {
        &self.ops
    }

    pub fn take_ops(&mut self) -> Vec<HostOp> {
        std::mem::take(&mut self.ops)
    }

    /// Invoke every listener registered for `event` on `target`.
    ///
    /// Handlers are cloned out before being called, so a handler is free to
    /// commit to a store while the host is borrowed. Returns the number of
    /// handlers invoked.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::UnknownNode`] if `target` is not alive and
    /// [`HostError::NotAnElement`] if it is a text node.
    pub fn dispatch(&self, target: HostRef, event: &str) -> Result<usize, HostError> {
        let handlers: Vec<EventHandler> = match &self.slot(target)?.content {
            Content::Element { listeners, .. } => listeners
                .iter()
                .filter(|(name, _)| name == event)
                .map(|(_, handler)| handler.clone())
                .collect(),
            Content::Text(_) => return Err(HostError::NotAnElement(target)),
        };

        let event = Event::new(event, target);
        for handler in &handlers {
            handler.call(&event);
        }
        Ok(handlers.len())
    }

    /// Serialize the subtree under `node` as HTML.
    ///
    /// Tag names are lower-cased; attributes are emitted in name order.
    #[must_use]
    pub fn to_html(&self, node: HostRef) -> String {
        let mut out = String::new();
        self.write_html(node, &mut out);
        out
    }

    /// Serialize the children of `node` as HTML, without the node itself.
    #[must_use]
    pub fn inner_html(&self, node: HostRef) -> String {
        let mut out = String::new();
        for &child in self.children(node) {
            self.write_html(child, &mut out);
        }
        out
    }

    fn write_html(&self, node: HostRef, out: &mut String) {
        let Some(slot) = self.nodes.get(&node) else {
            return;
        };
        match &slot.content {
            Content::Text(body) => out.push_str(body),
            Content::Element {
                tag, attributes, ..
            } => {
                let tag = tag.to_ascii_lowercase();
                out.push('<');
                out.push_str(&tag);
                for (name, value) in attributes {
                    let _ = write!(out, " {name}=\"{value}\"");
                }
                out.push('>');
                for &child in &slot.children {
                    self.write_html(child, out);
                }
                let _ = write!(out, "</{tag}>");
            }
        }
    }

    fn record(&mut self, op: HostOp) {
        if self.journal {
            self.ops.push(op);
        }
    }

    fn alloc(&mut self, content: Content) -> HostRef {
        self.next_id += 1;
        let node = HostRef::new(self.next_id);
        self.nodes.insert(
            node,
            Slot {
                content,
                parent: None,
                children: Vec::new(),
            },
        );
        node
    }

    fn slot(&self, node: HostRef) -> Result<&Slot, HostError> {
        self.nodes.get(&node).ok_or(HostError::UnknownNode(node))
    }

    fn slot_mut(&mut self, node: HostRef) -> Result<&mut Slot, HostError> {
        self.nodes.get_mut(&node).ok_or(HostError::UnknownNode(node))
    }

    fn element_mut(
        &mut self,
        el: HostRef,
    ) -> Result<(&mut BTreeMap<String, String>, &mut Vec<(String, EventHandler)>), HostError> {
        match &mut self.slot_mut(el)?.content {
            Content::Element {
                attributes,
                listeners,
                ..
            } => Ok((attributes, listeners)),
            Content::Text(_) => Err(HostError::NotAnElement(el)),
        }
    }

    /// Unlink `child` from its current parent, if any.
    fn detach(&mut self, child: HostRef) -> Result<(), HostError> {
        if let Some(parent) = self.slot_mut(child)?.parent.take() {
            if let Some(slot) = self.nodes.get_mut(&parent) {
                slot.children.retain(|&c| c != child);
            }
        }
        Ok(())
    }

    /// Drop `node` and its whole subtree from the arena.
    fn destroy(&mut self, node: HostRef) {
        let mut stack = vec![node];
        while let Some(current) = stack.pop() {
            if let Some(slot) = self.nodes.remove(&current) {
                stack.extend(slot.children);
            }
        }
    }

    fn ensure_child(&self, parent: HostRef, child: HostRef) -> Result<usize, HostError> {
        self.slot(parent)?
            .children
            .iter()
            .position(|&c| c == child)
            .ok_or(HostError::NotAChild { parent, child })
    }
}

impl Host for MemoryHost {
    fn create_element(&mut self, tag: &str) -> Result<HostRef, HostError> {
        let node = self.alloc(Content::Element {
            tag: tag.to_ascii_uppercase(),
            attributes: BTreeMap::new(),
            listeners: Vec::new(),
        });
        self.record(HostOp::CreateElement {
            node,
            tag: tag.to_string(),
        });
        Ok(node)
    }

    fn create_text_node(&mut self, body: &str) -> Result<HostRef, HostError> {
        let node = self.alloc(Content::Text(body.to_string()));
        self.record(HostOp::CreateText {
            node,
            body: body.to_string(),
        });
        Ok(node)
    }

    fn set_attribute(&mut self, el: HostRef, name: &str, value: &str) -> Result<(), HostError> {
        let (attributes, _) = self.element_mut(el)?;
        attributes.insert(name.to_string(), value.to_string());
        self.record(HostOp::SetAttribute {
            el,
            name: name.to_string(),
            value: value.to_string(),
        });
        Ok(())
    }

    fn remove_attribute(&mut self, el: HostRef, name: &str) -> Result<(), HostError> {
        let (attributes, _) = self.element_mut(el)?;
        attributes.remove(name);
        self.record(HostOp::RemoveAttribute {
            el,
            name: name.to_string(),
        });
        Ok(())
    }

    fn add_event_listener(
        &mut self,
        el: HostRef,
        event: &str,
        handler: EventHandler,
    ) -> Result<(), HostError> {
        let (_, listeners) = self.element_mut(el)?;
        listeners.push((event.to_string(), handler));
        self.record(HostOp::AddEventListener {
            el,
            event: event.to_string(),
        });
        Ok(())
    }

    fn append_child(&mut self, parent: HostRef, child: HostRef) -> Result<(), HostError> {
        if let Content::Text(_) = self.slot(parent)?.content {
            return Err(HostError::NotAnElement(parent));
        }
        self.detach(child)?;
        self.slot_mut(parent)?.children.push(child);
        self.slot_mut(child)?.parent = Some(parent);
        self.record(HostOp::AppendChild { parent, child });
        Ok(())
    }

    fn replace_child(
        &mut self,
        parent: HostRef,
        new_child: HostRef,
        old_child: HostRef,
    ) -> Result<(), HostError> {
        self.slot(new_child)?;
        self.ensure_child(parent, old_child)?;
        self.detach(new_child)?;

        let index = self.ensure_child(parent, old_child)?;
        self.slot_mut(parent)?.children[index] = new_child;
        self.slot_mut(new_child)?.parent = Some(parent);
        self.destroy(old_child);

        self.record(HostOp::ReplaceChild {
            parent,
            new_child,
            old_child,
        });
        Ok(())
    }

    fn remove_child(&mut self, parent: HostRef, child: HostRef) -> Result<(), HostError> {
        let index = self.ensure_child(parent, child)?;
        self.slot_mut(parent)?.children.remove(index);
        self.destroy(child);
        self.record(HostOp::RemoveChild { parent, child });
        Ok(())
    }
}
