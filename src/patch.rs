//! Mounting and patching node trees against a host.
//!
//! [`Patcher::mount`] materializes a node tree for the first time.
//! [`Patcher::reconcile`] takes the previously mounted tree and a freshly built
//! one, classifies each position with [`classify`](crate::diff::classify) and
//! writes only what changed:
//!
//! - a replace kind (`VNodeType`, `Text`, `Tag`) builds the next subtree from
//!   scratch and swaps it in with a single `replace_child`,
//! - `Props` on a tag rewrites attributes in place,
//! - no change carries the old host reference onto the new node.
//!
//! In the last two cases the children are reconciled pairwise by index.
//! Components are re-rendered on every pass and their output is reconciled in
//! the component's parent container, since a component owns no host node of its
//! own.

use tracing::{debug, trace, warn};

use crate::diff::{DiffKind, Reconcile, classify, diff_props};
use crate::error::RenderError;
use crate::host::{Host, HostRef, event_name};
use crate::node::{Child, ComponentNode, Node, PropValue, Props, TagNode};

/// Counters for one mount or reconciliation pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PatchStats {
    /// Subtrees mounted and appended to a parent. A subtree counts once, however
    /// many nodes it holds.
    pub mounted: usize,
    /// Subtrees swapped in with `replace_child`.
    pub replaced: usize,
    /// Subtrees removed from their parent.
    pub removed: usize,
    /// Elements whose attributes were rewritten in place.
    pub props_updated: usize,
    /// Host nodes carried over unchanged.
    pub reused: usize,
}

/// Applies node trees to a [`Host`], evaluating components against `ctx`.
///
/// A patcher only lives for one pass; it never holds on to either tree.
pub struct Patcher<'a, H: Host, C> {
    host: &'a mut H,
    ctx: &'a C,
    stats: PatchStats,
}

impl<'a, H: Host, C> Patcher<'a, H, C> {
    pub fn new(host: &'a mut H, ctx: &'a C) -> Self {
        Self {
            host,
            ctx,
            stats: PatchStats::default(),
        }
    }

    #[must_use]
    pub fn stats(&self) -> PatchStats {
        self.stats
    }

    /// Mount `node` and append it to `container`.
    ///
    /// Tags are created, given their props, appended, and then filled with their
    /// children in order. Components are rendered and their output is mounted in
    /// their place.
    ///
    /// # Errors
    ///
    /// Propagates any [`HostError`](crate::error::HostError).
    pub fn mount(&mut self, node: &mut Node<C>, container: HostRef) -> Result<(), RenderError> {
        self.mount_node(node, container)?;
        self.stats.mounted += 1;
        Ok(())
    }

    fn mount_node(&mut self, node: &mut Node<C>, container: HostRef) -> Result<(), RenderError> {
        match node {
            Node::Text(text) => {
                let el = self.host.create_text_node(&text.body)?;
                text.host = Some(el);
                self.host.append_child(container, el)?;
            }
            Node::Tag(tag) => {
                let el = self.create_element(tag)?;
                self.host.append_child(container, el)?;
                self.mount_children(&mut tag.children, el)?;
            }
            Node::Component(component) => {
                self.render_component(component);
                if let Some(Some(output)) = component.children.first_mut() {
                    self.mount_node(output, container)?;
                }
                component.host = component.children.first().and_then(|c| c.as_ref()?.host());
            }
        }
        Ok(())
    }

    /// Reconcile the slot `next` against `current` inside `parent`.
    ///
    /// `current` is consumed: whatever host nodes it still owns afterwards have
    /// either been carried onto `next` or removed from the host tree.
    ///
    /// # Errors
    ///
    /// Propagates host failures, and returns [`RenderError::Unmounted`] when a
    /// tag whose children must be patched was never mounted.
    pub fn reconcile(
        &mut self,
        parent: HostRef,
        current: Child<C>,
        next: &mut Child<C>,
    ) -> Result<(), RenderError> {
        match classify(current.as_ref(), next.as_ref()) {
            Reconcile::Absent => Ok(()),
            Reconcile::Mount => match next {
                Some(node) => self.mount(node, parent),
                None => Ok(()),
            },
            Reconcile::Remove => match current {
                Some(node) => self.unmount(parent, &node),
                None => Ok(()),
            },
            Reconcile::Diff(kind) => match (current, next) {
                (Some(current), Some(next)) => self.patch(parent, current, next, kind),
                _ => Ok(()),
            },
        }
    }

    /// Apply the classification `kind` for two present nodes.
    fn patch(
        &mut self,
        parent: HostRef,
        current: Node<C>,
        next: &mut Node<C>,
        kind: Option<DiffKind>,
    ) -> Result<(), RenderError> {
        if let Some(kind) = kind.filter(|k| k.is_replace()) {
            trace!(?kind, from = %current.kind(), to = %next.kind(), "replacing subtree");
            return self.replace(parent, &current, next);
        }

        match (current, next) {
            (Node::Text(current), Node::Text(next)) => {
                next.host = current.host;
                self.stats.reused += 1;
                Ok(())
            }
            (Node::Tag(current), Node::Tag(next)) => {
                let Some(el) = current.host else {
                    return Err(RenderError::Unmounted("tag"));
                };
                if kind == Some(DiffKind::Props) {
                    self.update_props(el, &current.props, &next.props)?;
                } else {
                    self.stats.reused += 1;
                }
                next.host = Some(el);
                self.reconcile_children(el, current.children, &mut next.children)
            }
            (Node::Component(current), Node::Component(next)) => {
                if kind == Some(DiffKind::Props) {
                    trace!(component = next.component.name(), "component inputs changed");
                }
                self.render_component(next);
                self.reconcile_children(parent, current.children, &mut next.children)?;
                next.host = next.children.first().and_then(|c| c.as_ref()?.host());
                Ok(())
            }
            (current, next) => {
                warn!(
                    from = %current.kind(),
                    to = %next.kind(),
                    "unclassified node pair, skipping update"
                );
                Ok(())
            }
        }
    }

    /// Build `next` detached and substitute it for `current`'s host node.
    ///
    /// When one side resolves to no host node (a component rendering nothing),
    /// the substitution degrades to an append or a removal.
    fn replace(
        &mut self,
        parent: HostRef,
        current: &Node<C>,
        next: &mut Node<C>,
    ) -> Result<(), RenderError> {
        let fresh = self.build(next)?;
        match (current.host(), fresh) {
            (Some(old), Some(new)) => self.host.replace_child(parent, new, old)?,
            (None, Some(new)) => self.host.append_child(parent, new)?,
            (Some(old), None) => self.host.remove_child(parent, old)?,
            (None, None) => {}
        }
        self.stats.replaced += 1;
        Ok(())
    }

    /// Create the host subtree for `node` without attaching it to a parent.
    fn build(&mut self, node: &mut Node<C>) -> Result<Option<HostRef>, RenderError> {
        let el = match node {
            Node::Text(text) => {
                let el = self.host.create_text_node(&text.body)?;
                text.host = Some(el);
                Some(el)
            }
            Node::Tag(tag) => {
                let el = self.create_element(tag)?;
                self.mount_children(&mut tag.children, el)?;
                Some(el)
            }
            Node::Component(component) => {
                self.render_component(component);
                let el = match component.children.first_mut() {
                    Some(Some(output)) => self.build(output)?,
                    _ => None,
                };
                component.host = el;
                el
            }
        };
        Ok(el)
    }

    fn unmount(&mut self, parent: HostRef, node: &Node<C>) -> Result<(), RenderError> {
        if let Some(el) = node.host() {
            self.host.remove_child(parent, el)?;
            self.stats.removed += 1;
        }
        Ok(())
    }

    fn reconcile_children(
        &mut self,
        parent: HostRef,
        current: Vec<Child<C>>,
        next: &mut [Child<C>],
    ) -> Result<(), RenderError> {
        let count = current.len().max(next.len());
        let mut current = current.into_iter();
        for index in 0..count {
            let previous = current.next().flatten();
            match next.get_mut(index) {
                Some(slot) => self.reconcile(parent, previous, slot)?,
                None => self.reconcile(parent, previous, &mut None)?,
            }
        }
        Ok(())
    }

    fn mount_children(
        &mut self,
        children: &mut [Child<C>],
        el: HostRef,
    ) -> Result<(), RenderError> {
        for child in children.iter_mut().flatten() {
            self.mount_node(child, el)?;
        }
        Ok(())
    }

    /// Create an element for `tag`, apply its props and bind it.
    fn create_element(&mut self, tag: &mut TagNode<C>) -> Result<HostRef, RenderError> {
        let el = self.host.create_element(&tag.tag)?;
        self.apply_props(el, &tag.props)?;
        tag.host = Some(el);
        Ok(el)
    }

    fn apply_props(&mut self, el: HostRef, props: &Props) -> Result<(), RenderError> {
        for (key, value) in props.iter() {
            match (event_name(key), value) {
                (Some(event), PropValue::Handler(handler)) => {
                    self.host.add_event_listener(el, &event, handler.clone())?;
                }
                (None, PropValue::Attr(value)) => self.host.set_attribute(el, key, value)?,
                (Some(_), PropValue::Attr(_)) => {
                    warn!(key, "string value under an event key, skipping");
                }
                (None, PropValue::Handler(_)) => {
                    warn!(key, "event handler under an attribute key, skipping");
                }
            }
        }
        Ok(())
    }

    fn update_props(
        &mut self,
        el: HostRef,
        current: &Props,
        next: &Props,
    ) -> Result<(), RenderError> {
        let delta = diff_props(current, next);
        for key in &delta.removed {
            self.host.remove_attribute(el, key)?;
        }
        for (key, value) in &delta.set {
            self.host.set_attribute(el, key, value)?;
        }
        self.stats.props_updated += 1;
        Ok(())
    }

    /// Evaluate a component and store its normalized output as its only child.
    fn render_component(&mut self, component: &mut ComponentNode<C>) {
        let output = component.component.render(&component.props, self.ctx);
        debug!(
            component = component.component.name(),
            empty = output.is_none(),
            "rendered component"
        );
        component.children = vec![output];
    }
}
