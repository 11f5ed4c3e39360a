//! Node classification for reconciliation.
//!
//! [`classify`] decides what has to happen at one tree position. The checks run
//! in a fixed order and the first match wins:
//!
//! 1. presence: exactly one side is empty ([`Reconcile::Mount`] or
//!    [`Reconcile::Remove`]),
//! 2. [`DiffKind::VNodeType`]: the node kinds differ,
//! 3. [`DiffKind::Text`]: two text nodes with different bodies,
//! 4. [`DiffKind::Tag`]: two tag nodes with different tag names,
//! 5. [`DiffKind::Props`]: the attribute bags differ.
//!
//! If nothing matches the nodes are structurally identical at this position.
//! Children are always paired by index; there are no keys, so an insertion at the
//! front of a list shows up as a change at every following index.

use crate::node::{Node, Props};

/// Why two present nodes differ.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiffKind {
    /// The node kinds differ (text, tag, component).
    VNodeType,
    /// Two text nodes with different bodies.
    Text,
    /// Two tag nodes for different host tags.
    Tag,
    /// Same tag, different attributes.
    Props,
}

impl DiffKind {
    /// Whether this kind is resolved by replacing the host subtree.
    #[must_use]
    pub const fn is_replace(self) -> bool {
        !matches!(self, Self::Props)
    }
}

/// The decision for one tree position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reconcile {
    /// Both sides empty.
    Absent,
    /// Only `next` is present: mount it and append.
    Mount,
    /// Only `current` is present: remove it from its parent.
    Remove,
    /// Both present. `None` means no structural change.
    Diff(Option<DiffKind>),
}

pub fn classify<C>(current: Option<&Node<C>>, next: Option<&Node<C>>) -> Reconcile {
    match (current, next) {
        (None, None) => Reconcile::Absent,
        (None, Some(_)) => Reconcile::Mount,
        (Some(_), None) => Reconcile::Remove,
        (Some(current), Some(next)) => Reconcile::Diff(diff(current, next)),
    }
}

/// Classify two present nodes.
///
/// Tag names compare ASCII case-insensitively, since hosts usually report
/// upper-cased element names. Component nodes only compare their attribute
/// bags; what they render is compared one level down.
#[must_use]
pub fn diff<C>(current: &Node<C>, next: &Node<C>) -> Option<DiffKind> {
    match (current, next) {
        (Node::Text(current), Node::Text(next)) => {
            (current.body != next.body).then_some(DiffKind::Text)
        }
        (Node::Tag(current), Node::Tag(next)) => {
            if !current.tag.eq_ignore_ascii_case(&next.tag) {
                Some(DiffKind::Tag)
            } else if !current.props.attrs_eq(&next.props) {
                Some(DiffKind::Props)
            } else {
                None
            }
        }
        (Node::Component(current), Node::Component(next)) => {
            (!current.props.attrs.attrs_eq(&next.props.attrs)).then_some(DiffKind::Props)
        }
        _ => Some(DiffKind::VNodeType),
    }
}

/// Attribute writes needed to turn `current`'s attributes into `next`'s.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropDelta {
    /// Keys present on `current` only.
    pub removed: Vec<String>,
    /// Every attribute on `next`, in key order.
    pub set: Vec<(String, String)>,
}

impl PropDelta {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.removed.is_empty() && self.set.is_empty()
    }
}

/// Compute the attribute delta between two prop bags.
///
/// Event-handler keys never appear in either list: handlers are registered once
/// at mount time and are neither removed nor replaced.
#[must_use]
pub fn diff_props(current: &Props, next: &Props) -> PropDelta {
    let removed = current
        .attributes()
        .filter(|(key, _)| next.get_attr(key).is_none())
        .map(|(key, _)| key.to_string())
        .collect();

    let set = next
        .attributes()
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect();

    PropDelta { removed, set }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::children;
    use crate::node::{Component, ComponentProps};

    fn tag(name: &str, props: Props) -> Node<()> {
        Node::tag(name, props, Vec::new())
    }

    #[test]
    fn test_presence_classification() {
        let node: Node<()> = Node::text("a");
        assert_eq!(classify::<()>(None, None), Reconcile::Absent);
        assert_eq!(classify(None, Some(&node)), Reconcile::Mount);
        assert_eq!(classify(Some(&node), None), Reconcile::Remove);
        assert_eq!(classify(Some(&node), Some(&node)), Reconcile::Diff(None));
    }

    #[test]
    fn test_kind_change_wins_over_everything() {
        let text: Node<()> = Node::text("div");
        let el = tag("div", Props::new());
        let component: Node<()> = Node::component(
            Component::new("Div", |_: &ComponentProps<()>, _: &()| "div"),
            Props::new(),
            Vec::new(),
        );

        assert_eq!(diff(&text, &el), Some(DiffKind::VNodeType));
        assert_eq!(diff(&el, &component), Some(DiffKind::VNodeType));
        assert_eq!(diff(&component, &text), Some(DiffKind::VNodeType));
    }

    #[test]
    fn test_text_bodies() {
        let a: Node<()> = Node::text("a");
        let b: Node<()> = Node::text("b");
        assert_eq!(diff(&a, &b), Some(DiffKind::Text));
        assert_eq!(diff(&a, &a.clone()), None);
    }

    #[test]
    fn test_tag_change_beats_props_change() {
        let current = tag("div", Props::new().attr("class", "a"));
        let next = tag("span", Props::new().attr("class", "b"));
        assert_eq!(diff(&current, &next), Some(DiffKind::Tag));
    }

    #[test]
    fn test_tag_names_compare_case_insensitively() {
        let current = tag("DIV", Props::new());
        let next = tag("div", Props::new());
        assert_eq!(diff(&current, &next), None);
    }

    #[test]
    fn test_props_change_and_handler_blindness() {
        let a = tag("div", Props::new().attr("class", "a"));
        let b = tag("div", Props::new().attr("class", "b"));
        let with_handler = tag("div", Props::new().attr("class", "a").on("onClick", |_| {}));

        assert_eq!(diff(&a, &b), Some(DiffKind::Props));
        assert_eq!(diff(&a, &with_handler), None);
    }

    #[test]
    fn test_children_do_not_affect_node_classification() {
        let current: Node<()> = Node::tag("ul", Props::new(), children!["a"]);
        let next: Node<()> = Node::tag("ul", Props::new(), children!["b", "c"]);
        assert_eq!(diff(&current, &next), None);
    }

    #[test]
    fn test_component_props() {
        let render = Component::new("Label", |p: &ComponentProps<()>, _: &()| {
            p.attrs.get_attr("text").unwrap_or_default().to_string()
        });
        let a: Node<()> =
            Node::component(render.clone(), Props::new().attr("text", "a"), Vec::new());
        let b: Node<()> =
            Node::component(render.clone(), Props::new().attr("text", "b"), Vec::new());
        let a2: Node<()> = Node::component(render, Props::new().attr("text", "a"), Vec::new());

        assert_eq!(diff(&a, &b), Some(DiffKind::Props));
        assert_eq!(diff(&a, &a2), None);
    }

    #[test]
    fn test_diff_props_class_toggle() {
        let current = Props::new().attr("className", "a");
        let next = Props::new().attr("className", "b");

        let delta = diff_props(&current, &next);
        assert!(delta.removed.is_empty());
        assert_eq!(delta.set, vec![("className".to_string(), "b".to_string())]);
    }

    #[test]
    fn test_diff_props_removes_only_old_keys_and_skips_handlers() {
        let current = Props::new()
            .attr("id", "x")
            .attr("title", "old")
            .on("onClick", |_| {});
        let next = Props::new().attr("id", "y").on("onInput", |_| {});

        let delta = diff_props(&current, &next);
        assert_eq!(delta.removed, vec!["title".to_string()]);
        assert_eq!(delta.set, vec![("id".to_string(), "y".to_string())]);
    }

    #[test]
    fn test_is_replace() {
        assert!(DiffKind::VNodeType.is_replace());
        assert!(DiffKind::Text.is_replace());
        assert!(DiffKind::Tag.is_replace());
        assert!(!DiffKind::Props.is_replace());
        assert!(PropDelta::default().is_empty());
    }
}
