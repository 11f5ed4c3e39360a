// Property tests for mounting and reconciliation against the in-memory host.

#![allow(clippy::unwrap_used)]

use std::collections::BTreeMap;

use petal::diff::diff_props;
use petal::host::memory::HostOp;
use petal::patch::Patcher;
use petal::prelude::*;
use proptest::prelude::*;

fn list(items: &[Option<String>], attrs: &BTreeMap<String, String>) -> Node<()> {
    let mut props: Props = attrs
        .iter()
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();
    props = props.on("onClick", |_| {});
    let children = items
        .iter()
        .map(|item| item.as_deref().map(|body| Node::tag("li", Props::new(), children![body])))
        .collect();
    Node::tag("ul", props, children)
}

fn mounted(node: &mut Node<()>) -> (MemoryHost, HostRef) {
    let mut host = MemoryHost::with_journal();
    let root = host.create_root("main");
    Patcher::new(&mut host, &()).mount(node, root).unwrap();
    host.take_ops();
    (host, root)
}

fn items() -> impl Strategy<Value = Vec<Option<String>>> {
    prop::collection::vec(prop::option::of("[a-z ]{0,8}"), 0..12)
}

fn attrs() -> impl Strategy<Value = BTreeMap<String, String>> {
    prop::collection::btree_map("[a-z]{1,6}", "[a-z0-9]{0,6}", 0..6)
}

proptest! {
    /// Mounting skips empty slots and keeps the order of the rest.
    #[test]
    fn prop_mount_excludes_empty_children(items in items()) {
        let mut node = list(&items, &BTreeMap::new());
        let (host, root) = mounted(&mut node);

        let ul = host.children(root)[0];
        let expected: Vec<String> = items
            .iter()
            .flatten()
            .map(|body| format!("<li>{body}</li>"))
            .collect();
        prop_assert_eq!(host.children(ul).len(), expected.len());
        prop_assert_eq!(host.inner_html(ul), expected.concat());
    }

    /// Reconciling a tree against an equal rebuild touches nothing.
    #[test]
    fn prop_identical_rebuild_is_noop(items in items(), attrs in attrs()) {
        let mut node = list(&items, &attrs);
        let (mut host, root) = mounted(&mut node);
        let before = host.inner_html(root);
        let ul = node.host();

        let mut next = Some(list(&items, &attrs));
        let stats = {
            let mut patcher = Patcher::new(&mut host, &());
            patcher.reconcile(root, Some(node), &mut next).unwrap();
            patcher.stats()
        };

        prop_assert!(host.take_ops().is_empty());
        prop_assert_eq!(host.inner_html(root), before);
        prop_assert_eq!(next.as_ref().and_then(Node::host), ul);
        prop_assert_eq!(stats.replaced + stats.mounted + stats.removed, 0);
        prop_assert_eq!(host.listener_count(ul.unwrap(), "click"), 1);
    }

    /// A changed text body replaces the old host node and frees it.
    #[test]
    fn prop_text_change_replaces_node(old in "[a-z]{1,8}", new in "[A-Z]{1,8}") {
        let mut node: Node<()> = Node::tag("p", Props::new(), children![old.as_str()]);
        let (mut host, root) = mounted(&mut node);
        let p = host.children(root)[0];
        let old_text = host.children(p)[0];

        let mut next = Some(Node::tag("p", Props::new(), children![new.as_str()]));
        Patcher::new(&mut host, &()).reconcile(root, Some(node), &mut next).unwrap();

        let ops = host.take_ops();
        let replaced = ops.iter().any(|op| {
            matches!(op, HostOp::ReplaceChild { old_child, .. } if *old_child == old_text)
        });
        prop_assert!(replaced);
        prop_assert!(!host.contains(old_text));
        prop_assert_eq!(host.text(host.children(p)[0]), Some(new.as_str()));
    }

    /// The delta removes only vanished keys, sets every new attribute and never
    /// mentions handlers.
    #[test]
    fn prop_prop_delta_shape(current in attrs(), next in attrs()) {
        let as_props = |attrs: &BTreeMap<String, String>| {
            attrs
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect::<Props>()
                .on("onInput", |_| {})
        };
        let delta = diff_props(&as_props(&current), &as_props(&next));

        let removed: Vec<String> = current
            .keys()
            .filter(|key| !next.contains_key(*key))
            .cloned()
            .collect();
        let set: Vec<(String, String)> = next.clone().into_iter().collect();
        prop_assert_eq!(delta.removed, removed);
        prop_assert_eq!(delta.set, set);
    }

    /// Growing or shrinking a dense list ends with the host matching the new
    /// list. Empty slots are left out: a slot that fills in later is appended.
    #[test]
    fn prop_reconcile_converges(
        before in prop::collection::vec("[a-z]{0,8}".prop_map(Some), 0..12),
        after in prop::collection::vec("[a-z]{0,8}".prop_map(Some), 0..12),
    ) {
        let mut node = list(&before, &BTreeMap::new());
        let (mut host, root) = mounted(&mut node);

        let mut next = Some(list(&after, &BTreeMap::new()));
        Patcher::new(&mut host, &()).reconcile(root, Some(node), &mut next).unwrap();

        let mut fresh = list(&after, &BTreeMap::new());
        let (expected, expected_root) = mounted(&mut fresh);
        prop_assert_eq!(host.inner_html(root), expected.inner_html(expected_root));
    }
}
