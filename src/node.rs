//! The virtual node model.
//!
//! A [`Node`] is a host-independent description of one piece of UI. It is one of
//! three variants:
//!
//! - [`TextNode`]: a text body.
//! - [`TagNode`]: a host element with props and children.
//! - [`ComponentNode`]: a render function plus its input props. The function is
//!   only evaluated when the node is mounted or patched; its normalized output is
//!   kept as the component's single child.
//!
//! The empty node ("render nothing here") is not a variant. Every position that
//! can hold a node holds a [`Child`], which is `Option<Node<C>>`.
//!
//! The type parameter `C` is the context handed to component render functions,
//! typically a [`Store`](crate::store::Store) handle.
//!
//! # Example
//!
//! ```
//! use petal::children;
//! use petal::node::{Node, Props, create_node};
//!
//! let count = 3;
//! let node: Node<()> = create_node(
//!     "p",
//!     Some(Props::new().attr("class", "count")),
//!     children!["count: ", count, None::<Node<()>>],
//! );
//!
//! assert_eq!(node.children().len(), 3);
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use crate::host::{Event, EventHandler, HostRef, event_name};

/// A node slot: `None` renders nothing.
pub type Child<C> = Option<Node<C>>;

/// A prop value: either an attribute string or an event handler.
#[derive(Debug, Clone)]
pub enum PropValue {
    Attr(String),
    Handler(EventHandler),
}

impl PropValue {
    #[must_use]
    pub fn as_attr(&self) -> Option<&str> {
        match self {
            Self::Attr(value) => Some(value),
            Self::Handler(_) => None,
        }
    }
}

impl PartialEq for PropValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Attr(a), Self::Attr(b)) => a == b,
            (Self::Handler(a), Self::Handler(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

impl From<&str> for PropValue {
    fn from(value: &str) -> Self {
        Self::Attr(value.to_string())
    }
}

impl From<String> for PropValue {
    fn from(value: String) -> Self {
        Self::Attr(value)
    }
}

impl From<EventHandler> for PropValue {
    fn from(handler: EventHandler) -> Self {
        Self::Handler(handler)
    }
}

/// A string-keyed property bag, ordered by key.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Props {
    entries: BTreeMap<String, PropValue>,
}

impl Props {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style attribute insert.
    #[must_use]
    pub fn attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.entries.insert(key.into(), PropValue::Attr(value.into()));
        self
    }

    /// Builder-style event binding. `key` should follow the `onEvent` convention.
    #[must_use]
    pub fn on(mut self, key: impl Into<String>, handler: impl Fn(&Event) + 'static) -> Self {
        self.entries.insert(key.into(), PropValue::Handler(EventHandler::new(handler)));
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<PropValue>) {
        self.entries.insert(key.into(), value.into());
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&PropValue> {
        self.entries.get(key)
    }

    /// Attribute value for `key`, if it is an attribute.
    #[must_use]
    pub fn get_attr(&self, key: &str) -> Option<&str> {
        self.entries.get(key).and_then(PropValue::as_attr)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Entries whose key is not an event binding and whose value is a string.
    pub fn attributes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().filter_map(|(key, value)| {
            if event_name(key).is_some() {
                return None;
            }
            value.as_attr().map(|v| (key.as_str(), v))
        })
    }

    /// Structural equality of the attribute entries.
    ///
    /// Event handlers are excluded: a render creates fresh closures every time,
    /// and handlers are never patched.
    #[must_use]
    pub fn attrs_eq(&self, other: &Self) -> bool {
        self.attributes().eq(other.attributes())
    }
}

impl<K: Into<String>, V: Into<PropValue>> FromIterator<(K, V)> for Props {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// The props a component render function receives: its input bag plus the
/// children it was given.
pub struct ComponentProps<C> {
    pub attrs: Props,
    pub children: Vec<Child<C>>,
}

impl<C> ComponentProps<C> {
    #[must_use]
    pub fn new(attrs: Props, children: Vec<Child<C>>) -> Self {
        Self { attrs, children }
    }
}

impl<C> Clone for ComponentProps<C> {
    fn clone(&self) -> Self {
        Self {
            attrs: self.attrs.clone(),
            children: self.children.clone(),
        }
    }
}

impl<C> fmt::Debug for ComponentProps<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentProps")
            .field("attrs", &self.attrs)
            .field("children", &self.children)
            .finish()
    }
}

type RenderFn<C> = Rc<dyn Fn(&ComponentProps<C>, &C) -> Child<C>>;

/// A named, pure render function.
pub struct Component<C> {
    name: &'static str,
    render: RenderFn<C>,
}

impl<C> Component<C> {
    /// Wrap a render function. Its return value is normalized through
    /// [`IntoChild`], so it may return a node, a string, a number or an empty
    /// value.
    pub fn new<F, R>(name: &'static str, render: F) -> Self
    where
        F: Fn(&ComponentProps<C>, &C) -> R + 'static,
        R: IntoChild<C>,
    {
        Self {
            name,
            render: Rc::new(move |props: &ComponentProps<C>, ctx: &C| {
                render(props, ctx).into_child()
            }),
        }
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Evaluate the render function.
    pub fn render(&self, props: &ComponentProps<C>, ctx: &C) -> Child<C> {
        (self.render)(props, ctx)
    }
}

impl<C> Clone for Component<C> {
    fn clone(&self) -> Self {
        Self {
            name: self.name,
            render: Rc::clone(&self.render),
        }
    }
}

impl<C> fmt::Debug for Component<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Component({})", self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextNode {
    pub body: String,
    pub(crate) host: Option<HostRef>,
}

pub struct TagNode<C> {
    pub tag: String,
    pub props: Props,
    pub children: Vec<Child<C>>,
    pub(crate) host: Option<HostRef>,
}

pub struct ComponentNode<C> {
    pub component: Component<C>,
    pub props: ComponentProps<C>,
    /// Normalized render output. Empty until the component is evaluated, then
    /// exactly one slot.
    pub children: Vec<Child<C>>,
    pub(crate) host: Option<HostRef>,
}

/// Discriminant of a [`Node`], used by the reconciler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Text,
    Tag,
    Component,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl NodeKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Tag => "tag",
            Self::Component => "component",
        }
    }
}

/// A virtual node.
pub enum Node<C> {
    Text(TextNode),
    Tag(TagNode<C>),
    Component(ComponentNode<C>),
}

impl<C> Node<C> {
    pub fn text(body: impl Into<String>) -> Self {
        Self::Text(TextNode {
            body: body.into(),
            host: None,
        })
    }

    pub fn tag(tag: impl Into<String>, props: Props, children: Vec<Child<C>>) -> Self {
        Self::Tag(TagNode {
            tag: tag.into(),
            props,
            children,
            host: None,
        })
    }

    #[must_use]
    pub fn component(component: Component<C>, props: Props, children: Vec<Child<C>>) -> Self {
        Self::Component(ComponentNode {
            component,
            props: ComponentProps::new(props, children),
            children: Vec::new(),
            host: None,
        })
    }

    #[must_use]
    pub fn kind(&self) -> NodeKind {
        match self {
            Self::Text(_) => NodeKind::Text,
            Self::Tag(_) => NodeKind::Tag,
            Self::Component(_) => NodeKind::Component,
        }
    }

    /// The host node currently representing this node, if mounted.
    #[must_use]
    pub fn host(&self) -> Option<HostRef> {
        match self {
            Self::Text(node) => node.host,
            Self::Tag(node) => node.host,
            Self::Component(node) => node.host,
        }
    }

    pub(crate) fn set_host(&mut self, host: Option<HostRef>) {
        match self {
            Self::Text(node) => node.host = host,
            Self::Tag(node) => node.host = host,
            Self::Component(node) => node.host = host,
        }
    }

    /// Tag children, or a component's rendered output. Text nodes have none.
    #[must_use]
    pub fn children(&self) -> &[Child<C>] {
        match self {
            Self::Text(_) => &[],
            Self::Tag(node) => &node.children,
            Self::Component(node) => &node.children,
        }
    }
}

impl<C> Clone for Node<C> {
    fn clone(&self) -> Self {
        match self {
            Self::Text(node) => Self::Text(node.clone()),
            Self::Tag(node) => Self::Tag(TagNode {
                tag: node.tag.clone(),
                props: node.props.clone(),
                children: node.children.clone(),
                host: node.host,
            }),
            Self::Component(node) => Self::Component(ComponentNode {
                component: node.component.clone(),
                props: node.props.clone(),
                children: node.children.clone(),
                host: node.host,
            }),
        }
    }
}

impl<C> fmt::Debug for Node<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(node) => f
                .debug_struct("Text")
                .field("body", &node.body)
                .field("host", &node.host)
                .finish(),
            Self::Tag(node) => f
                .debug_struct("Tag")
                .field("tag", &node.tag)
                .field("props", &node.props)
                .field("children", &node.children)
                .field("host", &node.host)
                .finish(),
            Self::Component(node) => f
                .debug_struct("Component")
                .field("component", &node.component)
                .field("props", &node.props)
                .field("children", &node.children)
                .field("host", &node.host)
                .finish(),
        }
    }
}

/// Normalization of render output and child values into a [`Child`].
///
/// Strings and numbers become text nodes; `false`, `true`, `()` and `None`
/// become the empty node.
pub trait IntoChild<C> {
    fn into_child(self) -> Child<C>;
}

impl<C> IntoChild<C> for Node<C> {
    fn into_child(self) -> Child<C> {
        Some(self)
    }
}

impl<C, T: IntoChild<C>> IntoChild<C> for Option<T> {
    fn into_child(self) -> Child<C> {
        self.and_then(IntoChild::into_child)
    }
}

impl<C> IntoChild<C> for &str {
    fn into_child(self) -> Child<C> {
        Some(Node::text(self))
    }
}

impl<C> IntoChild<C> for String {
    fn into_child(self) -> Child<C> {
        Some(Node::text(self))
    }
}

impl<C> IntoChild<C> for bool {
    fn into_child(self) -> Child<C> {
        None
    }
}

impl<C> IntoChild<C> for () {
    fn into_child(self) -> Child<C> {
        None
    }
}

macro_rules! impl_into_child_for_numbers {
    ($($ty:ty),*) => {
        $(
            impl<C> IntoChild<C> for $ty {
                fn into_child(self) -> Child<C> {
                    Some(Node::text(self.to_string()))
                }
            }
        )*
    };
}

impl_into_child_for_numbers!(
    i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64
);

/// Build a `Vec<Child<C>>` from any mix of [`IntoChild`] values.
#[macro_export]
macro_rules! children {
    () => {
        ::std::vec::Vec::new()
    };
    ($($child:expr),+ $(,)?) => {
        ::std::vec![$($crate::node::IntoChild::into_child($child)),+]
    };
}

/// What [`create_node`] builds: a host tag or a component.
pub enum NodeType<C> {
    Tag(String),
    Component(Component<C>),
}

impl<C> From<&str> for NodeType<C> {
    fn from(tag: &str) -> Self {
        Self::Tag(tag.to_string())
    }
}

impl<C> From<String> for NodeType<C> {
    fn from(tag: String) -> Self {
        Self::Tag(tag)
    }
}

impl<C> From<Component<C>> for NodeType<C> {
    fn from(component: Component<C>) -> Self {
        Self::Component(component)
    }
}

/// Build a node from a type, an optional prop bag and children.
///
/// Pure: no host interaction, and a component's render function is not
/// invoked. An absent prop bag is an empty one.
pub fn create_node<C>(
    ty: impl Into<NodeType<C>>,
    props: Option<Props>,
    children: impl IntoIterator<Item = Child<C>>,
) -> Node<C> {
    let props = props.unwrap_or_default();
    let children: Vec<Child<C>> = children.into_iter().collect();
    match ty.into() {
        NodeType::Tag(tag) => Node::tag(tag, props, children),
        NodeType::Component(component) => Node::component(component, props, children),
    }
}
