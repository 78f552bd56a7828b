//! VNode - immutable description of a UI subtree.
//!
//! A render produces a fresh tree of `VNode`s. Nodes are shared through `Rc`
//! and never mutated after construction, so passing the same child twice
//! (or keeping a child from the previous render) is cheap and lets the
//! reconciler detect "nothing changed" by pointer identity.

use std::fmt;
use std::rc::Rc;

use super::component::{Component, ComponentNode};
use super::props::{AddConfig, NodeRef, Props, Style, Value};
use crate::theme::ThemeOverride;

/// What a component render returns. `None` renders nothing.
pub type Element = Option<VNode>;

// =============================================================================
// Keys
// =============================================================================

/// Sibling identity across renders.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Key {
    Int(i64),
    Str(Rc<str>),
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(i) => write!(f, "{i}"),
            Self::Str(s) => write!(f, "{s}"),
        }
    }
}

impl From<i64> for Key {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for Key {
    fn from(value: i32) -> Self {
        Self::Int(value as i64)
    }
}

impl From<usize> for Key {
    fn from(value: usize) -> Self {
        Self::Int(value as i64)
    }
}

impl From<&str> for Key {
    fn from(value: &str) -> Self {
        Self::Str(value.into())
    }
}

impl From<String> for Key {
    fn from(value: String) -> Self {
        Self::Str(value.into())
    }
}

// =============================================================================
// VNode
// =============================================================================

/// A host element: native tag, props, children.
#[derive(Debug, Clone)]
pub struct ElementNode {
    pub tag: &'static str,
    pub key: Option<Key>,
    pub props: Props,
    pub children: Vec<VNode>,
}

/// A group of siblings without a native node of its own.
#[derive(Debug, Clone)]
pub struct FragmentNode {
    pub key: Option<Key>,
    pub children: Vec<VNode>,
}

#[derive(Clone, Default)]
pub enum VNode {
    /// Renders nothing. Also what `false` and `None` children become.
    #[default]
    Null,
    Text(Rc<str>),
    /// Nested child list, flattened into its parent before diffing.
    List(Rc<[VNode]>),
    Element(Rc<ElementNode>),
    Component(Rc<ComponentNode>),
    Fragment(Rc<FragmentNode>),
}

impl VNode {
    pub fn key(&self) -> Option<&Key> {
        match self {
            Self::Element(el) => el.key.as_ref(),
            Self::Component(c) => c.key.as_ref(),
            Self::Fragment(f) => f.key.as_ref(),
            _ => None,
        }
    }

    /// Name used in diagnostics paths.
    pub fn display_name(&self) -> &str {
        match self {
            Self::Null => "null",
            Self::Text(_) => "#text",
            Self::List(_) => "list",
            Self::Element(el) => el.tag,
            Self::Component(c) => c.component.name(),
            Self::Fragment(_) => "Fragment",
        }
    }

    /// Same kind and same type: tag for elements, identity for components.
    ///
    /// Keys are not considered here.
    pub fn same_type(&self, other: &VNode) -> bool {
        match (self, other) {
            (Self::Element(a), Self::Element(b)) => a.tag == b.tag,
            (Self::Component(a), Self::Component(b)) => a.component == b.component,
            (Self::Fragment(_), Self::Fragment(_)) | (Self::Text(_), Self::Text(_)) => true,
            _ => false,
        }
    }

    /// Pointer identity for shared nodes, value equality for text.
    pub fn ptr_eq(&self, other: &VNode) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Text(a), Self::Text(b)) => a == b,
            (Self::List(a), Self::List(b)) => Rc::ptr_eq(a, b),
            (Self::Element(a), Self::Element(b)) => Rc::ptr_eq(a, b),
            (Self::Component(a), Self::Component(b)) => Rc::ptr_eq(a, b),
            (Self::Fragment(a), Self::Fragment(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }

    pub(crate) fn is_renderable(&self) -> bool {
        match self {
            Self::Null | Self::List(_) => false,
            Self::Text(t) => !t.trim().is_empty(),
            _ => true,
        }
    }

    /// Normalize a render result into a single mountable node.
    ///
    /// Lists become keyless fragments; nothing-renders become `None`.
    pub(crate) fn normalize(element: Element) -> Option<VNode> {
        match element? {
            Self::List(items) => {
                let children = flatten_children(&items);
                (!children.is_empty()).then(|| fragment(children))
            }
            node if node.is_renderable() => Some(node),
            _ => None,
        }
    }
}

impl fmt::Debug for VNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "Null"),
            Self::Text(t) => write!(f, "Text({t:?})"),
            Self::List(items) => f.debug_list().entries(items.iter()).finish(),
            Self::Element(el) => f
                .debug_struct("Element")
                .field("tag", &el.tag)
                .field("key", &el.key)
                .field("children", &el.children)
                .finish(),
            Self::Component(c) => f
                .debug_struct("Component")
                .field("name", &c.component.name())
                .field("key", &c.key)
                .finish(),
            Self::Fragment(frag) => f
                .debug_struct("Fragment")
                .field("key", &frag.key)
                .field("children", &frag.children)
                .finish(),
        }
    }
}

impl From<&str> for VNode {
    fn from(value: &str) -> Self {
        Self::Text(value.into())
    }
}

impl From<String> for VNode {
    fn from(value: String) -> Self {
        Self::Text(value.into())
    }
}

impl From<Rc<str>> for VNode {
    fn from(value: Rc<str>) -> Self {
        Self::Text(value)
    }
}

/// `false` and `true` both render nothing, so `cond && node` patterns work.
impl From<bool> for VNode {
    fn from(_: bool) -> Self {
        Self::Null
    }
}

impl From<Option<VNode>> for VNode {
    fn from(value: Option<VNode>) -> Self {
        value.unwrap_or_default()
    }
}

impl From<Vec<VNode>> for VNode {
    fn from(value: Vec<VNode>) -> Self {
        Self::List(value.into())
    }
}

impl From<ElementNode> for VNode {
    fn from(value: ElementNode) -> Self {
        Self::Element(Rc::new(value))
    }
}

/// Deep-flatten a child list: nested lists are spliced in place, `Null`
/// and whitespace-only text are dropped.
pub fn flatten_children(children: &[VNode]) -> Vec<VNode> {
    let mut out = Vec::with_capacity(children.len());
    push_flat(children, &mut out);
    out
}

fn push_flat(children: &[VNode], out: &mut Vec<VNode>) {
    for child in children {
        match child {
            VNode::List(items) => push_flat(items, out),
            node if node.is_renderable() => out.push(node.clone()),
            _ => {}
        }
    }
}

// =============================================================================
// Builders
// =============================================================================

/// Builder for host elements.
///
/// ```
/// use spark_scene::vdom::{element, text};
/// use spark_scene::vdom::Style;
///
/// let node = element("view")
///     .key(1)
///     .style(Style::new().gap(2.0))
///     .child(text("hello"))
///     .build();
/// assert_eq!(node.display_name(), "view");
/// ```
#[derive(Debug, Clone)]
#[must_use]
pub struct ElementBuilder {
    node: ElementNode,
}

pub fn element(tag: &'static str) -> ElementBuilder {
    ElementBuilder {
        node: ElementNode {
            tag,
            key: None,
            props: Props::default(),
            children: Vec::new(),
        },
    }
}

/// A generic container element.
pub fn view() -> ElementBuilder {
    element("view")
}

pub fn text(content: impl Into<Rc<str>>) -> VNode {
    VNode::Text(content.into())
}

pub fn fragment(children: impl IntoIterator<Item = VNode>) -> VNode {
    VNode::Fragment(Rc::new(FragmentNode {
        key: None,
        children: children.into_iter().collect(),
    }))
}

pub fn keyed_fragment(key: impl Into<Key>, children: impl IntoIterator<Item = VNode>) -> VNode {
    VNode::Fragment(Rc::new(FragmentNode {
        key: Some(key.into()),
        children: children.into_iter().collect(),
    }))
}

impl ElementBuilder {
    pub fn key(mut self, key: impl Into<Key>) -> Self {
        self.node.key = Some(key.into());
        self
    }

    pub fn props(mut self, props: Props) -> Self {
        self.node.props = props;
        self
    }

    pub fn style(mut self, style: Style) -> Self {
        self.node.props.style = style;
        self
    }

    pub fn attr(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.node.props.attrs.insert(name.into(), value.into());
        self
    }

    pub fn text(mut self, content: impl Into<Rc<str>>) -> Self {
        self.node.props.text = Some(content.into());
        self
    }

    pub fn node_ref(mut self, node_ref: impl Into<NodeRef>) -> Self {
        self.node.props.node_ref = Some(node_ref.into());
        self
    }

    pub fn theme(mut self, theme: Rc<ThemeOverride>) -> Self {
        self.node.props.theme = Some(theme);
        self
    }

    pub fn add_config(mut self, config: AddConfig) -> Self {
        self.node.props.add_config = Some(config);
        self
    }

    pub fn child(mut self, child: impl Into<VNode>) -> Self {
        self.node.children.push(child.into());
        self
    }

    pub fn children<I>(mut self, children: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<VNode>,
    {
        self.node.children.extend(children.into_iter().map(Into::into));
        self
    }

    pub fn build(self) -> VNode {
        VNode::Element(Rc::new(self.node))
    }
}

impl From<ElementBuilder> for VNode {
    fn from(builder: ElementBuilder) -> Self {
        builder.build()
    }
}

impl From<ElementBuilder> for Element {
    fn from(builder: ElementBuilder) -> Self {
        Some(builder.build())
    }
}

/// Builder for component instances, created by [`Component::with`].
#[derive(Clone)]
#[must_use]
pub struct ComponentBuilder {
    node: ComponentNode,
}

impl ComponentBuilder {
    pub(crate) fn new(component: Component) -> Self {
        Self {
            node: ComponentNode {
                component,
                key: None,
                props: Props::default(),
                children: Vec::new(),
                memo: None,
            },
        }
    }

    pub fn key(mut self, key: impl Into<Key>) -> Self {
        self.node.key = Some(key.into());
        self
    }

    pub fn props(mut self, props: Props) -> Self {
        self.node.props = props;
        self
    }

    pub fn attr(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.node.props.attrs.insert(name.into(), value.into());
        self
    }

    pub fn style(mut self, style: Style) -> Self {
        self.node.props.style = style;
        self
    }

    pub fn child(mut self, child: impl Into<VNode>) -> Self {
        self.node.children.push(child.into());
        self
    }

    pub fn children<I>(mut self, children: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<VNode>,
    {
        self.node.children.extend(children.into_iter().map(Into::into));
        self
    }

    /// `true` keeps a persistent context and skips re-renders when props and
    /// children are unchanged, even for components without hooks.
    /// `false` re-renders on every parent pass.
    pub fn memo(mut self, memo: bool) -> Self {
        self.node.memo = Some(memo);
        self
    }

    pub fn build(self) -> VNode {
        VNode::Component(Rc::new(self.node))
    }
}

impl From<ComponentBuilder> for VNode {
    fn from(builder: ComponentBuilder) -> Self {
        builder.build()
    }
}

impl From<ComponentBuilder> for Element {
    fn from(builder: ComponentBuilder) -> Self {
        Some(builder.build())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flatten_drops_null_and_whitespace() {
        let children = vec![
            text("a"),
            VNode::Null,
            VNode::from(false),
            text("   "),
            VNode::from(vec![text("b"), VNode::from(vec![text("c")])]),
            VNode::from(None),
        ];
        let flat = flatten_children(&children);
        let names: Vec<_> = flat
            .iter()
            .map(|n| match n {
                VNode::Text(t) => t.to_string(),
                other => other.display_name().to_string(),
            })
            .collect();
        assert_eq!(names, ["a", "b", "c"]);
    }

    #[test]
    fn test_same_type_ignores_key() {
        let a = view().key(1).build();
        let b = view().key(2).build();
        let c = element("text").build();
        assert!(a.same_type(&b));
        assert!(!a.same_type(&c));
        assert!(!a.same_type(&text("x")));
    }

    #[test]
    fn test_normalize_list_becomes_fragment() {
        let out = VNode::normalize(Some(VNode::from(vec![text("a"), VNode::Null])));
        assert!(matches!(out, Some(VNode::Fragment(_))));
        assert!(VNode::normalize(Some(VNode::from(Vec::new()))).is_none());
        assert!(VNode::normalize(Some(text(" "))).is_none());
        assert!(VNode::normalize(None).is_none());
    }

    #[test]
    fn test_ptr_eq() {
        let node = view().build();
        assert!(node.ptr_eq(&node.clone()));
        assert!(!node.ptr_eq(&view().build()));
        assert!(text("a").ptr_eq(&text("a")));
    }
}
