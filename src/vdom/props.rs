//! Props - explicit prop structs for host elements and components.
//!
//! Instead of a free-form prop bag, every VNode carries a [`Props`] with a
//! typed [`Style`] (layout and visual fields), an ordered `attrs` map for
//! host-specific or component data, and a handful of lifecycle props
//! (`node_ref`, `theme`, `add_config`).
//!
//! Equality is shallow and identity-based where values are shared:
//! strings and numbers compare by value, callbacks, lists and opaque values
//! compare by `Rc` pointer. This is what the memo gate and the "did anything
//! change" checks in patch rely on.

use std::any::Any;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use crate::theme::ThemeOverride;
use crate::types::{Align, AlignContent, Dimension, Direction, Edges, Justify, Overflow, Wrap};

// =============================================================================
// Callback
// =============================================================================

/// Shared callback compared by identity.
///
/// Two callbacks are equal only if they are clones of the same `Rc`, so a
/// closure rebuilt on every render never compares equal to its predecessor.
#[derive(Clone)]
pub struct Callback(Rc<dyn Fn(&Value)>);

impl Callback {
    pub fn new(f: impl Fn(&Value) + 'static) -> Self {
        Self(Rc::new(f))
    }

    pub fn call(&self, arg: &Value) {
        (self.0)(arg)
    }
}

impl PartialEq for Callback {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Callback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Callback({:p})", Rc::as_ptr(&self.0) as *const ())
    }
}

// =============================================================================
// Value
// =============================================================================

/// A prop value.
#[derive(Clone, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(Rc<str>),
    List(Rc<[Value]>),
    Callback(Callback),
    /// Any other shared value, compared by pointer.
    Opaque(Rc<dyn Any>),
}

impl Value {
    pub fn opaque<T: 'static>(value: T) -> Self {
        Self::Opaque(Rc::new(value))
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(f) => Some(*f),
            Self::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_callback(&self) -> Option<&Callback> {
        match self {
            Self::Callback(cb) => Some(cb),
            _ => None,
        }
    }

    pub fn downcast_ref<T: 'static>(&self) -> Option<&T> {
        match self {
            Self::Opaque(any) => any.downcast_ref(),
            _ => None,
        }
    }

    #[inline]
    pub fn is_callback(&self) -> bool {
        matches!(self, Self::Callback(_))
    }
}

/// `Object.is`-style equality: floats compare bitwise (NaN equals NaN,
/// `0.0` differs from `-0.0`), shared values compare by pointer.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a.to_bits() == b.to_bits(),
            (Self::Str(a), Self::Str(b)) => a == b,
            (Self::List(a), Self::List(b)) => Rc::ptr_eq(a, b),
            (Self::Callback(a), Self::Callback(b)) => a == b,
            (Self::Opaque(a), Self::Opaque(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "null"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::Str(s) => write!(f, "{s:?}"),
            Self::List(items) => f.debug_list().entries(items.iter()).finish(),
            Self::Callback(cb) => cb.fmt(f),
            Self::Opaque(any) => write!(f, "Opaque({:p})", Rc::as_ptr(any) as *const ()),
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Self::Int(value as i64)
    }
}

impl From<usize> for Value {
    fn from(value: usize) -> Self {
        Self::Int(value as i64)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Str(value.into())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Str(value.into())
    }
}

impl From<Rc<str>> for Value {
    fn from(value: Rc<str>) -> Self {
        Self::Str(value)
    }
}

impl From<Callback> for Value {
    fn from(value: Callback) -> Self {
        Self::Callback(value)
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Self::List(value.into())
    }
}

// =============================================================================
// Style
// =============================================================================

/// Layout and visual style. Every field is optional so styles can be layered.
///
/// The layout fields form the fixed allow-list of layout-relevant props: a
/// change to any of them (and only them) makes the reconciler recompute
/// geometry.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Style {
    // Size
    pub width: Option<Dimension>,
    pub height: Option<Dimension>,
    pub min_width: Option<Dimension>,
    pub max_width: Option<Dimension>,
    pub min_height: Option<Dimension>,
    pub max_height: Option<Dimension>,
    pub x: Option<f32>,
    pub y: Option<f32>,

    // Container
    pub direction: Option<Direction>,
    pub gap: Option<f32>,
    pub padding: Option<Edges>,
    pub justify: Option<Justify>,
    pub align_items: Option<Align>,
    pub align_content: Option<AlignContent>,
    pub wrap: Option<Wrap>,
    pub overflow: Option<Overflow>,

    // Item
    pub margin: Option<Edges>,
    pub flex: Option<f32>,
    pub flex_shrink: Option<f32>,
    pub flex_basis: Option<Dimension>,
    pub align_self: Option<Align>,
    pub visible: Option<bool>,

    // Visual
    pub color: Option<u32>,
    pub background: Option<u32>,
    pub opacity: Option<f32>,
    pub z_index: Option<i32>,
}

macro_rules! style_setters {
    (into { $($field:ident: $ty:ty),* $(,)? } plain { $($pfield:ident: $pty:ty),* $(,)? }) => {
        $(
            pub fn $field(mut self, value: impl Into<$ty>) -> Self {
                self.$field = Some(value.into());
                self
            }
        )*
        $(
            pub fn $pfield(mut self, value: $pty) -> Self {
                self.$pfield = Some(value);
                self
            }
        )*
    };
}

macro_rules! layer_fields {
    ($top:expr, $base:expr; $($field:ident),* $(,)?) => {
        Style { $($field: $top.$field.or($base.$field),)* }
    };
}

impl Style {
    pub fn new() -> Self {
        Self::default()
    }

    style_setters! {
        into {
            width: Dimension,
            height: Dimension,
            min_width: Dimension,
            max_width: Dimension,
            min_height: Dimension,
            max_height: Dimension,
            flex_basis: Dimension,
            padding: Edges,
            margin: Edges,
        }
        plain {
            x: f32,
            y: f32,
            direction: Direction,
            gap: f32,
            justify: Justify,
            align_items: Align,
            align_content: AlignContent,
            wrap: Wrap,
            overflow: Overflow,
            flex: f32,
            flex_shrink: f32,
            align_self: Align,
            visible: bool,
            color: u32,
            background: u32,
            opacity: f32,
            z_index: i32,
        }
    }

    /// Fields set on `self` win; unset fields fall back to `base`.
    pub fn layered(&self, base: &Style) -> Style {
        layer_fields!(self, base;
            width, height, min_width, max_width, min_height, max_height, x, y,
            direction, gap, padding, justify, align_items, align_content, wrap, overflow,
            margin, flex, flex_shrink, flex_basis, align_self, visible,
            color, background, opacity, z_index,
        )
    }
}

impl From<f32> for Edges {
    fn from(value: f32) -> Self {
        Edges::all(value)
    }
}

impl From<f64> for Edges {
    fn from(value: f64) -> Self {
        Edges::all(value as f32)
    }
}

// =============================================================================
// Node refs
// =============================================================================

/// A box with a `current` field that holds the mounted native node.
#[derive(Clone, Default)]
pub struct RefSlot(Rc<RefCell<Option<Rc<dyn Any>>>>);

impl RefSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// The attached node, if the host node type is `N`.
    pub fn current<N: Clone + 'static>(&self) -> Option<N> {
        self.0.borrow().as_ref().and_then(|node| node.downcast_ref::<N>().cloned())
    }

    pub fn is_attached(&self) -> bool {
        self.0.borrow().is_some()
    }
}

impl fmt::Debug for RefSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RefSlot").field("attached", &self.is_attached()).finish()
    }
}

/// `ref` prop: a slot or a callback receiving the node (or `None` on detach).
#[derive(Clone)]
pub enum NodeRef {
    Slot(RefSlot),
    Callback(Rc<dyn Fn(Option<&dyn Any>)>),
}

impl NodeRef {
    pub fn callback(f: impl Fn(Option<&dyn Any>) + 'static) -> Self {
        Self::Callback(Rc::new(f))
    }

    pub(crate) fn attach<N: Clone + 'static>(&self, node: &N) {
        match self {
            Self::Slot(slot) => *slot.0.borrow_mut() = Some(Rc::new(node.clone())),
            Self::Callback(f) => f(Some(node as &dyn Any)),
        }
    }

    pub(crate) fn detach(&self) {
        match self {
            Self::Slot(slot) => *slot.0.borrow_mut() = None,
            Self::Callback(f) => f(None),
        }
    }
}

impl From<RefSlot> for NodeRef {
    fn from(slot: RefSlot) -> Self {
        Self::Slot(slot)
    }
}

impl PartialEq for NodeRef {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Slot(a), Self::Slot(b)) => Rc::ptr_eq(&a.0, &b.0),
            (Self::Callback(a), Self::Callback(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Debug for NodeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Slot(slot) => slot.fmt(f),
            Self::Callback(cb) => write!(f, "NodeRef::Callback({:p})", Rc::as_ptr(cb) as *const ()),
        }
    }
}

// =============================================================================
// Props
// =============================================================================

/// Sizing hints only the host bridge interprets (sizer-style expand/proportion).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AddConfig {
    pub expand: bool,
    pub proportion: i32,
}

pub type Attrs = BTreeMap<Rc<str>, Value>;

/// Props of a host element or component.
#[derive(Debug, Clone, Default)]
pub struct Props {
    pub style: Style,
    pub attrs: Attrs,
    /// Text content for text-like host nodes.
    pub text: Option<Rc<str>>,
    pub node_ref: Option<NodeRef>,
    /// Style override applied to this node and inherited by its subtree.
    pub theme: Option<Rc<ThemeOverride>>,
    pub add_config: Option<AddConfig>,
}

impl Props {
    pub fn attr(&self, name: &str) -> Option<&Value> {
        self.attrs.get(name)
    }

    /// Names of the attrs that differ between `self` and `other`, if every
    /// difference is a callback whose identity changed and nothing else differs.
    pub fn callback_only_changes(&self, other: &Props) -> Option<Vec<Rc<str>>> {
        if self.style != other.style
            || self.text != other.text
            || self.node_ref != other.node_ref
            || !same_theme(&self.theme, &other.theme)
            || self.add_config != other.add_config
            || self.attrs.len() != other.attrs.len()
        {
            return None;
        }

        let mut changed = Vec::new();
        for ((name, a), (other_name, b)) in self.attrs.iter().zip(other.attrs.iter()) {
            if name != other_name {
                return None;
            }
            if a != b {
                if !(a.is_callback() && b.is_callback()) {
                    return None;
                }
                changed.push(name.clone());
            }
        }
        (!changed.is_empty()).then_some(changed)
    }
}

impl PartialEq for Props {
    fn eq(&self, other: &Self) -> bool {
        self.style == other.style
            && self.attrs == other.attrs
            && self.text == other.text
            && self.node_ref == other.node_ref
            && same_theme(&self.theme, &other.theme)
            && self.add_config == other.add_config
    }
}

/// Theme contexts compare by identity.
pub(crate) fn same_theme(a: &Option<Rc<ThemeOverride>>, b: &Option<Rc<ThemeOverride>>) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(a), Some(b)) => Rc::ptr_eq(a, b),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_object_is_semantics() {
        assert_eq!(Value::Float(f64::NAN), Value::Float(f64::NAN));
        assert_ne!(Value::Float(0.0), Value::Float(-0.0));
        assert_eq!(Value::from("a"), Value::from(String::from("a")));
        assert_ne!(Value::Int(1), Value::Float(1.0));

        let list: Rc<[Value]> = vec![Value::Int(1)].into();
        assert_eq!(Value::List(list.clone()), Value::List(list));
        assert_ne!(Value::from(vec![Value::Int(1)]), Value::from(vec![Value::Int(1)]));
    }

    #[test]
    fn test_callback_identity() {
        let cb = Callback::new(|_| {});
        assert_eq!(cb, cb.clone());
        assert_ne!(cb, Callback::new(|_| {}));
    }

    #[test]
    fn test_style_layering() {
        let base = Style::new().width(10.0).color(0xff0000).gap(2.0);
        let top = Style::new().width(20.0);
        let merged = top.layered(&base);
        assert_eq!(merged.width, Some(Dimension::Px(20.0)));
        assert_eq!(merged.color, Some(0xff0000));
        assert_eq!(merged.gap, Some(2.0));
    }

    #[test]
    fn test_callback_only_changes() {
        let mut a = Props::default();
        a.attrs.insert("label".into(), "ok".into());
        a.attrs.insert("on_press".into(), Callback::new(|_| {}).into());

        let mut b = a.clone();
        assert_eq!(a, b);
        b.attrs.insert("on_press".into(), Callback::new(|_| {}).into());
        assert_ne!(a, b);
        assert_eq!(a.callback_only_changes(&b), Some(vec![Rc::from("on_press")]));

        b.attrs.insert("label".into(), "changed".into());
        assert_eq!(a.callback_only_changes(&b), None);
    }

    #[test]
    fn test_ref_slot_attach_detach() {
        let slot = RefSlot::new();
        let node_ref = NodeRef::from(slot.clone());
        node_ref.attach(&42u32);
        assert_eq!(slot.current::<u32>(), Some(42));
        assert_eq!(slot.current::<String>(), None);
        node_ref.detach();
        assert!(!slot.is_attached());
    }
}
