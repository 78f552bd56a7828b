//! Virtual node model: what renders produce and the reconciler consumes.

mod component;
mod props;
mod vnode;

pub use component::{Component, ComponentNode, RenderFn};
pub use props::{AddConfig, Attrs, Callback, NodeRef, Props, RefSlot, Style, Value};
pub(crate) use props::same_theme;
pub use vnode::{
    ComponentBuilder, Element, ElementBuilder, ElementNode, FragmentNode, Key, VNode, element,
    flatten_children, fragment, keyed_fragment, text, view,
};
