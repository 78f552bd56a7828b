//! Components - render functions with a stable identity.

use std::fmt;
use std::rc::Rc;

use super::props::Props;
use super::vnode::{ComponentBuilder, Element, Key, VNode};
use crate::hooks::Scope;

/// Plain render function.
pub type RenderFn = fn(&mut Scope<'_>, &Props, &[VNode]) -> Element;

type RenderClosure = dyn Fn(&mut Scope<'_>, &Props, &[VNode]) -> Element;

#[derive(Clone)]
enum Render {
    Fn(RenderFn),
    Closure(Rc<RenderClosure>),
}

/// A component type.
///
/// Two components are the same type only if they wrap the same function
/// pointer or clones of the same closure `Rc`. Building a new closure
/// component during a render produces a new type and remounts its subtree.
#[derive(Clone)]
pub struct Component {
    name: &'static str,
    render: Render,
}

impl Component {
    pub const fn new(name: &'static str, render: RenderFn) -> Self {
        Self {
            name,
            render: Render::Fn(render),
        }
    }

    pub fn from_closure(
        name: &'static str,
        render: impl Fn(&mut Scope<'_>, &Props, &[VNode]) -> Element + 'static,
    ) -> Self {
        Self {
            name,
            render: Render::Closure(Rc::new(render)),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Start building an instance of this component.
    pub fn with(&self) -> ComponentBuilder {
        ComponentBuilder::new(self.clone())
    }

    /// Shorthand for an instance with default props and no children.
    pub fn node(&self) -> VNode {
        self.with().build()
    }

    pub(crate) fn render(&self, scope: &mut Scope<'_>, props: &Props, children: &[VNode]) -> Element {
        match &self.render {
            Render::Fn(f) => f(scope, props, children),
            Render::Closure(f) => f(scope, props, children),
        }
    }
}

impl PartialEq for Component {
    fn eq(&self, other: &Self) -> bool {
        match (&self.render, &other.render) {
            (Render::Fn(a), Render::Fn(b)) => *a as usize == *b as usize,
            (Render::Closure(a), Render::Closure(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Debug for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Component").field(&self.name).finish()
    }
}

/// A component instance in a VNode tree.
#[derive(Debug, Clone)]
pub struct ComponentNode {
    pub component: Component,
    pub key: Option<Key>,
    pub props: Props,
    pub children: Vec<VNode>,
    /// `None`: memoize when the instance keeps a context (it uses hooks).
    pub memo: Option<bool>,
}

impl ComponentNode {
    /// Props shallow-equal and children identical by pointer.
    pub(crate) fn same_inputs(&self, other: &ComponentNode) -> bool {
        self.props == other.props && self.same_children(other)
    }

    pub(crate) fn same_children(&self, other: &ComponentNode) -> bool {
        self.children.len() == other.children.len()
            && self.children.iter().zip(&other.children).all(|(a, b)| a.ptr_eq(b))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn first(_: &mut Scope<'_>, _: &Props, _: &[VNode]) -> Element {
        None
    }

    fn second(_: &mut Scope<'_>, _: &Props, _: &[VNode]) -> Element {
        Some(VNode::from("second"))
    }

    #[test]
    fn test_fn_identity() {
        let a = Component::new("First", first);
        assert_eq!(a, Component::new("First", first));
        assert_ne!(a, Component::new("First", second));
    }

    #[test]
    fn test_closure_identity() {
        let a = Component::from_closure("Inline", |_, _, _| None);
        let b = Component::from_closure("Inline", |_, _, _| None);
        assert_eq!(a, a.clone());
        assert_ne!(a, b);
        assert_eq!(a.name(), b.name());
    }

    #[test]
    fn test_same_inputs_uses_child_identity() {
        let shared = VNode::from(vec![VNode::from("x")]);
        let comp = Component::new("First", first);
        let a = comp.with().attr("n", 1).child(shared.clone());
        let b = comp.with().attr("n", 1).child(shared);
        let (VNode::Component(a), VNode::Component(b)) = (a.build(), b.build()) else {
            unreachable!()
        };
        assert!(a.same_inputs(&b));

        let c = comp.with().attr("n", 1).child(VNode::from(vec![VNode::from("x")]));
        let VNode::Component(c) = c.build() else { unreachable!() };
        assert!(!a.same_inputs(&c));
    }
}
