//! Theme resolution for host elements.
//!
//! A [`ThemeResolver`] turns a node's explicit props into the effective
//! props handed to the host, and decides the style context its children
//! inherit. Priority, lowest to highest:
//!
//! 1. the resolver's global defaults
//! 2. the inherited context from themed ancestors
//! 3. the node's own `theme` override
//! 4. the node's explicit style
//!
//! # Example
//!
//! ```rust
//! use std::rc::Rc;
//! use spark_scene::theme::{DefaultTheme, ThemeOverride, ThemeResolver};
//! use spark_scene::vdom::{Props, Style};
//!
//! let theme = DefaultTheme::new(ThemeOverride::new().tag("text", Style::new().color(0xcccccc)));
//! let resolved = theme.resolve("text", None, &Props::default());
//! assert_eq!(resolved.props.style.color, Some(0xcccccc));
//! ```

use std::collections::BTreeMap;
use std::rc::Rc;

use crate::vdom::{Props, Style};

// =============================================================================
// ThemeOverride - a style context
// =============================================================================

/// Styles applied to a subtree: one for every node, plus per-tag styles.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ThemeOverride {
    pub all: Style,
    pub tags: BTreeMap<&'static str, Style>,
}

impl ThemeOverride {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn for_all(mut self, style: Style) -> Self {
        self.all = style;
        self
    }

    pub fn tag(mut self, tag: &'static str, style: Style) -> Self {
        self.tags.insert(tag, style);
        self
    }

    pub fn shared(self) -> Rc<Self> {
        Rc::new(self)
    }

    /// Style for `tag`: the tag entry layered over `all`.
    pub fn style_for(&self, tag: &str) -> Style {
        match self.tags.get(tag) {
            Some(style) => style.layered(&self.all),
            None => self.all,
        }
    }

    /// `self` layered over `parent`, field by field and tag by tag.
    pub fn merged_over(&self, parent: &ThemeOverride) -> ThemeOverride {
        let mut tags = parent.tags.clone();
        for (tag, style) in &self.tags {
            let merged = match parent.tags.get(tag) {
                Some(base) => style.layered(base),
                None => *style,
            };
            tags.insert(*tag, merged);
        }
        ThemeOverride {
            all: self.all.layered(&parent.all),
            tags,
        }
    }
}

// =============================================================================
// Resolver
// =============================================================================

/// Result of resolving one node.
#[derive(Debug, Clone)]
pub struct Resolved {
    /// Props to create or patch the native node with.
    pub props: Props,
    /// Context inherited by the node's children.
    pub for_children: Option<Rc<ThemeOverride>>,
}

pub trait ThemeResolver {
    fn resolve(&self, tag: &str, inherited: Option<&Rc<ThemeOverride>>, explicit: &Props) -> Resolved;
}

/// Layered resolver with an optional global default context.
#[derive(Debug, Clone, Default)]
pub struct DefaultTheme {
    global: ThemeOverride,
}

impl DefaultTheme {
    pub fn new(global: ThemeOverride) -> Self {
        Self { global }
    }
}

impl ThemeResolver for DefaultTheme {
    fn resolve(&self, tag: &str, inherited: Option<&Rc<ThemeOverride>>, explicit: &Props) -> Resolved {
        let mut style = self.global.style_for(tag);
        if let Some(inherited) = inherited {
            style = inherited.style_for(tag).layered(&style);
        }
        if let Some(local) = &explicit.theme {
            style = local.style_for(tag).layered(&style);
        }
        style = explicit.style.layered(&style);

        let for_children = match (inherited, &explicit.theme) {
            (_, None) => inherited.cloned(),
            (None, Some(local)) => Some(local.clone()),
            (Some(inherited), Some(local)) => Some(Rc::new(local.merged_over(inherited))),
        };

        Resolved {
            props: Props {
                style,
                ..explicit.clone()
            },
            for_children,
        }
    }
}

/// Keep `previous` when `next` has the same contents, so unchanged contexts
/// keep their identity across patches.
pub(crate) fn stable_context(
    previous: &Option<Rc<ThemeOverride>>,
    next: Option<Rc<ThemeOverride>>,
) -> Option<Rc<ThemeOverride>> {
    match (previous, next) {
        (Some(prev), Some(next)) if Rc::ptr_eq(prev, &next) || **prev == *next => Some(prev.clone()),
        (_, next) => next,
    }
}
