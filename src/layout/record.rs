//! Layout record - the layout-relevant subset of a node's style.
//!
//! Built from the effective (theme-resolved) style with defaults filled in.
//! Comparing two records is how the reconciler decides whether a patch
//! touched geometry: visual-only changes leave the record equal.

use crate::types::{Align, AlignContent, Dimension, Direction, Edges, Justify, Overflow, Wrap};
use crate::vdom::Style;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutRecord {
    pub width: Dimension,
    pub height: Dimension,
    pub min_width: Dimension,
    pub max_width: Dimension,
    pub min_height: Dimension,
    pub max_height: Dimension,
    /// Offsets inside a stack container.
    pub x: f32,
    pub y: f32,

    pub direction: Direction,
    pub gap: f32,
    pub padding: Edges,
    pub justify: Justify,
    pub align_items: Align,
    pub align_content: AlignContent,
    pub wrap: Wrap,
    pub overflow: Overflow,

    pub margin: Edges,
    pub grow: f32,
    pub shrink: f32,
    pub basis: Dimension,
    pub align_self: Option<Align>,
    pub visible: bool,
}

impl Default for LayoutRecord {
    fn default() -> Self {
        Self {
            width: Dimension::Auto,
            height: Dimension::Auto,
            min_width: Dimension::Auto,
            max_width: Dimension::Auto,
            min_height: Dimension::Auto,
            max_height: Dimension::Auto,
            x: 0.0,
            y: 0.0,
            direction: Direction::Column,
            gap: 0.0,
            padding: Edges::ZERO,
            justify: Justify::Start,
            align_items: Align::Stretch,
            align_content: AlignContent::Start,
            wrap: Wrap::NoWrap,
            overflow: Overflow::Visible,
            margin: Edges::ZERO,
            grow: 0.0,
            shrink: 1.0,
            basis: Dimension::Auto,
            align_self: None,
            visible: true,
        }
    }
}

impl From<&Style> for LayoutRecord {
    fn from(style: &Style) -> Self {
        let d = Self::default();
        Self {
            width: style.width.unwrap_or(d.width),
            height: style.height.unwrap_or(d.height),
            min_width: style.min_width.unwrap_or(d.min_width),
            max_width: style.max_width.unwrap_or(d.max_width),
            min_height: style.min_height.unwrap_or(d.min_height),
            max_height: style.max_height.unwrap_or(d.max_height),
            x: style.x.unwrap_or(d.x),
            y: style.y.unwrap_or(d.y),
            direction: style.direction.unwrap_or(d.direction),
            gap: style.gap.unwrap_or(d.gap).max(0.0),
            padding: style.padding.unwrap_or(d.padding),
            justify: style.justify.unwrap_or(d.justify),
            align_items: style.align_items.unwrap_or(d.align_items),
            align_content: style.align_content.unwrap_or(d.align_content),
            wrap: style.wrap.unwrap_or(d.wrap),
            overflow: style.overflow.unwrap_or(d.overflow),
            margin: style.margin.unwrap_or(d.margin),
            grow: style.flex.unwrap_or(d.grow).max(0.0),
            shrink: style.flex_shrink.unwrap_or(d.shrink).max(0.0),
            basis: style.flex_basis.unwrap_or(d.basis),
            align_self: style.align_self,
            visible: style.visible.unwrap_or(d.visible),
        }
    }
}

impl LayoutRecord {
    /// A stack container with all defaults, used for mount roots.
    pub fn root() -> Self {
        Self {
            direction: Direction::Stack,
            ..Self::default()
        }
    }

    /// Whether this node's box depends on its content on either axis.
    pub fn sized_by_content(&self) -> bool {
        self.width.is_auto() || self.height.is_auto()
    }

    /// `overflow: hidden` clips children to the content box.
    #[inline]
    pub fn clips(&self) -> bool {
        self.overflow == Overflow::Hidden
    }

    pub(crate) fn main_dimension(&self, row: bool) -> Dimension {
        if row { self.width } else { self.height }
    }

    pub(crate) fn cross_dimension(&self, row: bool) -> Dimension {
        if row { self.height } else { self.width }
    }

    pub(crate) fn main_bounds(&self, row: bool) -> (Dimension, Dimension) {
        if row {
            (self.min_width, self.max_width)
        } else {
            (self.min_height, self.max_height)
        }
    }

    pub(crate) fn cross_bounds(&self, row: bool) -> (Dimension, Dimension) {
        if row {
            (self.min_height, self.max_height)
        } else {
            (self.min_width, self.max_width)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visual_changes_keep_record_equal() {
        let a = Style::new().width(10.0).color(0xffffff);
        let b = Style::new().width(10.0).color(0x000000).opacity(0.5);
        assert_eq!(LayoutRecord::from(&a), LayoutRecord::from(&b));
    }

    #[test]
    fn test_layout_changes_differ() {
        let a = Style::new().width(10.0);
        let b = Style::new().width(10.0).gap(1.0);
        assert_ne!(LayoutRecord::from(&a), LayoutRecord::from(&b));
    }

    #[test]
    fn test_defaults() {
        let record = LayoutRecord::from(&Style::new());
        assert_eq!(record.direction, Direction::Column);
        assert_eq!(record.align_items, Align::Stretch);
        assert_eq!(record.shrink, 1.0);
        assert!(record.visible);
        assert!(record.sized_by_content());
    }
}
