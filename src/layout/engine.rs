//! Flex engine - child frames for one container.
//!
//! Pure functions: given a container's layout record, its box size and the
//! layout inputs of its direct children, compute each child's frame. The
//! engine never looks further down or up the tree; the reconciler walks the
//! tree and decides which containers need a pass.
//!
//! # Algorithm
//!
//! 1. **Stack**: every child sits at the content origin offset by its `x`/`y`
//! 2. **Flow, step 1**: hypothetical main sizes (basis) and flex lines
//! 3. **Flow, step 2**: grow/shrink per line, then cross sizes
//! 4. **Flow, step 3**: line placement (`align_content`), then item
//!    placement (`justify`, `align_items`/`align_self`)
//!
//! All outputs are clamped to zero or more.

use super::record::LayoutRecord;
use crate::types::{Align, AlignContent, Dimension, Direction, Frame, Justify, Size, Wrap};

/// Layout input for one child.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutItem {
    pub record: LayoutRecord,
    /// Size the child would take on its own (measured or intrinsic).
    pub natural: Size,
}

impl LayoutItem {
    pub fn new(record: LayoutRecord, natural: Size) -> Self {
        Self { record, natural }
    }
}

// =============================================================================
// Dimension helpers
// =============================================================================

fn clamp_to(value: f32, (min, max): (Dimension, Dimension), basis: f32, viewport: Size) -> f32 {
    let mut v = value;
    if let Some(max) = max.resolve(basis, viewport) {
        v = v.min(max);
    }
    if let Some(min) = min.resolve(basis, viewport) {
        v = v.max(min);
    }
    v.max(0.0)
}

/// A dimension that resolves without a parent basis.
fn fixed(dim: Dimension, viewport: Size) -> Option<f32> {
    match dim {
        Dimension::Auto | Dimension::Fill | Dimension::Percent(_) => None,
        Dimension::Calc(expr) if expr.percent != 0.0 => None,
        other => other.resolve(0.0, viewport),
    }
}

/// Outer box of a node laid out on its own inside `available`.
///
/// `Auto` takes the natural size, `Fill` and percentages resolve against
/// `available`. Min/max bounds apply last.
pub fn resolve_box(record: &LayoutRecord, available: Size, natural: Size, viewport: Size) -> Size {
    let width = record.width.resolve(available.width, viewport).unwrap_or(natural.width);
    let height = record.height.resolve(available.height, viewport).unwrap_or(natural.height);
    Size::new(
        clamp_to(width, (record.min_width, record.max_width), available.width, viewport),
        clamp_to(height, (record.min_height, record.max_height), available.height, viewport),
    )
}

/// Natural size of a container from its children, padding included.
///
/// Children sized relative to the container (percent, fill) count with
/// their natural size. Wrapping is ignored: the intrinsic size is the
/// single-line size.
pub fn intrinsic_size(record: &LayoutRecord, items: &[LayoutItem], viewport: Size) -> Size {
    let visible = items.iter().filter(|item| item.record.visible);

    let outer = |item: &LayoutItem| {
        let r = &item.record;
        let w = fixed(r.width, viewport).unwrap_or(item.natural.width);
        let h = fixed(r.height, viewport).unwrap_or(item.natural.height);
        let w = clamp_to(w, (r.min_width, r.max_width), 0.0, viewport);
        let h = clamp_to(h, (r.min_height, r.max_height), 0.0, viewport);
        Size::new(w + r.margin.horizontal(), h + r.margin.vertical())
    };

    let content = match record.direction {
        Direction::Stack => visible.fold(Size::ZERO, |acc, item| {
            let size = outer(item);
            Size::new(
                acc.width.max(item.record.x + size.width),
                acc.height.max(item.record.y + size.height),
            )
        }),
        direction => {
            let row = direction.is_row();
            let mut main = 0.0f32;
            let mut cross = 0.0f32;
            let mut count = 0usize;
            for item in visible {
                let size = outer(item);
                main += size.main(row);
                cross = cross.max(size.cross(row));
                count += 1;
            }
            if count > 1 {
                main += record.gap * (count - 1) as f32;
            }
            Size::from_axes(main, cross, row)
        }
    };

    Size::new(
        (content.width + record.padding.horizontal()).max(0.0),
        (content.height + record.padding.vertical()).max(0.0),
    )
}

// =============================================================================
// Children
// =============================================================================

/// Frames for `items`, relative to the container's origin.
///
/// The result has one frame per item. Invisible items get an empty frame
/// at the content origin and take no space.
pub fn compute_children(
    record: &LayoutRecord,
    size: Size,
    items: &[LayoutItem],
    viewport: Size,
) -> Vec<Frame> {
    let content = size.inset(record.padding);
    let origin = (record.padding.left, record.padding.top);
    let mut frames = vec![Frame::new(origin.0, origin.1, 0.0, 0.0); items.len()];

    match record.direction {
        Direction::Stack => layout_stack(items, content, origin, viewport, &mut frames),
        direction => layout_flow(record, direction.is_row(), items, content, origin, viewport, &mut frames),
    }

    frames
}

fn layout_stack(
    items: &[LayoutItem],
    content: Size,
    origin: (f32, f32),
    viewport: Size,
    frames: &mut [Frame],
) {
    for (item, frame) in items.iter().zip(frames.iter_mut()) {
        let r = &item.record;
        if !r.visible {
            continue;
        }
        let available = Size::new(
            (content.width - r.margin.horizontal()).max(0.0),
            (content.height - r.margin.vertical()).max(0.0),
        );
        let size = resolve_box(r, available, item.natural, viewport);
        *frame = Frame::new(
            origin.0 + r.margin.left + r.x,
            origin.1 + r.margin.top + r.y,
            size.width,
            size.height,
        );
    }
}

/// Per-item working state for a flow pass.
#[derive(Debug, Clone, Copy)]
struct FlexItem {
    index: usize,
    basis: f32,
    grow: f32,
    shrink: f32,
    main: f32,
    cross: f32,
    margin_main: f32,
    margin_cross: f32,
    explicit_cross: Option<f32>,
    align: Align,
}

struct FlexLine {
    start: usize,
    end: usize,
    cross: f32,
}

fn layout_flow(
    record: &LayoutRecord,
    row: bool,
    items: &[LayoutItem],
    content: Size,
    origin: (f32, f32),
    viewport: Size,
    frames: &mut [Frame],
) {
    let main_size = content.main(row);
    let cross_size = content.cross(row);
    let gap = record.gap;

    let mut flex: Vec<FlexItem> = items
        .iter()
        .enumerate()
        .filter(|(_, item)| item.record.visible)
        .map(|(index, item)| hypothetical(index, item, row, main_size, cross_size, record.align_items, viewport))
        .collect();

    if flex.is_empty() {
        return;
    }

    // =========================================================================
    // Step 1: Collect items into flex lines
    // =========================================================================

    let mut lines: Vec<FlexLine> = Vec::new();
    let mut line_start = 0;
    let mut used = 0.0f32;
    for (fi, item) in flex.iter().enumerate() {
        let outer = item.basis + item.margin_main;
        let next = if fi > line_start { used + gap + outer } else { outer };
        if record.wrap == Wrap::Wrap && fi > line_start && next > main_size {
            lines.push(FlexLine { start: line_start, end: fi, cross: 0.0 });
            line_start = fi;
            used = outer;
        } else {
            used = next;
        }
    }
    lines.push(FlexLine { start: line_start, end: flex.len(), cross: 0.0 });

    // =========================================================================
    // Step 2: Resolve flex grow/shrink per line, then cross sizes
    // =========================================================================

    let single_line = record.wrap == Wrap::NoWrap;
    for line in &mut lines {
        let members = &mut flex[line.start..line.end];
        let used: f32 = members.iter().map(|i| i.basis + i.margin_main).sum::<f32>()
            + gap * (members.len().saturating_sub(1)) as f32;
        let free = main_size - used;
        let total_grow: f32 = members.iter().map(|i| i.grow).sum();
        let total_shrink: f32 = members.iter().map(|i| i.shrink).sum();

        for item in members.iter_mut() {
            let r = &items[item.index].record;
            let mut main = item.basis;
            if free > 0.0 && total_grow > 0.0 {
                main += free * item.grow / total_grow;
            } else if free < 0.0 && total_shrink > 0.0 {
                main -= -free * item.shrink / total_shrink;
            }
            item.main = clamp_to(main, r.main_bounds(row), main_size, viewport);
        }

        line.cross = if single_line {
            cross_size
        } else {
            members
                .iter()
                .map(|i| i.explicit_cross.unwrap_or(i.cross) + i.margin_cross)
                .fold(0.0, f32::max)
        };
    }

    // =========================================================================
    // Step 3: Position lines and items
    // =========================================================================

    let line_gap = if single_line { 0.0 } else { gap };
    let total_cross: f32 = lines.iter().map(|l| l.cross).sum::<f32>() + line_gap * (lines.len() - 1) as f32;
    let free_cross = (cross_size - total_cross).max(0.0);
    let line_count = lines.len() as f32;

    let (mut cross_offset, line_spacing) = if single_line {
        (0.0, 0.0)
    } else {
        match record.align_content {
            AlignContent::Start => (0.0, 0.0),
            AlignContent::Center => (free_cross / 2.0, 0.0),
            AlignContent::End => (free_cross, 0.0),
            AlignContent::SpaceBetween if lines.len() > 1 => (0.0, free_cross / (line_count - 1.0)),
            AlignContent::SpaceBetween => (0.0, 0.0),
            AlignContent::SpaceAround => (free_cross / line_count / 2.0, free_cross / line_count),
            AlignContent::Stretch => {
                let extra = free_cross / line_count;
                for line in &mut lines {
                    line.cross += extra;
                }
                (0.0, 0.0)
            }
        }
    };

    for line in &lines {
        let members = &flex[line.start..line.end];
        let count = members.len() as f32;
        let line_main: f32 = members.iter().map(|i| i.main + i.margin_main).sum::<f32>()
            + gap * (count - 1.0);
        let remaining = (main_size - line_main).max(0.0);

        let (mut main_offset, extra) = match record.justify {
            Justify::Start => (0.0, 0.0),
            Justify::Center => (remaining / 2.0, 0.0),
            Justify::End => (remaining, 0.0),
            Justify::SpaceBetween if members.len() > 1 => (0.0, remaining / (count - 1.0)),
            Justify::SpaceBetween => (0.0, 0.0),
            Justify::SpaceAround => (remaining / count / 2.0, remaining / count),
            Justify::SpaceEvenly => (remaining / (count + 1.0), remaining / (count + 1.0)),
        };

        for item in members {
            let r = &items[item.index].record;
            let room = (line.cross - item.margin_cross).max(0.0);
            let cross = match (item.explicit_cross, item.align) {
                (Some(explicit), _) => explicit,
                (None, Align::Stretch) => clamp_to(room, r.cross_bounds(row), cross_size, viewport),
                (None, _) => item.cross,
            };

            let margin_start = r.margin.cross_start(row);
            let cross_pos = match item.align {
                Align::Center => margin_start + (room - cross) / 2.0,
                Align::End => margin_start + room - cross,
                Align::Start | Align::Stretch => margin_start,
            };

            let main_pos = main_offset + r.margin.main_start(row);
            let (x, y) = if row { (main_pos, cross_offset + cross_pos) } else { (cross_offset + cross_pos, main_pos) };
            let size = Size::from_axes(item.main.max(0.0), cross.max(0.0), row);
            frames[item.index] = Frame::new(origin.0 + x, origin.1 + y, size.width, size.height);

            main_offset += item.main + item.margin_main + gap + extra;
        }

        cross_offset += line.cross + line_gap + line_spacing;
    }
}

/// Basis and unstretched cross size of one visible item.
fn hypothetical(
    index: usize,
    item: &LayoutItem,
    row: bool,
    main_size: f32,
    cross_size: f32,
    align_items: Align,
    viewport: Size,
) -> FlexItem {
    let r = &item.record;
    let main_dim = r.main_dimension(row);
    let mut grow = r.grow;

    let basis = match r.basis {
        Dimension::Auto | Dimension::Fill => None,
        basis => basis.resolve(main_size, viewport),
    };
    let basis = match (basis, main_dim) {
        (Some(b), _) => b,
        (None, Dimension::Fill) => {
            grow = grow.max(1.0);
            0.0
        }
        (None, Dimension::Auto) => item.natural.main(row),
        (None, dim) => dim.resolve(main_size, viewport).unwrap_or(0.0),
    };
    let basis = clamp_to(basis, r.main_bounds(row), main_size, viewport);

    let margin_cross = r.margin.cross(row);
    let explicit_cross = r
        .cross_dimension(row)
        .resolve((cross_size - margin_cross).max(0.0), viewport)
        .map(|c| clamp_to(c, r.cross_bounds(row), cross_size, viewport));
    let natural_cross = clamp_to(item.natural.cross(row), r.cross_bounds(row), cross_size, viewport);

    FlexItem {
        index,
        basis,
        grow,
        shrink: r.shrink,
        main: basis,
        cross: natural_cross,
        margin_main: r.margin.main(row),
        margin_cross,
        explicit_cross,
        align: r.align_self.unwrap_or(align_items),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Edges, Overflow};

    const VIEWPORT: Size = Size::new(1000.0, 500.0);

    fn container(direction: Direction) -> LayoutRecord {
        LayoutRecord { direction, ..LayoutRecord::default() }
    }

    fn item(record: LayoutRecord) -> LayoutItem {
        LayoutItem::new(record, Size::ZERO)
    }

    fn sized(w: f32, h: f32) -> LayoutItem {
        item(LayoutRecord {
            width: Dimension::Px(w),
            height: Dimension::Px(h),
            ..LayoutRecord::default()
        })
    }

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 0.01
    }

    #[test]
    fn test_percent_of_content_area() {
        let parent = LayoutRecord {
            padding: Edges::all(10.0),
            ..container(Direction::Row)
        };
        let child = item(LayoutRecord {
            width: Dimension::Percent(50.0),
            ..LayoutRecord::default()
        });
        let frames = compute_children(&parent, Size::new(710.0, 100.0), &[child], VIEWPORT);
        assert_eq!(frames[0].width, 345.0);
        assert_eq!(frames[0].x, 10.0);
        assert_eq!(frames[0].height, 80.0);
    }

    #[test]
    fn test_flex_grow_ratio() {
        let parent = container(Direction::Row);
        let one = item(LayoutRecord { grow: 1.0, ..LayoutRecord::default() });
        let two = item(LayoutRecord { grow: 2.0, ..LayoutRecord::default() });
        let frames = compute_children(&parent, Size::new(200.0, 10.0), &[one, two], VIEWPORT);
        assert!(approx(frames[0].width, 66.67));
        assert!(approx(frames[1].width, 133.33));
        assert!(approx(frames[1].x, 66.67));
    }

    #[test]
    fn test_row_children_stay_inside_without_overlap() {
        let parent = LayoutRecord {
            gap: 5.0,
            padding: Edges::all(2.0),
            ..container(Direction::Row)
        };
        let items = [sized(20.0, 5.0), sized(30.0, 5.0), sized(40.0, 5.0)];
        let frames = compute_children(&parent, Size::new(200.0, 20.0), &items, VIEWPORT);
        assert_eq!(frames[0].x, 2.0);
        assert_eq!(frames[1].x, 27.0);
        assert_eq!(frames[2].x, 62.0);
        for pair in frames.windows(2) {
            assert!(pair[0].x + pair[0].width <= pair[1].x);
        }
    }

    #[test]
    fn test_shrink_on_overflow() {
        let parent = container(Direction::Row);
        let items = [sized(80.0, 5.0), sized(40.0, 5.0)];
        let frames = compute_children(&parent, Size::new(100.0, 10.0), &items, VIEWPORT);
        assert_eq!(frames[0].width, 70.0);
        assert_eq!(frames[1].width, 30.0);
    }

    #[test]
    fn test_fill_takes_remaining_space() {
        let parent = container(Direction::Column);
        let fill = item(LayoutRecord {
            height: Dimension::Fill,
            ..LayoutRecord::default()
        });
        let frames = compute_children(&parent, Size::new(50.0, 100.0), &[sized(50.0, 30.0), fill], VIEWPORT);
        assert_eq!(frames[1].y, 30.0);
        assert_eq!(frames[1].height, 70.0);
        assert_eq!(frames[1].width, 50.0);
    }

    #[test]
    fn test_justify_modes() {
        let cases = [
            (Justify::Center, [35.0, 50.0]),
            (Justify::End, [70.0, 85.0]),
            (Justify::SpaceBetween, [0.0, 85.0]),
            (Justify::SpaceAround, [17.5, 67.5]),
            (Justify::SpaceEvenly, [70.0 / 3.0, 140.0 / 3.0 + 15.0]),
        ];
        for (justify, expected) in cases {
            let parent = LayoutRecord { justify, ..container(Direction::Row) };
            let items = [sized(15.0, 5.0), sized(15.0, 5.0)];
            let frames = compute_children(&parent, Size::new(100.0, 10.0), &items, VIEWPORT);
            assert!(approx(frames[0].x, expected[0]), "{justify:?}");
            assert!(approx(frames[1].x, expected[1]), "{justify:?}");
        }
    }

    #[test]
    fn test_align_items() {
        let parent = LayoutRecord {
            align_items: Align::Center,
            ..container(Direction::Row)
        };
        let frames = compute_children(&parent, Size::new(100.0, 20.0), &[sized(10.0, 10.0)], VIEWPORT);
        assert_eq!(frames[0].y, 5.0);

        let stretch = container(Direction::Row);
        let auto_height = item(LayoutRecord {
            width: Dimension::Px(10.0),
            ..LayoutRecord::default()
        });
        let frames = compute_children(&stretch, Size::new(100.0, 20.0), &[auto_height], VIEWPORT);
        assert_eq!(frames[0].height, 20.0);
    }

    #[test]
    fn test_wrap_starts_new_line() {
        let parent = LayoutRecord {
            wrap: Wrap::Wrap,
            ..container(Direction::Row)
        };
        let items = [sized(60.0, 10.0), sized(60.0, 10.0), sized(30.0, 5.0)];
        let frames = compute_children(&parent, Size::new(100.0, 100.0), &items, VIEWPORT);
        assert_eq!((frames[0].x, frames[0].y), (0.0, 0.0));
        assert_eq!((frames[1].x, frames[1].y), (0.0, 10.0));
        assert_eq!((frames[2].x, frames[2].y), (60.0, 10.0));
    }

    #[test]
    fn test_stack_offsets_from_content_origin() {
        let parent = LayoutRecord {
            padding: Edges::all(4.0),
            ..container(Direction::Stack)
        };
        let child = item(LayoutRecord {
            width: Dimension::Px(10.0),
            height: Dimension::Px(10.0),
            x: 3.0,
            y: 7.0,
            ..LayoutRecord::default()
        });
        let frames = compute_children(&parent, Size::new(50.0, 50.0), &[child], VIEWPORT);
        assert_eq!(frames[0], Frame::new(7.0, 11.0, 10.0, 10.0));
    }

    #[test]
    fn test_invisible_children_take_no_space() {
        let parent = container(Direction::Row);
        let hidden = item(LayoutRecord {
            width: Dimension::Px(50.0),
            visible: false,
            ..LayoutRecord::default()
        });
        let frames = compute_children(&parent, Size::new(100.0, 10.0), &[hidden, sized(10.0, 10.0)], VIEWPORT);
        assert_eq!(frames[0].width, 0.0);
        assert_eq!(frames[1].x, 0.0);
    }

    #[test]
    fn test_margins_occupy_main_axis() {
        let parent = container(Direction::Column);
        let child = item(LayoutRecord {
            height: Dimension::Px(10.0),
            margin: Edges::new(3.0, 0.0, 2.0, 4.0),
            ..LayoutRecord::default()
        });
        let frames = compute_children(&parent, Size::new(40.0, 100.0), &[child, sized(5.0, 5.0)], VIEWPORT);
        assert_eq!(frames[0].y, 3.0);
        assert_eq!(frames[0].x, 4.0);
        assert_eq!(frames[0].width, 36.0);
        assert_eq!(frames[1].y, 15.0);
    }

    #[test]
    fn test_viewport_units() {
        let parent = container(Direction::Stack);
        let child = item(LayoutRecord {
            width: Dimension::Vw(10.0),
            height: Dimension::Vh(10.0),
            ..LayoutRecord::default()
        });
        let frames = compute_children(&parent, Size::new(10.0, 10.0), &[child], VIEWPORT);
        assert_eq!(frames[0].size(), Size::new(100.0, 50.0));
    }

    #[test]
    fn test_intrinsic_size_sums_main_axis() {
        let parent = LayoutRecord {
            gap: 1.0,
            padding: Edges::all(1.0),
            overflow: Overflow::Visible,
            ..container(Direction::Row)
        };
        let items = [
            LayoutItem::new(LayoutRecord::default(), Size::new(5.0, 1.0)),
            sized(10.0, 3.0),
        ];
        assert_eq!(intrinsic_size(&parent, &items, VIEWPORT), Size::new(18.0, 5.0));
    }

    #[test]
    fn test_resolve_box_clamps() {
        let record = LayoutRecord {
            width: Dimension::Percent(100.0),
            max_width: Dimension::Px(50.0),
            min_height: Dimension::Px(4.0),
            ..LayoutRecord::default()
        };
        let size = resolve_box(&record, Size::new(300.0, 300.0), Size::new(1.0, 1.0), VIEWPORT);
        assert_eq!(size, Size::new(50.0, 4.0));
    }
}
