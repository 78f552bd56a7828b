//! Layout through the reconciler, plus engine properties.

mod common;

use common::*;
use proptest::prelude::*;
use spark_scene::host::NodeId;
use spark_scene::layout::{LayoutItem, LayoutRecord, compute_children};
use spark_scene::types::{Dimension, Frame, Size};
use spark_scene::{Config, Direction, Justify, Overflow, RefSlot, Style, text, view};

fn attached(slot: &RefSlot) -> NodeId {
    slot.current::<NodeId>().unwrap()
}

#[test]
fn test_percent_of_padded_parent() {
    let inner = RefSlot::new();
    let (rt, root) = runtime(Size::new(800.0, 600.0));
    rt.mount(
        root,
        view()
            .style(Style::new().width(710.0).padding(10.0))
            .child(view().node_ref(inner.clone()).style(Style::new().width(Dimension::Percent(50.0)))),
    )
    .unwrap();

    let f = frame(&rt, attached(&inner));
    assert_eq!((f.x, f.width), (10.0, 345.0));
}

#[test]
fn test_flex_grow_splits_free_space() {
    let (a, b) = (RefSlot::new(), RefSlot::new());
    let (rt, root) = runtime(Size::new(400.0, 100.0));
    rt.mount(
        root,
        view()
            .style(Style::new().direction(Direction::Row).width(200.0).height(10.0))
            .child(view().node_ref(a.clone()).style(Style::new().flex(1.0)))
            .child(view().node_ref(b.clone()).style(Style::new().flex(2.0))),
    )
    .unwrap();

    let (fa, fb) = (frame(&rt, attached(&a)), frame(&rt, attached(&b)));
    assert!(approx(fa.width, 66.67), "{fa:?}");
    assert!(approx(fb.width, 133.33), "{fb:?}");
    assert!(approx(fb.x, fa.width));
    assert_eq!(fa.height, 10.0);
}

#[test]
fn test_column_stretches_cross_axis() {
    let child = RefSlot::new();
    let (rt, root) = runtime(Size::new(80.0, 24.0));
    rt.mount(
        root,
        view()
            .style(Style::new().width(20.0).height(10.0).padding(1.0))
            .child(view().node_ref(child.clone()).style(Style::new().height(2.0))),
    )
    .unwrap();

    assert_eq!(frame(&rt, attached(&child)), Frame::new(1.0, 1.0, 18.0, 2.0));
}

#[test]
fn test_justify_center() {
    let child = RefSlot::new();
    let (rt, root) = runtime(Size::new(80.0, 24.0));
    rt.mount(
        root,
        view()
            .style(Style::new().direction(Direction::Row).width(20.0).height(1.0).justify(Justify::Center))
            .child(view().node_ref(child.clone()).style(Style::new().width(4.0))),
    )
    .unwrap();

    assert_eq!(frame(&rt, attached(&child)).x, 8.0);
}

#[test]
fn test_stack_offsets_and_viewport_units() {
    let (a, b) = (RefSlot::new(), RefSlot::new());
    let (rt, root) = runtime(Size::new(80.0, 24.0));
    rt.mount(
        root,
        view()
            .style(Style::new().direction(Direction::Stack).width(Dimension::Percent(100.0)).height(24.0))
            .child(view().node_ref(a.clone()).style(Style::new().x(5.0).y(2.0).width(3.0).height(1.0)))
            .child(view().node_ref(b.clone()).style(Style::new().width(Dimension::Vw(50.0)).height(1.0))),
    )
    .unwrap();

    assert_eq!(frame(&rt, attached(&a)), Frame::new(5.0, 2.0, 3.0, 1.0));
    assert_eq!(frame(&rt, attached(&b)).width, 40.0);
}

#[test]
fn test_configured_viewport_drives_vw() {
    let child = RefSlot::new();
    let config = Config::default().with_viewport(Size::new(200.0, 50.0));
    let (rt, root) = runtime_with(Size::new(80.0, 24.0), config);
    rt.mount(root, view().node_ref(child.clone()).style(Style::new().width(Dimension::Vw(10.0))))
        .unwrap();
    assert_eq!(frame(&rt, attached(&child)).width, 20.0);
}

#[test]
fn test_visual_change_places_nothing() {
    let tree = |color: u32| {
        view()
            .style(Style::new().width(10.0).height(2.0).color(color))
            .child(text("label"))
    };
    let (rt, root) = runtime(Size::new(80.0, 24.0));
    rt.mount(root, tree(1)).unwrap();
    clear_log(&rt);

    rt.mount(root, tree(2)).unwrap();
    let s = stats(&rt);
    assert_eq!(s.patched, 1);
    assert_eq!(s.placed, 0);
    assert_eq!(s.clipped, 0);
}

#[test]
fn test_text_growth_reflows_auto_sized_row() {
    let row = RefSlot::new();
    let tree = |first: &str| {
        view()
            .node_ref(row.clone())
            .style(Style::new().direction(Direction::Row))
            .child(text(first.to_string()))
            .child(text("cd"))
    };
    let (rt, root) = runtime(Size::new(80.0, 24.0));
    rt.mount(root, tree("ab")).unwrap();
    assert_eq!(frame(&rt, attached(&row)).width, 4.0);

    rt.mount(root, tree("abcd")).unwrap();
    let second = find_text(&rt, root, "cd").unwrap();
    assert_eq!(frame(&rt, second).x, 4.0);
    assert_eq!(frame(&rt, attached(&row)).width, 6.0);
}

#[test]
fn test_state_change_relayouts_siblings() {
    use std::cell::RefCell;
    use std::rc::Rc;

    use spark_scene::{Component, Setter};

    let slot: Rc<RefCell<Option<Setter<String>>>> = Rc::new(RefCell::new(None));
    let label = {
        let slot = slot.clone();
        Component::from_closure("Label", move |cx, _, _| {
            let (content, set) = cx.use_state(|| "ab".to_string());
            *slot.borrow_mut() = Some(set);
            Some(text(content))
        })
    };
    let (rt, root) = runtime(Size::new(80.0, 24.0));
    rt.mount(
        root,
        view()
            .style(Style::new().direction(Direction::Row).gap(1.0))
            .child(label.node())
            .child(text("tail")),
    )
    .unwrap();
    let tail = find_text(&rt, root, "tail").unwrap();
    assert_eq!(frame(&rt, tail).x, 3.0);

    slot.borrow().clone().unwrap().set("abcdef".to_string());
    rt.flush().unwrap();
    assert_eq!(frame(&rt, tail).x, 7.0);
}

#[test]
fn test_layout_pass_without_movement_queues_no_frame_work() {
    let tree = |content: &str| {
        view()
            .style(Style::new().direction(Direction::Row).width(20.0).height(1.0))
            .child(text(content.to_string()))
    };
    let (rt, root) = runtime(Size::new(80.0, 24.0));
    rt.mount(root, tree("ab")).unwrap();
    rt.frame().unwrap();
    assert!(rt.is_idle());

    rt.mount(root, tree("cd")).unwrap();
    assert!(find_text(&rt, root, "cd").is_some());
    assert!(rt.is_idle());

    rt.mount(root, tree("abcd")).unwrap();
    assert!(!rt.is_idle());
}

#[test]
fn test_overflow_hidden_sets_clip() {
    let panel = RefSlot::new();
    let (rt, root) = runtime(Size::new(80.0, 24.0));
    rt.mount(
        root,
        view()
            .node_ref(panel.clone())
            .style(Style::new().width(10.0).height(5.0).padding(1.0).overflow(Overflow::Hidden))
            .child(text("a long line that overflows")),
    )
    .unwrap();

    let clip = rt
        .with_host(|host| host.node(attached(&panel)).and_then(|n| n.clip))
        .unwrap();
    assert_eq!(clip, Some(Frame::new(1.0, 1.0, 8.0, 3.0)));
}

#[test]
fn test_resize_relayouts_root() {
    let child = RefSlot::new();
    let (rt, root) = runtime(Size::new(80.0, 24.0));
    rt.mount(
        root,
        view()
            .node_ref(child.clone())
            .style(Style::new().width(Dimension::Percent(100.0)).height(1.0)),
    )
    .unwrap();
    assert_eq!(frame(&rt, attached(&child)).width, 80.0);

    assert!(!rt.resize(&root).unwrap());
    rt.with_host_mut(|host| host.resize_root(root, Size::new(100.0, 30.0)))
        .unwrap();
    assert!(rt.resize(&root).unwrap());
    assert_eq!(frame(&rt, attached(&child)).width, 100.0);
}

// =============================================================================
// Engine properties
// =============================================================================

fn row(width: f32, padding: f32, gap: f32) -> LayoutRecord {
    LayoutRecord::from(&Style::new().direction(Direction::Row).width(width).padding(padding).gap(gap))
}

proptest! {
    #[test]
    fn fill_child_consumes_remaining_space(
        width in 50.0f32..500.0,
        padding in 0.0f32..10.0,
        gap in 0.0f32..4.0,
        fixed in prop::collection::vec(1.0f32..10.0, 0..5),
        position in 0usize..6,
    ) {
        let container = row(width, padding, gap);
        let position = position % (fixed.len() + 1);
        let mut items: Vec<LayoutItem> = fixed
            .iter()
            .map(|&w| LayoutItem::new(LayoutRecord::from(&Style::new().width(w).flex_shrink(0.0)), Size::new(w, 1.0)))
            .collect();
        items.insert(position, LayoutItem::new(LayoutRecord::from(&Style::new().flex(1.0)), Size::ZERO));

        let content = width - 2.0 * padding;
        let used: f32 = fixed.iter().sum::<f32>() + gap * fixed.len() as f32;
        prop_assume!(used < content);

        let frames = compute_children(&container, Size::new(width, 10.0), &items, Size::new(width, 10.0));
        let total: f32 = frames.iter().map(|f| f.width).sum::<f32>() + gap * fixed.len() as f32;
        prop_assert!((total - content).abs() < 0.01, "total {total} content {content}");
        prop_assert!(frames.windows(2).all(|w| w[0].x <= w[1].x));
    }

    #[test]
    fn frames_are_never_negative(
        width in 0.0f32..60.0,
        padding in 0.0f32..20.0,
        naturals in prop::collection::vec((0.0f32..40.0, 0.0f32..3.0, 0.0f32..3.0), 1..6),
        column in any::<bool>(),
    ) {
        let direction = if column { Direction::Column } else { Direction::Row };
        let container = LayoutRecord::from(&Style::new().direction(direction).padding(padding).gap(1.0));
        let items: Vec<LayoutItem> = naturals
            .iter()
            .map(|&(natural, grow, shrink)| {
                let style = Style::new().flex(grow).flex_shrink(shrink);
                LayoutItem::new(LayoutRecord::from(&style), Size::new(natural, natural))
            })
            .collect();

        let frames = compute_children(&container, Size::new(width, width), &items, Size::new(80.0, 24.0));
        prop_assert_eq!(frames.len(), items.len());
        for f in frames {
            prop_assert!(f.width >= 0.0 && f.height >= 0.0, "{:?}", f);
        }
    }
}
