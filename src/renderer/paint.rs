//! Scene painting - rasterize a [`MemoryHost`] scene into a [`FrameBuffer`].
//!
//! Frames are relative to the parent node, so painting accumulates origins
//! on the way down. Clip rects set by `overflow: hidden` containers narrow
//! the clip for their subtree. Siblings paint in `z_index` order (stable).

use super::buffer::{ClipRect, FrameBuffer};
use crate::host::{MemoryHost, NodeId};
use crate::layout::wrap_text;

/// Repaint `buffer` from the subtree under `root`. The root itself is not painted.
pub fn paint(host: &MemoryHost, root: NodeId, buffer: &mut FrameBuffer) {
    buffer.clear();
    let clip = buffer.bounds();
    for &child in host.children(root) {
        paint_node(host, child, (0.0, 0.0), clip, None, buffer);
    }
}

fn paint_node(
    host: &MemoryHost,
    id: NodeId,
    origin: (f32, f32),
    clip: ClipRect,
    inherited_fg: Option<u32>,
    buffer: &mut FrameBuffer,
) {
    let Some(node) = host.node(id) else {
        return;
    };
    let style = &node.props.style;
    if style.visible == Some(false) {
        return;
    }

    let x = origin.0 + node.frame.x;
    let y = origin.1 + node.frame.y;
    let rect = ClipRect::new(
        x.round() as i32,
        y.round() as i32,
        node.frame.width.round() as i32,
        node.frame.height.round() as i32,
    );

    if let Some(bg) = style.background {
        buffer.fill_rect(rect.intersect(&clip), bg);
    }

    let fg = style.color.or(inherited_fg);
    if let Some(text) = &node.props.text {
        let text_clip = rect.intersect(&clip);
        let width = (rect.right - rect.x).max(1) as usize;
        for (row, line) in wrap_text(text, width).iter().enumerate() {
            let line_y = rect.y + row as i32;
            if line_y >= rect.bottom {
                break;
            }
            buffer.draw_text(rect.x, line_y, line, fg, text_clip);
        }
    }

    let child_clip = match node.clip {
        Some(c) => clip.intersect(&ClipRect::new(
            (x + c.x).round() as i32,
            (y + c.y).round() as i32,
            c.width.round() as i32,
            c.height.round() as i32,
        )),
        None => clip,
    };
    if child_clip.is_empty() {
        return;
    }

    let mut children = host.children(id).to_vec();
    children.sort_by_key(|&child| host.node(child).and_then(|n| n.props.style.z_index).unwrap_or(0));
    for child in children {
        paint_node(host, child, (x, y), child_clip, fg, buffer);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{HostBridge, TEXT_TAG};
    use crate::types::{Frame, Size};
    use crate::vdom::{Props, Style};

    fn text_props(text: &str, style: Style) -> Props {
        Props {
            text: Some(text.into()),
            style,
            ..Props::default()
        }
    }

    #[test]
    fn test_paints_text_at_absolute_position() {
        let mut host = MemoryHost::new();
        let root = host.create_root(Size::new(20.0, 5.0));
        let panel = host.create("view", &Props::default());
        let label = host.create(TEXT_TAG, &text_props("hi", Style::new().color(0xff0000)));
        host.append(&root, &panel);
        host.append(&panel, &label);
        host.place(&panel, Frame::new(3.0, 1.0, 10.0, 3.0));
        host.place(&label, Frame::new(1.0, 1.0, 2.0, 1.0));

        let mut buffer = FrameBuffer::new(20, 5);
        paint(&host, root, &mut buffer);
        assert_eq!(buffer.row_text(2), "    hi");
        assert_eq!(buffer.get(4, 2).and_then(|c| c.fg), Some(0xff0000));
    }

    #[test]
    fn test_clip_and_visibility() {
        let mut host = MemoryHost::new();
        let root = host.create_root(Size::new(20.0, 2.0));
        let panel = host.create("view", &Props::default());
        let label = host.create(TEXT_TAG, &text_props("overflowing", Style::new()));
        let hidden = host.create(TEXT_TAG, &text_props("x", Style::new().visible(false)));
        host.append(&root, &panel);
        host.append(&panel, &label);
        host.append(&root, &hidden);
        host.place(&panel, Frame::new(0.0, 0.0, 4.0, 1.0));
        host.place(&label, Frame::new(0.0, 0.0, 11.0, 1.0));
        host.place(&hidden, Frame::new(0.0, 1.0, 1.0, 1.0));
        host.clip(&panel, Some(Frame::new(0.0, 0.0, 4.0, 1.0)));

        let mut buffer = FrameBuffer::new(20, 2);
        paint(&host, root, &mut buffer);
        assert_eq!(buffer.row_text(0), "over");
        assert_eq!(buffer.row_text(1), "");
    }

    #[test]
    fn test_background_fill() {
        let mut host = MemoryHost::new();
        let root = host.create_root(Size::new(4.0, 2.0));
        let panel = host.create(
            "view",
            &Props {
                style: Style::new().background(9),
                ..Props::default()
            },
        );
        host.append(&root, &panel);
        host.place(&panel, Frame::new(1.0, 0.0, 2.0, 1.0));

        let mut buffer = FrameBuffer::new(4, 2);
        paint(&host, root, &mut buffer);
        assert_eq!(buffer.get(1, 0).and_then(|c| c.bg), Some(9));
        assert_eq!(buffer.get(3, 0).and_then(|c| c.bg), None);
    }
}
