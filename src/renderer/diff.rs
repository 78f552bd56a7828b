//! Differential renderer for fullscreen mode.
//!
//! The DiffRenderer compares the current frame to the previous frame and only
//! outputs cells that have changed.
//!
//! # Algorithm
//!
//! 1. Wrap output in a synchronized update
//! 2. For each cell in the new frame:
//!    - If previous frame exists and cell is unchanged: skip
//!    - Otherwise: move the cursor if needed, switch colors if needed, print
//! 3. Flush output (single write)
//! 4. Store current frame as previous for next comparison

use std::io::{self, Stdout, Write};

use crossterm::cursor::{Hide, MoveTo, Show};
use crossterm::style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor};
use crossterm::terminal::{
    BeginSynchronizedUpdate, Clear, ClearType, EndSynchronizedUpdate, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::{execute, queue};

use super::buffer::{CONTINUATION, Cell, FrameBuffer};

/// Differential renderer for fullscreen mode.
///
/// Keeps track of the previous frame to enable diff-based rendering.
/// Only cells that have changed since the last frame are output.
pub struct DiffRenderer<W: Write = Stdout> {
    out: W,
    previous: Option<FrameBuffer>,
    /// Cursor position after the last print, if known.
    cursor: Option<(u16, u16)>,
    fg: Option<Option<u32>>,
    bg: Option<Option<u32>>,
}

impl DiffRenderer<Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> DiffRenderer<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            previous: None,
            cursor: None,
            fg: None,
            bg: None,
        }
    }

    /// Render a frame, outputting only changed cells.
    ///
    /// Returns the number of cells written.
    pub fn render(&mut self, buffer: &FrameBuffer) -> io::Result<usize> {
        queue!(self.out, BeginSynchronizedUpdate)?;
        self.reset_state();

        let width = buffer.width();
        let height = buffer.height();
        let comparable = self
            .previous
            .as_ref()
            .is_some_and(|prev| prev.width() == width && prev.height() == height);

        let mut written = 0;
        for y in 0..height {
            for x in 0..width {
                let Some(cell) = buffer.get(x, y) else {
                    continue;
                };
                let changed = !comparable || self.previous.as_ref().and_then(|prev| prev.get(x, y)) != Some(cell);
                if changed && cell.ch != CONTINUATION {
                    self.write_cell(x, y, cell)?;
                    written += 1;
                }
            }
        }

        queue!(self.out, ResetColor, EndSynchronizedUpdate)?;
        self.out.flush()?;
        self.previous = Some(buffer.clone());
        Ok(written)
    }

    /// Force a full redraw (no diffing).
    ///
    /// Use this after terminal resize or when the screen is corrupted.
    pub fn render_full(&mut self, buffer: &FrameBuffer) -> io::Result<usize> {
        self.invalidate();
        queue!(self.out, Clear(ClearType::All))?;
        self.render(buffer)
    }

    fn reset_state(&mut self) {
        self.cursor = None;
        self.fg = None;
        self.bg = None;
    }

    fn write_cell(&mut self, x: u16, y: u16, cell: &Cell) -> io::Result<()> {
        if self.cursor != Some((x, y)) {
            queue!(self.out, MoveTo(x, y))?;
        }
        if self.fg != Some(cell.fg) {
            queue!(self.out, SetForegroundColor(to_color(cell.fg)))?;
            self.fg = Some(cell.fg);
        }
        if self.bg != Some(cell.bg) {
            queue!(self.out, SetBackgroundColor(to_color(cell.bg)))?;
            self.bg = Some(cell.bg);
        }
        queue!(self.out, Print(cell.ch))?;
        let advance = unicode_width::UnicodeWidthChar::width(cell.ch).unwrap_or(1) as u16;
        self.cursor = Some((x.saturating_add(advance), y));
        Ok(())
    }

    /// Invalidate the previous frame.
    ///
    /// Next render will be a full redraw.
    pub fn invalidate(&mut self) {
        self.previous = None;
    }

    /// Check if we have a previous frame to diff against.
    pub fn has_previous(&self) -> bool {
        self.previous.is_some()
    }

    /// Enter fullscreen mode (alternate screen buffer).
    pub fn enter_fullscreen(&mut self) -> io::Result<()> {
        execute!(self.out, EnterAlternateScreen, Hide, Clear(ClearType::All))?;
        self.invalidate();
        Ok(())
    }

    /// Exit fullscreen mode.
    pub fn exit_fullscreen(&mut self) -> io::Result<()> {
        execute!(self.out, ResetColor, Show, LeaveAlternateScreen)
    }

    pub fn writer(&self) -> &W {
        &self.out
    }
}

fn to_color(color: Option<u32>) -> Color {
    match color {
        Some(rgb) => Color::Rgb {
            r: (rgb >> 16) as u8,
            g: (rgb >> 8) as u8,
            b: rgb as u8,
        },
        None => Color::Reset,
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::buffer::ClipRect;

    fn renderer() -> DiffRenderer<Vec<u8>> {
        DiffRenderer::new(Vec::new())
    }

    #[test]
    fn test_first_frame_writes_everything() {
        let mut renderer = renderer();
        assert!(!renderer.has_previous());
        let buffer = FrameBuffer::new(4, 2);
        assert_eq!(renderer.render(&buffer).unwrap(), 8);
        assert!(renderer.has_previous());
    }

    #[test]
    fn test_only_changed_cells_are_written() {
        let mut renderer = renderer();
        let mut buffer = FrameBuffer::new(4, 2);
        renderer.render(&buffer).unwrap();
        assert_eq!(renderer.render(&buffer).unwrap(), 0);

        buffer.draw_text(1, 1, "x", Some(0x00ff00), ClipRect::new(0, 0, 4, 2));
        assert_eq!(renderer.render(&buffer).unwrap(), 1);
    }

    #[test]
    fn test_invalidate() {
        let mut renderer = renderer();
        let buffer = FrameBuffer::new(3, 1);
        renderer.render(&buffer).unwrap();
        renderer.invalidate();
        assert!(!renderer.has_previous());
        assert_eq!(renderer.render(&buffer).unwrap(), 3);
    }

    #[test]
    fn test_color_conversion() {
        assert_eq!(to_color(Some(0x102030)), Color::Rgb { r: 0x10, g: 0x20, b: 0x30 });
        assert_eq!(to_color(None), Color::Reset);
    }
}
