//! Cell buffer - one frame of terminal output.

use unicode_width::UnicodeWidthChar;

/// Marks the second column of a wide character.
pub const CONTINUATION: char = '\0';

/// One terminal cell. Colors are `0xRRGGBB`; `None` is the terminal default.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    pub ch: char,
    pub fg: Option<u32>,
    pub bg: Option<u32>,
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            ch: ' ',
            fg: None,
            bg: None,
        }
    }
}

/// Integer clip rectangle in buffer coordinates. `right`/`bottom` are exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClipRect {
    pub x: i32,
    pub y: i32,
    pub right: i32,
    pub bottom: i32,
}

impl ClipRect {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            right: x + width.max(0),
            bottom: y + height.max(0),
        }
    }

    pub fn intersect(&self, other: &ClipRect) -> ClipRect {
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        ClipRect {
            x,
            y,
            right: self.right.min(other.right).max(x),
            bottom: self.bottom.min(other.bottom).max(y),
        }
    }

    #[inline]
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x && x < self.right && y >= self.y && y < self.bottom
    }

    pub fn is_empty(&self) -> bool {
        self.right <= self.x || self.bottom <= self.y
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FrameBuffer {
    width: u16,
    height: u16,
    cells: Vec<Cell>,
}

impl FrameBuffer {
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            cells: vec![Cell::default(); width as usize * height as usize],
        }
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    /// Clip rect covering the whole buffer.
    pub fn bounds(&self) -> ClipRect {
        ClipRect::new(0, 0, self.width as i32, self.height as i32)
    }

    #[inline]
    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return None;
        }
        Some(y as usize * self.width as usize + x as usize)
    }

    pub fn get(&self, x: u16, y: u16) -> Option<&Cell> {
        self.index(x as i32, y as i32).map(|i| &self.cells[i])
    }

    pub fn clear(&mut self) {
        self.cells.fill(Cell::default());
    }

    /// Set the background of every cell in `rect`.
    pub fn fill_rect(&mut self, rect: ClipRect, bg: u32) {
        let rect = rect.intersect(&self.bounds());
        for y in rect.y..rect.bottom {
            for x in rect.x..rect.right {
                if let Some(i) = self.index(x, y) {
                    self.cells[i] = Cell {
                        ch: ' ',
                        fg: None,
                        bg: Some(bg),
                    };
                }
            }
        }
    }

    /// Draw `text` on one row starting at `x`, clipped to `clip`. Cells keep
    /// their background. Returns the columns consumed.
    pub fn draw_text(&mut self, x: i32, y: i32, text: &str, fg: Option<u32>, clip: ClipRect) -> i32 {
        let clip = clip.intersect(&self.bounds());
        let mut col = x;
        for ch in text.chars() {
            let width = ch.width().unwrap_or(0) as i32;
            if width == 0 {
                continue;
            }
            // Wide characters are drawn only when both columns are visible.
            let fits = (0..width).all(|dx| clip.contains(col + dx, y));
            if fits {
                for dx in 0..width {
                    if let Some(i) = self.index(col + dx, y) {
                        let cell = &mut self.cells[i];
                        cell.ch = if dx == 0 { ch } else { CONTINUATION };
                        cell.fg = fg;
                    }
                }
            }
            col += width;
        }
        col - x
    }

    /// Row `y` as a string, trailing spaces trimmed. Continuation cells are skipped.
    pub fn row_text(&self, y: u16) -> String {
        let mut row: String = (0..self.width)
            .filter_map(|x| self.get(x, y))
            .map(|cell| cell.ch)
            .filter(|&ch| ch != CONTINUATION)
            .collect();
        row.truncate(row.trim_end().len());
        row
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_draw_text_clips() {
        let mut buffer = FrameBuffer::new(10, 2);
        let clip = ClipRect::new(2, 0, 3, 1);
        buffer.draw_text(0, 0, "abcdefg", Some(1), clip);
        assert_eq!(buffer.row_text(0), "  cde");
        assert_eq!(buffer.get(2, 0).map(|c| c.fg), Some(Some(1)));
    }

    #[test]
    fn test_wide_chars_take_two_cells() {
        let mut buffer = FrameBuffer::new(6, 1);
        let consumed = buffer.draw_text(0, 0, "日本", None, buffer.bounds());
        assert_eq!(consumed, 4);
        assert_eq!(buffer.get(1, 0).map(|c| c.ch), Some(CONTINUATION));
        assert_eq!(buffer.row_text(0), "日本");
    }

    #[test]
    fn test_fill_rect_is_clamped() {
        let mut buffer = FrameBuffer::new(4, 4);
        buffer.fill_rect(ClipRect::new(2, 2, 10, 10), 7);
        assert_eq!(buffer.get(3, 3).and_then(|c| c.bg), Some(7));
        assert_eq!(buffer.get(1, 1).and_then(|c| c.bg), None);
    }

    #[test]
    fn test_intersect_empty() {
        let a = ClipRect::new(0, 0, 2, 2);
        let b = ClipRect::new(5, 5, 2, 2);
        assert!(a.intersect(&b).is_empty());
    }
}
