//! Text measurement in terminal cells.
//!
//! Widths come from `unicode-width`: ASCII is one cell, CJK and most emoji
//! are two, combining marks and control characters are zero.

use unicode_width::UnicodeWidthChar;

use crate::types::Size;

#[inline]
fn char_width(c: char) -> usize {
    c.width().unwrap_or(0)
}

/// Display width of a string. The widest line wins for multi-line text.
pub fn string_width(s: &str) -> usize {
    s.split('\n')
        .map(|line| line.chars().map(char_width).sum())
        .max()
        .unwrap_or(0)
}

/// Natural size of text: widest line by line count.
pub fn measure_text(text: &str) -> Size {
    if text.is_empty() {
        return Size::ZERO;
    }
    let lines = text.split('\n').count();
    Size::new(string_width(text) as f32, lines as f32)
}

/// Character-wrap text to `width` cells, honouring explicit newlines.
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    if text.is_empty() {
        return Vec::new();
    }
    if width == 0 {
        return text.split('\n').map(str::to_string).collect();
    }

    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_width = 0;

    for c in text.chars() {
        if c == '\n' {
            lines.push(std::mem::take(&mut current));
            current_width = 0;
            continue;
        }

        let w = char_width(c);
        if current_width + w > width && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
            current_width = 0;
        }
        current.push(c);
        current_width += w;
    }

    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_width() {
        assert_eq!(string_width("hello"), 5);
        assert_eq!(string_width(""), 0);
        assert_eq!(string_width("日本"), 4);
        assert_eq!(string_width("ab\nabcd"), 4);
    }

    #[test]
    fn test_measure_text() {
        assert_eq!(measure_text("hi\nthere"), Size::new(5.0, 2.0));
        assert_eq!(measure_text(""), Size::ZERO);
    }

    #[test]
    fn test_wrap_text() {
        assert_eq!(wrap_text("hello world", 5), ["hello", " worl", "d"]);
        assert_eq!(wrap_text("a\nb", 10), ["a", "b"]);
    }
}
