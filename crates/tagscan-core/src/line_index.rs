//! Logical line index
//!
//! Provides offset <-> line/column conversion using a Rope, with O(log N) access.

use ropey::Rope;

/// Logical line index - implemented using Rope data structure
///
/// All offsets are character offsets (Unicode scalar values); columns count characters
/// from the start of the line.
#[derive(Debug, Clone)]
pub struct LineIndex {
    rope: Rope,
}

impl LineIndex {
    /// Create an empty line index
    pub fn new() -> Self {
        Self { rope: Rope::new() }
    }

    /// Build line index from text
    pub fn from_text(text: &str) -> Self {
        Self {
            rope: Rope::from_str(text),
        }
    }

    /// Get line number and offset within line from character offset
    pub fn char_offset_to_position(&self, char_offset: usize) -> (usize, usize) {
        let char_offset = char_offset.min(self.rope.len_chars());

        let line_idx = self.rope.char_to_line(char_offset);
        let line_start_char = self.rope.line_to_char(line_idx);
        let char_in_line = char_offset - line_start_char;

        (line_idx, char_in_line)
    }

    /// Get character offset from line number and column number
    ///
    /// Out-of-range lines clamp to the end of the document, out-of-range columns clamp to
    /// the end of the line.
    pub fn position_to_char_offset(&self, line: usize, column: usize) -> usize {
        if line >= self.rope.len_lines() {
            return self.rope.len_chars();
        }

        let line_start_char = self.rope.line_to_char(line);
        line_start_char + column.min(self.line_len_chars(line))
    }

    /// Character offset of the first character of `line` (clamped).
    pub fn line_start_char(&self, line: usize) -> usize {
        self.position_to_char_offset(line, 0)
    }

    /// Character offset just past the last character of `line`, excluding the line break.
    pub fn line_end_char(&self, line: usize) -> usize {
        self.position_to_char_offset(line, usize::MAX)
    }

    fn line_len_chars(&self, line: usize) -> usize {
        let slice = self.rope.line(line);
        let mut len = slice.len_chars();
        if len > 0 && slice.char(len - 1) == '\n' {
            len -= 1;
            if len > 0 && slice.char(len - 1) == '\r' {
                len -= 1;
            }
        }
        len
    }

    /// Get total line count
    pub fn line_count(&self) -> usize {
        self.rope.len_lines()
    }

    /// Get total byte count
    pub fn byte_count(&self) -> usize {
        self.rope.len_bytes()
    }

    /// Get total character count
    pub fn char_count(&self) -> usize {
        self.rope.len_chars()
    }

    /// Get complete text
    pub fn get_text(&self) -> String {
        self.rope.to_string()
    }

    /// Get the text of a half-open character range (clamped to the document).
    pub fn slice(&self, start: usize, end: usize) -> String {
        let len = self.rope.len_chars();
        let end = end.min(len);
        let start = start.min(end);
        self.rope.slice(start..end).to_string()
    }

    /// Get text of the specified line (excluding newline)
    pub fn get_line_text(&self, line_number: usize) -> Option<String> {
        if line_number >= self.rope.len_lines() {
            return None;
        }

        let start = self.rope.line_to_char(line_number);
        Some(self.slice(start, start + self.line_len_chars(line_number)))
    }
}

impl Default for LineIndex {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_line_index() {
        let index = LineIndex::new();
        assert_eq!(index.line_count(), 1); // Rope empty document has 1 line
        assert_eq!(index.byte_count(), 0);
        assert_eq!(index.char_count(), 0);
    }

    #[test]
    fn test_from_text() {
        let text = "Line 1\nLine 2\nLine 3";
        let index = LineIndex::from_text(text);

        assert_eq!(index.line_count(), 3);
        assert_eq!(index.byte_count(), text.len());
        assert_eq!(index.char_count(), text.chars().count());
    }

    #[test]
    fn test_position_round_trip_with_wide_chars() {
        let index = LineIndex::from_text("a👋b\n你好\n");

        assert_eq!(index.char_offset_to_position(0), (0, 0));
        assert_eq!(index.char_offset_to_position(2), (0, 2));
        assert_eq!(index.char_offset_to_position(4), (1, 0));
        assert_eq!(index.char_offset_to_position(5), (1, 1));
        assert_eq!(index.position_to_char_offset(1, 1), 5);
        assert_eq!(index.position_to_char_offset(1, 99), 6);
        assert_eq!(index.position_to_char_offset(9, 0), index.char_count());
    }

    #[test]
    fn test_line_bounds_and_slices() {
        let index = LineIndex::from_text("ab\r\ncd\nef");

        assert_eq!(index.line_start_char(1), 4);
        assert_eq!(index.line_end_char(0), 2);
        assert_eq!(index.line_end_char(1), 6);
        assert_eq!(index.line_end_char(2), 9);
        assert_eq!(index.get_line_text(0).as_deref(), Some("ab"));
        assert_eq!(index.get_line_text(3), None);
        assert_eq!(index.slice(4, 9), "cd\nef");
        assert_eq!(index.slice(7, 100), "ef");
    }
}
