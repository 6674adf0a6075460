//! Byte <-> char offset mapping for scanned text slices.
//!
//! Regex matching happens on UTF-8 bytes, while every public offset is a char offset.

#[derive(Debug)]
pub(crate) struct CharIndex {
    /// `None` for pure ASCII text, where byte and char offsets coincide.
    char_to_byte: Option<Vec<usize>>,
    text_len: usize,
}

impl CharIndex {
    pub(crate) fn new(text: &str) -> Self {
        if text.is_ascii() {
            return Self {
                char_to_byte: None,
                text_len: text.len(),
            };
        }

        let mut char_to_byte: Vec<usize> = text.char_indices().map(|(b, _)| b).collect();
        char_to_byte.push(text.len());
        Self {
            char_to_byte: Some(char_to_byte),
            text_len: text.len(),
        }
    }

    pub(crate) fn byte_to_char(&self, byte_offset: usize) -> usize {
        let clamped = byte_offset.min(self.text_len);
        match &self.char_to_byte {
            None => clamped,
            Some(table) => match table.binary_search(&clamped) {
                Ok(idx) => idx,
                Err(idx) => idx,
            },
        }
    }

    pub(crate) fn char_to_byte(&self, char_offset: usize) -> usize {
        match &self.char_to_byte {
            None => char_offset.min(self.text_len),
            Some(table) => table
                .get(char_offset)
                .copied()
                .unwrap_or(self.text_len),
        }
    }
}

/// Byte offset of the end of the line containing `from` (the `\n` position or text end).
pub(crate) fn line_end(text: &str, from: usize) -> usize {
    text[from..].find('\n').map_or(text.len(), |i| from + i)
}

/// Number of leading spaces/tabs in `s`.
pub(crate) fn leading_blanks(s: &str) -> usize {
    s.bytes().take_while(|b| *b == b' ' || *b == b'\t').count()
}

/// Trim trailing whitespace (including a `\r` from CRLF endings) from `start..end`.
pub(crate) fn trim_end(text: &str, start: usize, end: usize) -> usize {
    start + text[start..end].trim_end().len()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_char_index_ascii_is_identity() {
        let index = CharIndex::new("hello");
        assert_eq!(index.byte_to_char(3), 3);
        assert_eq!(index.byte_to_char(99), 5);
    }

    #[test]
    fn test_char_index_multibyte() {
        let text = "a👋b你";
        let index = CharIndex::new(text);
        assert_eq!(index.byte_to_char(0), 0);
        assert_eq!(index.byte_to_char(1), 1);
        assert_eq!(index.byte_to_char(5), 2);
        assert_eq!(index.byte_to_char(6), 3);
        assert_eq!(index.byte_to_char(text.len()), 4);
        assert_eq!(index.char_to_byte(2), 5);
        assert_eq!(index.char_to_byte(9), text.len());
    }

    #[test]
    fn test_line_helpers() {
        let text = "ab\r\ncd";
        assert_eq!(line_end(text, 0), 3);
        assert_eq!(line_end(text, 4), 6);
        assert_eq!(trim_end(text, 0, 3), 2);
        assert_eq!(leading_blanks(" \t x"), 3);
    }
}
