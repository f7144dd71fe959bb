//! Newline index for offset/line conversion

/// Byte offsets of line starts, built by one scan of the content.
///
/// Offset-to-line lookup is a binary search; column conversion scans only
/// the containing line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineIndex {
    /// Byte offset where each line starts; `line_starts[0]` is always 0.
    line_starts: Vec<usize>,
    /// Total length of the content in bytes.
    total_length: usize,
}

impl LineIndex {
    pub fn new(content: &str) -> Self {
        let mut line_starts = vec![0];
        line_starts.extend(
            content
                .char_indices()
                .filter(|&(_, ch)| ch == '\n')
                .map(|(offset, _)| offset + 1),
        );
        LineIndex {
            line_starts,
            total_length: content.len(),
        }
    }

    /// Number of lines; a trailing newline opens one more (empty) line.
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    pub fn total_length(&self) -> usize {
        self.total_length
    }

    /// Zero-based line containing `offset`.
    ///
    /// Returns `None` when the offset is out of bounds. An offset exactly at
    /// a newline belongs to the line the newline terminates.
    pub fn line_of(&self, offset: usize) -> Option<usize> {
        if offset > self.total_length {
            return None;
        }
        Some(self.line_starts.partition_point(|&start| start <= offset) - 1)
    }

    /// Byte offset where a line starts, or `None` past the last line.
    pub fn line_start(&self, line: usize) -> Option<usize> {
        self.line_starts.get(line).copied()
    }

    /// Byte offset one past the line's content, excluding its newline.
    pub fn line_end(&self, line: usize) -> Option<usize> {
        match self.line_starts.get(line + 1) {
            Some(&next_start) => Some(next_start - 1),
            None if line < self.line_count() => Some(self.total_length),
            None => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_content() {
        let index = LineIndex::new("");
        assert_eq!(index.line_count(), 1);
        assert_eq!(index.line_of(0), Some(0));
        assert_eq!(index.line_of(1), None);
    }

    #[test]
    fn line_boundaries() {
        // Offsets: "line 1\n" is [0, 7), "line 2\n" is [7, 14), "x" is [14, 15).
        let index = LineIndex::new("line 1\nline 2\nx");
        assert_eq!(index.line_count(), 3);
        assert_eq!(index.line_of(0), Some(0));
        assert_eq!(index.line_of(6), Some(0)); // the newline itself
        assert_eq!(index.line_of(7), Some(1));
        assert_eq!(index.line_of(14), Some(2));
        assert_eq!(index.line_of(15), Some(2)); // end of content
        assert_eq!(index.line_of(16), None);
        assert_eq!(index.line_start(1), Some(7));
        assert_eq!(index.line_end(0), Some(6));
        assert_eq!(index.line_end(2), Some(15));
        assert_eq!(index.line_end(3), None);
    }

    #[test]
    fn trailing_newline_opens_empty_line() {
        let index = LineIndex::new("a\n");
        assert_eq!(index.line_count(), 2);
        assert_eq!(index.line_of(2), Some(1));
        assert_eq!(index.line_start(1), Some(2));
        assert_eq!(index.line_end(1), Some(2));
    }

    #[test]
    fn consecutive_newlines() {
        let index = LineIndex::new("a\n\n\nb");
        assert_eq!(index.line_count(), 4);
        assert_eq!(index.line_of(2), Some(1));
        assert_eq!(index.line_of(3), Some(2));
        assert_eq!(index.line_of(4), Some(3));
    }

    #[test]
    fn multibyte_content_uses_byte_offsets() {
        // "é" is two bytes; the second line starts at byte 3.
        let index = LineIndex::new("é\nx");
        assert_eq!(index.line_start(1), Some(3));
        assert_eq!(index.line_of(3), Some(1));
    }
}
