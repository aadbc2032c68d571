use std::ops::Deref;

use serde::Serialize;

/// A byte offset within a text document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ByteOffset(u32);

impl ByteOffset {
    #[must_use]
    pub fn new(offset: u32) -> Self {
        Self(offset)
    }

    #[must_use]
    pub fn from_usize(offset: usize) -> Self {
        Self(u32::try_from(offset).unwrap_or(u32::MAX))
    }

    #[must_use]
    pub fn offset(&self) -> u32 {
        self.0
    }
}

impl Deref for ByteOffset {
    type Target = u32;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// A zero-based line and column position within a text document.
///
/// The column is measured in UTF-8 bytes; use [`LineIndex::offset_utf16`] when
/// the editor reports UTF-16 code units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct LineCol {
    line: u32,
    column: u32,
}

impl LineCol {
    #[must_use]
    pub fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }

    #[must_use]
    pub fn line(&self) -> u32 {
        self.line
    }

    #[must_use]
    pub fn column(&self) -> u32 {
        self.column
    }
}

/// Pre-computed line start positions for efficient position/offset conversion.
///
/// Computing line positions on every lookup would be O(n) where n is the document size.
/// By pre-computing once per text version, we get O(1) lookups for line starts
/// and O(log n) for offset-to-position conversions via binary search.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LineIndex {
    line_starts: Vec<u32>,
    length: u32,
}

impl LineIndex {
    #[must_use]
    pub fn from_text(text: &str) -> Self {
        let mut line_starts = vec![0];
        let mut pos_utf8 = 0;

        for c in text.chars() {
            pos_utf8 += u32::try_from(c.len_utf8()).unwrap_or(0);
            if c == '\n' {
                line_starts.push(pos_utf8);
            }
        }

        Self {
            line_starts,
            length: pos_utf8,
        }
    }

    #[must_use]
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    #[must_use]
    pub fn len(&self) -> u32 {
        self.length
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Byte offset of the first character of `line`.
    #[must_use]
    pub fn line_start(&self, line: u32) -> Option<ByteOffset> {
        self.line_starts
            .get(line as usize)
            .map(|start| ByteOffset(*start))
    }

    /// Convert a line/column position to an absolute byte offset.
    ///
    /// Returns `None` when the line does not exist or the column runs past the end
    /// of the line.
    #[must_use]
    pub fn offset(&self, position: LineCol) -> Option<ByteOffset> {
        let line_start = *self.line_starts.get(position.line as usize)?;
        let line_end = self
            .line_starts
            .get(position.line as usize + 1)
            .copied()
            .unwrap_or(self.length);

        let offset = line_start.checked_add(position.column)?;
        (offset <= line_end).then_some(ByteOffset(offset))
    }

    /// Convert a UTF-16 editor position to a UTF-8 byte offset.
    #[must_use]
    pub fn offset_utf16(&self, position: LineCol, text: &str) -> Option<ByteOffset> {
        let line_start = *self.line_starts.get(position.line as usize)?;

        if position.column == 0 {
            return Some(ByteOffset(line_start));
        }

        let next_line_start = self
            .line_starts
            .get(position.line as usize + 1)
            .copied()
            .unwrap_or(self.length);

        let line_text = text.get(line_start as usize..next_line_start as usize)?;

        let mut utf16_pos = 0;
        let mut utf8_pos = 0;

        for c in line_text.chars() {
            if utf16_pos >= position.column {
                break;
            }
            utf16_pos += u32::try_from(c.len_utf16()).unwrap_or(0);
            utf8_pos += u32::try_from(c.len_utf8()).unwrap_or(0);
        }

        Some(ByteOffset(line_start + utf8_pos))
    }

    /// Convert an absolute byte offset to a line/column position.
    ///
    /// Offsets past the end of the text clamp to the end.
    #[must_use]
    pub fn to_line_col(&self, offset: ByteOffset) -> LineCol {
        let offset = offset.0.min(self.length);
        let line = match self.line_starts.binary_search(&offset) {
            Ok(line) => line,
            Err(line) => line - 1,
        };

        let line_start = self.line_starts[line];
        LineCol::new(u32::try_from(line).unwrap_or(u32::MAX), offset - line_start)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_starts_and_round_trip() {
        let index = LineIndex::from_text("<div>\n  <p></p>\n</div>");

        assert_eq!(index.line_count(), 3);
        assert_eq!(index.line_start(1), Some(ByteOffset::new(6)));
        assert_eq!(
            index.to_line_col(ByteOffset::new(9)),
            LineCol::new(1, 3)
        );
        assert_eq!(
            index.offset(LineCol::new(1, 3)),
            Some(ByteOffset::new(9))
        );
    }

    #[test]
    fn test_offset_rejects_column_past_line_end() {
        let index = LineIndex::from_text("ab\ncd");
        assert_eq!(index.offset(LineCol::new(0, 3)), Some(ByteOffset::new(3)));
        assert_eq!(index.offset(LineCol::new(0, 4)), None);
        assert_eq!(index.offset(LineCol::new(5, 0)), None);
    }

    #[test]
    fn test_offset_utf16_counts_surrogate_pairs() {
        let text = "<p>😀x</p>";
        let index = LineIndex::from_text(text);
        // "<p>" is 3 units, the emoji is 2 UTF-16 units and 4 UTF-8 bytes.
        assert_eq!(
            index.offset_utf16(LineCol::new(0, 5), text),
            Some(ByteOffset::new(7))
        );
    }

    #[test]
    fn test_to_line_col_clamps_past_end() {
        let index = LineIndex::from_text("abc");
        assert_eq!(index.to_line_col(ByteOffset::new(99)), LineCol::new(0, 3));
    }
}
