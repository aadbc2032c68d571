use serde::Serialize;

use crate::position::ByteOffset;
use crate::position::LineCol;
use crate::position::LineIndex;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub struct Span {
    start: u32,
    length: u32,
}

impl Span {
    #[must_use]
    pub fn new(start: u32, length: u32) -> Self {
        Self { start, length }
    }

    #[must_use]
    pub fn from_parts(start: usize, length: usize) -> Self {
        let start_u32 = u32::try_from(start).unwrap_or(u32::MAX);
        let length_u32 = u32::try_from(length).unwrap_or(u32::MAX.saturating_sub(start_u32));
        Span::new(start_u32, length_u32)
    }

    /// Construct a span from integer bounds expressed as byte offsets.
    #[must_use]
    pub fn from_bounds(start: usize, end: usize) -> Self {
        Self::from_parts(start, end.saturating_sub(start))
    }

    #[must_use]
    pub fn start(self) -> u32 {
        self.start
    }

    #[must_use]
    pub fn start_usize(self) -> usize {
        self.start as usize
    }

    #[must_use]
    pub fn end(self) -> u32 {
        self.start + self.length
    }

    #[must_use]
    pub fn end_usize(self) -> usize {
        self.end() as usize
    }

    #[must_use]
    pub fn length(self) -> u32 {
        self.length
    }

    #[must_use]
    pub fn is_empty(self) -> bool {
        self.length == 0
    }

    #[must_use]
    pub fn start_offset(&self) -> ByteOffset {
        ByteOffset::new(self.start)
    }

    #[must_use]
    pub fn end_offset(&self) -> ByteOffset {
        ByteOffset::new(self.start.saturating_add(self.length))
    }

    /// Whether `offset` falls inside the span, end inclusive.
    ///
    /// A caret sitting directly after the last character still belongs to the
    /// span, which is what completion requests need.
    #[must_use]
    pub fn contains(self, offset: ByteOffset) -> bool {
        *offset >= self.start && *offset <= self.end()
    }

    /// Convert this span to start and end line/column positions using the given line index.
    #[must_use]
    pub fn to_line_col(&self, line_index: &LineIndex) -> (LineCol, LineCol) {
        let start = line_index.to_line_col(self.start_offset());
        let end = line_index.to_line_col(self.end_offset());
        (start, end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_is_end_inclusive() {
        let span = Span::new(4, 3);
        assert!(!span.contains(ByteOffset::new(3)));
        assert!(span.contains(ByteOffset::new(4)));
        assert!(span.contains(ByteOffset::new(7)));
        assert!(!span.contains(ByteOffset::new(8)));
    }

    #[test]
    fn test_to_line_col_spans_lines() {
        let index = LineIndex::from_text("one\ntwo\nthree");
        let span = Span::from_bounds(2, 9);
        assert_eq!(
            span.to_line_col(&index),
            (LineCol::new(0, 2), LineCol::new(2, 1))
        );
    }
}
