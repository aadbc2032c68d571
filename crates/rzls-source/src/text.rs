use std::ops::Deref;
use std::sync::Arc;
use std::sync::OnceLock;

use crate::position::LineIndex;
use crate::span::Span;

/// Immutable, cheaply clonable document text.
///
/// The line index is computed on first use and shared by every clone.
#[derive(Debug, Clone)]
pub struct SourceText(Arc<SourceTextInner>);

#[derive(Debug)]
struct SourceTextInner {
    encoding: FileEncoding,
    source: String,
    line_index: OnceLock<LineIndex>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FileEncoding {
    Ascii,
    Utf8,
}

impl SourceText {
    #[must_use]
    pub fn new(source: impl Into<String>) -> Self {
        let source = source.into();
        let encoding = if source.is_ascii() {
            FileEncoding::Ascii
        } else {
            FileEncoding::Utf8
        };
        Self(Arc::new(SourceTextInner {
            encoding,
            source,
            line_index: OnceLock::new(),
        }))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0.source
    }

    #[must_use]
    pub fn encoding(&self) -> FileEncoding {
        self.0.encoding
    }

    #[must_use]
    pub fn line_index(&self) -> &LineIndex {
        self.0
            .line_index
            .get_or_init(|| LineIndex::from_text(&self.0.source))
    }

    /// Text covered by `span`, or `None` when the span is out of range or splits a
    /// UTF-8 sequence.
    #[must_use]
    pub fn substring(&self, span: Span) -> Option<&str> {
        self.0.source.get(span.start_usize()..span.end_usize())
    }

    /// Whether two handles point at the same underlying buffer.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Default for SourceText {
    fn default() -> Self {
        Self::new(String::new())
    }
}

impl PartialEq for SourceText {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other) || self.0.source == other.0.source
    }
}

impl Eq for SourceText {}

impl AsRef<str> for SourceText {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl Deref for SourceText {
    type Target = str;

    fn deref(&self) -> &str {
        self.as_str()
    }
}

impl From<&str> for SourceText {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for SourceText {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}
