//! Source text and position primitives shared by the tag-helper services.
//!
//! Everything here is editor-agnostic: offsets are UTF-8 byte offsets, and
//! conversions to editor coordinates go through [`LineIndex`].

mod collections;
mod path;
mod position;
mod span;
mod text;

pub use collections::FxDashMap;
pub use collections::FxDashSet;
pub use path::clean_utf8_path;
pub use path::normalize_path;
pub use path::paths_are_case_sensitive;
pub use path::FilePathKey;
pub use position::ByteOffset;
pub use position::LineCol;
pub use position::LineIndex;
pub use span::Span;
pub use text::FileEncoding;
pub use text::SourceText;
