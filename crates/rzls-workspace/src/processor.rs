use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use rzls_source::SourceText;
use rzls_tag_helpers::DocumentContextCache;
use rzls_tag_helpers::TagHelperCollection;
use rzls_tag_helpers::TagHelperDocumentContext;
use thiserror::Error;

use crate::loader::LoadError;
use crate::project::FileKind;

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error("processing {path} failed: {message}")]
    Process { path: String, message: String },
    #[error("generation was cancelled")]
    Cancelled,
}

/// Everything the compiler sees for one document.
#[derive(Debug)]
pub struct ProcessInput<'a> {
    pub file_path: &'a str,
    pub file_kind: FileKind,
    pub source: &'a SourceText,
    /// Import texts, outermost first.
    pub imports: &'a [SourceText],
    pub tag_helpers: &'a TagHelperCollection,
}

/// The compiled form of a document.
#[derive(Debug, Clone)]
pub struct CodeDocument {
    source: SourceText,
    file_kind: FileKind,
    tag_helper_context: Arc<TagHelperDocumentContext>,
}

impl CodeDocument {
    #[must_use]
    pub fn new(source: SourceText, file_kind: FileKind, tag_helper_context: Arc<TagHelperDocumentContext>) -> Self {
        Self {
            source,
            file_kind,
            tag_helper_context,
        }
    }

    #[must_use]
    pub fn source(&self) -> &SourceText {
        &self.source
    }

    #[must_use]
    pub fn file_kind(&self) -> FileKind {
        self.file_kind
    }

    #[must_use]
    pub fn tag_helper_context(&self) -> &Arc<TagHelperDocumentContext> {
        &self.tag_helper_context
    }
}

/// Turns a document and its inputs into a [`CodeDocument`].
pub trait DocumentProcessor: Send + Sync {
    fn process(&self, input: ProcessInput<'_>) -> Result<CodeDocument, GenerateError>;
}

const TAG_HELPER_PREFIX_DIRECTIVE: &str = "@tagHelperPrefix";

/// The editor-time compiler: resolves the tag helper prefix and the document's
/// tag helper context, nothing more.
#[derive(Debug)]
pub struct DesignTimeProcessor {
    contexts: Arc<DocumentContextCache>,
    default_prefix: Option<String>,
    compilations: AtomicU64,
}

impl DesignTimeProcessor {
    #[must_use]
    pub fn new(contexts: Arc<DocumentContextCache>, default_prefix: Option<String>) -> Self {
        Self {
            contexts,
            default_prefix,
            compilations: AtomicU64::new(0),
        }
    }

    /// Documents processed so far.
    #[must_use]
    pub fn compilations(&self) -> u64 {
        self.compilations.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn contexts(&self) -> &Arc<DocumentContextCache> {
        &self.contexts
    }

    /// The prefix in effect for a document. The document's own directive wins,
    /// then the nearest import declaring one, then the configured default.
    /// Components never use a prefix.
    #[must_use]
    pub fn resolve_prefix<'a>(&'a self, input: &'a ProcessInput<'_>) -> Option<&'a str> {
        if input.file_kind.is_component() {
            return None;
        }
        find_prefix_directive(input.source.as_str())
            .or_else(|| {
                input
                    .imports
                    .iter()
                    .rev()
                    .find_map(|import| find_prefix_directive(import.as_str()))
            })
            .or(self.default_prefix.as_deref())
    }
}

impl DocumentProcessor for DesignTimeProcessor {
    fn process(&self, input: ProcessInput<'_>) -> Result<CodeDocument, GenerateError> {
        let prefix = self.resolve_prefix(&input);
        let context = self.contexts.get_or_create(prefix, input.tag_helpers);
        let count = self.compilations.fetch_add(1, Ordering::Relaxed) + 1;
        tracing::debug!(
            path = input.file_path,
            ?prefix,
            tag_helpers = input.tag_helpers.len(),
            compilations = count,
            "Processed document"
        );
        Ok(CodeDocument::new(input.source.clone(), input.file_kind, context))
    }
}

/// The value of the last `@tagHelperPrefix` directive in `text`, quotes removed.
fn find_prefix_directive(text: &str) -> Option<&str> {
    text.lines()
        .filter_map(|line| line.trim_start().strip_prefix(TAG_HELPER_PREFIX_DIRECTIVE))
        .filter(|rest| rest.is_empty() || rest.starts_with(char::is_whitespace))
        .map(|rest| {
            let value = rest.trim();
            value
                .strip_prefix('"')
                .and_then(|value| value.strip_suffix('"'))
                .unwrap_or(value)
        })
        .last()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn processor(default_prefix: Option<&str>) -> DesignTimeProcessor {
        DesignTimeProcessor::new(Arc::new(DocumentContextCache::new()), default_prefix.map(str::to_string))
    }

    fn input<'a>(
        file_kind: FileKind,
        source: &'a SourceText,
        imports: &'a [SourceText],
        tag_helpers: &'a TagHelperCollection,
    ) -> ProcessInput<'a> {
        ProcessInput {
            file_path: "/app/Index.cshtml",
            file_kind,
            source,
            imports,
            tag_helpers,
        }
    }

    #[test]
    fn test_find_prefix_directive() {
        assert_eq!(find_prefix_directive("@tagHelperPrefix \"th:\"\n<p></p>"), Some("th:"));
        assert_eq!(find_prefix_directive("  @tagHelperPrefix th"), Some("th"));
        assert_eq!(find_prefix_directive("@tagHelperPrefix \"\""), Some(""));
        assert_eq!(find_prefix_directive("@tagHelperPrefixes th"), None);
        assert_eq!(find_prefix_directive("<p></p>"), None);
    }

    #[test]
    fn test_document_directive_wins() {
        let processor = processor(Some("default"));
        let catalog = TagHelperCollection::empty();
        let imports = [
            SourceText::new("@tagHelperPrefix outer"),
            SourceText::new("@tagHelperPrefix inner"),
        ];

        let own = SourceText::new("@tagHelperPrefix mine\n<p></p>");
        assert_eq!(processor.resolve_prefix(&input(FileKind::Legacy, &own, &imports, &catalog)), Some("mine"));

        let plain = SourceText::new("<p></p>");
        assert_eq!(processor.resolve_prefix(&input(FileKind::Legacy, &plain, &imports, &catalog)), Some("inner"));
        assert_eq!(processor.resolve_prefix(&input(FileKind::Legacy, &plain, &[], &catalog)), Some("default"));
        assert_eq!(processor.resolve_prefix(&input(FileKind::Component, &own, &imports, &catalog)), None);
    }

    #[test]
    fn test_process_shares_contexts() {
        let processor = processor(None);
        let catalog = TagHelperCollection::empty();
        let first = SourceText::new("@tagHelperPrefix th\n<p></p>");
        let second = SourceText::new("@tagHelperPrefix th\n<div></div>");

        let a = processor.process(input(FileKind::Legacy, &first, &[], &catalog)).unwrap();
        let b = processor.process(input(FileKind::Legacy, &second, &[], &catalog)).unwrap();
        assert!(Arc::ptr_eq(a.tag_helper_context(), b.tag_helper_context()));
        assert_eq!(a.tag_helper_context().prefix(), Some("th"));
        assert_eq!(processor.compilations(), 2);
    }
}
