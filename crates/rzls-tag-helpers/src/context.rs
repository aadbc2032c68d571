use std::sync::Arc;
use std::sync::OnceLock;

use rzls_source::FxDashMap;

use crate::binder::TagHelperBinder;
use crate::checksum::Checksum;
use crate::collection::TagHelperCollection;

/// The tag helpers in scope for one document plus its tag helper prefix.
///
/// The binder is built on first use and then reused by every query.
#[derive(Debug)]
pub struct TagHelperDocumentContext {
    prefix: Option<String>,
    tag_helpers: TagHelperCollection,
    binder: OnceLock<TagHelperBinder>,
}

impl TagHelperDocumentContext {
    #[must_use]
    pub fn create(prefix: Option<&str>, tag_helpers: TagHelperCollection) -> Self {
        Self {
            prefix: normalize_prefix(prefix).map(str::to_string),
            tag_helpers,
            binder: OnceLock::new(),
        }
    }

    #[must_use]
    pub fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    #[must_use]
    pub fn tag_helpers(&self) -> &TagHelperCollection {
        &self.tag_helpers
    }

    #[must_use]
    pub fn binder(&self) -> &TagHelperBinder {
        self.binder.get_or_init(|| {
            tracing::trace!(
                count = self.tag_helpers.len(),
                prefix = ?self.prefix,
                "Building tag helper binder"
            );
            TagHelperBinder::new(self.prefix.as_deref(), self.tag_helpers.clone())
        })
    }
}

fn normalize_prefix(prefix: Option<&str>) -> Option<&str> {
    prefix.filter(|prefix| !prefix.is_empty())
}

/// Shares document contexts between documents with the same prefix and catalog.
#[derive(Debug, Default)]
pub struct DocumentContextCache {
    contexts: FxDashMap<(Option<String>, Checksum), Arc<TagHelperDocumentContext>>,
}

impl DocumentContextCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_create(
        &self,
        prefix: Option<&str>,
        tag_helpers: &TagHelperCollection,
    ) -> Arc<TagHelperDocumentContext> {
        let prefix = normalize_prefix(prefix);
        let key = (prefix.map(str::to_string), tag_helpers.checksum());

        if let Some(context) = self.contexts.get(&key) {
            return Arc::clone(context.value());
        }

        let entry = self.contexts.entry(key).or_insert_with(|| {
            tracing::debug!(
                count = tag_helpers.len(),
                ?prefix,
                "Creating tag helper document context"
            );
            Arc::new(TagHelperDocumentContext::create(prefix, tag_helpers.clone()))
        });
        Arc::clone(entry.value())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.contexts.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.contexts.is_empty()
    }

    pub fn clear(&self) {
        self.contexts.clear();
    }
}
