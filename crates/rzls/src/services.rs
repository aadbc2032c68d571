use std::sync::Arc;

use anyhow::Context;
use anyhow::Result;
use rzls_conf::Settings;
use rzls_ide::completion_facts;
use rzls_ide::items::attribute_completion_items;
use rzls_ide::items::element_completion_items;
use rzls_ide::syntax::AttributeCompletionLocation;
use rzls_ide::syntax::ElementCompletionLocation;
use rzls_ide::syntax::MarkupSyntax;
use rzls_ide::CommitCharacters;
use rzls_ide::TagHelperCompletionItem;
use rzls_ide::TagHelperCompletionService;
use rzls_source::ByteOffset;
use rzls_tag_helpers::DocumentContextCache;
use rzls_tag_helpers::TagHelperDocumentContext;
use rzls_workspace::BackgroundDocumentGenerator;
use rzls_workspace::DesignTimeProcessor;
use rzls_workspace::DocumentSnapshot;
use rzls_workspace::GeneratedOutput;
use rzls_workspace::ProjectKey;
use rzls_workspace::ProjectSnapshotManager;
use rzls_workspace::TagHelperResolver;
use tokio_util::sync::CancellationToken;

/// Everything a host needs to answer tag helper queries.
///
/// Created once at startup; [`shutdown`](Self::shutdown) stops background work.
/// Must be created inside a Tokio runtime.
pub struct LanguageServices {
    manager: ProjectSnapshotManager,
    processor: Arc<DesignTimeProcessor>,
    completion: TagHelperCompletionService,
    commit: CommitCharacters,
    background: BackgroundDocumentGenerator,
}

impl LanguageServices {
    #[must_use]
    pub fn new(settings: &Settings) -> Self {
        let contexts = Arc::new(DocumentContextCache::new());
        let processor = Arc::new(DesignTimeProcessor::new(
            contexts,
            settings.tag_helpers.prefix.clone(),
        ));
        let manager = ProjectSnapshotManager::new();
        let background = BackgroundDocumentGenerator::spawn(
            &manager,
            processor.clone(),
            CancellationToken::new(),
        );
        tracing::info!(host = ?settings.completion.host, "Language services started");

        Self {
            manager,
            processor,
            completion: TagHelperCompletionService::new(completion_facts(&settings.completion)),
            commit: CommitCharacters::from_settings(&settings.completion),
            background,
        }
    }

    #[must_use]
    pub fn manager(&self) -> &ProjectSnapshotManager {
        &self.manager
    }

    #[must_use]
    pub fn processor(&self) -> &DesignTimeProcessor {
        &self.processor
    }

    #[must_use]
    pub fn commit_characters(&self) -> &CommitCharacters {
        &self.commit
    }

    /// The document at `path` in the first project that contains it.
    pub fn document(&self, path: &str) -> Result<DocumentSnapshot> {
        self.manager
            .documents(path)
            .into_iter()
            .next()
            .with_context(|| format!("No project contains {path}"))
    }

    pub async fn generated_output(
        &self,
        path: &str,
        cancel: &CancellationToken,
    ) -> Result<Arc<GeneratedOutput>> {
        let document = self.document(path)?;
        Ok(document.generated_output(self.processor.as_ref(), cancel).await?)
    }

    /// The tag helpers and prefix in scope for the document at `path`.
    pub async fn document_context(
        &self,
        path: &str,
        cancel: &CancellationToken,
    ) -> Result<Arc<TagHelperDocumentContext>> {
        let output = self.generated_output(path, cancel).await?;
        Ok(Arc::clone(output.code_document().tag_helper_context()))
    }

    /// Element name completions at `offset`; empty when the caret is not on an
    /// element name.
    pub async fn element_completions<S: MarkupSyntax>(
        &self,
        path: &str,
        syntax: &S,
        offset: ByteOffset,
        existing: Vec<String>,
        cancel: &CancellationToken,
    ) -> Result<Vec<TagHelperCompletionItem>> {
        let Some(location) = ElementCompletionLocation::at(syntax, offset) else {
            return Ok(Vec::new());
        };
        let output = self.generated_output(path, cancel).await?;
        let code = output.code_document();

        let replacement = location.replacement;
        let context = location.into_context(code.tag_helper_context(), existing);
        let completions = self.completion.element_completions(&context, cancel)?;
        Ok(element_completion_items(
            &completions,
            replacement,
            code.source().line_index(),
            &self.commit,
        ))
    }

    /// Attribute name completions at `offset`; empty outside a start tag.
    pub async fn attribute_completions<S: MarkupSyntax>(
        &self,
        path: &str,
        syntax: &S,
        offset: ByteOffset,
        existing: Vec<String>,
        cancel: &CancellationToken,
    ) -> Result<Vec<TagHelperCompletionItem>> {
        let Some(location) = AttributeCompletionLocation::at(syntax, offset) else {
            return Ok(Vec::new());
        };
        let output = self.generated_output(path, cancel).await?;
        let code = output.code_document();

        let replacement = location.replacement;
        let context = location.into_context(code.tag_helper_context(), existing);
        let completions = self.completion.attribute_completions(&context, cancel)?;
        Ok(attribute_completion_items(
            &completions,
            replacement,
            code.source().line_index(),
            &self.commit,
        ))
    }

    /// Fetch the project's catalog and install it if it changed by value.
    pub async fn refresh_tag_helpers(
        &self,
        key: &ProjectKey,
        resolver: &dyn TagHelperResolver,
        cancel: &CancellationToken,
    ) -> Result<()> {
        let project = self
            .manager
            .project(key)
            .with_context(|| format!("Unknown project {key}"))?;
        let tag_helpers = resolver.resolve(&project, cancel).await?;
        self.manager
            .update(|updater| updater.update_tag_helpers(key, tag_helpers))?;
        Ok(())
    }

    pub fn shutdown(&self) {
        tracing::info!("Shutting down language services");
        self.background.shutdown();
    }
}

impl Drop for LanguageServices {
    fn drop(&mut self) {
        self.background.shutdown();
    }
}
