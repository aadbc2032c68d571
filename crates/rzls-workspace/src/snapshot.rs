use std::fmt;
use std::sync::Arc;

use camino::Utf8Path;
use rzls_source::FilePathKey;
use rzls_source::SourceText;
use rzls_tag_helpers::TagHelperCollection;
use tokio_util::sync::CancellationToken;

use crate::loader::LoadError;
use crate::processor::CodeDocument;
use crate::processor::DocumentProcessor;
use crate::processor::GenerateError;
use crate::processor::ProcessInput;
use crate::project::FileKind;
use crate::project::HostProject;
use crate::project::ProjectKey;
use crate::state::DocumentState;
use crate::state::ProjectState;
use crate::version::VersionStamp;

/// The memoized compile result of one document state.
#[derive(Debug)]
pub struct GeneratedOutput {
    code_document: CodeDocument,
    input_version: VersionStamp,
    imports_version: VersionStamp,
}

impl GeneratedOutput {
    #[must_use]
    pub fn code_document(&self) -> &CodeDocument {
        &self.code_document
    }

    /// Newest of the document, import, configuration and catalog versions.
    #[must_use]
    pub fn input_version(&self) -> VersionStamp {
        self.input_version
    }

    #[must_use]
    pub fn imports_version(&self) -> VersionStamp {
        self.imports_version
    }
}

/// A project at one point in time.
#[derive(Clone)]
pub struct ProjectSnapshot {
    state: Arc<ProjectState>,
}

impl ProjectSnapshot {
    #[must_use]
    pub fn new(state: Arc<ProjectState>) -> Self {
        Self { state }
    }

    #[must_use]
    pub fn key(&self) -> &ProjectKey {
        self.state.key()
    }

    #[must_use]
    pub fn host_project(&self) -> &HostProject {
        self.state.host_project()
    }

    #[must_use]
    pub fn tag_helpers(&self) -> &TagHelperCollection {
        self.state.tag_helpers()
    }

    #[must_use]
    pub fn version(&self) -> VersionStamp {
        self.state.version()
    }

    #[must_use]
    pub fn state(&self) -> &Arc<ProjectState> {
        &self.state
    }

    #[must_use]
    pub fn document(&self, path: impl AsRef<str>) -> Option<DocumentSnapshot> {
        self.state
            .document(&FilePathKey::new(path))
            .map(|document| DocumentSnapshot::new(Arc::clone(&self.state), Arc::clone(document)))
    }

    pub fn documents(&self) -> impl Iterator<Item = DocumentSnapshot> + '_ {
        self.state
            .documents()
            .map(|(_, document)| DocumentSnapshot::new(Arc::clone(&self.state), Arc::clone(document)))
    }
}

impl fmt::Debug for ProjectSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.state, f)
    }
}

/// A document within a project at one point in time.
#[derive(Clone)]
pub struct DocumentSnapshot {
    project: Arc<ProjectState>,
    document: Arc<DocumentState>,
}

impl DocumentSnapshot {
    #[must_use]
    pub fn new(project: Arc<ProjectState>, document: Arc<DocumentState>) -> Self {
        Self { project, document }
    }

    #[must_use]
    pub fn file_path(&self) -> &Utf8Path {
        self.document.host_document().file_path()
    }

    #[must_use]
    pub fn target_path(&self) -> &Utf8Path {
        self.document.host_document().target_path()
    }

    #[must_use]
    pub fn file_kind(&self) -> FileKind {
        self.document.host_document().file_kind()
    }

    #[must_use]
    pub fn version(&self) -> VersionStamp {
        self.document.version()
    }

    #[must_use]
    pub fn project(&self) -> ProjectSnapshot {
        ProjectSnapshot::new(Arc::clone(&self.project))
    }

    #[must_use]
    pub fn state(&self) -> &Arc<DocumentState> {
        &self.document
    }

    /// Whether both snapshots share the same document state, and so the same
    /// output slot.
    #[must_use]
    pub fn same_state(&self, other: &DocumentSnapshot) -> bool {
        Arc::ptr_eq(&self.document, &other.document)
    }

    pub async fn text(&self, cancel: &CancellationToken) -> Result<SourceText, LoadError> {
        self.document.text(cancel).await
    }

    #[must_use]
    pub fn imports(&self) -> Vec<DocumentSnapshot> {
        self.project
            .imports_for(self.document.host_document())
            .into_iter()
            .map(|document| DocumentSnapshot::new(Arc::clone(&self.project), document))
            .collect()
    }

    /// The cached output, if one has been computed for this state.
    #[must_use]
    pub fn try_get_generated_output(&self) -> Option<Arc<GeneratedOutput>> {
        self.document.output.get().cloned()
    }

    /// Compute the output once per document state; concurrent callers share the
    /// same computation. Cancellation leaves the slot empty.
    pub async fn generated_output(
        &self,
        processor: &dyn DocumentProcessor,
        cancel: &CancellationToken,
    ) -> Result<Arc<GeneratedOutput>, GenerateError> {
        if let Some(output) = self.try_get_generated_output() {
            tracing::trace!(path = %self.file_path(), "Generated output cache hit");
            return Ok(output);
        }
        if cancel.is_cancelled() {
            return Err(GenerateError::Cancelled);
        }

        let compute = self
            .document
            .output
            .get_or_try_init(|| self.compute_output(processor, cancel));
        tokio::select! {
            biased;
            () = cancel.cancelled() => Err(GenerateError::Cancelled),
            output = compute => output.cloned(),
        }
    }

    #[tracing::instrument(skip_all, fields(path = %self.file_path()))]
    async fn compute_output(
        &self,
        processor: &dyn DocumentProcessor,
        cancel: &CancellationToken,
    ) -> Result<Arc<GeneratedOutput>, GenerateError> {
        tracing::debug!("Generated output cache miss");
        let source = self.text(cancel).await.map_err(cancelled_or)?;

        let imports = self.imports();
        let mut import_texts = Vec::with_capacity(imports.len());
        let mut imports_version = VersionStamp::INITIAL;
        for import in &imports {
            import_texts.push(import.text(cancel).await.map_err(cancelled_or)?);
            imports_version = imports_version.max(import.version());
        }

        let input_version = self
            .version()
            .max(imports_version)
            .max(self.project.configuration_version())
            .max(self.project.tag_helpers_version());

        let code_document = processor.process(ProcessInput {
            file_path: self.file_path().as_str(),
            file_kind: self.file_kind(),
            source: &source,
            imports: &import_texts,
            tag_helpers: self.project.tag_helpers(),
        })?;

        Ok(Arc::new(GeneratedOutput {
            code_document,
            input_version,
            imports_version,
        }))
    }
}

fn cancelled_or(error: LoadError) -> GenerateError {
    match error {
        LoadError::Cancelled => GenerateError::Cancelled,
        error => GenerateError::Load(error),
    }
}

impl fmt::Debug for DocumentSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DocumentSnapshot")
            .field("project", self.project.key())
            .field("document", &self.document)
            .finish()
    }
}
