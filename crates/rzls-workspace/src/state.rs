//! Immutable project and document state.
//!
//! Every update produces new state values; unchanged documents are shared by
//! pointer between the old and the new project state.

use std::fmt;
use std::sync::Arc;

use rustc_hash::FxHashMap;
use rustc_hash::FxHashSet;
use rzls_source::FilePathKey;
use rzls_source::SourceText;
use rzls_tag_helpers::TagHelperCollection;
use tokio::sync::OnceCell;
use tokio_util::sync::CancellationToken;

use crate::imports::import_candidates;
use crate::loader::LoadError;
use crate::loader::TextLoader;
use crate::project::HostDocument;
use crate::project::HostProject;
use crate::project::ProjectKey;
use crate::snapshot::GeneratedOutput;
use crate::version::VersionStamp;

pub struct DocumentState {
    host_document: HostDocument,
    loader: Arc<dyn TextLoader>,
    version: VersionStamp,
    text: OnceCell<SourceText>,
    pub(crate) output: OnceCell<Arc<GeneratedOutput>>,
}

impl DocumentState {
    pub(crate) fn new(host_document: HostDocument, loader: Arc<dyn TextLoader>, version: VersionStamp) -> Self {
        Self {
            host_document,
            loader,
            version,
            text: OnceCell::new(),
            output: OnceCell::new(),
        }
    }

    /// Same document and text, with an empty output slot.
    pub(crate) fn with_fresh_output(&self) -> Self {
        Self {
            host_document: self.host_document.clone(),
            loader: Arc::clone(&self.loader),
            version: self.version,
            text: self.text.clone(),
            output: OnceCell::new(),
        }
    }

    #[must_use]
    pub fn host_document(&self) -> &HostDocument {
        &self.host_document
    }

    /// Version of the document's own text.
    #[must_use]
    pub fn version(&self) -> VersionStamp {
        self.version
    }

    pub async fn text(&self, cancel: &CancellationToken) -> Result<SourceText, LoadError> {
        self.text
            .get_or_try_init(|| self.loader.load(cancel))
            .await
            .cloned()
    }

    #[must_use]
    pub fn try_get_text(&self) -> Option<SourceText> {
        self.text.get().cloned()
    }
}

impl fmt::Debug for DocumentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DocumentState")
            .field("file_path", &self.host_document.file_path())
            .field("version", &self.version)
            .field("has_output", &self.output.initialized())
            .finish_non_exhaustive()
    }
}

#[derive(Clone)]
pub struct ProjectState {
    host_project: HostProject,
    tag_helpers: TagHelperCollection,
    documents: Arc<FxHashMap<FilePathKey, Arc<DocumentState>>>,
    /// Import path to the documents that would import it.
    import_map: Arc<FxHashMap<FilePathKey, Vec<FilePathKey>>>,
    version: VersionStamp,
    configuration_version: VersionStamp,
    tag_helpers_version: VersionStamp,
}

impl ProjectState {
    pub(crate) fn new(host_project: HostProject, version: VersionStamp) -> Self {
        Self {
            host_project,
            tag_helpers: TagHelperCollection::empty(),
            documents: Arc::default(),
            import_map: Arc::default(),
            version,
            configuration_version: version,
            tag_helpers_version: version,
        }
    }

    #[must_use]
    pub fn key(&self) -> &ProjectKey {
        self.host_project.key()
    }

    #[must_use]
    pub fn host_project(&self) -> &HostProject {
        &self.host_project
    }

    #[must_use]
    pub fn tag_helpers(&self) -> &TagHelperCollection {
        &self.tag_helpers
    }

    /// Version of the last change to anything in the project.
    #[must_use]
    pub fn version(&self) -> VersionStamp {
        self.version
    }

    #[must_use]
    pub fn configuration_version(&self) -> VersionStamp {
        self.configuration_version
    }

    /// Version of the last change to the tag helper catalog, by value.
    #[must_use]
    pub fn tag_helpers_version(&self) -> VersionStamp {
        self.tag_helpers_version
    }

    #[must_use]
    pub fn document(&self, path: &FilePathKey) -> Option<&Arc<DocumentState>> {
        self.documents.get(path)
    }

    pub fn documents(&self) -> impl Iterator<Item = (&FilePathKey, &Arc<DocumentState>)> + '_ {
        self.documents.iter()
    }

    #[must_use]
    pub fn document_count(&self) -> usize {
        self.documents.len()
    }

    /// Import documents present in the project for `document`, outermost first.
    #[must_use]
    pub fn imports_for(&self, document: &HostDocument) -> Vec<Arc<DocumentState>> {
        import_candidates(self.host_project.directory(), document.file_path(), document.file_kind())
            .into_iter()
            .filter_map(|path| self.documents.get(&FilePathKey::new(path)).cloned())
            .collect()
    }

    /// Documents that would import `path`.
    #[must_use]
    pub fn documents_importing(&self, path: &FilePathKey) -> &[FilePathKey] {
        self.import_map.get(path).map(Vec::as_slice).unwrap_or_default()
    }

    pub(crate) fn with_host_project(&self, host_project: HostProject, version: VersionStamp) -> Self {
        let mut next = self.clone();
        next.host_project = host_project;
        next.version = version;
        next.configuration_version = version;
        next.import_map = Arc::new(build_import_map(&next.host_project, &next.documents));
        next.refresh_all();
        next
    }

    /// `None` when `tag_helpers` equals the current catalog by value.
    pub(crate) fn with_tag_helpers(&self, tag_helpers: TagHelperCollection, version: VersionStamp) -> Option<Self> {
        if self.tag_helpers == tag_helpers {
            return None;
        }
        let mut next = self.clone();
        next.tag_helpers = tag_helpers;
        next.version = version;
        next.tag_helpers_version = version;
        next.refresh_all();
        Some(next)
    }

    pub(crate) fn with_document(&self, document: DocumentState, version: VersionStamp) -> Self {
        let mut next = self.clone();
        let key = document.host_document().key();
        let host_document = document.host_document().clone();
        Arc::make_mut(&mut next.documents).insert(key.clone(), Arc::new(document));
        next.add_imports_of(&host_document);
        next.version = version;
        next.refresh_related(&key);
        next
    }

    pub(crate) fn without_document(&self, key: &FilePathKey, version: VersionStamp) -> Self {
        let mut next = self.clone();
        Arc::make_mut(&mut next.documents).remove(key);
        let map = Arc::make_mut(&mut next.import_map);
        for related in map.values_mut() {
            related.retain(|document| document != key);
        }
        map.retain(|_, related| !related.is_empty());
        next.version = version;
        next.refresh_related(key);
        next
    }

    /// Replace a document's state; documents importing it get fresh output slots.
    pub(crate) fn with_document_state(&self, document: DocumentState, version: VersionStamp) -> Self {
        let mut next = self.clone();
        let key = document.host_document().key();
        Arc::make_mut(&mut next.documents).insert(key.clone(), Arc::new(document));
        next.version = version;
        next.refresh_related(&key);
        next
    }

    fn add_imports_of(&mut self, document: &HostDocument) {
        let key = document.key();
        let map = Arc::make_mut(&mut self.import_map);
        for import in import_candidates(self.host_project.directory(), document.file_path(), document.file_kind()) {
            let related = map.entry(FilePathKey::new(import)).or_default();
            if !related.contains(&key) {
                related.push(key.clone());
            }
        }
    }

    fn refresh_related(&mut self, import: &FilePathKey) {
        let Some(related) = self.import_map.get(import).cloned() else {
            return;
        };
        let documents = Arc::make_mut(&mut self.documents);
        for key in related {
            if let Some(state) = documents.get_mut(&key) {
                *state = Arc::new(state.with_fresh_output());
            }
        }
    }

    fn refresh_all(&mut self) {
        let documents = Arc::make_mut(&mut self.documents);
        for state in documents.values_mut() {
            *state = Arc::new(state.with_fresh_output());
        }
    }
}

impl fmt::Debug for ProjectState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProjectState")
            .field("key", self.key())
            .field("version", &self.version)
            .field("documents", &self.documents.len())
            .field("tag_helpers", &self.tag_helpers.len())
            .finish_non_exhaustive()
    }
}

fn build_import_map(
    host_project: &HostProject,
    documents: &FxHashMap<FilePathKey, Arc<DocumentState>>,
) -> FxHashMap<FilePathKey, Vec<FilePathKey>> {
    let mut map: FxHashMap<FilePathKey, Vec<FilePathKey>> = FxHashMap::default();
    for (key, state) in documents {
        let document = state.host_document();
        for import in import_candidates(host_project.directory(), document.file_path(), document.file_kind()) {
            map.entry(FilePathKey::new(import)).or_default().push(key.clone());
        }
    }
    map
}

/// Every project plus the set of open documents, at one version.
#[derive(Debug, Clone, Default)]
pub struct SolutionState {
    version: VersionStamp,
    projects: Arc<FxHashMap<ProjectKey, Arc<ProjectState>>>,
    open_documents: Arc<FxHashSet<FilePathKey>>,
}

impl SolutionState {
    #[must_use]
    pub fn version(&self) -> VersionStamp {
        self.version
    }

    #[must_use]
    pub fn project(&self, key: &ProjectKey) -> Option<&Arc<ProjectState>> {
        self.projects.get(key)
    }

    pub fn projects(&self) -> impl Iterator<Item = &Arc<ProjectState>> + '_ {
        self.projects.values()
    }

    #[must_use]
    pub fn is_open(&self, path: &FilePathKey) -> bool {
        self.open_documents.contains(path)
    }

    pub(crate) fn with_version(&self, version: VersionStamp) -> Self {
        Self {
            version,
            ..self.clone()
        }
    }

    pub(crate) fn projects_mut(&mut self) -> &mut FxHashMap<ProjectKey, Arc<ProjectState>> {
        Arc::make_mut(&mut self.projects)
    }

    pub(crate) fn set_open(&mut self, path: FilePathKey, open: bool) {
        let open_documents = Arc::make_mut(&mut self.open_documents);
        if open {
            open_documents.insert(path);
        } else {
            open_documents.remove(&path);
        }
    }
}
