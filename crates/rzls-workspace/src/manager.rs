use std::sync::Arc;
use std::sync::Mutex;
use std::sync::PoisonError;

use arc_swap::ArcSwap;
use camino::Utf8PathBuf;
use rzls_source::FilePathKey;
use rzls_source::SourceText;
use rzls_tag_helpers::TagHelperCollection;
use thiserror::Error;
use tokio::sync::broadcast;

use crate::loader::StaticTextLoader;
use crate::loader::TextLoader;
use crate::project::HostDocument;
use crate::project::HostProject;
use crate::project::ProjectKey;
use crate::snapshot::DocumentSnapshot;
use crate::snapshot::ProjectSnapshot;
use crate::state::DocumentState;
use crate::state::ProjectState;
use crate::state::SolutionState;
use crate::version::VersionStamp;

const CHANGE_CHANNEL_CAPACITY: usize = 64;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProjectError {
    #[error("project {0} already exists")]
    ProjectAlreadyExists(ProjectKey),
    #[error("project {0} not found")]
    ProjectNotFound(ProjectKey),
    #[error("document {path} already exists in project {project}")]
    DocumentAlreadyExists { project: ProjectKey, path: Utf8PathBuf },
    #[error("document {path} not found in project {project}")]
    DocumentNotFound { project: ProjectKey, path: Utf8PathBuf },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProjectChange {
    ProjectAdded(ProjectKey),
    ProjectRemoved(ProjectKey),
    ProjectChanged(ProjectKey),
    DocumentAdded { project: ProjectKey, path: Utf8PathBuf },
    DocumentRemoved { project: ProjectKey, path: Utf8PathBuf },
    DocumentChanged { project: ProjectKey, path: Utf8PathBuf },
    DocumentOpened { project: ProjectKey, path: Utf8PathBuf },
    DocumentClosed { project: ProjectKey, path: Utf8PathBuf },
}

impl ProjectChange {
    #[must_use]
    pub fn project(&self) -> &ProjectKey {
        match self {
            ProjectChange::ProjectAdded(project)
            | ProjectChange::ProjectRemoved(project)
            | ProjectChange::ProjectChanged(project)
            | ProjectChange::DocumentAdded { project, .. }
            | ProjectChange::DocumentRemoved { project, .. }
            | ProjectChange::DocumentChanged { project, .. }
            | ProjectChange::DocumentOpened { project, .. }
            | ProjectChange::DocumentClosed { project, .. } => project,
        }
    }
}

/// One published update: the states on either side and what changed.
#[derive(Debug, Clone)]
pub struct ProjectChangeBatch {
    pub older: Arc<SolutionState>,
    pub newer: Arc<SolutionState>,
    pub changes: Vec<ProjectChange>,
}

/// Owns the current solution state and serializes every update to it.
pub struct ProjectSnapshotManager {
    state: ArcSwap<SolutionState>,
    gate: Mutex<()>,
    changes: broadcast::Sender<Arc<ProjectChangeBatch>>,
}

impl ProjectSnapshotManager {
    #[must_use]
    pub fn new() -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self {
            state: ArcSwap::from_pointee(SolutionState::default()),
            gate: Mutex::new(()),
            changes,
        }
    }

    #[must_use]
    pub fn current(&self) -> Arc<SolutionState> {
        self.state.load_full()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Arc<ProjectChangeBatch>> {
        self.changes.subscribe()
    }

    #[must_use]
    pub fn project(&self, key: &ProjectKey) -> Option<ProjectSnapshot> {
        self.current().project(key).cloned().map(ProjectSnapshot::new)
    }

    pub fn projects(&self) -> Vec<ProjectSnapshot> {
        self.current().projects().cloned().map(ProjectSnapshot::new).collect()
    }

    /// Every project's view of the document at `path`.
    pub fn documents(&self, path: impl AsRef<str>) -> Vec<DocumentSnapshot> {
        let key = FilePathKey::new(path);
        self.current()
            .projects()
            .filter_map(|project| {
                project
                    .document(&key)
                    .map(|document| DocumentSnapshot::new(Arc::clone(project), Arc::clone(document)))
            })
            .collect()
    }

    /// Apply a batch of operations and publish the result as one change.
    ///
    /// An error from any operation discards the whole batch.
    #[tracing::instrument(skip_all)]
    pub fn update<R>(
        &self,
        apply: impl FnOnce(&mut ProjectUpdater) -> Result<R, ProjectError>,
    ) -> Result<R, ProjectError> {
        let _gate = self.gate.lock().unwrap_or_else(PoisonError::into_inner);

        let older = self.state.load_full();
        let version = older.version().next();
        let mut updater = ProjectUpdater {
            state: older.with_version(version),
            version,
            changes: Vec::new(),
        };
        let result = apply(&mut updater)?;

        if updater.changes.is_empty() {
            tracing::trace!("Update produced no changes");
            return Ok(result);
        }

        let newer = Arc::new(updater.state);
        self.state.store(Arc::clone(&newer));
        tracing::debug!(%version, changes = updater.changes.len(), "Published solution state");

        let batch = Arc::new(ProjectChangeBatch {
            older,
            newer,
            changes: updater.changes,
        });
        // No subscribers is fine.
        let _ = self.changes.send(batch);
        Ok(result)
    }
}

impl Default for ProjectSnapshotManager {
    fn default() -> Self {
        Self::new()
    }
}

/// The working state inside [`ProjectSnapshotManager::update`].
pub struct ProjectUpdater {
    state: SolutionState,
    version: VersionStamp,
    changes: Vec<ProjectChange>,
}

impl ProjectUpdater {
    #[must_use]
    pub fn state(&self) -> &SolutionState {
        &self.state
    }

    pub fn add_project(&mut self, host_project: HostProject) -> Result<(), ProjectError> {
        let key = host_project.key().clone();
        if self.state.project(&key).is_some() {
            return Err(ProjectError::ProjectAlreadyExists(key));
        }
        tracing::debug!(project = %key, "Adding project");
        self.state
            .projects_mut()
            .insert(key.clone(), Arc::new(ProjectState::new(host_project, self.version)));
        self.changes.push(ProjectChange::ProjectAdded(key));
        Ok(())
    }

    pub fn remove_project(&mut self, key: &ProjectKey) -> Result<(), ProjectError> {
        let project = self.project(key)?;
        for (path, _) in project.documents() {
            self.state.set_open(path.clone(), false);
        }
        self.state.projects_mut().remove(key);
        self.changes.push(ProjectChange::ProjectRemoved(key.clone()));
        Ok(())
    }

    /// Replace the project's configuration; every document gets a fresh output slot.
    pub fn update_project(&mut self, host_project: HostProject) -> Result<(), ProjectError> {
        let key = host_project.key().clone();
        let project = self.project(&key)?;
        if project.host_project() == &host_project {
            return Ok(());
        }
        let next = project.with_host_project(host_project, self.version);
        self.replace(next);
        self.changes.push(ProjectChange::ProjectChanged(key));
        Ok(())
    }

    /// Install a tag helper catalog; a catalog equal by value is not a change.
    pub fn update_tag_helpers(&mut self, key: &ProjectKey, tag_helpers: TagHelperCollection) -> Result<(), ProjectError> {
        let project = self.project(key)?;
        let Some(next) = project.with_tag_helpers(tag_helpers, self.version) else {
            tracing::trace!(project = %key, "Tag helpers unchanged");
            return Ok(());
        };
        tracing::debug!(project = %key, count = next.tag_helpers().len(), "Tag helpers changed");
        self.replace(next);
        self.changes.push(ProjectChange::ProjectChanged(key.clone()));
        Ok(())
    }

    pub fn add_document(
        &mut self,
        key: &ProjectKey,
        host_document: HostDocument,
        loader: Arc<dyn TextLoader>,
    ) -> Result<(), ProjectError> {
        let project = self.project(key)?;
        let path = host_document.file_path().to_path_buf();
        if project.document(&host_document.key()).is_some() {
            return Err(ProjectError::DocumentAlreadyExists {
                project: key.clone(),
                path,
            });
        }
        let next = project.with_document(DocumentState::new(host_document, loader, self.version), self.version);
        self.replace(next);
        self.changes.push(ProjectChange::DocumentAdded {
            project: key.clone(),
            path,
        });
        Ok(())
    }

    pub fn remove_document(&mut self, key: &ProjectKey, path: impl AsRef<str>) -> Result<(), ProjectError> {
        let project = self.project(key)?;
        let document_key = FilePathKey::new(path);
        let path = self.document(&project, &document_key)?.host_document().file_path().to_path_buf();
        self.replace(project.without_document(&document_key, self.version));
        self.state.set_open(document_key, false);
        self.changes.push(ProjectChange::DocumentRemoved {
            project: key.clone(),
            path,
        });
        Ok(())
    }

    pub fn update_document_text(
        &mut self,
        key: &ProjectKey,
        path: impl AsRef<str>,
        loader: Arc<dyn TextLoader>,
    ) -> Result<(), ProjectError> {
        let document_key = FilePathKey::new(path);
        let path = self.replace_text(key, &document_key, loader)?;
        self.changes.push(ProjectChange::DocumentChanged {
            project: key.clone(),
            path,
        });
        Ok(())
    }

    /// Mark a document open with the editor's text.
    pub fn open_document(&mut self, key: &ProjectKey, path: impl AsRef<str>, text: SourceText) -> Result<(), ProjectError> {
        let document_key = FilePathKey::new(path);
        let path = self.replace_text(key, &document_key, Arc::new(StaticTextLoader::new(text)))?;
        self.state.set_open(document_key, true);
        self.changes.push(ProjectChange::DocumentOpened {
            project: key.clone(),
            path,
        });
        Ok(())
    }

    /// Mark a document closed; `loader` supplies its text from now on.
    pub fn close_document(
        &mut self,
        key: &ProjectKey,
        path: impl AsRef<str>,
        loader: Arc<dyn TextLoader>,
    ) -> Result<(), ProjectError> {
        let document_key = FilePathKey::new(path);
        let path = self.replace_text(key, &document_key, loader)?;
        self.state.set_open(document_key, false);
        self.changes.push(ProjectChange::DocumentClosed {
            project: key.clone(),
            path,
        });
        Ok(())
    }

    fn replace_text(
        &mut self,
        key: &ProjectKey,
        document_key: &FilePathKey,
        loader: Arc<dyn TextLoader>,
    ) -> Result<Utf8PathBuf, ProjectError> {
        let project = self.project(key)?;
        let host_document = self.document(&project, document_key)?.host_document().clone();
        let path = host_document.file_path().to_path_buf();
        let next = project.with_document_state(DocumentState::new(host_document, loader, self.version), self.version);
        self.replace(next);
        Ok(path)
    }

    fn project(&self, key: &ProjectKey) -> Result<Arc<ProjectState>, ProjectError> {
        self.state
            .project(key)
            .cloned()
            .ok_or_else(|| ProjectError::ProjectNotFound(key.clone()))
    }

    fn document(
        &self,
        project: &Arc<ProjectState>,
        document_key: &FilePathKey,
    ) -> Result<Arc<DocumentState>, ProjectError> {
        project
            .document(document_key)
            .cloned()
            .ok_or_else(|| ProjectError::DocumentNotFound {
                project: project.key().clone(),
                path: document_key.as_path().to_path_buf(),
            })
    }

    fn replace(&mut self, project: ProjectState) {
        self.state
            .projects_mut()
            .insert(project.key().clone(), Arc::new(project));
    }
}
