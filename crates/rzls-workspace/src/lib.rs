//! Project and document snapshots.
//!
//! [`ProjectSnapshotManager`] owns the current [`SolutionState`] and applies
//! batches of updates to it, publishing one [`ProjectChangeBatch`] per batch.
//! Readers take [`ProjectSnapshot`]s and [`DocumentSnapshot`]s, which never
//! change once taken. A document's generated output is computed at most once
//! per document state and shared by every snapshot holding that state.

mod background;
mod imports;
mod loader;
mod manager;
mod processor;
mod project;
mod resolver;
mod snapshot;
mod state;
mod version;

pub use background::BackgroundDocumentGenerator;
pub use imports::import_candidates;
pub use imports::imports_file_name;
pub use imports::COMPONENT_IMPORTS_FILE_NAME;
pub use imports::LEGACY_IMPORTS_FILE_NAME;
pub use loader::FileTextLoader;
pub use loader::LoadError;
pub use loader::StaticTextLoader;
pub use loader::TextLoader;
pub use manager::ProjectChange;
pub use manager::ProjectChangeBatch;
pub use manager::ProjectError;
pub use manager::ProjectSnapshotManager;
pub use manager::ProjectUpdater;
pub use processor::CodeDocument;
pub use processor::DesignTimeProcessor;
pub use processor::DocumentProcessor;
pub use processor::GenerateError;
pub use processor::ProcessInput;
pub use project::FileKind;
pub use project::HostDocument;
pub use project::HostProject;
pub use project::ProjectConfiguration;
pub use project::ProjectKey;
pub use resolver::ProviderTagHelperResolver;
pub use resolver::ResolveError;
pub use resolver::TagHelperResolver;
pub use snapshot::DocumentSnapshot;
pub use snapshot::GeneratedOutput;
pub use snapshot::ProjectSnapshot;
pub use state::DocumentState;
pub use state::ProjectState;
pub use state::SolutionState;
pub use version::VersionStamp;
