use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use rzls_source::SourceText;
use rzls_tag_helpers::DocumentContextCache;
use rzls_tag_helpers::TagHelperCollection;
use rzls_tag_helpers::TagHelperDescriptorBuilder;
use rzls_workspace::BackgroundDocumentGenerator;
use rzls_workspace::DesignTimeProcessor;
use rzls_workspace::DocumentSnapshot;
use rzls_workspace::GenerateError;
use rzls_workspace::HostDocument;
use rzls_workspace::HostProject;
use rzls_workspace::LoadError;
use rzls_workspace::ProjectChange;
use rzls_workspace::ProjectConfiguration;
use rzls_workspace::ProjectError;
use rzls_workspace::ProjectKey;
use rzls_workspace::ProjectSnapshotManager;
use rzls_workspace::StaticTextLoader;
use rzls_workspace::TextLoader;
use tokio_util::sync::CancellationToken;

const PROJECT: &str = "/app/App.csproj";
const INDEX: &str = "/app/Pages/Index.cshtml";
const IMPORTS: &str = "/app/_ViewImports.cshtml";
const OTHER: &str = "/app/Shared/Layout.cshtml";

fn key() -> ProjectKey {
    ProjectKey::new(PROJECT)
}

fn loader(text: &str) -> Arc<dyn TextLoader> {
    Arc::new(StaticTextLoader::new(SourceText::new(text)))
}

fn processor() -> DesignTimeProcessor {
    DesignTimeProcessor::new(Arc::new(DocumentContextCache::new()), None)
}

fn catalog() -> TagHelperCollection {
    [TagHelperDescriptorBuilder::tag_helper("DivTagHelper", "App")
        .tag_matching_rule(|rule| rule.tag_name("div"))
        .build()]
    .into_iter()
    .collect()
}

fn manager_with_index() -> ProjectSnapshotManager {
    let manager = ProjectSnapshotManager::new();
    manager
        .update(|updater| {
            updater.add_project(HostProject::new(PROJECT, ProjectConfiguration::default(), None))?;
            updater.add_document(&key(), HostDocument::new(INDEX, "Pages/Index.cshtml"), loader("<div></div>"))
        })
        .unwrap();
    manager
}

fn index(manager: &ProjectSnapshotManager) -> DocumentSnapshot {
    manager.project(&key()).unwrap().document(INDEX).unwrap()
}

mod cache {
    use super::*;

    #[tokio::test]
    async fn unrelated_document_keeps_cached_output() {
        let manager = manager_with_index();
        let processor = processor();
        let cancel = CancellationToken::new();
        let first = index(&manager).generated_output(&processor, &cancel).await.unwrap();

        manager
            .update(|updater| updater.add_document(&key(), HostDocument::new(OTHER, "Shared/Layout.cshtml"), loader("")))
            .unwrap();

        let second = index(&manager).generated_output(&processor, &cancel).await.unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(processor.compilations(), 1);
    }

    #[tokio::test]
    async fn own_text_change_recomputes() {
        let manager = manager_with_index();
        let processor = processor();
        let cancel = CancellationToken::new();
        let first = index(&manager).generated_output(&processor, &cancel).await.unwrap();

        manager
            .update(|updater| updater.update_document_text(&key(), INDEX, loader("<p></p>")))
            .unwrap();

        let snapshot = index(&manager);
        assert!(snapshot.try_get_generated_output().is_none());
        let second = snapshot.generated_output(&processor, &cancel).await.unwrap();
        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(second.code_document().source().as_str(), "<p></p>");
        assert!(second.input_version() > first.input_version());
    }

    #[tokio::test]
    async fn import_changes_recompute() {
        let manager = manager_with_index();
        let processor = processor();
        let cancel = CancellationToken::new();
        let first = index(&manager).generated_output(&processor, &cancel).await.unwrap();

        manager
            .update(|updater| {
                updater.add_document(&key(), HostDocument::new(IMPORTS, "_ViewImports.cshtml"), loader("@tagHelperPrefix th"))
            })
            .unwrap();
        let second = index(&manager).generated_output(&processor, &cancel).await.unwrap();
        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(second.code_document().tag_helper_context().prefix(), Some("th"));

        manager
            .update(|updater| updater.update_document_text(&key(), IMPORTS, loader("@tagHelperPrefix x")))
            .unwrap();
        let third = index(&manager).generated_output(&processor, &cancel).await.unwrap();
        assert!(!Arc::ptr_eq(&second, &third));
        assert_eq!(third.code_document().tag_helper_context().prefix(), Some("x"));
        assert_eq!(third.imports_version(), manager.current().version());
    }

    #[tokio::test]
    async fn value_equal_catalog_is_not_a_change() {
        let manager = manager_with_index();
        manager.update(|updater| updater.update_tag_helpers(&key(), catalog())).unwrap();
        let version = manager.current().version();

        let processor = processor();
        let cancel = CancellationToken::new();
        let first = index(&manager).generated_output(&processor, &cancel).await.unwrap();

        let mut changes = manager.subscribe();
        manager.update(|updater| updater.update_tag_helpers(&key(), catalog())).unwrap();
        assert_eq!(manager.current().version(), version);
        assert!(changes.try_recv().is_err());

        let second = index(&manager).generated_output(&processor, &cancel).await.unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[tokio::test]
    async fn different_catalog_recomputes() {
        let manager = manager_with_index();
        let processor = processor();
        let cancel = CancellationToken::new();
        let first = index(&manager).generated_output(&processor, &cancel).await.unwrap();

        manager.update(|updater| updater.update_tag_helpers(&key(), catalog())).unwrap();
        let second = index(&manager).generated_output(&processor, &cancel).await.unwrap();
        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(second.code_document().tag_helper_context().tag_helpers().len(), 1);
    }

    #[tokio::test]
    async fn concurrent_readers_share_one_compute() {
        let manager = manager_with_index();
        let processor = processor();
        let cancel = CancellationToken::new();
        let snapshot = index(&manager);

        let (first, second) = tokio::join!(
            snapshot.generated_output(&processor, &cancel),
            snapshot.generated_output(&processor, &cancel),
        );
        assert!(Arc::ptr_eq(&first.unwrap(), &second.unwrap()));
        assert_eq!(processor.compilations(), 1);
    }
}

mod cancellation {
    use super::*;

    /// Waits for cancellation on the first load, then succeeds.
    #[derive(Debug, Default)]
    struct StallOnce {
        stalled: AtomicBool,
    }

    #[async_trait]
    impl TextLoader for StallOnce {
        async fn load(&self, cancel: &CancellationToken) -> Result<SourceText, LoadError> {
            if !self.stalled.swap(true, Ordering::SeqCst) {
                cancel.cancelled().await;
                return Err(LoadError::Cancelled);
            }
            Ok(SourceText::new("<div></div>"))
        }
    }

    #[tokio::test]
    async fn cancelled_compute_leaves_slot_empty() {
        let manager = ProjectSnapshotManager::new();
        manager
            .update(|updater| {
                updater.add_project(HostProject::new(PROJECT, ProjectConfiguration::default(), None))?;
                updater.add_document(&key(), HostDocument::new(INDEX, "Pages/Index.cshtml"), Arc::new(StallOnce::default()))
            })
            .unwrap();
        let processor = processor();
        let snapshot = index(&manager);

        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            trigger.cancel();
        });
        let result = snapshot.generated_output(&processor, &cancel).await;
        assert!(matches!(result, Err(GenerateError::Cancelled)));
        assert!(snapshot.try_get_generated_output().is_none());

        let retry = snapshot
            .generated_output(&processor, &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(retry.code_document().source().as_str(), "<div></div>");
        assert_eq!(processor.compilations(), 1);
    }

    #[tokio::test]
    async fn cancelled_token_fails_fast() {
        let manager = manager_with_index();
        let cancel = CancellationToken::new();
        cancel.cancel();
        let result = index(&manager).generated_output(&processor(), &cancel).await;
        assert!(matches!(result, Err(GenerateError::Cancelled)));
    }
}

mod updates {
    use super::*;

    #[test]
    fn batch_publishes_one_change_set() {
        let manager = ProjectSnapshotManager::new();
        let mut changes = manager.subscribe();
        manager
            .update(|updater| {
                updater.add_project(HostProject::new(PROJECT, ProjectConfiguration::default(), None))?;
                updater.add_document(&key(), HostDocument::new(INDEX, "Pages/Index.cshtml"), loader(""))?;
                updater.open_document(&key(), INDEX, SourceText::new("<div>"))
            })
            .unwrap();

        let batch = changes.try_recv().unwrap();
        assert_eq!(
            batch.changes,
            [
                ProjectChange::ProjectAdded(key()),
                ProjectChange::DocumentAdded {
                    project: key(),
                    path: INDEX.into()
                },
                ProjectChange::DocumentOpened {
                    project: key(),
                    path: INDEX.into()
                },
            ]
        );
        assert!(batch.older.project(&key()).is_none());
        assert_eq!(batch.newer.version(), manager.current().version());
        assert!(manager.current().is_open(&INDEX.into()));
        assert!(changes.try_recv().is_err());
    }

    #[test]
    fn failed_batch_publishes_nothing() {
        let manager = ProjectSnapshotManager::new();
        let mut changes = manager.subscribe();
        let missing = ProjectKey::new("/missing/Missing.csproj");

        let result = manager.update(|updater| {
            updater.add_project(HostProject::new(PROJECT, ProjectConfiguration::default(), None))?;
            updater.add_document(&missing, HostDocument::new(INDEX, "Index.cshtml"), loader(""))
        });

        assert_eq!(result, Err(ProjectError::ProjectNotFound(missing)));
        assert!(manager.project(&key()).is_none());
        assert!(changes.try_recv().is_err());
    }

    #[test]
    fn duplicate_document_is_rejected() {
        let manager = manager_with_index();
        let result = manager.update(|updater| {
            updater.add_document(&key(), HostDocument::new(INDEX, "Pages/Index.cshtml"), loader(""))
        });
        assert!(matches!(result, Err(ProjectError::DocumentAlreadyExists { .. })));
    }

    #[test]
    fn old_snapshots_stay_consistent() {
        let manager = manager_with_index();
        let before = manager.project(&key()).unwrap();

        manager.update(|updater| updater.remove_document(&key(), INDEX)).unwrap();

        assert!(before.document(INDEX).is_some());
        assert!(manager.project(&key()).unwrap().document(INDEX).is_none());
        assert!(before.version() < manager.current().version());
    }

    #[test]
    fn configuration_change_refreshes_documents() {
        let manager = manager_with_index();
        let before = index(&manager);

        let configuration = ProjectConfiguration {
            language_version: "8.0".to_string(),
            ..ProjectConfiguration::default()
        };
        manager
            .update(|updater| updater.update_project(HostProject::new(PROJECT, configuration, None)))
            .unwrap();

        let after = index(&manager);
        assert!(!after.same_state(&before));
        assert_eq!(after.project().host_project().configuration().language_version, "8.0");
    }
}

mod background {
    use super::*;

    async fn wait_for_output(manager: &ProjectSnapshotManager) -> bool {
        for _ in 0..200 {
            if index(manager).try_get_generated_output().is_some() {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        false
    }

    #[tokio::test]
    async fn open_documents_are_generated_eagerly() {
        let manager = manager_with_index();
        let processor = Arc::new(processor());
        let generator = BackgroundDocumentGenerator::spawn(&manager, processor.clone(), CancellationToken::new());

        manager
            .update(|updater| updater.open_document(&key(), INDEX, SourceText::new("<div>open</div>")))
            .unwrap();

        assert!(wait_for_output(&manager).await);
        let output = index(&manager).try_get_generated_output().unwrap();
        assert_eq!(output.code_document().source().as_str(), "<div>open</div>");

        generator.shutdown();
        generator.join().await;
    }

    /// Parks the first load until it is cancelled, flagging that it got there.
    #[derive(Debug)]
    struct ParkFirstLoad {
        parked: Arc<AtomicBool>,
    }

    #[async_trait]
    impl TextLoader for ParkFirstLoad {
        async fn load(&self, cancel: &CancellationToken) -> Result<SourceText, LoadError> {
            if !self.parked.swap(true, Ordering::SeqCst) {
                cancel.cancelled().await;
                return Err(LoadError::Cancelled);
            }
            Ok(SourceText::new("@tagHelperPrefix th"))
        }
    }

    #[tokio::test]
    async fn superseded_open_document_is_rescheduled() {
        let manager = manager_with_index();
        let parked = Arc::new(AtomicBool::new(false));
        manager
            .update(|updater| {
                updater.add_document(
                    &key(),
                    HostDocument::new(IMPORTS, "_ViewImports.cshtml"),
                    Arc::new(ParkFirstLoad { parked: parked.clone() }),
                )?;
                updater.add_document(&key(), HostDocument::new(OTHER, "Shared/Layout.cshtml"), loader(""))
            })
            .unwrap();
        let generator = BackgroundDocumentGenerator::spawn(&manager, Arc::new(processor()), CancellationToken::new());

        manager
            .update(|updater| updater.open_document(&key(), INDEX, SourceText::new("<div>open</div>")))
            .unwrap();
        for _ in 0..200 {
            if parked.load(Ordering::SeqCst) {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        assert!(parked.load(Ordering::SeqCst));

        manager
            .update(|updater| updater.update_document_text(&key(), OTHER, loader("<p></p>")))
            .unwrap();

        assert!(wait_for_output(&manager).await);
        let output = index(&manager).try_get_generated_output().unwrap();
        assert_eq!(output.code_document().tag_helper_context().prefix(), Some("th"));

        generator.shutdown();
        generator.join().await;
    }

    #[tokio::test]
    async fn closed_documents_stay_lazy() {
        let manager = manager_with_index();
        let generator = BackgroundDocumentGenerator::spawn(&manager, Arc::new(processor()), CancellationToken::new());

        manager
            .update(|updater| updater.update_document_text(&key(), INDEX, loader("<p></p>")))
            .unwrap();

        assert!(!wait_for_output(&manager).await);
        generator.shutdown();
        generator.join().await;
    }
}
