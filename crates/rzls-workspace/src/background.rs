use std::sync::Arc;

use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

use crate::manager::ProjectChangeBatch;
use crate::manager::ProjectSnapshotManager;
use crate::processor::DocumentProcessor;
use crate::processor::GenerateError;
use crate::snapshot::DocumentSnapshot;

/// Eagerly computes generated output for open documents as batches are published.
///
/// Work for a batch is cancelled as soon as a newer batch arrives. The newer batch
/// reschedules every open document still missing output, including those whose
/// generation was cut short.
pub struct BackgroundDocumentGenerator {
    shutdown: CancellationToken,
    handle: JoinHandle<()>,
}

impl BackgroundDocumentGenerator {
    /// Subscribe to `manager` and start the generator on the current runtime.
    ///
    /// The generator stops when `shutdown` is cancelled or the manager is dropped.
    #[tracing::instrument(skip_all)]
    pub fn spawn(
        manager: &ProjectSnapshotManager,
        processor: Arc<dyn DocumentProcessor>,
        shutdown: CancellationToken,
    ) -> Self {
        let mut receiver = manager.subscribe();
        let token = shutdown.clone();

        let handle = tokio::spawn(
            async move {
                tracing::debug!("Background generator started");
                let mut current = token.child_token();
                loop {
                    let received = tokio::select! {
                        biased;
                        () = token.cancelled() => break,
                        received = receiver.recv() => received,
                    };

                    let batch = match received {
                        Ok(batch) => batch,
                        Err(RecvError::Lagged(skipped)) => {
                            tracing::warn!(skipped, "Background generator lagged behind");
                            continue;
                        }
                        Err(RecvError::Closed) => break,
                    };

                    current.cancel();
                    current = token.child_token();

                    let documents = pending_open_documents(&batch);
                    if documents.is_empty() {
                        continue;
                    }
                    tracing::debug!(
                        version = %batch.newer.version(),
                        count = documents.len(),
                        "Scheduling background generation"
                    );
                    tokio::spawn(
                        generate(documents, Arc::clone(&processor), current.clone()).in_current_span(),
                    );
                }
                current.cancel();
                tracing::debug!("Background generator stopped");
            }
            .in_current_span(),
        );

        Self { shutdown, handle }
    }

    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Wait for the generator loop to exit after [`shutdown`](Self::shutdown).
    pub async fn join(self) {
        if let Err(err) = self.handle.await {
            tracing::error!(?err, "Background generator task failed");
        }
    }
}

/// Open documents in the newer state that have no generated output yet.
fn pending_open_documents(batch: &ProjectChangeBatch) -> Vec<DocumentSnapshot> {
    let mut documents = Vec::new();
    for project in batch.newer.projects() {
        for (key, document) in project.documents() {
            if !batch.newer.is_open(key) {
                continue;
            }
            let snapshot = DocumentSnapshot::new(Arc::clone(project), Arc::clone(document));
            if snapshot.try_get_generated_output().is_none() {
                documents.push(snapshot);
            }
        }
    }
    documents
}

async fn generate(documents: Vec<DocumentSnapshot>, processor: Arc<dyn DocumentProcessor>, cancel: CancellationToken) {
    for document in documents {
        match document.generated_output(processor.as_ref(), &cancel).await {
            Ok(output) => {
                tracing::trace!(
                    path = %document.file_path(),
                    version = %output.input_version(),
                    "Generated output in background"
                );
            }
            Err(GenerateError::Cancelled) => {
                tracing::debug!("Background generation superseded");
                return;
            }
            Err(err) => {
                tracing::warn!(path = %document.file_path(), %err, "Background generation failed");
            }
        }
    }
}
