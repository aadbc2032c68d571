use std::fmt;
use std::io;

use async_trait::async_trait;
use camino::Utf8Path;
use camino::Utf8PathBuf;
use rzls_source::SourceText;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("failed to read {path}")]
    Io {
        path: Utf8PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("text load was cancelled")]
    Cancelled,
}

/// Supplies the text of a document.
#[async_trait]
pub trait TextLoader: Send + Sync + fmt::Debug {
    async fn load(&self, cancel: &CancellationToken) -> Result<SourceText, LoadError>;
}

/// Reads a document from disk.
#[derive(Debug, Clone)]
pub struct FileTextLoader {
    path: Utf8PathBuf,
}

impl FileTextLoader {
    #[must_use]
    pub fn new(path: impl Into<Utf8PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Utf8Path {
        &self.path
    }
}

#[async_trait]
impl TextLoader for FileTextLoader {
    async fn load(&self, cancel: &CancellationToken) -> Result<SourceText, LoadError> {
        let read = tokio::fs::read_to_string(&self.path);
        let contents = tokio::select! {
            biased;
            () = cancel.cancelled() => return Err(LoadError::Cancelled),
            contents = read => contents,
        };
        match contents {
            Ok(contents) => {
                tracing::trace!(path = %self.path, len = contents.len(), "Loaded document text");
                Ok(SourceText::new(contents))
            }
            Err(source) => {
                tracing::warn!(path = %self.path, error = %source, "Failed to load document text");
                Err(LoadError::Io {
                    path: self.path.clone(),
                    source,
                })
            }
        }
    }
}

/// Text already held in memory, such as an open editor buffer.
#[derive(Debug, Clone)]
pub struct StaticTextLoader {
    text: SourceText,
}

impl StaticTextLoader {
    #[must_use]
    pub fn new(text: impl Into<SourceText>) -> Self {
        Self { text: text.into() }
    }
}

#[async_trait]
impl TextLoader for StaticTextLoader {
    async fn load(&self, cancel: &CancellationToken) -> Result<SourceText, LoadError> {
        if cancel.is_cancelled() {
            return Err(LoadError::Cancelled);
        }
        Ok(self.text.clone())
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[tokio::test]
    async fn test_file_loader_reads_disk() {
        let dir = TempDir::new().unwrap();
        let path = Utf8PathBuf::from_path_buf(dir.path().join("Index.cshtml")).unwrap();
        std::fs::write(&path, "<p>Hello</p>").unwrap();

        let text = FileTextLoader::new(&path)
            .load(&CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(text.as_str(), "<p>Hello</p>");
    }

    #[tokio::test]
    async fn test_file_loader_reports_missing_file() {
        let dir = TempDir::new().unwrap();
        let path = Utf8PathBuf::from_path_buf(dir.path().join("Missing.cshtml")).unwrap();

        let error = FileTextLoader::new(&path)
            .load(&CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(error, LoadError::Io { .. }));
    }

    #[tokio::test]
    async fn test_cancelled_load() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let error = StaticTextLoader::new("text").load(&cancel).await.unwrap_err();
        assert!(matches!(error, LoadError::Cancelled));
    }
}
