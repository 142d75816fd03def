//! File Loader
//!
//! Injects a single script or stylesheet into the [`Document`]. A load
//! never fails the caller: errors, timeouts and cancellation are logged and
//! reported as a [`LoadOutcome`], and a half-injected reference is removed
//! so the page proceeds without it.

use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

use super::document::Document;
use super::error::{LoaderError, LoaderResult};
use crate::cancel::CancellationToken;

/// Kind of resource, decided by file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Script,
    Stylesheet,
}

impl ResourceKind {
    /// Classify a path by its extension (case-insensitive)
    pub fn from_path(path: &str) -> LoaderResult<Self> {
        let without_query = path.split(['?', '#']).next().unwrap_or(path);
        let file_name = without_query.rsplit('/').next().unwrap_or(without_query);
        let extension = file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_default();

        match extension.as_str() {
            "js" => Ok(ResourceKind::Script),
            "css" => Ok(ResourceKind::Stylesheet),
            _ => Err(LoaderError::UnsupportedExtension(path.to_string())),
        }
    }
}

/// What happened to a single load
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadOutcome {
    Loaded,
    Failed,
    TimedOut,
    Cancelled,
    Unsupported,
}

impl From<&LoaderError> for LoadOutcome {
    fn from(err: &LoaderError) -> Self {
        match err {
            LoaderError::UnsupportedExtension(_) => LoadOutcome::Unsupported,
            LoaderError::Timeout { .. } => LoadOutcome::TimedOut,
            LoaderError::Cancelled => LoadOutcome::Cancelled,
            LoaderError::NotFound(_) | LoaderError::LoadFailed { .. } => LoadOutcome::Failed,
        }
    }
}

/// Loads scripts and stylesheets into a document
#[derive(Clone)]
pub struct FileLoader {
    document: Arc<dyn Document>,
    timeout: Duration,
    cancel: CancellationToken,
}

impl FileLoader {
    pub fn new(document: Arc<dyn Document>, timeout: Duration, cancel: CancellationToken) -> Self {
        Self {
            document,
            timeout,
            cancel,
        }
    }

    /// Per-load timeout
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Cancellation token of the current run
    pub fn cancel_token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Load a resource, logging instead of failing
    pub async fn load_file(&self, path: &str) -> LoadOutcome {
        match self.try_load_file(path).await {
            Ok(()) => LoadOutcome::Loaded,
            Err(e) => {
                match &e {
                    LoaderError::UnsupportedExtension(_) => {
                        tracing::error!("Refusing to load {}: {}", path, e)
                    }
                    LoaderError::Cancelled => tracing::debug!("Load of {} cancelled", path),
                    _ => tracing::error!("Error on loading {}: {}", path, e),
                }
                LoadOutcome::from(&e)
            }
        }
    }

    /// Load a resource, reporting the failure
    ///
    /// Exactly one injection attempt is made. A reference that failed, timed
    /// out or was cancelled is removed from the document again.
    pub async fn try_load_file(&self, path: &str) -> LoaderResult<()> {
        let kind = ResourceKind::from_path(path)?;
        self.cancel.check()?;

        match kind {
            ResourceKind::Script => tracing::debug!("Load script: {}", path),
            ResourceKind::Stylesheet => tracing::debug!("Load stylesheet: {}", path),
        }

        let result = tokio::select! {
            _ = self.cancel.cancelled() => Err(LoaderError::Cancelled),
            res = tokio::time::timeout(self.timeout, self.document.inject(kind, path)) => {
                match res {
                    Ok(inner) => inner,
                    Err(_) => Err(LoaderError::Timeout {
                        path: path.to_string(),
                        timeout: self.timeout,
                    }),
                }
            }
        };

        if result.is_err() {
            self.document.remove(kind, path).await;
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingDocument;

    fn loader(document: Arc<RecordingDocument>) -> FileLoader {
        FileLoader::new(document, Duration::from_millis(50), CancellationToken::new())
    }

    #[test]
    fn test_resource_kind_from_path() {
        assert_eq!(ResourceKind::from_path("a/b.js").unwrap(), ResourceKind::Script);
        assert_eq!(ResourceKind::from_path("B.CSS").unwrap(), ResourceKind::Stylesheet);
        assert_eq!(
            ResourceKind::from_path("https://x.test/lib.js?v=2").unwrap(),
            ResourceKind::Script
        );
        assert!(matches!(
            ResourceKind::from_path("translations/en.json"),
            Err(LoaderError::UnsupportedExtension(_))
        ));
        assert!(ResourceKind::from_path("Makefile").is_err());
        assert!(ResourceKind::from_path("dir.js/file").is_err());
    }

    #[tokio::test]
    async fn test_load_success() {
        let document = Arc::new(RecordingDocument::new());
        let outcome = loader(document.clone()).load_file("clock.js").await;

        assert_eq!(outcome, LoadOutcome::Loaded);
        assert_eq!(document.present().await, vec!["clock.js".to_string()]);
    }

    #[tokio::test]
    async fn test_failed_load_is_removed() {
        let document = Arc::new(RecordingDocument::new().failing("broken.css"));
        let outcome = loader(document.clone()).load_file("broken.css").await;

        assert_eq!(outcome, LoadOutcome::Failed);
        assert!(document.present().await.is_empty());
        assert_eq!(document.removed().await, vec!["broken.css".to_string()]);
    }

    #[tokio::test]
    async fn test_hung_load_times_out() {
        let document = Arc::new(RecordingDocument::new().hanging("slow.js"));
        let outcome = loader(document.clone()).load_file("slow.js").await;

        assert_eq!(outcome, LoadOutcome::TimedOut);
        assert_eq!(document.removed().await, vec!["slow.js".to_string()]);
    }

    #[tokio::test]
    async fn test_cancel_interrupts_hung_load() {
        let document = Arc::new(RecordingDocument::new().hanging("slow.js"));
        let cancel = CancellationToken::new();
        let loader = FileLoader::new(document, Duration::from_secs(30), cancel.clone());

        let handle = tokio::spawn(async move { loader.try_load_file("slow.js").await });
        tokio::time::sleep(Duration::from_millis(10)).await;
        cancel.cancel();

        let result = tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(result, Err(LoaderError::Cancelled));
    }

    #[tokio::test]
    async fn test_cancelled_before_load() {
        let document = Arc::new(RecordingDocument::new());
        let cancel = CancellationToken::new();
        cancel.cancel();
        let loader = FileLoader::new(document.clone(), Duration::from_secs(1), cancel);

        assert_eq!(loader.load_file("clock.js").await, LoadOutcome::Cancelled);
        assert!(document.attempts().await.is_empty());
    }

    #[tokio::test]
    async fn test_unsupported_extension_injects_nothing() {
        let document = Arc::new(RecordingDocument::new());
        let outcome = loader(document.clone()).load_file("data.json").await;

        assert_eq!(outcome, LoadOutcome::Unsupported);
        assert!(document.attempts().await.is_empty());
    }
}
