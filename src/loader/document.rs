//! Injection target for scripts and stylesheets
//!
//! [`Document`] is the environment resources are injected into. Injection
//! is a global side effect: once a reference is in the document it stays
//! there unless the load failed and the loader removes it again.
//!
//! [`PageDocument`] is the host's own document. It checks local resources
//! against a root directory, records injected references in order and
//! renders the resulting dashboard page.

use async_trait::async_trait;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;

use super::error::{LoaderError, LoaderResult};
use super::file::ResourceKind;

/// Environment that scripts and stylesheets are injected into
#[async_trait]
pub trait Document: Send + Sync {
    /// Inject a reference and wait until it reports load completion
    async fn inject(&self, kind: ResourceKind, path: &str) -> LoaderResult<()>;

    /// Remove a previously injected reference
    async fn remove(&self, kind: ResourceKind, path: &str);
}

/// One reference present in the page
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InjectedResource {
    pub kind: ResourceKind,
    pub path: String,
}

/// File-backed document for the dashboard page
pub struct PageDocument {
    root: PathBuf,
    resources: RwLock<Vec<InjectedResource>>,
}

impl PageDocument {
    /// Create a document serving resources from `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            resources: RwLock::new(Vec::new()),
        }
    }

    /// Document root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// References currently in the page, in injection order
    pub async fn injected(&self) -> Vec<InjectedResource> {
        self.resources.read().await.clone()
    }

    /// Render the page: stylesheets in `<head>`, scripts at the end of `<body>`
    pub async fn render_html(&self, title: &str) -> String {
        let resources = self.resources.read().await;

        let mut head = String::new();
        let mut body = String::new();
        for resource in resources.iter() {
            let href = escape_attr(&resource.path);
            match resource.kind {
                ResourceKind::Stylesheet => {
                    head.push_str(&format!(
                        "    <link rel=\"stylesheet\" type=\"text/css\" href=\"{}\">\n",
                        href
                    ));
                }
                ResourceKind::Script => {
                    body.push_str(&format!(
                        "    <script type=\"text/javascript\" src=\"{}\"></script>\n",
                        href
                    ));
                }
            }
        }

        format!(
            "<!DOCTYPE html>\n<html>\n  <head>\n    <meta charset=\"utf-8\">\n    <title>{}</title>\n{}  </head>\n  <body>\n{}  </body>\n</html>\n",
            escape_attr(title),
            head,
            body
        )
    }

    fn is_remote(path: &str) -> bool {
        path.starts_with("http://") || path.starts_with("https://")
    }
}

#[async_trait]
impl Document for PageDocument {
    async fn inject(&self, kind: ResourceKind, path: &str) -> LoaderResult<()> {
        if !Self::is_remote(path) {
            let local = self.root.join(path.trim_start_matches('/'));
            match tokio::fs::metadata(&local).await {
                Ok(meta) if meta.is_file() => {}
                Ok(_) => {
                    return Err(LoaderError::LoadFailed {
                        path: path.to_string(),
                        reason: "not a regular file".to_string(),
                    })
                }
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    return Err(LoaderError::NotFound(path.to_string()))
                }
                Err(e) => {
                    return Err(LoaderError::LoadFailed {
                        path: path.to_string(),
                        reason: e.to_string(),
                    })
                }
            }
        }

        self.resources.write().await.push(InjectedResource {
            kind,
            path: path.to_string(),
        });
        Ok(())
    }

    async fn remove(&self, kind: ResourceKind, path: &str) {
        self.resources
            .write()
            .await
            .retain(|r| !(r.kind == kind && r.path == path));
    }
}

fn escape_attr(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
