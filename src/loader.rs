//! Document loading collaborators.
//!
//! The transform engine never touches the filesystem directly: external
//! resources referenced by rules go through a [`DocumentLoader`]. The
//! default [`FsLoader`] resolves relative paths lexically and parses
//! JSON/YAML documents; tests and embedders can inject their own loader.

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use serde_json::Value;

use crate::error::MailError;

/// Asynchronous document access used by `$ref` resolution and
/// [`MailDb::get`](crate::MailDb::get).
///
/// Loader failures are the one class of error the engine does not recover
/// from: they propagate to the `transform` caller.
#[async_trait]
pub trait DocumentLoader: Send + Sync {
    /// Resolve a relative reference against a base directory into an
    /// absolute locator.
    async fn resolve(&self, dir: &Path, reference: &str) -> Result<PathBuf, MailError>;

    /// Load and parse the document at a resolved locator.
    async fn load_document(&self, path: &Path) -> Result<Value, MailError>;
}

/// Filesystem-backed loader.
///
/// Documents parse by extension: `.json` via serde_json, `.yaml`/`.yml`
/// via serde_yaml, anything else as a plain string value. Unknown formats
/// are the caller's business through the engine's format-handler map.
#[derive(Debug, Clone, Default)]
pub struct FsLoader;

#[async_trait]
impl DocumentLoader for FsLoader {
    async fn resolve(&self, dir: &Path, reference: &str) -> Result<PathBuf, MailError> {
        Ok(normalize(&dir.join(reference)))
    }

    async fn load_document(&self, path: &Path) -> Result<Value, MailError> {
        let contents = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| MailError::Io {
                path: path.to_path_buf(),
                source: e,
            })?;

        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();

        match ext.as_str() {
            "json" => serde_json::from_str(&contents).map_err(|e| MailError::Parse {
                path: path.to_path_buf(),
                reason: e.to_string(),
            }),
            "yaml" | "yml" => serde_yaml::from_str(&contents).map_err(|e| MailError::Parse {
                path: path.to_path_buf(),
                reason: e.to_string(),
            }),
            _ => Ok(Value::String(contents)),
        }
    }
}

/// Lexically normalize a path: drop `.` segments and fold `..` into the
/// preceding segment. No filesystem access.
pub(crate) fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push("..");
                }
            }
            other => out.push(other),
        }
    }
    out
}
