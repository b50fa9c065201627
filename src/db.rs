//! MailDb: document access plus the record transformation entry point.

use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::error::MailError;
use crate::loader::{DocumentLoader, FsLoader};
use crate::record::Record;
use crate::transform::{
    bind_rules, transform_record, FieldFn, RuleSet, TransformOptions, TransformRegistry,
};

/// A directory-rooted mail database.
///
/// Holds the document loader and the transform registry, and exposes the
/// crate's core operation, [`MailDb::transform`]. Documents (rule-set
/// configs, recipient lists, mail bodies) are addressed relative to the
/// root directory.
#[derive(Debug)]
pub struct MailDb<L: DocumentLoader = FsLoader> {
    root: PathBuf,
    loader: L,
    registry: TransformRegistry,
}

impl MailDb<FsLoader> {
    /// Open a filesystem-backed database at a root directory.
    pub fn open(root: impl Into<PathBuf>) -> Self {
        Self::with_loader(root, FsLoader)
    }
}

impl<L: DocumentLoader> MailDb<L> {
    /// Create a database with an injected document loader.
    pub fn with_loader(root: impl Into<PathBuf>, loader: L) -> Self {
        Self {
            root: root.into(),
            loader,
            registry: TransformRegistry::new(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn loader(&self) -> &L {
        &self.loader
    }

    pub fn registry(&self) -> &TransformRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut TransformRegistry {
        &mut self.registry
    }

    /// Register a named field function for module references.
    pub fn register(&mut self, name: impl Into<String>, func: FieldFn) -> &mut Self {
        self.registry.register(name, func);
        self
    }

    /// Load a document addressed relative to the database root.
    pub async fn get(&self, reference: &str) -> Result<Value, MailError> {
        let path = self.loader.resolve(&self.root, reference).await?;
        tracing::debug!(reference, path = %path.display(), "loading document");
        self.loader.load_document(&path).await
    }

    /// Transform a source record through a rule-set.
    ///
    /// The rule-set is read-only here: module references are bound to
    /// registry functions in a fresh copy each call, so a rule-set may be
    /// shared across concurrent transforms. Callers doing many transforms
    /// with one rule-set can pre-bind it once via [`MailDb::bind`] and skip
    /// the repeated lookups.
    ///
    /// Per-field diagnostics flow through `opts.on_error`; the returned
    /// record always carries one entry per evaluated field, with
    /// `Value::Null` standing in for unresolved values.
    ///
    /// # Errors
    /// Document loading and registry resolution failures abort the call.
    pub async fn transform(
        &self,
        source: &Record,
        rules: &RuleSet,
        opts: &TransformOptions<'_>,
    ) -> Result<Record, MailError> {
        transform_record(source, rules, opts, &self.registry, &self.loader).await
    }

    /// Pre-bind a rule-set's module references against a base directory.
    pub async fn bind(&self, rules: &RuleSet, dir: &Path) -> Result<RuleSet, MailError> {
        bind_rules(rules, Some(dir), &self.registry, &self.loader).await
    }
}
