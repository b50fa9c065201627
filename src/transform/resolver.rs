//! `$ref` resolution.
//!
//! A reference is either a dotted key path into the source/output records
//! or, when it starts with a path marker (`.`), an external resource loaded
//! through the document loader or a caller-supplied format handler.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::Value;

use crate::error::MailError;
use crate::loader::DocumentLoader;
use crate::record::{find_in_record, Record};

/// Extension-keyed handler invoked instead of the generic document loader.
///
/// Keys are lower-cased file extensions without the dot (`"png"`, `"csv"`).
pub type FormatFn = Arc<dyn Fn(&Path) -> Result<Value, MailError> + Send + Sync>;

/// Map of format handlers checked before falling back to the loader.
pub type FormatHandlers = HashMap<String, FormatFn>;

/// Resolve a `$ref` value.
///
/// * `Ok(Some(value))` — resolved (a found `Value::Null` counts);
/// * `Ok(None)` — the dotted path matched neither source nor output; the
///   caller reports this through its error hook, it is not a failure here;
/// * `Err(..)` — resource loading or a format handler failed.
pub async fn resolve_reference<L: DocumentLoader + ?Sized>(
    reference: &str,
    source: &Record,
    output: &Record,
    dir: Option<&Path>,
    formats: &FormatHandlers,
    loader: &L,
) -> Result<Option<Value>, MailError> {
    if reference.starts_with('.') {
        let base = dir.map(PathBuf::from).unwrap_or_default();
        let path = loader.resolve(&base, reference).await?;
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();
        if let Some(handler) = formats.get(&ext) {
            return handler(&path).map(Some);
        }
        return loader.load_document(&path).await.map(Some);
    }

    // Dotted key path: the whole path through source first, then through
    // the output built so far.
    Ok(find_in_record(reference, source)
        .or_else(|| find_in_record(reference, output))
        .cloned())
}
