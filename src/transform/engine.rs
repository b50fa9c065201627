//! Transform engine: evaluates a rule-set against a source record.
//!
//! The engine runs two passes. A binding pass resolves module references
//! into registry functions and returns a new bound rule-set (the caller's
//! rule-set is never mutated, so sharing one across concurrent transforms
//! is safe). The main pass then evaluates every field strictly in order,
//! accumulating results into a fresh output record. Per-field problems go
//! through the `on_error` hook and leave `Value::Null` behind; only loader
//! and registry failures abort the whole transform.

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde_json::{json, Value};

use crate::error::MailError;
use crate::loader::DocumentLoader;
use crate::record::Record;
use crate::transform::registry::TransformRegistry;
use crate::transform::resolver::{resolve_reference, FormatFn, FormatHandlers};
use crate::transform::rule::{Rule, RuleSet, KEEP_KEY};

/// Options for one transform invocation.
pub struct TransformOptions<'a> {
    /// Base directory for module references and external `$ref` resources.
    pub dir: Option<PathBuf>,
    /// Extension-keyed handlers checked before the document loader.
    pub formats: FormatHandlers,
    /// Non-fatal diagnostic hook. Side-effect only; never affects control
    /// flow. Defaults to a no-op.
    pub on_error: Option<Box<dyn Fn(&str, &Value) + Send + Sync + 'a>>,
}

impl<'a> TransformOptions<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the base directory.
    pub fn with_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.dir = Some(dir.into());
        self
    }

    /// Register a format handler for a file extension.
    pub fn with_format(mut self, ext: impl Into<String>, handler: FormatFn) -> Self {
        self.formats.insert(ext.into().to_ascii_lowercase(), handler);
        self
    }

    /// Set the diagnostic hook.
    pub fn on_error(mut self, hook: impl Fn(&str, &Value) + Send + Sync + 'a) -> Self {
        self.on_error = Some(Box::new(hook));
        self
    }

    fn report(&self, reason: &str, context: &Value) {
        tracing::warn!(reason, %context, "transform diagnostic");
        if let Some(hook) = &self.on_error {
            hook(reason, context);
        }
    }
}

impl Default for TransformOptions<'_> {
    fn default() -> Self {
        Self {
            dir: None,
            formats: FormatHandlers::new(),
            on_error: None,
        }
    }
}

impl std::fmt::Debug for TransformOptions<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransformOptions")
            .field("dir", &self.dir)
            .field("formats", &self.formats.keys().collect::<Vec<_>>())
            .field("on_error", &self.on_error.as_ref().map(|_| ".."))
            .finish()
    }
}

/// Bind module references in a rule-set to registry functions.
///
/// Returns a new rule-set; the input is untouched. Without a base directory
/// module references stay unbound (and later evaluate as their raw data
/// values, matching the bare-key fallback). Binding an already bound set is
/// a no-op, so the pass is idempotent.
///
/// # Errors
/// A module reference whose file stem is missing from the registry is a
/// module-resolution failure and aborts with
/// [`MailError::UnknownTransform`].
pub async fn bind_rules<L: DocumentLoader + ?Sized>(
    rules: &RuleSet,
    dir: Option<&Path>,
    registry: &TransformRegistry,
    loader: &L,
) -> Result<RuleSet, MailError> {
    let mut bound = RuleSet::new();
    bound.set_keep(rules.keep());

    for (field, rule) in rules.iter() {
        let rule = match (rule, dir) {
            (Rule::ModuleRef { path, args, .. }, Some(dir)) => {
                let resolved = loader.resolve(dir, path).await?;
                let name = resolved
                    .file_stem()
                    .and_then(|s| s.to_str())
                    .unwrap_or(path);
                let func = registry
                    .get(name)
                    .ok_or_else(|| MailError::UnknownTransform(name.to_string()))?;
                tracing::debug!(field = %field, transform = %name, "bound module reference");
                Rule::Call {
                    func: func.clone(),
                    args: args.clone(),
                }
            }
            (other, _) => other.clone(),
        };
        bound.insert(field.clone(), rule);
    }

    Ok(bound)
}

/// Evaluate a rule-set against a source record.
///
/// Fields evaluate first to last; a rule may read fields already populated
/// earlier in the same pass, and a rule referencing a later field sees
/// nothing yet. There is no dependency resolution: callers order dependent
/// fields themselves.
///
/// With `$keep`, source fields are unioned in front of the rule-set fields
/// (rules win on duplicates) and each source value is classified as a rule
/// of its own, which copies plain values through.
///
/// Every iterated field produces exactly one output entry.
pub async fn transform_record<L: DocumentLoader + ?Sized>(
    source: &Record,
    rules: &RuleSet,
    opts: &TransformOptions<'_>,
    registry: &TransformRegistry,
    loader: &L,
) -> Result<Record, MailError> {
    let bound = bind_rules(rules, opts.dir.as_deref(), registry, loader).await?;

    let mut merged: IndexMap<String, Rule> = IndexMap::new();
    if bound.keep() {
        for (key, value) in source {
            merged.insert(key.clone(), Rule::classify(value.clone()));
        }
    }
    for (key, rule) in bound.iter() {
        merged.insert(key.clone(), rule.clone());
    }

    let mut output = Record::new();
    for (field, rule) in &merged {
        if field == KEEP_KEY {
            continue;
        }
        let value = evaluate_rule(rule, field, source, &output, opts, loader).await?;
        output.insert(field.clone(), value);
    }

    Ok(output)
}

/// Evaluate a single rule for one output field.
async fn evaluate_rule<L: DocumentLoader + ?Sized>(
    rule: &Rule,
    field: &str,
    source: &Record,
    output: &Record,
    opts: &TransformOptions<'_>,
    loader: &L,
) -> Result<Value, MailError> {
    let value = match rule {
        Rule::Ref(path) => {
            let resolved = resolve_reference(
                path,
                source,
                output,
                opts.dir.as_deref(),
                &opts.formats,
                loader,
            )
            .await?;
            match resolved {
                Some(value) => value,
                None => {
                    opts.report("unable to resolve $ref", &json!({ "$ref": path }));
                    Value::Null
                }
            }
        }
        Rule::Call { func, args } => func.call(output, field, source, args),
        Rule::Func(func) => func.call(output, field, source, &[]),
        Rule::Lookup { input, table } => {
            // A lookup table, not a reference: a missing selector or a
            // missing table entry stays silent.
            let selector = source.get(input).or_else(|| output.get(input));
            selector
                .and_then(lookup_key)
                .and_then(|key| table.get(&key))
                .cloned()
                .unwrap_or(Value::Null)
        }
        Rule::Object(map) => Value::Object(map.clone()),
        // Unbound module reference: behaves as its raw data value.
        Rule::ModuleRef { raw, .. } => evaluate_bare_key(raw, source, output),
        Rule::Literal(value) => evaluate_bare_key(value, source, output),
    };
    Ok(value)
}

/// Bare-key evaluation: treat a primitive value as a field name in source,
/// else output; when neither resolves, the value itself is the result.
fn evaluate_bare_key(value: &Value, source: &Record, output: &Record) -> Value {
    match lookup_key(value) {
        Some(key) => source
            .get(&key)
            .or_else(|| output.get(&key))
            .cloned()
            .unwrap_or_else(|| value.clone()),
        None => value.clone(),
    }
}

/// Stringify a value into a field-name key the way JS object indexing
/// would. Arrays and objects never act as keys.
fn lookup_key(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null => Some("null".to_string()),
        Value::Array(_) | Value::Object(_) => None,
    }
}
