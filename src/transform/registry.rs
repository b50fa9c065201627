//! Transform registry: named field functions for rule-sets.
//!
//! Rule-sets are plain data; any rule that needs executable behavior names
//! a function registered here. Module references in a rule-set (path-marker
//! strings) are bound to registry entries by their file stem during the
//! engine's binding pass, so declarative configs stay portable while the
//! host decides which capabilities exist.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::record::Record;

/// A callable attached to an output field.
///
/// Two calling conventions exist, mirroring the two signatures a field
/// function may want:
///
/// * [`FieldFn::Simple`] — `f(source, extra_args)`, for short functions
///   that only derive from the source record;
/// * [`FieldFn::Full`] — `f(output_so_far, field_name, source, extra_args)`,
///   for functions that need the partially built output or their own field
///   name.
#[derive(Clone)]
pub enum FieldFn {
    Simple(Arc<dyn Fn(&Record, &[Value]) -> Value + Send + Sync>),
    Full(Arc<dyn Fn(&Record, &str, &Record, &[Value]) -> Value + Send + Sync>),
}

impl FieldFn {
    /// Wrap a source-only function.
    pub fn simple<F>(f: F) -> Self
    where
        F: Fn(&Record, &[Value]) -> Value + Send + Sync + 'static,
    {
        FieldFn::Simple(Arc::new(f))
    }

    /// Wrap a full-context function.
    pub fn full<F>(f: F) -> Self
    where
        F: Fn(&Record, &str, &Record, &[Value]) -> Value + Send + Sync + 'static,
    {
        FieldFn::Full(Arc::new(f))
    }

    /// Invoke with the appropriate calling convention.
    pub fn call(&self, output: &Record, field: &str, source: &Record, args: &[Value]) -> Value {
        match self {
            FieldFn::Simple(f) => f(source, args),
            FieldFn::Full(f) => f(output, field, source, args),
        }
    }
}

impl fmt::Debug for FieldFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldFn::Simple(_) => write!(f, "FieldFn::Simple(..)"),
            FieldFn::Full(_) => write!(f, "FieldFn::Full(..)"),
        }
    }
}

/// Registry of named field functions.
#[derive(Default, Clone)]
pub struct TransformRegistry {
    transforms: HashMap<String, FieldFn>,
}

impl TransformRegistry {
    /// Create a new empty transform registry.
    pub fn new() -> Self {
        Self {
            transforms: HashMap::new(),
        }
    }

    /// Register a field function under a name.
    ///
    /// # Example
    ///
    /// ```
    /// use mailforge::{FieldFn, TransformRegistry};
    /// use serde_json::Value;
    ///
    /// let mut registry = TransformRegistry::new();
    /// registry.register("first-name", FieldFn::simple(|source, _args| {
    ///     source
    ///         .get("name")
    ///         .and_then(|v| v.as_str())
    ///         .and_then(|name| name.split(' ').next())
    ///         .map(|part| Value::String(part.to_string()))
    ///         .unwrap_or(Value::Null)
    /// }));
    /// assert!(registry.has_transform("first-name"));
    /// ```
    pub fn register(&mut self, name: impl Into<String>, func: FieldFn) {
        self.transforms.insert(name.into(), func);
    }

    /// Look up a field function by name.
    pub fn get(&self, name: &str) -> Option<&FieldFn> {
        self.transforms.get(name)
    }

    /// Check if a transform is registered.
    pub fn has_transform(&self, name: &str) -> bool {
        self.transforms.contains_key(name)
    }

    /// Get list of all registered transform names.
    pub fn list_transforms(&self) -> Vec<String> {
        self.transforms.keys().cloned().collect()
    }

    /// Get number of registered transforms.
    pub fn count(&self) -> usize {
        self.transforms.len()
    }
}

impl fmt::Debug for TransformRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransformRegistry")
            .field("transforms", &self.list_transforms())
            .finish()
    }
}
