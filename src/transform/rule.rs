//! Rule-set model: tagged rules classified from declarative data.
//!
//! A rule-set maps output field names to rules. In data form (JSON/YAML) a
//! rule's kind is inferred from its shape once, up front, into the tagged
//! [`Rule`] enum; the evaluator then matches exhaustively instead of
//! re-checking shapes per field.

use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use serde_json::Value;

use crate::error::MailError;
use crate::transform::registry::FieldFn;

/// The reserved control key that seeds output with source fields.
pub const KEEP_KEY: &str = "$keep";

/// Key marking a reference rule.
pub const REF_KEY: &str = "$ref";

/// Key marking a lookup-table rule.
pub const INPUT_KEY: &str = "$input";

/// A single transformation rule for one output field.
#[derive(Debug, Clone)]
pub enum Rule {
    /// `{"$ref": "path"}` — resolve a dotted path or an external resource.
    Ref(String),
    /// An invocable with extra positional arguments, either built
    /// programmatically or produced by binding a [`Rule::ModuleRef`].
    Call { func: FieldFn, args: Vec<Value> },
    /// A data-form function reference awaiting registry binding: a
    /// path-marker string (`"./fn:arg"`, colon-split) or an array headed by
    /// one. Without a base directory it evaluates as its raw value.
    ModuleRef {
        raw: Value,
        path: String,
        args: Vec<Value>,
    },
    /// `{"$input": "field", ...}` — index this same object by the value of
    /// another field.
    Lookup {
        input: String,
        table: serde_json::Map<String, Value>,
    },
    /// Any other object: copied through verbatim, no evaluation.
    Object(serde_json::Map<String, Value>),
    /// A directly invocable rule, called with the full convention.
    Func(FieldFn),
    /// A primitive: bare-key reference with fallback to the literal value.
    Literal(Value),
}

impl Rule {
    /// Classify a data value into a rule by its shape.
    ///
    /// Dispatch mirrors evaluation order: `$ref` wins over `$input` when an
    /// object carries both.
    pub fn classify(value: Value) -> Rule {
        match value {
            Value::Object(map) => {
                if let Some(Value::String(path)) = map.get(REF_KEY) {
                    if !path.is_empty() {
                        return Rule::Ref(path.clone());
                    }
                }
                if let Some(Value::String(input)) = map.get(INPUT_KEY) {
                    if !input.is_empty() {
                        return Rule::Lookup {
                            input: input.clone(),
                            table: map,
                        };
                    }
                }
                Rule::Object(map)
            }
            Value::Array(items) => {
                let module_path = match items.first() {
                    Some(Value::String(head)) if head.starts_with('.') => Some(head.clone()),
                    _ => None,
                };
                match module_path {
                    Some(path) => Rule::ModuleRef {
                        args: items[1..].to_vec(),
                        raw: Value::Array(items),
                        path,
                    },
                    None => Rule::Literal(Value::Array(items)),
                }
            }
            Value::String(text) if text.starts_with('.') => {
                // "./fn:a:b" carries colon-separated arguments.
                let mut parts = text.split(':');
                let path = parts.next().unwrap_or_default().to_string();
                let args = parts.map(|p| Value::String(p.to_string())).collect();
                Rule::ModuleRef {
                    raw: Value::String(text),
                    path,
                    args,
                }
            }
            other => Rule::Literal(other),
        }
    }

    /// Shorthand for a call rule.
    pub fn call(func: FieldFn, args: Vec<Value>) -> Rule {
        Rule::Call { func, args }
    }

    /// Shorthand for a reference rule.
    pub fn reference(path: impl Into<String>) -> Rule {
        Rule::Ref(path.into())
    }
}

/// An ordered mapping of output field name → [`Rule`], plus the `$keep`
/// control flag.
///
/// Declaration order is a contract: fields are evaluated first to last, and
/// later rules may read earlier results from the partial output.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    keep: bool,
    rules: IndexMap<String, Rule>,
}

impl RuleSet {
    /// Create an empty rule-set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Classify every entry of a JSON object into a rule-set.
    ///
    /// The `$keep` key is consumed into the flag (JS truthiness: `false`,
    /// `0`, `""` and `null` are off) and never becomes a rule.
    ///
    /// # Errors
    /// Returns [`MailError::InvalidRuleSet`] when the value is not an object.
    pub fn from_value(value: Value) -> Result<Self, MailError> {
        let map = match value {
            Value::Object(map) => map,
            other => {
                return Err(MailError::InvalidRuleSet(format!(
                    "expected an object, got {}",
                    kind_name(&other)
                )))
            }
        };

        let mut set = RuleSet::new();
        for (key, entry) in map {
            if key == KEEP_KEY {
                set.keep = is_truthy(&entry);
                continue;
            }
            set.rules.insert(key, Rule::classify(entry));
        }
        Ok(set)
    }

    /// Parse a rule-set from JSON text.
    pub fn from_json_str(text: &str) -> Result<Self, MailError> {
        let value: Value = serde_json::from_str(text)
            .map_err(|e| MailError::InvalidRuleSet(format!("invalid JSON: {}", e)))?;
        Self::from_value(value)
    }

    /// Parse a rule-set from YAML text. Key order is preserved.
    pub fn from_yaml_str(text: &str) -> Result<Self, MailError> {
        let value: Value = serde_yaml::from_str(text)
            .map_err(|e| MailError::InvalidRuleSet(format!("invalid YAML: {}", e)))?;
        Self::from_value(value)
    }

    /// Load a rule-set from a `.json`, `.yaml` or `.yml` file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, MailError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| MailError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();
        match ext.as_str() {
            "json" => Self::from_json_str(&contents),
            _ => Self::from_yaml_str(&contents),
        }
        .map_err(|e| MailError::Parse {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Insert a rule, replacing any existing rule for the field while
    /// keeping its original position.
    pub fn insert(&mut self, field: impl Into<String>, rule: Rule) -> &mut Self {
        self.rules.insert(field.into(), rule);
        self
    }

    /// Whether source fields seed the output before rules apply.
    pub fn keep(&self) -> bool {
        self.keep
    }

    /// Set the `$keep` control flag.
    pub fn set_keep(&mut self, keep: bool) -> &mut Self {
        self.keep = keep;
        self
    }

    /// Get the rule for a field.
    pub fn get(&self, field: &str) -> Option<&Rule> {
        self.rules.get(field)
    }

    /// Iterate fields and rules in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Rule)> {
        self.rules.iter()
    }

    /// Number of rules (excluding the `$keep` flag).
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether the rule-set has no rules.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// JS-style truthiness for control values coming from data.
pub(crate) fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
