//! Declarative record transformation.
//!
//! The engine maps a source [`Record`](crate::record::Record) into a
//! derived output record using per-field rules: dotted-path references,
//! external resources, named-function calls, conditional lookup tables and
//! bare-key remaps. See [`engine::transform_record`] for the orchestration
//! and [`rule::Rule`] for the rule shapes.

pub mod engine;
pub mod registry;
pub mod resolver;
pub mod rule;

pub use engine::{bind_rules, transform_record, TransformOptions};
pub use registry::{FieldFn, TransformRegistry};
pub use resolver::{resolve_reference, FormatFn, FormatHandlers};
pub use rule::{Rule, RuleSet, INPUT_KEY, KEEP_KEY, REF_KEY};
