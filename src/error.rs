//! Error types shared across the crate.

use std::fmt;
use std::path::PathBuf;

/// Error type for mail composition and record transformation.
///
/// Per-field transformation problems (an unresolvable `$ref`, a lookup-table
/// miss) are deliberately NOT represented here: the engine reports those
/// through the `on_error` hook and keeps going. `MailError` covers the hard
/// failures that abort an operation: I/O, document parsing, registry
/// resolution and transport errors.
#[derive(Debug)]
pub enum MailError {
    /// Reading or resolving a document failed.
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    /// A loaded document could not be parsed.
    Parse {
        path: PathBuf,
        reason: String,
    },
    /// A rule-set value had an unusable top-level shape.
    InvalidRuleSet(String),
    /// A module reference named a function missing from the registry.
    UnknownTransform(String),
    /// An address was added to a recipient field that does not exist.
    InvalidAddressField(String),
    /// A caller-supplied format handler failed.
    Format(String),
    /// The injected transport rejected the envelope.
    Transport(String),
}

impl fmt::Display for MailError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MailError::Io { path, source } => {
                write!(f, "I/O error at {}: {}", path.display(), source)
            }
            MailError::Parse { path, reason } => {
                write!(f, "Failed to parse {}: {}", path.display(), reason)
            }
            MailError::InvalidRuleSet(msg) => write!(f, "Invalid rule-set: {}", msg),
            MailError::UnknownTransform(name) => {
                write!(f, "Transform not found in registry: {}", name)
            }
            MailError::InvalidAddressField(field) => {
                write!(f, "Invalid address field: {}", field)
            }
            MailError::Format(msg) => write!(f, "Format handler error: {}", msg),
            MailError::Transport(msg) => write!(f, "Transport error: {}", msg),
        }
    }
}

impl std::error::Error for MailError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            MailError::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}
