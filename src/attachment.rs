//! Attachment model with a transport-ready projection.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::placeholders::replace;
use crate::record::Record;

/// A mail attachment.
///
/// All fields are plain strings; empty means unset. The field set matches
/// what SMTP transport layers commonly accept (filename, inline content,
/// file path, remote href, content metadata, content id for inline images,
/// raw override).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Attachment {
    pub filename: String,
    pub content: String,
    pub path: String,
    pub href: String,
    pub http_headers: String,
    pub content_type: String,
    pub content_disposition: String,
    pub cid: String,
    pub encoding: String,
    pub headers: String,
    pub raw: String,
}

impl Default for Attachment {
    fn default() -> Self {
        Self {
            filename: String::new(),
            content: String::new(),
            path: String::new(),
            href: String::new(),
            http_headers: String::new(),
            content_type: String::new(),
            content_disposition: "attachment".to_string(),
            cid: String::new(),
            encoding: String::new(),
            headers: String::new(),
            raw: String::new(),
        }
    }
}

impl Attachment {
    /// Build an attachment from a data value: an object reads its fields,
    /// a bare string is taken as a file path.
    pub fn from_value(input: &Value) -> Self {
        match input {
            Value::String(path) => Self {
                path: path.clone(),
                ..Self::default()
            },
            Value::Object(_) => {
                serde_json::from_value(input.clone()).unwrap_or_default()
            }
            _ => Self::default(),
        }
    }

    /// Project into a transport-ready object, keeping only non-empty
    /// fields. Placeholder replacement runs over filename, path, href and
    /// cid.
    pub fn format_for_transport(&self, replacements: &Record) -> Record {
        let mut out = Record::new();
        let mut put = |key: &str, value: String| {
            if !value.is_empty() {
                out.insert(key.to_string(), Value::String(value));
            }
        };
        put("filename", replace(&self.filename, replacements));
        put("content", self.content.clone());
        put("path", replace(&self.path, replacements));
        put("href", replace(&self.href, replacements));
        put("httpHeaders", self.http_headers.clone());
        put("contentType", self.content_type.clone());
        put("contentDisposition", self.content_disposition.clone());
        put("cid", replace(&self.cid, replacements));
        put("encoding", self.encoding.clone());
        put("headers", self.headers.clone());
        put("raw", self.raw.clone());
        out
    }
}
