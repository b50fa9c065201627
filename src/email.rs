//! Templated e-mail and its transport-ready envelope.

use std::path::PathBuf;

use serde::Serialize;
use serde_json::Value;

use crate::address::Address;
use crate::attachment::Attachment;
use crate::placeholders::replace;
use crate::record::{to_record, Record};
use crate::target::Target;

/// A templated e-mail: subject/body with `{{key}}` placeholders, sender,
/// recipients and attachments.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Email {
    pub subject: String,
    pub html: String,
    /// Default replacement fields carried with the template.
    pub fields: Record,
    pub from: Address,
    pub target: Target,
    /// Inline CSS injected into the rendered document head.
    pub style: String,
    /// Base directory for relative attachment paths.
    pub dir: Option<PathBuf>,
    pub attachments: Vec<Attachment>,
    /// Optional explicit plain-text body; derived from the HTML when empty.
    pub text: String,
}

/// The flattened payload handed to a transport.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Envelope {
    pub from: String,
    pub to: String,
    pub cc: String,
    pub bcc: String,
    pub subject: String,
    pub html: String,
    pub text: String,
    pub attachments: Vec<Record>,
}

impl Email {
    /// Build an e-mail from a data value.
    ///
    /// A `to` field is honored only when no `target` is given; `target`
    /// wins otherwise.
    pub fn from_value(input: &Value) -> Result<Self, crate::error::MailError> {
        let get_str = |key: &str| {
            input
                .get(key)
                .and_then(|v| v.as_str())
                .unwrap_or("")
                .to_string()
        };

        let to = input.get("to").cloned().unwrap_or(Value::Null);
        let target_value = input.get("target").cloned().unwrap_or(Value::Null);
        let target_source = if !to.is_null() && target_value.is_null() {
            to
        } else {
            target_value
        };

        let mut email = Email {
            subject: get_str("subject"),
            html: get_str("html"),
            fields: input.get("fields").map(to_record).unwrap_or_default(),
            from: Address::from_value(input.get("from").unwrap_or(&Value::Null)),
            target: Target::from_value(&target_source)?,
            style: get_str("style"),
            dir: input
                .get("dir")
                .and_then(|v| v.as_str())
                .map(PathBuf::from),
            attachments: Vec::new(),
            text: get_str("text"),
        };
        if let Some(attachments) = input.get("attachments") {
            email.attach(attachments);
        }
        Ok(email)
    }

    /// Add an attachment, or every element of an array. Relative paths
    /// (`.`-prefixed) resolve against the e-mail's directory.
    pub fn attach(&mut self, attachment: &Value) {
        match attachment {
            Value::Array(items) => {
                for item in items {
                    self.attach(item);
                }
            }
            other => {
                let mut attachment = Attachment::from_value(other);
                if let Some(dir) = &self.dir {
                    if attachment.path.starts_with('.') {
                        attachment.path = crate::loader::normalize(&dir.join(&attachment.path))
                            .to_string_lossy()
                            .into_owned();
                    }
                }
                self.attachments.push(attachment);
            }
        }
    }

    /// Format for a transport, substituting placeholders into the
    /// addressing fields, subject, body and attachments.
    pub fn format_for_transport(&self, replacements: &Record) -> Envelope {
        let lines = self.target.recipient_lines();
        Envelope {
            from: replace(&self.from.to_string(), replacements),
            to: replace(&lines.to, replacements),
            cc: replace(&lines.cc, replacements),
            bcc: replace(&lines.bcc, replacements),
            subject: replace(&self.subject, replacements),
            html: replace(&self.html, replacements),
            text: replace(&self.text, replacements),
            attachments: self
                .attachments
                .iter()
                .map(|a| a.format_for_transport(replacements))
                .collect(),
        }
    }
}
