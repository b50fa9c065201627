//! A single point-to-point mail message.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::address::Address;
use crate::attachment::Attachment;

/// One message from one sender to one recipient, with attachments.
///
/// Unlike [`Email`](crate::email::Email) this is not a template: the body
/// is final text and both ends are single addresses.
#[derive(Debug, Clone, PartialEq)]
pub struct MailMessage {
    pub body: String,
    pub time: DateTime<Utc>,
    pub from: Address,
    pub to: Address,
    pub dir: Option<PathBuf>,
    pub attachments: Vec<Attachment>,
}

impl MailMessage {
    pub fn new(body: impl Into<String>, from: Address, to: Address) -> Self {
        Self {
            body: body.into(),
            time: Utc::now(),
            from,
            to,
            dir: None,
            attachments: Vec::new(),
        }
    }

    /// Build a message from a data value.
    pub fn from_value(input: &Value) -> Self {
        let get_str = |key: &str| {
            input
                .get(key)
                .and_then(|v| v.as_str())
                .unwrap_or("")
                .to_string()
        };
        let mut message = Self::new(
            get_str("body"),
            Address::from_value(input.get("from").unwrap_or(&Value::Null)),
            Address::from_value(input.get("to").unwrap_or(&Value::Null)),
        );
        if let Some(time) = input.get("time").and_then(|v| v.as_str()) {
            if let Ok(parsed) = time.parse::<DateTime<Utc>>() {
                message.time = parsed;
            }
        }
        if let Some(dir) = input.get("dir").and_then(|v| v.as_str()) {
            message.dir = Some(PathBuf::from(dir));
        }
        if let Some(attachments) = input.get("attachments") {
            message.attach(attachments);
        }
        message
    }

    /// Add an attachment, or every element of an array of attachments.
    pub fn attach(&mut self, attachment: &Value) {
        match attachment {
            Value::Array(items) => {
                for item in items {
                    self.attach(item);
                }
            }
            other => self.attachments.push(Attachment::from_value(other)),
        }
    }
}
