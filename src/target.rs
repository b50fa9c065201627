//! Multi-recipient target: ordered to/cc/bcc address lists.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::address::Address;
use crate::error::MailError;

/// Recipient fields a target accepts.
pub const ADDRESS_FIELDS: [&str; 3] = ["to", "cc", "bcc"];

/// Recipient sets for one e-mail.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Target {
    pub to: Vec<Address>,
    pub cc: Vec<Address>,
    pub bcc: Vec<Address>,
}

/// Comma-joined recipient header lines.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecipientLines {
    pub to: String,
    pub cc: String,
    pub bcc: String,
}

impl Target {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an address to a recipient field.
    ///
    /// # Errors
    /// Returns [`MailError::InvalidAddressField`] for anything outside
    /// to/cc/bcc.
    pub fn add(&mut self, address: Address, field: &str) -> Result<(), MailError> {
        match field {
            "to" => self.to.push(address),
            "cc" => self.cc.push(address),
            "bcc" => self.bcc.push(address),
            other => return Err(MailError::InvalidAddressField(other.to_string())),
        }
        Ok(())
    }

    /// Add addresses from a data value: a string or object is one address,
    /// an array contributes each element.
    pub fn add_value(&mut self, value: &Value, field: &str) -> Result<(), MailError> {
        match value {
            Value::Array(items) => {
                for item in items {
                    self.add(Address::from_value(item), field)?;
                }
                Ok(())
            }
            other => self.add(Address::from_value(other), field),
        }
    }

    /// Ingest a structured recipient object.
    ///
    /// Three shapes are recognised, checked in order:
    /// * an object with any to/cc/bcc key — every key is taken as a
    ///   recipient field (an unknown key alongside them is an error);
    /// * a `{type, address}` pair;
    /// * anything else — a single address added to `to`.
    pub fn add_object(&mut self, item: &Value) -> Result<(), MailError> {
        if let Value::Object(map) = item {
            if map.keys().any(|k| ADDRESS_FIELDS.contains(&k.as_str())) {
                for (key, value) in map {
                    self.add_value(value, key)?;
                }
                return Ok(());
            }
            let kind = map.get("type").and_then(|v| v.as_str());
            let address = map.get("address");
            if let (Some(kind), Some(address)) = (kind, address) {
                return self.add(Address::from_value(address), kind);
            }
        }
        self.add(Address::from_value(item), "to")
    }

    /// Build a target from a string, object or array value.
    pub fn from_value(source: &Value) -> Result<Self, MailError> {
        let mut target = Target::new();
        match source {
            Value::Array(items) => {
                for item in items {
                    match item {
                        Value::Null => {}
                        Value::String(text) => target.add(Address::parse(text), "to")?,
                        Value::Object(_) => target.add_object(item)?,
                        _ => {}
                    }
                }
            }
            Value::Object(_) => target.add_object(source)?,
            Value::String(text) if !text.is_empty() => target.add(Address::parse(text), "to")?,
            _ => {}
        }
        Ok(target)
    }

    pub fn get(&self, field: &str) -> Option<&Vec<Address>> {
        match field {
            "to" => Some(&self.to),
            "cc" => Some(&self.cc),
            "bcc" => Some(&self.bcc),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.to.is_empty() && self.cc.is_empty() && self.bcc.is_empty()
    }

    /// Render comma-joined header lines per recipient field.
    pub fn recipient_lines(&self) -> RecipientLines {
        let join = |addresses: &[Address]| {
            addresses
                .iter()
                .map(|a| a.to_string())
                .collect::<Vec<_>>()
                .join(", ")
        };
        RecipientLines {
            to: join(&self.to),
            cc: join(&self.cc),
            bcc: join(&self.bcc),
        }
    }
}
