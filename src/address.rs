//! Address model: sender or recipient contact point.

use std::fmt;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The detected kind of an address string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AddressKind {
    Email,
    Url,
    Phone,
    Tel,
    Address,
}

impl fmt::Display for AddressKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AddressKind::Email => "email",
            AddressKind::Url => "url",
            AddressKind::Phone => "phone",
            AddressKind::Tel => "tel",
            AddressKind::Address => "address",
        };
        write!(f, "{}", name)
    }
}

/// An address with an optional display name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub address: String,
    #[serde(default)]
    pub name: String,
}

impl Address {
    pub fn new(address: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            name: name.into(),
        }
    }

    /// Detect the address kind from its format.
    ///
    /// Checks run in a fixed order: email (`@`), url (`http(s)://`), phone
    /// (a run of more than four dial characters), `tel:` prefix, and plain
    /// address as the fallback.
    pub fn kind(&self) -> AddressKind {
        if self.address.contains('@') {
            return AddressKind::Email;
        }
        if self.address.starts_with("https://") || self.address.starts_with("http://") {
            return AddressKind::Url;
        }
        let pattern = Regex::new(r"[\d\-\(\)\+\s]+").expect("valid phone pattern");
        let dial: String = pattern
            .find_iter(&self.address)
            .map(|m| m.as_str())
            .collect();
        if dial.len() > 4 {
            return AddressKind::Phone;
        }
        if self.address.starts_with("tel:") {
            return AddressKind::Tel;
        }
        AddressKind::Address
    }

    /// Decode an address from a `"Name <address>"` string, or treat the
    /// whole string as the address when no angle-bracket part is present.
    pub fn parse(input: &str) -> Self {
        let pattern = Regex::new(r"^(.*)\s*<(.+)>$").expect("valid address pattern");
        if let Some(caps) = pattern.captures(input) {
            return Self::new(caps[2].trim(), caps[1].trim());
        }
        Self::new(input, "")
    }

    /// Build an address from a data value: a string is parsed, an object
    /// reads its `address` / `name` fields.
    pub fn from_value(input: &Value) -> Self {
        match input {
            Value::String(text) => Self::parse(text),
            Value::Object(map) => Self::new(
                map.get("address").and_then(|v| v.as_str()).unwrap_or(""),
                map.get("name").and_then(|v| v.as_str()).unwrap_or(""),
            ),
            _ => Self::default(),
        }
    }

    /// Project into a JSON object; an empty field list includes address,
    /// name and the detected kind.
    pub fn to_object(&self, fields: &[&str]) -> Value {
        let mut map = serde_json::Map::new();
        let all = ["address", "name", "type"];
        let wanted: &[&str] = if fields.is_empty() { &all } else { fields };
        for field in wanted {
            let value = match *field {
                "address" => Value::String(self.address.clone()),
                "name" => Value::String(self.name.clone()),
                "type" => Value::String(self.kind().to_string()),
                _ => continue,
            };
            map.insert(field.to_string(), value);
        }
        Value::Object(map)
    }
}

impl fmt::Display for Address {
    /// Renders `Name <address>`, or `<address>` without a name. Angle
    /// brackets inside the name are stripped to keep the format parseable.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.name.is_empty() {
            write!(f, "<{}>", self.address)
        } else {
            let name = self.name.replace(['<', '>'], "");
            write!(f, "{} <{}>", name, self.address)
        }
    }
}

impl From<&str> for Address {
    fn from(input: &str) -> Self {
        Self::parse(input)
    }
}
