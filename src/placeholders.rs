//! `{{key}}` placeholder substitution.

use regex::{Captures, Regex};
use serde_json::Value;

use crate::record::Record;

/// Replace `{{key}}` placeholders in a template with values from a
/// flattened data record. Unknown keys keep their placeholder.
pub fn replace(template: &str, data: &Record) -> String {
    replace_with(template, data, |s| s.to_string())
}

/// Like [`replace`], passing each substituted value through an escaper.
pub fn replace_with(template: &str, data: &Record, escaper: impl Fn(&str) -> String) -> String {
    let pattern = Regex::new(r"\{\{(.*?)\}\}").expect("valid placeholder pattern");
    pattern
        .replace_all(template, |caps: &Captures| {
            let key = caps[1].trim();
            match data.get(key) {
                Some(value) => escaper(&value_text(value)),
                None => caps[0].to_string(),
            }
        })
        .into_owned()
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
