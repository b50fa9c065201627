//! Sending: the injected transport seam and the document assembly step.

use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::email::{Email, Envelope};
use crate::error::MailError;
use crate::html::{escape, html_to_text};
use crate::placeholders::{replace, replace_with};
use crate::record::flatten;
use crate::target::Target;

/// Mail transport seam.
///
/// The crate never talks to the wire itself; callers inject a transport
/// (SMTP client, HTTP API, test double). The returned value is the
/// transport's own delivery info.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, envelope: &Envelope) -> Result<Value, MailError>;
}

/// In-memory transport that records every envelope. For tests and dry
/// runs.
#[derive(Debug, Default)]
pub struct MemoryTransport {
    sent: Mutex<Vec<Envelope>>,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Envelopes sent so far, oldest first.
    pub fn sent(&self) -> Vec<Envelope> {
        self.sent.lock().expect("transport lock").clone()
    }

    pub fn count(&self) -> usize {
        self.sent.lock().expect("transport lock").len()
    }
}

#[async_trait]
impl Transport for MemoryTransport {
    async fn send(&self, envelope: &Envelope) -> Result<Value, MailError> {
        let mut sent = self.sent.lock().expect("transport lock");
        sent.push(envelope.clone());
        Ok(json!({
            "accepted": [envelope.to],
            "messageId": format!("<memory-{}>", sent.len()),
        }))
    }
}

/// Options for [`send_mail`].
#[derive(Debug, Clone)]
pub struct SendOptions {
    /// Line separator used when assembling the HTML document.
    pub html_eol: String,
}

impl Default for SendOptions {
    fn default() -> Self {
        Self {
            html_eol: "\n".to_string(),
        }
    }
}

/// Render an e-mail against per-recipient data and hand it to a transport.
///
/// `data` is flattened into dotted keys for placeholder replacement. A
/// `from` or `target` field in `data` overrides the template's own. The
/// HTML body has its placeholders substituted with escaping, then gets
/// wrapped into a full document; the plain-text body is the template's
/// `text` when present, else derived from the rendered HTML.
///
/// # Errors
/// Transport failures propagate; rendering itself cannot fail.
pub async fn send_mail(
    email: &Email,
    data: &Value,
    transport: &dyn Transport,
    opts: &SendOptions,
) -> Result<Value, MailError> {
    let flat = flatten(data);
    let mut envelope = email.format_for_transport(&flat);

    // Per-recipient data may carry its own sender and target.
    if let Some(from) = data.get("from") {
        envelope.from = match from {
            Value::String(text) => text.clone(),
            other => crate::address::Address::from_value(other).to_string(),
        };
    }
    if let Some(target) = data.get("target") {
        let lines = Target::from_value(target)?.recipient_lines();
        envelope.to = lines.to;
        envelope.cc = lines.cc;
        envelope.bcc = lines.bcc;
    }

    let content = replace_with(&email.html, &flat, escape);
    let text = if email.text.is_empty() {
        html_to_text(&content)
    } else {
        replace(&email.text, &flat)
    };
    let style = if email.style.is_empty() {
        String::new()
    } else {
        format!("<style>{}</style>", email.style)
    };

    let html = [
        "<!DOCTYPE html>".to_string(),
        "<html>".to_string(),
        "<head>".to_string(),
        format!("<title>{}</title>", escape(&envelope.subject)),
        style,
        "</head>".to_string(),
        "<body>".to_string(),
        content,
        "</body>".to_string(),
        "</html>".to_string(),
    ]
    .join(&opts.html_eol);

    envelope.html = html;
    envelope.text = text;

    tracing::debug!(to = %envelope.to, subject = %envelope.subject, "sending mail");
    transport.send(&envelope).await
}
