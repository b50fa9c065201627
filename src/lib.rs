//! # Mailforge: Mail Composition with Declarative Record Transformation
//!
//! Mailforge models e-mail addresses, attachments, multi-recipient targets
//! and templated messages, renders them into a transport-ready payload,
//! and ships a generic record transformation engine for deriving
//! per-recipient data from declarative rule-sets.
//!
//! ## Features
//!
//! - **Record transformation engine**: per-field rules — dotted-path
//!   `$ref` lookups, external file references, named-function calls,
//!   `$input` lookup tables and bare-key remaps — evaluated in declaration
//!   order with non-fatal per-field diagnostics
//! - **Transform registry**: capability-by-name functions bound to module
//!   references declared as plain data
//! - **Mail value objects**: `Address`, `Attachment`, `Target`,
//!   `MailMessage`, `Email` with `{{key}}` placeholder substitution
//! - **Injected transport**: an async `Transport` seam plus an in-memory
//!   recording transport for tests
//!
//! ## Example: transforming a recipient record
//!
//! ```
//! use mailforge::{MailDb, FieldFn, RuleSet, TransformOptions};
//! use serde_json::json;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), mailforge::MailError> {
//! let db = MailDb::open(".");
//! let source = mailforge::to_record(&json!({
//!     "name": "Bob Example",
//!     "mail": "bob@example.com"
//! }));
//! let rules = RuleSet::from_value(json!({
//!     "email": { "$ref": "mail" },
//!     "locale": "uk-UA"
//! }))?;
//!
//! let output = db.transform(&source, &rules, &TransformOptions::new()).await?;
//! assert_eq!(output["email"], json!("bob@example.com"));
//! assert_eq!(output["locale"], json!("uk-UA"));
//! # Ok(())
//! # }
//! ```

// Core engine
pub mod transform;

// Documents and the database facade
pub mod db;
pub mod loader;
pub mod record;

// Mail value objects and rendering
pub mod address;
pub mod attachment;
pub mod email;
pub mod html;
pub mod mailer;
pub mod message;
pub mod placeholders;
pub mod target;

pub mod error;

// Re-export key types
pub use address::{Address, AddressKind};
pub use attachment::Attachment;
pub use db::MailDb;
pub use email::{Email, Envelope};
pub use error::MailError;
pub use loader::{DocumentLoader, FsLoader};
pub use mailer::{send_mail, MemoryTransport, SendOptions, Transport};
pub use message::MailMessage;
pub use record::{find_nested, flatten, to_record, Record};
pub use target::{RecipientLines, Target, ADDRESS_FIELDS};
pub use transform::{
    FieldFn, FormatFn, FormatHandlers, Rule, RuleSet, TransformOptions, TransformRegistry,
};
