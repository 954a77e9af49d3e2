//! Request descriptor domain.
//!
//! Converts curl-style command strings into structured request templates.
//!
//! - `model.rs` - [`RequestDescriptor`], bodies and file attachments
//! - `parser.rs` - tokenizer and flag scanner
//! - `error.rs` - parse errors

mod error;
mod model;
mod parser;

pub use error::DescriptorError;
pub use model::{
    ATTACHMENT_PLACEHOLDER_NAME, Attachment, Body, DEFAULT_METHOD, FormValue, Headers,
    RequestDescriptor,
};
pub use parser::{DescriptorParser, ParseOptions, parse_descriptor};
