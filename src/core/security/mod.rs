// Security module for attachment path validation
//
// Descriptor form values of the form `@path` open local files. This module
// keeps those reads inside the configured root directory.

pub mod path_validator;

pub use path_validator::{PathSecurityError, validate_attachment_path};
