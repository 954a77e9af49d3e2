//! Request descriptor model.
//!
//! A [`RequestDescriptor`] is the structured form of a curl-style command:
//! method, url, headers and an optional body. Descriptors are immutable once
//! parsed; tools freeze one at registration time.

use indexmap::IndexMap;
use parking_lot::Mutex;
use serde::{Serialize, Serializer, ser::SerializeMap};
use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Method used when the descriptor carries no explicit method flag.
pub const DEFAULT_METHOD: &str = "GET";

/// Upload name attached to every `@path` form field.
pub const ATTACHMENT_PLACEHOLDER_NAME: &str = "filename";

/// Header map preserving the order headers were given in.
///
/// Keys are case-sensitive exactly as written in the descriptor.
pub type Headers = IndexMap<String, String>;

/// Structured HTTP request template parsed from a descriptor string.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RequestDescriptor {
    /// Upper-cased method token (not necessarily a verb the client supports).
    pub method: String,

    /// Target URL. Empty when the descriptor named none.
    pub url: String,

    /// Request headers, last occurrence of a key wins.
    pub headers: Headers,

    /// Request body. `None` unless a body or form flag was seen.
    pub body: Option<Body>,
}

impl RequestDescriptor {
    /// Whether the descriptor names a target URL.
    pub fn has_url(&self) -> bool {
        !self.url.is_empty()
    }
}

/// Body of a request descriptor.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Body {
    /// Raw text exactly as given to a data flag.
    Text(String),

    /// Text decoded as JSON because the descriptor declared a JSON content type.
    Json(serde_json::Value),

    /// Multipart form fields in declaration order.
    Form(IndexMap<String, FormValue>),
}

impl Body {
    /// Whether this body is a form carrying at least one file attachment.
    pub fn has_attachments(&self) -> bool {
        match self {
            Self::Form(fields) => fields.values().any(|v| matches!(v, FormValue::File(_))),
            _ => false,
        }
    }
}

/// A single form field value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FormValue {
    Text(String),
    File(Attachment),
}

/// An open file referenced by a `@path` form value.
///
/// The handle is shared between clones and closed when the last clone is
/// dropped, so its lifetime is bounded by the descriptor (or tool) holding it.
#[derive(Clone)]
pub struct Attachment {
    name: String,
    path: PathBuf,
    handle: Arc<Mutex<File>>,
}

impl Attachment {
    /// Open the file at `path` for later upload.
    pub fn open(path: impl Into<PathBuf>) -> io::Result<Self> {
        let path = path.into();
        let file = File::open(&path)?;
        Ok(Self {
            name: ATTACHMENT_PLACEHOLDER_NAME.to_string(),
            path,
            handle: Arc::new(Mutex::new(file)),
        })
    }

    /// Upload name of the attachment.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Path the attachment was opened from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the whole file from the start of the held handle.
    pub fn read_contents(&self) -> io::Result<Vec<u8>> {
        let mut file = self.handle.lock();
        file.seek(SeekFrom::Start(0))?;
        let mut contents = Vec::new();
        file.read_to_end(&mut contents)?;
        Ok(contents)
    }

    /// Number of live references to the underlying handle.
    pub fn handle_refs(&self) -> usize {
        Arc::strong_count(&self.handle)
    }
}

// Handles are distinct resources per parse; equality is by name and path only.
impl PartialEq for Attachment {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.path == other.path
    }
}

impl std::fmt::Debug for Attachment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Attachment")
            .field("name", &self.name)
            .field("path", &self.path)
            .finish()
    }
}

impl Serialize for Attachment {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry("file", &self.name)?;
        map.serialize_entry("path", &self.path.display().to_string())?;
        map.end()
    }
}
