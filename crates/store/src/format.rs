//! On-disk document format

use crate::PersistedDocument;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// File format version
pub const FORMAT_VERSION: u32 = 1;

/// File extension for the document format
pub const FILE_EXTENSION: &str = "mkdoc";

/// File header for format identification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileHeader {
    /// Magic string for format identification
    pub magic: String,
    pub version: u32,
    pub document_id: String,
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
}

impl FileHeader {
    pub const MAGIC: &'static str = "MAKTABA-DOC";

    pub fn new(document_id: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            magic: Self::MAGIC.to_string(),
            version: FORMAT_VERSION,
            document_id: document_id.into(),
            created: now,
            modified: now,
        }
    }

    /// Mark the file as modified now
    pub fn touch(&mut self) {
        self.modified = Utc::now();
    }

    pub fn is_valid(&self) -> bool {
        self.magic == Self::MAGIC && self.version <= FORMAT_VERSION
    }
}

/// Complete file: header plus the HTML and tree pair
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentFile {
    pub header: FileHeader,
    pub document: PersistedDocument,
}

impl DocumentFile {
    pub fn new(document: PersistedDocument) -> Self {
        Self {
            header: FileHeader::new(Uuid::new_v4().to_string()),
            document,
        }
    }
}
