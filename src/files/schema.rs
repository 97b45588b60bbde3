use serde::{Deserialize, Serialize};

/// A stored upload with its metadata. Immutable once inserted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredFile {
    pub id: i64,
    pub filename: String,
    pub mime_type: String,
    /// Blob location relative to the storage root.
    pub file_path: String,
    pub file_size: u64,
    pub uploaded_at: String,
}

/// Metadata for a file about to be indexed (the id is assigned on insert).
#[derive(Debug, Clone)]
pub struct NewFile {
    pub filename: String,
    pub mime_type: String,
    pub file_path: String,
    pub file_size: u64,
    pub uploaded_at: String,
}

/// Body returned by a successful upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedFile {
    pub id: i64,
    pub filename: String,
}

impl From<&StoredFile> for UploadedFile {
    fn from(file: &StoredFile) -> Self {
        Self {
            id: file.id,
            filename: file.filename.clone(),
        }
    }
}

/// One line picked out of a stored file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineRecord {
    /// 1-based position in the original file.
    pub line_number: usize,
    pub text: String,
    pub file_name: String,
    pub most_common_letter: Option<char>,
}
