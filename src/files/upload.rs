use std::path::Path;

use chrono::Local;
use tracing::{info, warn};

use super::index::FileIndex;
use super::schema::{NewFile, StoredFile};
use super::storage::FileStorage;
use crate::error::{Result, ValidationErrors};

/// Multipart field carrying the upload.
pub const FILE_FIELD: &str = "file";

const REQUIRED_EXTENSION: &str = ".txt";
const REQUIRED_MIME_PREFIX: &str = "text/plain";

pub const MSG_MISSING: &str = "No file was submitted.";
pub const MSG_NOT_A_FILE: &str =
    "The submitted data was not a file. Check the encoding type on the form.";
pub const MSG_EMPTY: &str = "The submitted file is empty.";
pub const MSG_BAD_EXTENSION: &str = "Only .txt files are allowed.";
pub const MSG_BAD_CONTENT_TYPE: &str = "Only text/plain files are allowed.";

/// A file as received from the client, before validation.
#[derive(Debug, Clone)]
pub struct Upload {
    pub filename: Option<String>,
    pub content_type: Option<String>,
    pub data: Vec<u8>,
}

impl Upload {
    /// Check the upload and return the bare file name to store it under.
    pub fn validate(&self) -> Result<String, ValidationErrors> {
        let filename = match self.filename.as_deref().map(base_name) {
            Some(name) if !name.is_empty() => name,
            _ => return Err(ValidationErrors::single(FILE_FIELD, MSG_NOT_A_FILE)),
        };
        if self.data.is_empty() {
            return Err(ValidationErrors::single(FILE_FIELD, MSG_EMPTY));
        }
        if !filename.ends_with(REQUIRED_EXTENSION) {
            return Err(ValidationErrors::single(FILE_FIELD, MSG_BAD_EXTENSION));
        }
        if let Some(content_type) = self.content_type.as_deref().filter(|c| !c.is_empty()) {
            if !content_type.starts_with(REQUIRED_MIME_PREFIX) {
                return Err(ValidationErrors::single(FILE_FIELD, MSG_BAD_CONTENT_TYPE));
            }
        }
        Ok(filename.to_string())
    }
}

/// Strip any directory a client put in front of the file name.
fn base_name(name: &str) -> &str {
    let name = name.rsplit(['/', '\\']).next().unwrap_or(name);
    Path::new(name)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("")
}

/// Validate, write the blob and index it.
pub async fn save_upload(
    storage: &FileStorage,
    index: &FileIndex,
    upload: Upload,
) -> Result<StoredFile> {
    let filename = upload.validate()?;
    let file_path = storage.store(&filename, &upload.data).await?;
    let inserted = index.insert(NewFile {
        filename,
        mime_type: upload
            .content_type
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| REQUIRED_MIME_PREFIX.to_string()),
        file_path: file_path.clone(),
        file_size: upload.data.len() as u64,
        uploaded_at: Local::now().to_rfc3339(),
    });
    let stored = match inserted {
        Ok(stored) => stored,
        Err(e) => {
            // Blob without a record is unreachable; drop it.
            if let Err(cleanup) = storage.delete(&file_path).await {
                warn!("Failed to remove orphaned blob {}: {:#}", file_path, cleanup);
            }
            return Err(e.into());
        }
    };
    info!(
        id = stored.id,
        filename = %stored.filename,
        bytes = stored.file_size,
        "Stored upload"
    );
    Ok(stored)
}
