//! Line reading for stored files.

use super::schema::StoredFile;
use super::storage::FileStorage;
use crate::error::{FilelinesError, Result};

/// Read a stored file and split it into lines with terminators stripped.
pub async fn read_lines(storage: &FileStorage, file: &StoredFile) -> Result<Vec<String>> {
    let data = storage.read(&file.file_path).await?;
    let text = String::from_utf8(data).map_err(|source| FilelinesError::Decode {
        name: file.filename.clone(),
        source,
    })?;
    Ok(split_lines(&text).map(str::to_owned).collect())
}

/// Split on `\n`, `\r\n` and lone `\r`. A trailing terminator does not
/// start another line.
pub fn split_lines(text: &str) -> impl Iterator<Item = &str> {
    let mut rest = text;
    std::iter::from_fn(move || {
        if rest.is_empty() {
            return None;
        }
        match rest.find(['\n', '\r']) {
            Some(pos) => {
                let line = &rest[..pos];
                let skip = if rest[pos..].starts_with("\r\n") { 2 } else { 1 };
                rest = &rest[pos + skip..];
                Some(line)
            }
            None => {
                let line = rest;
                rest = "";
                Some(line)
            }
        }
    })
}
