use anyhow::Context;
use chrono::Local;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use uuid::Uuid;

use crate::error::{FilelinesError, Result};

/// Blob store on disk, organized by upload date.
pub struct FileStorage {
    base_dir: PathBuf,
}

impl FileStorage {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    /// Store file bytes, returns the path relative to the storage root.
    pub async fn store(&self, original_filename: &str, data: &[u8]) -> Result<String> {
        let date_dir = Local::now().format("%Y/%m/%d").to_string();
        let abs_dir = self.base_dir.join(&date_dir);
        fs::create_dir_all(&abs_dir)
            .await
            .context("Failed to create date directory")?;

        let ext = Path::new(original_filename)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("txt");
        let stored_name = format!("{}.{}", Uuid::new_v4(), ext);

        fs::write(abs_dir.join(&stored_name), data)
            .await
            .context("Failed to write file")?;

        Ok(format!("{}/{}", date_dir, stored_name))
    }

    /// Read file bytes by relative path.
    pub async fn read(&self, rel_path: &str) -> Result<Vec<u8>> {
        match fs::read(self.absolute_path(rel_path)).await {
            Ok(data) => Ok(data),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(FilelinesError::NotFound(format!(
                "blob '{}' is missing from storage",
                rel_path
            ))),
            Err(e) => Err(anyhow::Error::new(e)
                .context(format!("Failed to read {}", rel_path))
                .into()),
        }
    }

    /// Remove a blob; a missing one is not an error.
    pub async fn delete(&self, rel_path: &str) -> Result<()> {
        match fs::remove_file(self.absolute_path(rel_path)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(anyhow::Error::new(e)
                .context(format!("Failed to delete {}", rel_path))
                .into()),
        }
    }

    pub fn absolute_path(&self, rel_path: &str) -> PathBuf {
        self.base_dir.join(rel_path)
    }
}
