use super::schema::{NewFile, StoredFile};
use anyhow::{Context, Result};
use parking_lot::Mutex;
use rusqlite::{params, Connection};
use std::path::Path;
use std::sync::Arc;

/// SQLite-backed metadata index for stored files.
#[derive(Clone)]
pub struct FileIndex {
    conn: Arc<Mutex<Connection>>,
}

impl FileIndex {
    pub fn new(data_dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(data_dir)?;
        let db_path = data_dir.join("filelines.db");
        let conn = Connection::open(&db_path).context("Failed to open filelines.db")?;

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous  = NORMAL;
             PRAGMA cache_size   = -2000;
             PRAGMA temp_store   = MEMORY;",
        )?;

        Self::init_schema(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn init_schema(conn: &Connection) -> Result<()> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS stored_files (
                id           INTEGER PRIMARY KEY AUTOINCREMENT,
                filename     TEXT NOT NULL,
                mime_type    TEXT NOT NULL,
                file_path    TEXT NOT NULL,
                file_size    INTEGER NOT NULL,
                uploaded_at  TEXT NOT NULL
            );",
        )
        .context("Failed to init file index schema")?;
        Ok(())
    }

    /// Insert a new file record, returning it with its assigned id.
    pub fn insert(&self, file: NewFile) -> Result<StoredFile> {
        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO stored_files (filename, mime_type, file_path, file_size, uploaded_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                file.filename,
                file.mime_type,
                file.file_path,
                file.file_size as i64,
                file.uploaded_at,
            ],
        )
        .context("Failed to insert file record")?;

        Ok(StoredFile {
            id: conn.last_insert_rowid(),
            filename: file.filename,
            mime_type: file.mime_type,
            file_path: file.file_path,
            file_size: file.file_size,
            uploaded_at: file.uploaded_at,
        })
    }

    /// Get a file record by id.
    pub fn get(&self, id: i64) -> Result<Option<StoredFile>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(
            "SELECT id, filename, mime_type, file_path, file_size, uploaded_at
             FROM stored_files WHERE id = ?1",
        )?;
        match stmt.query_row(params![id], Self::row_to_record) {
            Ok(r) => Ok(Some(r)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// All files in upload order.
    pub fn list(&self) -> Result<Vec<StoredFile>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(
            "SELECT id, filename, mime_type, file_path, file_size, uploaded_at
             FROM stored_files ORDER BY id ASC",
        )?;
        let rows = stmt.query_map([], Self::row_to_record)?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .context("Failed to list file records")
    }

    pub fn count(&self) -> Result<usize> {
        let conn = self.conn.lock();
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM stored_files", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    fn row_to_record(row: &rusqlite::Row) -> rusqlite::Result<StoredFile> {
        Ok(StoredFile {
            id: row.get(0)?,
            filename: row.get(1)?,
            mime_type: row.get(2)?,
            file_path: row.get(3)?,
            file_size: row.get::<_, i64>(4)? as u64,
            uploaded_at: row.get(5)?,
        })
    }
}
