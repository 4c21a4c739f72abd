// 💾 Storage - load the Book at startup, save it at shutdown
//
// Two backends behind one contract:
// - JSON document on disk, replaced atomically
// - SQLite (WAL) table of content-addressed Book documents

use crate::book::Book;
use crate::config::{Config, StorageBackend};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use sha2::{Digest, Sha256};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

// ============================================================================
// STORAGE CONTRACT
// ============================================================================

pub trait BookStorage {
    /// `Ok(None)` when nothing has been saved yet
    fn load_book(&self) -> Result<Option<Book>>;

    fn save_book(&self, book: &Book) -> Result<()>;

    fn location(&self) -> &Path;
}

/// Open the backend chosen in the config
pub fn open_storage(config: &Config) -> Result<Box<dyn BookStorage>> {
    let storage: Box<dyn BookStorage> = match config.storage {
        StorageBackend::Json => Box::new(JsonFileStorage::new(&config.data_file)),
        StorageBackend::Sqlite => Box::new(SqliteStorage::open(&config.data_file)?),
    };
    Ok(storage)
}

// ============================================================================
// JSON FILE
// ============================================================================

pub struct JsonFileStorage {
    path: PathBuf,
}

impl JsonFileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        JsonFileStorage { path: path.into() }
    }
}

impl BookStorage for JsonFileStorage {
    fn load_book(&self) -> Result<Option<Book>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read {}", self.path.display()))?;
        let book: Book = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse book data in {}", self.path.display()))?;
        info!(path = %self.path.display(), clients = book.client_count(), "book loaded");
        Ok(Some(book))
    }

    fn save_book(&self, book: &Book) -> Result<()> {
        let dir = match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create {}", dir.display()))?;

        let json = serde_json::to_string_pretty(book)?;
        let mut tmp = tempfile::NamedTempFile::new_in(&dir)
            .context("Failed to create temporary file")?;
        tmp.write_all(json.as_bytes())?;
        tmp.flush()?;
        tmp.persist(&self.path)
            .with_context(|| format!("Failed to replace {}", self.path.display()))?;

        info!(path = %self.path.display(), clients = book.client_count(), "book saved");
        Ok(())
    }

    fn location(&self) -> &Path {
        &self.path
    }
}

// ============================================================================
// SQLITE
// ============================================================================

/// Every distinct saved Book is one row, keyed by the SHA-256 of its JSON
pub struct SqliteStorage {
    path: PathBuf,
    conn: Connection,
}

/// Metadata of one stored Book document
#[derive(Debug, Clone)]
pub struct SavedDocument {
    pub document_id: String,
    pub saved_at: DateTime<Utc>,
    pub content_hash: String,
}

impl SqliteStorage {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create {}", dir.display()))?;
        }
        let conn = Connection::open(&path)
            .with_context(|| format!("Failed to open database {}", path.display()))?;
        setup_database(&conn)?;
        Ok(SqliteStorage { path, conn })
    }

    /// All stored documents, newest first
    pub fn saved_documents(&self) -> Result<Vec<SavedDocument>> {
        let mut stmt = self.conn.prepare(
            "SELECT document_id, saved_at, content_hash
             FROM book_documents
             ORDER BY id DESC",
        )?;

        let documents = stmt
            .query_map([], |row| {
                let saved_at: String = row.get(1)?;
                Ok(SavedDocument {
                    document_id: row.get(0)?,
                    saved_at: DateTime::parse_from_rfc3339(&saved_at)
                        .map_err(|e| {
                            rusqlite::Error::FromSqlConversionFailure(
                                1,
                                rusqlite::types::Type::Text,
                                Box::new(e),
                            )
                        })?
                        .with_timezone(&Utc),
                    content_hash: row.get(2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(documents)
    }
}

pub fn setup_database(conn: &Connection) -> Result<()> {
    // Enable WAL mode for crash recovery
    conn.pragma_update(None, "journal_mode", "WAL")?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS book_documents (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            document_id TEXT UNIQUE NOT NULL,
            saved_at TEXT NOT NULL,
            content_hash TEXT UNIQUE NOT NULL,
            document TEXT NOT NULL
        )",
        [],
    )?;

    Ok(())
}

pub fn compute_content_hash(document: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(document.as_bytes());
    format!("{:x}", hasher.finalize())
}

impl BookStorage for SqliteStorage {
    fn load_book(&self) -> Result<Option<Book>> {
        let document: Option<String> = self
            .conn
            .query_row(
                "SELECT document FROM book_documents ORDER BY id DESC LIMIT 1",
                [],
                |row| row.get(0),
            )
            .optional()?;

        match document {
            Some(json) => {
                let book: Book = serde_json::from_str(&json)
                    .context("Failed to parse stored book document")?;
                let documents = self.saved_documents()?;
                info!(
                    path = %self.path.display(),
                    clients = book.client_count(),
                    versions = documents.len(),
                    saved_at = ?documents.first().map(|d| d.saved_at),
                    "book loaded"
                );
                Ok(Some(book))
            }
            None => Ok(None),
        }
    }

    fn save_book(&self, book: &Book) -> Result<()> {
        let json = serde_json::to_string(book)?;
        let hash = compute_content_hash(&json);

        let result = self.conn.execute(
            "INSERT INTO book_documents (document_id, saved_at, content_hash, document)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                uuid::Uuid::new_v4().to_string(),
                Utc::now().to_rfc3339(),
                hash,
                json,
            ],
        );

        match result {
            Ok(_) => {
                info!(path = %self.path.display(), hash = %hash, "book saved");
                Ok(())
            }
            // Same content already stored: make it the newest row again
            Err(rusqlite::Error::SqliteFailure(err, _))
                if err.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                self.conn.execute(
                    "UPDATE book_documents
                     SET id = (SELECT MAX(id) + 1 FROM book_documents), saved_at = ?1
                     WHERE content_hash = ?2",
                    params![Utc::now().to_rfc3339(), hash],
                )?;
                info!(path = %self.path.display(), hash = %hash, "book unchanged since an earlier save");
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    fn location(&self) -> &Path {
        &self.path
    }
}
