//! SQLite-backed object store.
//!
//! One table, `Objects(id TEXT PRIMARY KEY, object TEXT NOT NULL)`, holding the
//! serialized JSON of each object. Writes replace existing rows, which is safe
//! because keys are content-derived.

use std::fs::create_dir_all;
use std::path::{Path, PathBuf};

use log::debug;
use rusqlite::{Connection, OpenFlags, OptionalExtension};

use super::{ObjectStore, StoreCapabilities};
use crate::errors::{StoreError, StoreResult};

#[derive(Debug)]
pub struct SqliteObjectStore {
    connection: Connection,
    path: Option<PathBuf>,
    read_only: bool,
}

impl SqliteObjectStore {
    /// Open (creating if necessary) a store file.
    pub fn open<P: AsRef<Path>>(filename: P) -> StoreResult<Self> {
        let filename = filename.as_ref();
        if let Some(parent) = filename.parent().filter(|p| !p.as_os_str().is_empty()) {
            create_dir_all(parent)?;
        }
        let connection = Connection::open(filename)?;
        Self::create_table(&connection)?;
        debug!("Opened object store {}", filename.display());
        Ok(SqliteObjectStore {
            connection,
            path: Some(filename.to_path_buf()),
            read_only: false,
        })
    }

    /// Open an existing store file for lookups only.
    pub fn open_read_only<P: AsRef<Path>>(filename: P) -> StoreResult<Self> {
        let filename = filename.as_ref();
        let flags = OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        let connection = Connection::open_with_flags(filename, flags)?;
        Ok(SqliteObjectStore {
            connection,
            path: Some(filename.to_path_buf()),
            read_only: true,
        })
    }

    /// A store that lives only as long as this value.
    pub fn in_memory() -> StoreResult<Self> {
        let connection = Connection::open_in_memory()?;
        Self::create_table(&connection)?;
        Ok(SqliteObjectStore {
            connection,
            path: None,
            read_only: false,
        })
    }

    fn create_table(connection: &Connection) -> rusqlite::Result<()> {
        connection.execute(
            "CREATE TABLE IF NOT EXISTS Objects (
                id TEXT PRIMARY KEY,
                object TEXT NOT NULL
            ) STRICT",
            (),
        )?;
        Ok(())
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn len(&self) -> StoreResult<usize> {
        let count: i64 = self
            .connection
            .query_row("SELECT COUNT(*) FROM Objects", (), |row| row.get(0))?;
        Ok(count as usize)
    }

    pub fn is_empty(&self) -> StoreResult<bool> {
        Ok(self.len()? == 0)
    }
}

impl ObjectStore for SqliteObjectStore {
    fn get(&self, id: &str) -> StoreResult<Option<String>> {
        let mut get_object = self
            .connection
            .prepare_cached("SELECT object FROM Objects WHERE id = ?1")?;
        let object = get_object
            .query_row((id,), |row| row.get::<_, String>(0))
            .optional()?;
        Ok(object)
    }

    fn set(&mut self, id: &str, object: &str) -> StoreResult<()> {
        if self.read_only {
            return Err(StoreError::ReadOnly);
        }
        let mut insert = self
            .connection
            .prepare_cached("INSERT OR REPLACE INTO Objects(id, object) VALUES (?1, ?2)")?;
        insert.execute((id, object))?;
        Ok(())
    }

    fn keys(&self) -> StoreResult<Vec<String>> {
        let mut get_keys = self
            .connection
            .prepare_cached("SELECT id FROM Objects ORDER BY id")?;
        let keys = get_keys
            .query_map((), |row| row.get::<_, String>(0))?
            .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(keys)
    }

    fn capabilities(&self) -> StoreCapabilities {
        StoreCapabilities {
            writable: !self.read_only,
            iterable: true,
        }
    }
}
