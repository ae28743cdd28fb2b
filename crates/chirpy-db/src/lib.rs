pub mod error;
pub mod migrations;
pub mod models;
pub mod password;

mod messages;
mod revocations;
mod users;

pub use error::{DbError, Result};
pub use models::{Document, Message, RevokedToken, Sequences, User};

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{error, info};

/// Whole-document JSON store. Every call re-reads the file, so a failed
/// load or save never leaves the handle in a bad state.
///
/// Readers share the lock; anything that mutates holds it exclusively from
/// load through save, which is what keeps id assignment race-free.
pub struct Database {
    path: PathBuf,
    lock: RwLock<()>,
}

impl Database {
    pub fn open(path: &Path) -> Result<Self> {
        let db = Self {
            path: path.to_path_buf(),
            lock: RwLock::new(()),
        };

        {
            let _guard = db.write_lock();
            migrations::run(&db.path)?;
        }

        info!("Database opened at {}", path.display());
        Ok(db)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<Document> {
        let _guard = self.read_lock();
        read_document(&self.path)
    }

    pub fn save(&self, doc: &Document) -> Result<()> {
        let _guard = self.write_lock();
        write_document(&self.path, doc)
    }

    /// Run `f` against a freshly loaded document under the shared lock.
    pub fn with_doc<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Document) -> Result<T>,
    {
        let _guard = self.read_lock();
        let doc = read_document(&self.path)?;
        f(&doc)
    }

    /// Load, mutate and save as one transaction under the exclusive lock.
    /// Nothing is written if `f` fails.
    pub fn with_doc_mut<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Document) -> Result<T>,
    {
        let _guard = self.write_lock();
        let mut doc = read_document(&self.path)?;
        let out = f(&mut doc)?;
        write_document(&self.path, &doc)?;
        Ok(out)
    }

    // The guarded data is `()`; the file on disk is always whole, so a
    // panic in another holder leaves nothing to repair.
    fn read_lock(&self) -> RwLockReadGuard<'_, ()> {
        self.lock.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_lock(&self) -> RwLockWriteGuard<'_, ()> {
        self.lock.write().unwrap_or_else(PoisonError::into_inner)
    }
}

pub(crate) fn read_document(path: &Path) -> Result<Document> {
    let bytes = fs::read(path).map_err(|e| {
        error!("Failed to read {}: {}", path.display(), e);
        DbError::Io(e)
    })?;

    serde_json::from_slice(&bytes).map_err(|e| {
        error!("Malformed document at {}: {}", path.display(), e);
        DbError::Decode(e)
    })
}

/// Write to a sibling temp file and rename over the target so readers never
/// observe a half-written document.
pub(crate) fn write_document(path: &Path, doc: &Document) -> Result<()> {
    let bytes = serde_json::to_vec_pretty(doc).map_err(DbError::Encode)?;

    let mut tmp_name = path.as_os_str().to_owned();
    tmp_name.push(".tmp");
    let tmp_path = PathBuf::from(tmp_name);

    let result = (|| -> std::io::Result<()> {
        let mut file = fs::File::create(&tmp_path)?;
        file.write_all(&bytes)?;
        file.sync_all()?;
        fs::rename(&tmp_path, path)
    })();

    result.map_err(|e| {
        error!("Failed to write {}: {}", path.display(), e);
        let _ = fs::remove_file(&tmp_path);
        DbError::Io(e)
    })
}
