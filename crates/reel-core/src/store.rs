//! Project store
//!
//! Single source of truth for project records. Every mutation is a
//! whole-collection read-modify-write:
//! - load the collection from the backend
//! - locate the record by id and apply the updater
//! - write the whole collection back
//!
//! An in-process mutex serialises these cycles. There is no version check
//! across processes; the last writer wins.
//!
//! Backends are blocking. Async callers go through `fetch` and `update`,
//! which run the cycle on tokio's blocking pool.

use crate::error::StoreError;
use crate::types::{ProjectId, ProjectRecord};
use parking_lot::Mutex;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Persistence for the full project collection
pub trait ProjectBackend: Send + Sync {
    /// Load every record (empty when nothing was saved yet)
    fn load(&self) -> Result<Vec<ProjectRecord>, StoreError>;

    /// Replace the stored collection
    fn save(&self, projects: &[ProjectRecord]) -> Result<(), StoreError>;
}

/// JSON array on disk, replaced atomically through a temp file
#[derive(Debug, Clone)]
pub struct JsonFileBackend {
    path: PathBuf,
}

impl JsonFileBackend {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[inline]
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.display().to_string(),
            source,
        }
    }

    fn directory(&self) -> &Path {
        self.path
            .parent()
            .filter(|dir| !dir.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."))
    }
}

impl ProjectBackend for JsonFileBackend {
    fn load(&self) -> Result<Vec<ProjectRecord>, StoreError> {
        let text = match std::fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(self.io_error(e)),
        };
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_str(&text)?)
    }

    fn save(&self, projects: &[ProjectRecord]) -> Result<(), StoreError> {
        let dir = self.directory();
        std::fs::create_dir_all(dir).map_err(|e| self.io_error(e))?;

        let mut file = tempfile::NamedTempFile::new_in(dir).map_err(|e| self.io_error(e))?;
        serde_json::to_writer_pretty(&mut file, projects)?;
        file.flush().map_err(|e| self.io_error(e))?;
        file.persist(&self.path)
            .map_err(|e| self.io_error(e.error))?;

        tracing::debug!(path = %self.path.display(), count = projects.len(), "project collection written");
        Ok(())
    }
}

/// Volatile backend
#[derive(Debug, Default)]
pub struct MemoryBackend {
    projects: Mutex<Vec<ProjectRecord>>,
}

impl MemoryBackend {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProjectBackend for MemoryBackend {
    fn load(&self) -> Result<Vec<ProjectRecord>, StoreError> {
        Ok(self.projects.lock().clone())
    }

    fn save(&self, projects: &[ProjectRecord]) -> Result<(), StoreError> {
        *self.projects.lock() = projects.to_vec();
        Ok(())
    }
}

/// Read / replace-by-id access over a backend
pub struct ProjectStore {
    backend: Arc<dyn ProjectBackend>,
    /// Held for the whole read-modify-write cycle
    write_lock: Mutex<()>,
}

impl ProjectStore {
    /// Create store over `backend`
    #[must_use]
    pub fn new(backend: Arc<dyn ProjectBackend>) -> Self {
        Self {
            backend,
            write_lock: Mutex::new(()),
        }
    }

    /// Store backed by a JSON file
    #[must_use]
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self::new(Arc::new(JsonFileBackend::new(path)))
    }

    /// Store backed by memory
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryBackend::new()))
    }

    /// Every record, in insertion order
    pub fn read_all(&self) -> Result<Vec<ProjectRecord>, StoreError> {
        self.backend.load()
    }

    /// One record by id
    ///
    /// # Errors
    /// `StoreError::NotFound` when no record has `id`
    pub fn get(&self, id: &ProjectId) -> Result<ProjectRecord, StoreError> {
        self.backend
            .load()?
            .into_iter()
            .find(|p| &p.id == id)
            .ok_or_else(|| StoreError::NotFound(id.clone()))
    }

    /// Append a new record
    ///
    /// # Errors
    /// `StoreError::Duplicate` when the id is taken
    pub fn insert(&self, record: ProjectRecord) -> Result<ProjectRecord, StoreError> {
        let _guard = self.write_lock.lock();
        let mut projects = self.backend.load()?;
        if projects.iter().any(|p| p.id == record.id) {
            return Err(StoreError::Duplicate(record.id));
        }
        projects.push(record.clone());
        self.backend.save(&projects)?;
        tracing::info!("project stored: {}", record.id);
        Ok(record)
    }

    /// Read-modify-write one record
    ///
    /// `updater` sees the record as currently stored. When it fails nothing
    /// is written. Returns the record as written.
    ///
    /// # Errors
    /// `NotFound` (through `E: From<StoreError>`), backend failures, or the
    /// updater's own error
    pub fn replace<F, E>(&self, id: &ProjectId, updater: F) -> Result<ProjectRecord, E>
    where
        F: FnOnce(&mut ProjectRecord) -> Result<(), E>,
        E: From<StoreError>,
    {
        let _guard = self.write_lock.lock();
        let mut projects = self.backend.load()?;
        let record = projects
            .iter_mut()
            .find(|p| &p.id == id)
            .ok_or_else(|| StoreError::NotFound(id.clone()))?;

        let mut updated = record.clone();
        updater(&mut updated)?;
        updated.id = id.clone();
        *record = updated.clone();

        self.backend.save(&projects)?;
        tracing::debug!("project replaced: {}", id);
        Ok(updated)
    }
}

/// Async access, run on the blocking pool
impl ProjectStore {
    /// `get` off the async executor
    ///
    /// # Errors
    /// As `get`, plus `StoreError::Task` when the blocking task dies
    pub async fn fetch(self: &Arc<Self>, id: &ProjectId) -> Result<ProjectRecord, StoreError> {
        let store = Arc::clone(self);
        let id = id.clone();
        tokio::task::spawn_blocking(move || store.get(&id))
            .await
            .map_err(|e| StoreError::Task(e.to_string()))?
    }

    /// `replace` off the async executor
    ///
    /// # Errors
    /// As `replace`, plus `StoreError::Task` when the blocking task dies
    pub async fn update<F, E>(self: &Arc<Self>, id: &ProjectId, updater: F) -> Result<ProjectRecord, E>
    where
        F: FnOnce(&mut ProjectRecord) -> Result<(), E> + Send + 'static,
        E: From<StoreError> + Send + 'static,
    {
        let store = Arc::clone(self);
        let id = id.clone();
        tokio::task::spawn_blocking(move || store.replace(&id, updater))
            .await
            .map_err(|e| E::from(StoreError::Task(e.to_string())))?
    }
}

impl std::fmt::Debug for ProjectStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProjectStore").finish_non_exhaustive()
    }
}
