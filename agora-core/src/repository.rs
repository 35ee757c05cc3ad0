//! Durable storage behind the store
//!
//! A [`StateRepository`] stores one serialized [`AppState`] document under a
//! single key. The store calls `load` once at startup and `save` after every
//! mutation.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use crate::error::{Result, StoreError};
use crate::state::AppState;

/// Load/save of the whole state document
pub trait StateRepository {
    /// Read the stored state. `Ok(None)` means nothing was stored yet.
    fn load(&self) -> Result<Option<AppState>>;

    /// Overwrite the stored state
    fn save(&mut self, state: &AppState) -> Result<()>;
}

impl<R: StateRepository + ?Sized> StateRepository for Box<R> {
    fn load(&self) -> Result<Option<AppState>> {
        (**self).load()
    }

    fn save(&mut self, state: &AppState) -> Result<()> {
        (**self).save(state)
    }
}

// ============================================================================
// In-memory
// ============================================================================

/// Repository holding the raw document in memory
///
/// Clones share the same slot, so a test can keep a handle, let the store
/// write through another one, and inspect or corrupt what was written.
#[derive(Debug, Clone, Default)]
pub struct MemoryRepository {
    slot: Arc<Mutex<Option<String>>>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with a raw document already stored
    pub fn with_raw(raw: impl Into<String>) -> Self {
        Self {
            slot: Arc::new(Mutex::new(Some(raw.into()))),
        }
    }

    /// The raw document currently stored
    pub fn raw(&self) -> Option<String> {
        self.slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Overwrite the raw document, bypassing serialization
    pub fn set_raw(&self, raw: impl Into<String>) {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = Some(raw.into());
    }

    pub fn clear(&self) {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }
}

impl StateRepository for MemoryRepository {
    fn load(&self) -> Result<Option<AppState>> {
        self.raw().as_deref().map(AppState::from_json).transpose()
    }

    fn save(&mut self, state: &AppState) -> Result<()> {
        let raw = state.to_json()?;
        self.set_raw(raw);
        Ok(())
    }
}

// ============================================================================
// JSON file
// ============================================================================

/// Repository writing the document to `<dir>/<key>.json`
///
/// Saves go to a sibling temp file first and are renamed into place, so a
/// crash mid-write leaves the previous document intact.
#[derive(Debug, Clone)]
pub struct JsonFileRepository {
    path: PathBuf,
}

impl JsonFileRepository {
    pub fn new(dir: impl AsRef<Path>, key: &str) -> Self {
        Self {
            path: dir.as_ref().join(format!("{}.json", key)),
        }
    }

    /// Use an explicit file path
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl StateRepository for JsonFileRepository {
    fn load(&self) -> Result<Option<AppState>> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(StoreError::io(&self.path, e)),
        };
        AppState::from_json(&raw).map(Some)
    }

    fn save(&mut self, state: &AppState) -> Result<()> {
        let raw = state.to_json()?;

        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).map_err(|e| StoreError::io(dir, e))?;
        }

        let tmp = self.temp_path();
        let mut file = fs::File::create(&tmp).map_err(|e| StoreError::io(&tmp, e))?;
        file.write_all(raw.as_bytes())
            .and_then(|_| file.sync_all())
            .map_err(|e| StoreError::io(&tmp, e))?;
        fs::rename(&tmp, &self.path).map_err(|e| StoreError::io(&self.path, e))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_state() -> AppState {
        let mut state = AppState::default();
        state.selected_chapter = "porto".into();
        state.joined_groups.push("g1".into());
        state
    }

    #[test]
    fn memory_repository_starts_empty() {
        let repo = MemoryRepository::new();
        assert!(repo.load().unwrap().is_none());
    }

    #[test]
    fn memory_repository_clones_share_the_slot() {
        let observer = MemoryRepository::new();
        let mut writer = observer.clone();

        writer.save(&sample_state()).unwrap();

        let raw = observer.raw().unwrap();
        assert!(raw.contains("\"selectedChapter\":\"porto\""));
        assert_eq!(observer.load().unwrap(), Some(sample_state()));
    }

    #[test]
    fn memory_repository_reports_corruption() {
        let repo = MemoryRepository::with_raw("][");
        assert!(repo.load().unwrap_err().is_decode());
    }

    #[test]
    fn file_repository_missing_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let repo = JsonFileRepository::new(dir.path(), "state");
        assert!(repo.load().unwrap().is_none());
    }

    #[test]
    fn file_repository_writes_key_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut repo = JsonFileRepository::new(dir.path().join("nested"), "app-state");

        repo.save(&sample_state()).unwrap();

        assert_eq!(repo.path(), dir.path().join("nested").join("app-state.json"));
        assert!(repo.path().exists());
        assert!(!repo.temp_path().exists());
        assert_eq!(repo.load().unwrap(), Some(sample_state()));
    }

    #[test]
    fn file_repository_overwrites_previous_document() {
        let dir = tempfile::tempdir().unwrap();
        let mut repo = JsonFileRepository::new(dir.path(), "state");

        repo.save(&sample_state()).unwrap();
        repo.save(&AppState::default()).unwrap();

        assert_eq!(repo.load().unwrap(), Some(AppState::default()));
    }

    #[test]
    fn file_repository_reports_corruption() {
        let dir = tempfile::tempdir().unwrap();
        let repo = JsonFileRepository::new(dir.path(), "state");
        fs::write(repo.path(), "{\"likedPosts\": 7}").unwrap();

        assert!(repo.load().unwrap_err().is_decode());
    }

    #[test]
    fn boxed_repository_delegates() {
        let observer = MemoryRepository::new();
        let mut boxed: Box<dyn StateRepository> = Box::new(observer.clone());
        boxed.save(&sample_state()).unwrap();
        assert_eq!(boxed.load().unwrap(), Some(sample_state()));
        assert!(observer.raw().is_some());
    }
}
