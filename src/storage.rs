//! Persistence of the registration list in a single durable slot.

use crate::registration::Registration;
use fs2::FileExt;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Key used for the slot when none is configured.
pub const DEFAULT_KEY: &str = "registrations";

/// Errors raised while reading or writing the storage slot.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("storage I/O failed at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The slot exists but does not hold a valid registration list.
    #[error("storage slot '{key}' holds malformed data: {source}")]
    Corrupt {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to serialize registrations: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("could not lock {path}: another writer holds the lock")]
    Locked { path: PathBuf },

    #[error("invalid storage key {key:?}: must be a plain file name")]
    InvalidKey { key: String },
}

impl StorageError {
    fn io(path: &Path, source: io::Error) -> Self {
        StorageError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// A single key-value slot holding the whole registration list.
///
/// Every `save` is a total overwrite: the slot always holds exactly the list
/// that was last passed in, never a partial or appended one.
pub trait Storage {
    /// Overwrite the slot with `registrations`.
    fn save(&mut self, registrations: &[Registration]) -> Result<(), StorageError>;

    /// Read the slot. An absent slot yields an empty list; a slot that does
    /// not parse yields [`StorageError::Corrupt`].
    fn load(&self) -> Result<Vec<Registration>, StorageError>;

    /// Remove the slot. Idempotent.
    fn clear(&mut self) -> Result<(), StorageError>;

    /// Name of the slot, for diagnostics.
    fn key(&self) -> &str;
}

/// How [`FileStorage`] coordinates writers on the same slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LockMode {
    /// Exclusive `flock` on `<key>.lock` while the slot is rewritten. A save
    /// that finds the lock taken waits for it; the later writer wins.
    #[default]
    Flock,
    /// Like `Flock`, but a save that finds the lock taken fails with
    /// [`StorageError::Locked`] instead of waiting.
    TryFlock,
    /// No locking.
    None,
}

/// A slot stored as `<dir>/<key>.json`.
///
/// Writes go to `<key>.json.tmp`, are synced, then renamed over the slot, so a
/// crash mid-write leaves the previous contents intact.
#[derive(Debug, Clone)]
pub struct FileStorage {
    key: String,
    slot_path: PathBuf,
    tmp_path: PathBuf,
    lock_path: PathBuf,
    lock_mode: LockMode,
}

impl FileStorage {
    /// Open the slot `key` inside `dir`, creating `dir` if needed.
    ///
    /// The slot file itself is not created until the first save. `key` must
    /// be a plain file name: no path separators, not empty, not `.` or `..`.
    pub fn open(
        dir: impl AsRef<Path>,
        key: &str,
        lock_mode: LockMode,
    ) -> Result<Self, StorageError> {
        if !is_plain_key(key) {
            return Err(StorageError::InvalidKey {
                key: key.to_string(),
            });
        }
        let dir = dir.as_ref();
        fs::create_dir_all(dir).map_err(|e| StorageError::io(dir, e))?;

        Ok(FileStorage {
            key: key.to_string(),
            slot_path: dir.join(format!("{key}.json")),
            tmp_path: dir.join(format!("{key}.json.tmp")),
            lock_path: dir.join(format!("{key}.lock")),
            lock_mode,
        })
    }

    /// Returns the path of the slot file.
    pub fn slot_path(&self) -> &Path {
        &self.slot_path
    }

    pub fn lock_mode(&self) -> LockMode {
        self.lock_mode
    }

    fn acquire_lock(&self) -> Result<Option<File>, StorageError> {
        if self.lock_mode == LockMode::None {
            return Ok(None);
        }
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&self.lock_path)
            .map_err(|e| StorageError::io(&self.lock_path, e))?;
        let locked = match self.lock_mode {
            LockMode::TryFlock => file.try_lock_exclusive(),
            _ => FileExt::lock_exclusive(&file),
        };
        locked.map_err(|e| {
            if e.kind() == fs2::lock_contended_error().kind() {
                StorageError::Locked {
                    path: self.lock_path.clone(),
                }
            } else {
                StorageError::io(&self.lock_path, e)
            }
        })?;
        Ok(Some(file))
    }

    fn write_atomic(&self, json: &[u8]) -> io::Result<()> {
        let mut file = File::create(&self.tmp_path)?;
        file.write_all(json)?;
        file.sync_data()?;
        drop(file);

        fs::rename(&self.tmp_path, &self.slot_path)
    }
}

impl Storage for FileStorage {
    fn save(&mut self, registrations: &[Registration]) -> Result<(), StorageError> {
        let json = serde_json::to_vec(registrations).map_err(StorageError::Serialize)?;

        let lock = self.acquire_lock()?;
        let result = self
            .write_atomic(&json)
            .map_err(|e| StorageError::io(&self.slot_path, e));
        if let Some(lock) = lock {
            // Unlock failures are harmless: the lock drops with the handle.
            let _ = FileExt::unlock(&lock);
        }
        result?;

        log::debug!(
            "saved {} registrations to {}",
            registrations.len(),
            self.slot_path.display()
        );
        Ok(())
    }

    fn load(&self) -> Result<Vec<Registration>, StorageError> {
        let contents = match fs::read_to_string(&self.slot_path) {
            Ok(c) => c,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                log::debug!("no slot at {}, starting empty", self.slot_path.display());
                return Ok(Vec::new());
            }
            Err(e) => return Err(StorageError::io(&self.slot_path, e)),
        };

        let registrations = parse_slot(&self.key, &contents)?;
        log::debug!(
            "loaded {} registrations from {}",
            registrations.len(),
            self.slot_path.display()
        );
        Ok(registrations)
    }

    fn clear(&mut self) -> Result<(), StorageError> {
        for path in [&self.slot_path, &self.tmp_path] {
            match fs::remove_file(path) {
                Ok(()) => {}
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => return Err(StorageError::io(path, e)),
            }
        }
        Ok(())
    }

    fn key(&self) -> &str {
        &self.key
    }
}

fn is_plain_key(key: &str) -> bool {
    !key.is_empty()
        && key != "."
        && key != ".."
        && !key.contains(['/', '\\', '\0'])
}

/// A slot held in memory as serialized text.
///
/// Goes through the same JSON encoding as [`FileStorage`], so tests see the
/// same round-trip behavior, and hosts with their own key-value store (a
/// browser's local storage, say) can move [`MemoryStorage::contents`] across.
#[derive(Debug, Clone)]
pub struct MemoryStorage {
    key: String,
    contents: Option<String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        MemoryStorage {
            key: DEFAULT_KEY.to_string(),
            contents: None,
        }
    }

    /// Start from pre-existing slot text.
    pub fn with_contents(contents: impl Into<String>) -> Self {
        MemoryStorage {
            key: DEFAULT_KEY.to_string(),
            contents: Some(contents.into()),
        }
    }

    /// Name this slot `key` instead of [`DEFAULT_KEY`].
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    /// Raw slot text, or `None` if nothing was ever saved.
    pub fn contents(&self) -> Option<&str> {
        self.contents.as_deref()
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl Storage for MemoryStorage {
    fn save(&mut self, registrations: &[Registration]) -> Result<(), StorageError> {
        let json = serde_json::to_string(registrations).map_err(StorageError::Serialize)?;
        self.contents = Some(json);
        Ok(())
    }

    fn load(&self) -> Result<Vec<Registration>, StorageError> {
        match &self.contents {
            Some(text) => parse_slot(&self.key, text),
            None => Ok(Vec::new()),
        }
    }

    fn clear(&mut self) -> Result<(), StorageError> {
        self.contents = None;
        Ok(())
    }

    fn key(&self) -> &str {
        &self.key
    }
}

fn parse_slot(key: &str, text: &str) -> Result<Vec<Registration>, StorageError> {
    serde_json::from_str(text).map_err(|source| {
        log::error!("storage slot '{key}' is corrupt: {source}");
        StorageError::Corrupt {
            key: key.to_string(),
            source,
        }
    })
}
