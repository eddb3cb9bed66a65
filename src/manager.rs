use crate::registration::{Registration, RegistrationId};
use crate::storage::{DEFAULT_KEY, FileStorage, LockMode, Storage, StorageError};
use crate::view::{Statistics, View};
use std::path::{Path, PathBuf};

/// Errors from [`EventManager`] operations.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("no registration with id {0}")]
    NotFound(RegistrationId),

    #[error("index {index} is out of range for {len} registrations")]
    IndexOutOfRange { index: usize, len: usize },
}

/// Owner of the registration list.
///
/// Every mutation runs the same cycle: change the in-memory list, overwrite
/// the storage slot with it, then rebuild the [`View`] from scratch. If the
/// save fails the list is restored, so memory and storage never drift apart.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use eventroster::{EventManager, MemoryStorage, Registration};
///
/// let mut manager = EventManager::initialize(MemoryStorage::new())?;
/// let date = NaiveDate::from_ymd_opt(2030, 1, 1).unwrap();
/// let id = manager.add_registration(Registration::new("Meetup", date, "Ana", 10, "ana@x.com"))?;
/// assert_eq!(manager.view().statistics.average_cost_display(), "150.00");
///
/// manager.delete_registration(id)?;
/// assert!(manager.is_empty());
/// # Ok::<(), eventroster::RegistryError>(())
/// ```
#[derive(Debug)]
pub struct EventManager<S: Storage = FileStorage> {
    storage: S,
    registrations: Vec<Registration>,
    view: View,
}

impl EventManager<FileStorage> {
    /// Start configuring a manager backed by a slot file in `dir`.
    pub fn builder(dir: impl AsRef<Path>) -> EventManagerBuilder {
        EventManagerBuilder::new(dir)
    }

    /// Open the default slot in `dir` with default settings.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self, RegistryError> {
        Self::builder(dir).open()
    }
}

impl<S: Storage> EventManager<S> {
    /// Load the list from `storage` and render it.
    ///
    /// A missing slot starts an empty list. A slot that does not parse is an
    /// error; it is left untouched on disk.
    pub fn initialize(storage: S) -> Result<Self, RegistryError> {
        let registrations = storage.load()?;
        let view = View::render(&registrations);
        log::debug!(
            "event manager ready with {} registrations from '{}'",
            registrations.len(),
            storage.key()
        );
        Ok(EventManager {
            storage,
            registrations,
            view,
        })
    }

    /// Append `registration`, persist, and re-render.
    ///
    /// No capacity limit and no duplicate check.
    pub fn add_registration(
        &mut self,
        registration: Registration,
    ) -> Result<RegistrationId, RegistryError> {
        let id = registration.id();
        self.registrations.push(registration);
        if let Err(e) = self.storage.save(&self.registrations) {
            self.registrations.pop();
            return Err(e.into());
        }
        self.render();
        log::info!("added registration {id}");
        Ok(id)
    }

    /// Remove the registration with `id`, persist, and re-render.
    pub fn delete_registration(
        &mut self,
        id: RegistrationId,
    ) -> Result<Registration, RegistryError> {
        let index = self
            .position(id)
            .ok_or(RegistryError::NotFound(id))?;
        self.remove(index)
    }

    /// Remove the registration at `index` (0-based, as shown in the latest
    /// view), persist, and re-render.
    ///
    /// Prefer [`delete_registration`](Self::delete_registration): an index is
    /// only meaningful for the render it came from.
    pub fn delete_at(&mut self, index: usize) -> Result<Registration, RegistryError> {
        let len = self.registrations.len();
        if index >= len {
            return Err(RegistryError::IndexOutOfRange { index, len });
        }
        self.remove(index)
    }

    fn remove(&mut self, index: usize) -> Result<Registration, RegistryError> {
        let removed = self.registrations.remove(index);
        if let Err(e) = self.storage.save(&self.registrations) {
            self.registrations.insert(index, removed);
            return Err(e.into());
        }
        self.render();
        log::info!("deleted registration {} at index {index}", removed.id());
        Ok(removed)
    }

    fn render(&mut self) {
        self.view = View::render(&self.registrations);
    }

    fn position(&self, id: RegistrationId) -> Option<usize> {
        self.registrations.iter().position(|r| r.id() == id)
    }

    /// The registrations in insertion order.
    pub fn registrations(&self) -> &[Registration] {
        &self.registrations
    }

    pub fn get(&self, id: RegistrationId) -> Option<&Registration> {
        self.position(id).map(|i| &self.registrations[i])
    }

    pub fn len(&self) -> usize {
        self.registrations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }

    /// The view as of the last mutation (or initialization).
    pub fn view(&self) -> &View {
        &self.view
    }

    pub fn statistics(&self) -> Statistics {
        self.view.statistics
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Consume the manager, returning its storage.
    pub fn into_storage(self) -> S {
        self.storage
    }
}

/// Builder for a file-backed [`EventManager`].
///
/// ```no_run
/// use eventroster::{EventManager, LockMode};
///
/// let manager = EventManager::builder("./data")
///     .key("spring_registrations")
///     .lock_mode(LockMode::None)
///     .open()?;
/// # Ok::<(), eventroster::RegistryError>(())
/// ```
#[derive(Debug, Clone)]
pub struct EventManagerBuilder {
    dir: PathBuf,
    key: String,
    lock_mode: LockMode,
}

impl EventManagerBuilder {
    fn new(dir: impl AsRef<Path>) -> Self {
        EventManagerBuilder {
            dir: dir.as_ref().to_path_buf(),
            key: DEFAULT_KEY.to_string(),
            lock_mode: LockMode::default(),
        }
    }

    /// Name of the slot; the file is `<dir>/<key>.json`.
    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    pub fn lock_mode(mut self, mode: LockMode) -> Self {
        self.lock_mode = mode;
        self
    }

    /// Open the slot and load the list.
    pub fn open(self) -> Result<EventManager<FileStorage>, RegistryError> {
        let storage = FileStorage::open(&self.dir, &self.key, self.lock_mode)?;
        EventManager::initialize(storage)
    }
}
