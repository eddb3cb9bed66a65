mod form;
mod manager;
mod registration;
pub mod storage;
mod validate;
mod view;

pub use form::{local_today, FormController, SubmitError, TodayFn};
pub use manager::{EventManager, EventManagerBuilder, RegistryError};
pub use registration::{Registration, RegistrationId, COST_PER_SEAT};
pub use storage::{FileStorage, LockMode, MemoryStorage, Storage, StorageError};
pub use validate::{is_valid_email, parse_capacity, RegistrationForm, ValidatedForm, ValidationError};
pub use view::{Row, Statistics, View};
