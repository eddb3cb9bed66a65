use crate::manager::{EventManager, RegistryError};
use crate::registration::RegistrationId;
use crate::storage::Storage;
use crate::validate::{RegistrationForm, ValidationError};
use chrono::NaiveDate;

/// Source of the current calendar date used to reject past events.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use eventroster::TodayFn;
///
/// fn fixed() -> NaiveDate {
///     NaiveDate::from_ymd_opt(2030, 1, 1).unwrap()
/// }
///
/// let today: TodayFn = fixed;
/// ```
pub type TodayFn = fn() -> NaiveDate;

/// The local calendar date.
pub fn local_today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

/// Why a submission did not produce a registration.
#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    #[error("rejected: {0}")]
    Rejected(#[from] ValidationError),

    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// Drives the registration form: holds what the user typed, validates it on
/// submit, and hands accepted records to an [`EventManager`].
///
/// A rejected submission keeps the fields as typed and records the error; an
/// accepted one clears both.
#[derive(Debug, Clone)]
pub struct FormController {
    pub fields: RegistrationForm,
    error: Option<ValidationError>,
    today: TodayFn,
}

impl Default for FormController {
    fn default() -> Self {
        Self::new()
    }
}

impl FormController {
    pub fn new() -> Self {
        Self::with_today(local_today)
    }

    /// Use `today` instead of the local clock.
    pub fn with_today(today: TodayFn) -> Self {
        FormController {
            fields: RegistrationForm::default(),
            error: None,
            today,
        }
    }

    /// The reason the last submission was rejected, if it was.
    pub fn error(&self) -> Option<ValidationError> {
        self.error
    }

    /// Text for the inline error slot; empty when there is no error.
    pub fn error_message(&self) -> &'static str {
        self.error.map_or("", |e| e.message())
    }

    /// Clear every field and any pending error.
    pub fn reset(&mut self) {
        self.fields = RegistrationForm::default();
        self.error = None;
    }

    /// Validate the current fields and, if they pass, add the registration.
    ///
    /// On rejection nothing is stored and the fields are left as they were.
    /// If the manager fails to persist, the fields are likewise kept so the
    /// user can retry.
    pub fn submit<S: Storage>(
        &mut self,
        manager: &mut EventManager<S>,
    ) -> Result<RegistrationId, SubmitError> {
        self.error = None;

        let validated = match self.fields.validate((self.today)()) {
            Ok(v) => v,
            Err(e) => {
                log::warn!("registration rejected: {e}");
                self.error = Some(e);
                return Err(e.into());
            }
        };

        let id = manager.add_registration(validated.into_registration())?;
        self.reset();
        Ok(id)
    }
}
