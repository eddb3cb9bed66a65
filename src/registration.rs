use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Fixed price of one seat, in euros.
pub const COST_PER_SEAT: u64 = 15;

/// Stable opaque identifier of a [`Registration`].
///
/// Assigned once when the record is created and persisted alongside it, so a
/// delete control bound to an id keeps pointing at the same record no matter
/// how many other records are removed before it is clicked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RegistrationId(Uuid);

impl RegistrationId {
    /// Generate a fresh random identifier.
    pub fn new() -> Self {
        RegistrationId(Uuid::new_v4())
    }
}

impl Default for RegistrationId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RegistrationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for RegistrationId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(RegistrationId)
    }
}

/// One event sign-up.
///
/// Registrations are immutable once built: fields are only reachable through
/// accessors, and `cost` is derived from `capacity` exactly once, in
/// [`Registration::new`].
///
/// Serialized with camelCase keys in declaration order, which is the layout of
/// the storage slot:
///
/// ```text
/// {"eventName":"Meetup","eventDate":"2030-01-01","organizer":"Ana",
///  "capacity":10,"cost":150,"email":"ana@x.com","id":"6f1c..."}
/// ```
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use eventroster::Registration;
///
/// let date = NaiveDate::from_ymd_opt(2030, 1, 1).unwrap();
/// let reg = Registration::new("Meetup", date, "Ana", 10, "ana@x.com");
/// assert_eq!(reg.event_name(), "Meetup");
/// assert_eq!(reg.cost(), 150);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    event_name: String,
    event_date: NaiveDate,
    organizer: String,
    capacity: u32,
    cost: u64,
    email: String,

    /// Older slots were written without ids; those records get a fresh one
    /// on load.
    #[serde(default)]
    id: RegistrationId,
}

impl Registration {
    /// Build a registration, deriving `cost = capacity * COST_PER_SEAT`.
    ///
    /// Does no validation; callers coming from user input should go through
    /// [`RegistrationForm::validate`](crate::RegistrationForm::validate).
    pub fn new(
        event_name: impl Into<String>,
        event_date: NaiveDate,
        organizer: impl Into<String>,
        capacity: u32,
        email: impl Into<String>,
    ) -> Self {
        Registration {
            event_name: event_name.into(),
            event_date,
            organizer: organizer.into(),
            capacity,
            cost: u64::from(capacity) * COST_PER_SEAT,
            email: email.into(),
            id: RegistrationId::new(),
        }
    }

    pub fn id(&self) -> RegistrationId {
        self.id
    }

    pub fn event_name(&self) -> &str {
        &self.event_name
    }

    pub fn event_date(&self) -> NaiveDate {
        self.event_date
    }

    pub fn organizer(&self) -> &str {
        &self.organizer
    }

    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    /// Total cost in euros.
    pub fn cost(&self) -> u64 {
        self.cost
    }

    pub fn email(&self) -> &str {
        &self.email
    }
}
