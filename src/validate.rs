//! Form validation for new registrations.

use crate::registration::Registration;
use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// Date format produced by HTML date inputs.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Why a submitted form was rejected.
///
/// `Display` yields the short reason; [`ValidationError::message`] yields the
/// full sentence meant for an inline error slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("enter an Event Name")]
    EventName,
    #[error("select a Date")]
    Date,
    #[error("enter a future Date")]
    PastDate,
    #[error("enter the Organizer's Name")]
    Organizer,
    #[error("enter a valid Capacity")]
    Capacity,
    #[error("enter a valid email address")]
    Email,
}

impl ValidationError {
    pub fn message(&self) -> &'static str {
        match self {
            ValidationError::EventName => "Please enter an Event Name.",
            ValidationError::Date => "Please select a Date for the event.",
            ValidationError::PastDate => "Please enter a future Date for the event.",
            ValidationError::Organizer => "Please enter the Organizer's Name.",
            ValidationError::Capacity => "Please enter a valid Capacity.",
            ValidationError::Email => "Please enter a valid email address.",
        }
    }
}

/// Raw, unvalidated field values as typed into the registration form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationForm {
    pub event_name: String,
    pub event_date: String,
    pub organizer: String,
    pub capacity: String,
    pub email: String,
}

/// Field values that passed every check, ready to become a [`Registration`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedForm {
    event_name: String,
    event_date: NaiveDate,
    organizer: String,
    capacity: u32,
    email: String,
}

impl ValidatedForm {
    pub fn into_registration(self) -> Registration {
        Registration::new(
            self.event_name,
            self.event_date,
            self.organizer,
            self.capacity,
            self.email,
        )
    }
}

impl RegistrationForm {
    /// Check every field in order and stop at the first failure.
    ///
    /// `today` is the current calendar date; the event date must be strictly
    /// after it.
    ///
    /// # Examples
    ///
    /// ```
    /// use chrono::NaiveDate;
    /// use eventroster::{RegistrationForm, ValidationError};
    ///
    /// let today = NaiveDate::from_ymd_opt(2030, 1, 1).unwrap();
    /// let mut form = RegistrationForm {
    ///     event_name: "Meetup".into(),
    ///     event_date: "2030-01-02".into(),
    ///     organizer: "Ana".into(),
    ///     capacity: "10".into(),
    ///     email: "ana@x.com".into(),
    /// };
    /// assert!(form.validate(today).is_ok());
    ///
    /// form.event_date = "2030-01-01".into();
    /// assert_eq!(form.validate(today), Err(ValidationError::PastDate));
    /// ```
    pub fn validate(&self, today: NaiveDate) -> Result<ValidatedForm, ValidationError> {
        if self.event_name.is_empty() {
            return Err(ValidationError::EventName);
        }

        let event_date = NaiveDate::parse_from_str(self.event_date.trim(), DATE_FORMAT)
            .map_err(|_| ValidationError::Date)?;
        if event_date <= today {
            return Err(ValidationError::PastDate);
        }

        if self.organizer.is_empty() {
            return Err(ValidationError::Organizer);
        }

        let capacity = parse_capacity(&self.capacity).ok_or(ValidationError::Capacity)?;

        if self.email.is_empty() || !is_valid_email(&self.email) {
            return Err(ValidationError::Email);
        }

        Ok(ValidatedForm {
            event_name: self.event_name.clone(),
            event_date,
            organizer: self.organizer.clone(),
            capacity,
            email: self.email.clone(),
        })
    }
}

fn email_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    // Unanchored: something@something.something anywhere in the input.
    REGEX.get_or_init(|| Regex::new(r"\S+@\S+\.\S+").expect("Invalid regex"))
}

/// Minimal shape check: `local@domain.tld`, no whitespace inside each part.
///
/// ```
/// use eventroster::is_valid_email;
///
/// assert!(is_valid_email("ana@x.com"));
/// assert!(!is_valid_email("foo@bar"));
/// ```
pub fn is_valid_email(email: &str) -> bool {
    email_regex().is_match(email)
}

/// Parse a capacity the way a lenient integer reader does: skip leading
/// whitespace, accept an optional sign, take the leading run of digits and
/// ignore whatever follows. Returns `None` unless the result is a positive
/// value that fits in `u32`.
///
/// ```
/// use eventroster::parse_capacity;
///
/// assert_eq!(parse_capacity("10"), Some(10));
/// assert_eq!(parse_capacity(" 12 seats"), Some(12));
/// assert_eq!(parse_capacity("0"), None);
/// assert_eq!(parse_capacity("-3"), None);
/// assert_eq!(parse_capacity("ten"), None);
/// ```
pub fn parse_capacity(raw: &str) -> Option<u32> {
    let s = raw.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    let digits = &digits[..end];
    if digits.is_empty() || negative {
        return None;
    }
    match digits.parse::<u32>() {
        Ok(0) | Err(_) => None,
        Ok(n) => Some(n),
    }
}
