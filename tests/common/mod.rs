#![allow(dead_code)]

use chrono::{Days, NaiveDate};
use eventroster::{
    EventManager, MemoryStorage, Registration, RegistrationForm, Storage, StorageError,
};
use std::cell::Cell;
use std::io;
use std::path::PathBuf;
use std::rc::Rc;

pub fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2030, 1, 10).unwrap()
}

pub fn tomorrow() -> NaiveDate {
    today().checked_add_days(Days::new(1)).unwrap()
}

pub fn registration(name: &str, capacity: u32) -> Registration {
    Registration::new(name, tomorrow(), "Ana", capacity, "ana@x.com")
}

pub fn add_n<S: Storage>(manager: &mut EventManager<S>, n: usize) {
    for i in 0..n {
        manager
            .add_registration(registration(&format!("event_{i}"), i as u32 + 1))
            .unwrap();
    }
}

pub fn names<S: Storage>(manager: &EventManager<S>) -> Vec<String> {
    manager
        .registrations()
        .iter()
        .map(|r| r.event_name().to_string())
        .collect()
}

pub fn meetup_form(date: NaiveDate) -> RegistrationForm {
    RegistrationForm {
        event_name: "Meetup".into(),
        event_date: date.to_string(),
        organizer: "Ana".into(),
        capacity: "10".into(),
        email: "ana@x.com".into(),
    }
}

/// Slot text as the original form wrote it: no ids, costs taken as stored.
pub fn legacy_slot(costs: &[u64]) -> String {
    let records: Vec<String> = costs
        .iter()
        .enumerate()
        .map(|(i, cost)| {
            format!(
                r#"{{"eventName":"event_{i}","eventDate":"2030-02-01","organizer":"Ana","capacity":{},"cost":{cost},"email":"ana@x.com"}}"#,
                cost / 15
            )
        })
        .collect();
    format!("[{}]", records.join(","))
}

/// In-memory storage whose saves fail while the shared switch is on.
#[derive(Debug, Default)]
pub struct FlakyStorage {
    pub inner: MemoryStorage,
    pub fail_saves: Rc<Cell<bool>>,
}

impl Storage for FlakyStorage {
    fn save(&mut self, registrations: &[Registration]) -> Result<(), StorageError> {
        if self.fail_saves.get() {
            return Err(StorageError::Io {
                path: PathBuf::from("flaky"),
                source: io::Error::other("disk full"),
            });
        }
        self.inner.save(registrations)
    }

    fn load(&self) -> Result<Vec<Registration>, StorageError> {
        self.inner.load()
    }

    fn clear(&mut self) -> Result<(), StorageError> {
        self.inner.clear()
    }

    fn key(&self) -> &str {
        self.inner.key()
    }
}
