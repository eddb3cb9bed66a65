use crate::registration::{Registration, RegistrationId};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One table row: the six record fields in declared order, plus what a delete
/// control needs to target this record.
///
/// `index` is the record's position as of the render that produced this row.
/// `id` stays valid across later renders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Row {
    pub index: usize,
    pub id: RegistrationId,
    pub event_name: String,
    pub event_date: NaiveDate,
    pub organizer: String,
    pub capacity: u32,
    pub cost: u64,
    pub email: String,
}

impl Row {
    fn project(index: usize, reg: &Registration) -> Self {
        Row {
            index,
            id: reg.id(),
            event_name: reg.event_name().to_string(),
            event_date: reg.event_date(),
            organizer: reg.organizer().to_string(),
            capacity: reg.capacity(),
            cost: reg.cost(),
            email: reg.email().to_string(),
        }
    }

    /// The six field values as display text, in column order.
    pub fn cells(&self) -> [String; 6] {
        [
            self.event_name.clone(),
            self.event_date.to_string(),
            self.organizer.clone(),
            self.capacity.to_string(),
            self.cost.to_string(),
            self.email.clone(),
        ]
    }
}

/// Aggregate figures over the registration list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    pub total_events: usize,
    pub total_cost: u64,
    /// Mean cost in euro cents, rounded half up from the exact quotient, or
    /// `None` for an empty list.
    pub average_cost_cents: Option<u64>,
}

impl Statistics {
    /// Compute statistics for `registrations`.
    ///
    /// # Examples
    ///
    /// ```
    /// use chrono::NaiveDate;
    /// use eventroster::{Registration, Statistics};
    ///
    /// let date = NaiveDate::from_ymd_opt(2030, 1, 1).unwrap();
    /// let regs = vec![
    ///     Registration::new("A", date, "Ana", 1, "a@x.com"),
    ///     Registration::new("B", date, "Bo", 2, "b@x.com"),
    /// ];
    /// let stats = Statistics::compute(&regs);
    /// assert_eq!(stats.total_events, 2);
    /// assert_eq!(stats.total_cost, 45);
    /// assert_eq!(stats.average_cost_display(), "22.50");
    /// assert_eq!(Statistics::compute(&[]).average_cost_display(), "0");
    /// ```
    pub fn compute(registrations: &[Registration]) -> Self {
        let total_events = registrations.len();
        let total_cost: u64 = registrations.iter().map(Registration::cost).sum();
        let average_cost_cents = (total_events > 0).then(|| {
            // Integer arithmetic so near-ties like 15.075 round on the true
            // value rather than on its nearest f64.
            let n = total_events as u128;
            let cents = (u128::from(total_cost) * 200 + n) / (2 * n);
            cents as u64
        });
        Statistics {
            total_events,
            total_cost,
            average_cost_cents,
        }
    }

    /// Mean cost in euros, rounded to two decimals.
    pub fn average_cost(&self) -> Option<f64> {
        self.average_cost_cents.map(|c| c as f64 / 100.0)
    }

    /// `"150.00"`-style text, or the literal `"0"` when there are no events.
    pub fn average_cost_display(&self) -> String {
        match self.average_cost_cents {
            Some(cents) => format!("{}.{:02}", cents / 100, cents % 100),
            None => "0".to_string(),
        }
    }

    pub fn total_events_label(&self) -> String {
        format!("Total Events: {}", self.total_events)
    }

    pub fn average_cost_label(&self) -> String {
        format!("Average Cost: {} Euros", self.average_cost_display())
    }
}

/// A pure-data snapshot of everything a presentation layer shows: the table
/// and the two summary figures.
///
/// Rebuilt from scratch after every mutation; nothing is patched in place, so
/// row indices always match the list they were projected from.
///
/// `Display` renders a plain-text table suitable for printing.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct View {
    pub rows: Vec<Row>,
    pub statistics: Statistics,
}

impl View {
    /// Project `registrations` into rows and statistics.
    pub fn render(registrations: &[Registration]) -> Self {
        View {
            rows: registrations
                .iter()
                .enumerate()
                .map(|(index, reg)| Row::project(index, reg))
                .collect(),
            statistics: Statistics::compute(registrations),
        }
    }

    pub fn total_events_label(&self) -> String {
        self.statistics.total_events_label()
    }

    pub fn average_cost_label(&self) -> String {
        self.statistics.average_cost_label()
    }
}

const HEADERS: [&str; 6] = ["Event Name", "Date", "Organizer", "Capacity", "Cost", "Email"];

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cells: Vec<[String; 6]> = self.rows.iter().map(Row::cells).collect();

        let mut widths = HEADERS.map(|h| h.chars().count());
        for row in &cells {
            for (width, cell) in widths.iter_mut().zip(row) {
                *width = (*width).max(cell.chars().count());
            }
        }

        let line = |f: &mut fmt::Formatter<'_>, values: &[&str]| -> fmt::Result {
            let padded: Vec<String> = values
                .iter()
                .zip(widths)
                .map(|(v, w)| format!("{v:<w$}"))
                .collect();
            writeln!(f, "{}", padded.join(" | ").trim_end())
        };

        line(f, &HEADERS[..])?;
        let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
        writeln!(f, "{}", rule.join("-+-"))?;
        for row in &cells {
            let values: Vec<&str> = row.iter().map(String::as_str).collect();
            line(f, &values)?;
        }
        writeln!(f)?;
        writeln!(f, "{}", self.total_events_label())?;
        write!(f, "{}", self.average_cost_label())
    }
}
