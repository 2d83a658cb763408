//! Nearest-upcoming-birthday resolution.
//!
//! # Responsibility
//! - Find which contact's birthday recurs soonest relative to a reference day.
//!
//! # Invariants
//! - Day counts are computed between calendar days, never instants, so
//!   time-of-day and DST transitions cannot shift the result.
//! - `days_until` is in `0..=365`; a birthday today is `0`, not next year.
//! - Ties keep the first contact in input order.
//! - Contacts with missing or malformed birthdates are skipped, never fatal.

use crate::model::contact::{Contact, ContactId};
use chrono::{Datelike, Local, NaiveDate};
use log::debug;
use serde::Serialize;

/// Soonest upcoming birthday, borrowing the winning contact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProximityResult<'a> {
    pub contact: &'a Contact,
    pub days_until: u32,
    pub next_occurrence: NaiveDate,
}

impl ProximityResult<'_> {
    /// Detaches the result from the borrowed contact collection.
    pub fn to_upcoming(&self) -> UpcomingBirthday {
        UpcomingBirthday {
            contact: self.contact.clone(),
            days_until: self.days_until,
            next_occurrence: self.next_occurrence,
        }
    }
}

/// Owned proximity result, suitable for crossing thread boundaries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpcomingBirthday {
    pub contact: Contact,
    pub days_until: u32,
    pub next_occurrence: NaiveDate,
}

impl UpcomingBirthday {
    /// Short indicator text for the proximity display.
    pub fn headline(&self) -> String {
        match self.days_until {
            0 => format!("{}'s birthday is today", self.contact.name),
            1 => format!("{}'s birthday is tomorrow", self.contact.name),
            days => format!("{}'s birthday is in {days} days", self.contact.name),
        }
    }
}

/// Resolves the contact whose birthday comes soonest on or after `today`.
///
/// Returns `None` for an empty collection or when no birthdate parses.
pub fn resolve(today: NaiveDate, contacts: &[Contact]) -> Option<ProximityResult<'_>> {
    let mut best: Option<ProximityResult<'_>> = None;

    for contact in contacts {
        let Some(birthdate) = contact.parsed_birthdate() else {
            log_skipped(contact.uuid, contact.birthdate.is_some());
            continue;
        };

        let Some(next_occurrence) = next_occurrence(birthdate, today) else {
            continue;
        };
        let days_until = days_between(today, next_occurrence);

        // Strict `<` keeps the earliest contact on ties.
        if best.map_or(true, |current| days_until < current.days_until) {
            best = Some(ProximityResult {
                contact,
                days_until,
                next_occurrence,
            });
        }
    }

    best
}

/// Same as [`resolve`] using the local calendar day as reference.
pub fn resolve_today(contacts: &[Contact]) -> Option<ProximityResult<'_>> {
    resolve(Local::now().date_naive(), contacts)
}

/// Next recurrence of `birthdate`'s month/day on or after `today`.
///
/// A Feb 29 birthdate rolls over to Mar 1 in non-leap years.
pub fn next_occurrence(birthdate: NaiveDate, today: NaiveDate) -> Option<NaiveDate> {
    let this_year = occurrence_in(today.year(), birthdate.month(), birthdate.day())?;
    if this_year < today {
        occurrence_in(today.year() + 1, birthdate.month(), birthdate.day())
    } else {
        Some(this_year)
    }
}

/// Whole calendar days from `from` to `to`; `to` must not precede `from`.
pub fn days_between(from: NaiveDate, to: NaiveDate) -> u32 {
    u32::try_from((to - from).num_days()).unwrap_or(0)
}

fn occurrence_in(year: i32, month: u32, day: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, day).or_else(|| {
        if month == 2 && day == 29 {
            NaiveDate::from_ymd_opt(year, 3, 1)
        } else {
            None
        }
    })
}

fn log_skipped(id: ContactId, had_text: bool) {
    // Missing birthdates are ordinary; only malformed text is worth a line.
    if had_text {
        debug!(
            "event=birthdate_skipped module=report status=skipped contact_id={} reason=unparsable",
            id
        );
    }
}

#[cfg(test)]
mod tests {
    use super::{days_between, next_occurrence, occurrence_in};
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn leap_day_rolls_to_march_first_in_common_years() {
        assert_eq!(occurrence_in(2023, 2, 29), Some(date(2023, 3, 1)));
        assert_eq!(occurrence_in(2024, 2, 29), Some(date(2024, 2, 29)));
    }

    #[test]
    fn next_occurrence_wraps_only_when_strictly_past() {
        let birthdate = date(1990, 7, 4);
        assert_eq!(next_occurrence(birthdate, date(2024, 7, 4)), Some(date(2024, 7, 4)));
        assert_eq!(next_occurrence(birthdate, date(2024, 7, 5)), Some(date(2025, 7, 4)));
        assert_eq!(next_occurrence(birthdate, date(2024, 1, 1)), Some(date(2024, 7, 4)));
    }

    #[test]
    fn days_between_counts_calendar_days() {
        assert_eq!(days_between(date(2024, 2, 28), date(2024, 3, 1)), 2);
        assert_eq!(days_between(date(2023, 2, 28), date(2023, 3, 1)), 1);
        assert_eq!(days_between(date(2024, 3, 1), date(2024, 2, 28)), 0);
    }
}
