//! Contact ("buddy") domain model.
//!
//! # Responsibility
//! - Define the canonical buddy record owned by one user account.
//! - Provide the single parser for the `YYYY-MM-DD` birthdate wire format.
//!
//! # Invariants
//! - `uuid` is stable and never reused for another contact.
//! - `birthdate` is kept as stored text; only month/day drive recurrence and
//!   the year is never trusted for age.
//! - Write paths must call `Contact::validate()`; read paths tolerate
//!   malformed birthdate text so one bad row never aborts a report.

use chrono::{Datelike, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Positional `YYYY-MM-DD` shape. Capture 1 is the month segment.
static BIRTHDATE_SHAPE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]{4}-([0-9]{2})-[0-9]{2}$").expect("valid birthdate regex"));

/// Stable identifier for every contact.
pub type ContactId = Uuid;

/// Identifier of the user account owning a contact.
pub type OwnerId = i64;

/// Closed gender category set.
///
/// Only `Male` and `Female` are charted; `Other` is stored but never counted
/// in chart-facing aggregates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    /// Stored/wire text for this category.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Male => "Male",
            Self::Female => "Female",
            Self::Other => "Other",
        }
    }

    /// Parses stored text. Matching is exact, like the store's equality filter.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "Male" => Some(Self::Male),
            "Female" => Some(Self::Female),
            "Other" => Some(Self::Other),
            _ => None,
        }
    }
}

impl Display for Gender {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validation errors for contact write paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContactValidationError {
    EmptyName,
    InvalidBirthdate(String),
    InvalidEmail(String),
}

impl Display for ContactValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyName => write!(f, "contact name cannot be empty"),
            Self::InvalidBirthdate(value) => {
                write!(f, "birthdate `{value}` is not a valid YYYY-MM-DD date")
            }
            Self::InvalidEmail(value) => write!(f, "email `{value}` is missing `@`"),
        }
    }
}

impl Error for ContactValidationError {}

/// Canonical buddy record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    pub uuid: ContactId,
    pub owner_id: OwnerId,
    pub name: String,
    pub gender: Gender,
    /// `YYYY-MM-DD` text as stored. `None` when never entered.
    pub birthdate: Option<String>,
    pub phone: String,
    pub email: Option<String>,
}

impl Contact {
    /// Creates a contact with a generated stable ID and no optional fields.
    pub fn new(owner_id: OwnerId, name: impl Into<String>, gender: Gender) -> Self {
        Self::with_id(Uuid::new_v4(), owner_id, name, gender)
    }

    /// Creates a contact with a caller-provided stable ID.
    pub fn with_id(
        uuid: ContactId,
        owner_id: OwnerId,
        name: impl Into<String>,
        gender: Gender,
    ) -> Self {
        Self {
            uuid,
            owner_id,
            name: name.into(),
            gender,
            birthdate: None,
            phone: String::new(),
            email: None,
        }
    }

    /// Builder-style birthdate setter used heavily by report callers.
    pub fn born(mut self, birthdate: impl Into<String>) -> Self {
        self.birthdate = Some(birthdate.into());
        self
    }

    /// Parsed birthdate, or `None` when missing or not a canonical date.
    pub fn parsed_birthdate(&self) -> Option<NaiveDate> {
        self.birthdate.as_deref().and_then(parse_birthdate)
    }

    /// Month (1..=12) read positionally from the birthdate text.
    pub fn birth_month(&self) -> Option<u32> {
        self.birthdate.as_deref().and_then(birth_month)
    }

    /// Validates write-path invariants.
    pub fn validate(&self) -> Result<(), ContactValidationError> {
        if self.name.trim().is_empty() {
            return Err(ContactValidationError::EmptyName);
        }

        if let Some(birthdate) = self.birthdate.as_deref() {
            if !birthdate.is_empty() && parse_birthdate(birthdate).is_none() {
                return Err(ContactValidationError::InvalidBirthdate(
                    birthdate.to_string(),
                ));
            }
        }

        if let Some(email) = self.email.as_deref() {
            if !email.contains('@') {
                return Err(ContactValidationError::InvalidEmail(email.to_string()));
            }
        }

        Ok(())
    }
}

/// Parses a canonical `YYYY-MM-DD` birthdate into a calendar date.
///
/// Any other shape (`1990/07/04`, `1990-7-4`, surrounding whitespace) and any
/// impossible date (`1990-02-30`) yields `None`.
pub fn parse_birthdate(value: &str) -> Option<NaiveDate> {
    if !BIRTHDATE_SHAPE_RE.is_match(value) {
        return None;
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()
}

/// Extracts the month segment of a `YYYY-MM-DD` text by position.
///
/// Day and year are not validated beyond their digit shape.
pub fn birth_month(value: &str) -> Option<u32> {
    let captures = BIRTHDATE_SHAPE_RE.captures(value)?;
    let month: u32 = captures.get(1)?.as_str().parse().ok()?;
    (1..=12).contains(&month).then_some(month)
}

/// Formats a date in the canonical birthdate wire format.
pub fn format_birthdate(date: NaiveDate) -> String {
    format!("{:04}-{:02}-{:02}", date.year(), date.month(), date.day())
}

#[cfg(test)]
mod tests {
    use super::{birth_month, parse_birthdate};

    #[test]
    fn month_extraction_is_positional() {
        assert_eq!(birth_month("1990-07-04"), Some(7));
        assert_eq!(birth_month("0000-12-99"), Some(12));
        assert_eq!(birth_month("1990-13-01"), None);
        assert_eq!(birth_month("1990-00-01"), None);
        assert_eq!(birth_month("1990-7-4"), None);
        assert_eq!(birth_month(" 1990-07-04"), None);
    }

    #[test]
    fn full_parse_rejects_impossible_dates() {
        assert!(parse_birthdate("2000-02-29").is_some());
        assert!(parse_birthdate("1999-02-29").is_none());
        assert!(parse_birthdate("1990/07/04").is_none());
        assert!(parse_birthdate("").is_none());
    }
}
