//! Gender and birth-month aggregation.
//!
//! # Responsibility
//! - Bucket a contact collection into the two chart-facing aggregates.
//! - Offer the same aggregates computed from pre-aggregated store counts.
//!
//! # Invariants
//! - Aggregation is pure: identical input yields identical output, and input
//!   order never changes the result.
//! - `Other` gender contributes to no gender bucket.
//! - Missing or malformed birthdates contribute to no month bucket, so the
//!   month sum never exceeds the number of contacts with a known birthdate.

use crate::model::contact::{Contact, Gender, OwnerId};
use crate::repo::contact_repo::{ContactRepository, RepoResult};
use serde::{Deserialize, Serialize};

pub const MONTHS_PER_YEAR: usize = 12;

/// Three-letter month labels, January first.
pub const MONTH_ABBREVIATIONS: [&str; MONTHS_PER_YEAR] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Male/female split charted by the donut.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenderCounts {
    pub male: u32,
    pub female: u32,
}

impl GenderCounts {
    pub fn new(male: u32, female: u32) -> Self {
        Self { male, female }
    }

    pub fn total(&self) -> u32 {
        self.male + self.female
    }
}

/// Birthday counts per month; index 0 is January.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyHistogram {
    buckets: [u32; MONTHS_PER_YEAR],
}

impl MonthlyHistogram {
    pub fn from_buckets(buckets: [u32; MONTHS_PER_YEAR]) -> Self {
        Self { buckets }
    }

    /// Builds a histogram from an arbitrary slice; anything but 12 values is
    /// rejected.
    pub fn try_from_slice(values: &[u32]) -> Option<Self> {
        let buckets: [u32; MONTHS_PER_YEAR] = values.try_into().ok()?;
        Some(Self { buckets })
    }

    pub fn buckets(&self) -> &[u32; MONTHS_PER_YEAR] {
        &self.buckets
    }

    /// Count for `month` in 1..=12.
    pub fn month(&self, month: u32) -> Option<u32> {
        let index = usize::try_from(month).ok()?.checked_sub(1)?;
        self.buckets.get(index).copied()
    }

    pub fn total(&self) -> u32 {
        self.buckets.iter().sum()
    }

    /// Largest bucket, floored at 1 so normalization never divides by zero.
    pub fn normalization_max(&self) -> u32 {
        self.buckets.iter().copied().max().unwrap_or(0).max(1)
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.iter().all(|&count| count == 0)
    }
}

/// Counts male and female contacts in one pass.
pub fn aggregate_gender(contacts: &[Contact]) -> GenderCounts {
    contacts
        .iter()
        .fold(GenderCounts::default(), |mut counts, contact| {
            match contact.gender {
                Gender::Male => counts.male += 1,
                Gender::Female => counts.female += 1,
                Gender::Other => {}
            }
            counts
        })
}

/// Buckets contacts by the positional month segment of their birthdate.
pub fn aggregate_months(contacts: &[Contact]) -> MonthlyHistogram {
    let mut buckets = [0_u32; MONTHS_PER_YEAR];
    for month in contacts.iter().filter_map(Contact::birth_month) {
        // birth_month guarantees 1..=12.
        buckets[(month - 1) as usize] += 1;
    }
    MonthlyHistogram { buckets }
}

/// Gender split delegated to the store's count queries.
pub fn gender_from_store<R: ContactRepository>(
    repo: &R,
    owner: OwnerId,
) -> RepoResult<GenderCounts> {
    Ok(GenderCounts {
        male: repo.count_by_gender(owner, Gender::Male)?,
        female: repo.count_by_gender(owner, Gender::Female)?,
    })
}

/// Month histogram delegated to the store's count queries.
pub fn months_from_store<R: ContactRepository>(
    repo: &R,
    owner: OwnerId,
) -> RepoResult<MonthlyHistogram> {
    let mut buckets = [0_u32; MONTHS_PER_YEAR];
    for (index, bucket) in buckets.iter_mut().enumerate() {
        *bucket = repo.count_by_month(owner, index as u32 + 1)?;
    }
    Ok(MonthlyHistogram { buckets })
}

#[cfg(test)]
mod tests {
    use super::MonthlyHistogram;

    #[test]
    fn normalization_max_is_floored_at_one() {
        assert_eq!(MonthlyHistogram::default().normalization_max(), 1);
        let hist = MonthlyHistogram::from_buckets([2, 0, 5, 0, 0, 0, 0, 0, 0, 0, 0, 1]);
        assert_eq!(hist.normalization_max(), 5);
    }

    #[test]
    fn month_lookup_is_one_based() {
        let hist = MonthlyHistogram::from_buckets([2, 0, 5, 0, 0, 0, 0, 0, 0, 0, 0, 1]);
        assert_eq!(hist.month(1), Some(2));
        assert_eq!(hist.month(12), Some(1));
        assert_eq!(hist.month(0), None);
        assert_eq!(hist.month(13), None);
    }

    #[test]
    fn try_from_slice_requires_twelve_values() {
        assert!(MonthlyHistogram::try_from_slice(&[1, 2, 3]).is_none());
        assert!(MonthlyHistogram::try_from_slice(&[0; 12]).is_some());
    }
}
