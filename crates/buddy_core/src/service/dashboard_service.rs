//! Dashboard report use-case.
//!
//! # Responsibility
//! - Load one owner's report snapshot: gender split, month histogram, total
//!   count and the nearest upcoming birthday.
//!
//! # Invariants
//! - Both aggregation sources produce identical snapshots for the same data.
//! - Malformed birthdates never fail a load; only storage errors do.

use crate::model::contact::OwnerId;
use crate::report::histogram::{
    aggregate_gender, aggregate_months, gender_from_store, months_from_store, GenderCounts,
    MonthlyHistogram,
};
use crate::report::proximity::{self, UpcomingBirthday};
use crate::repo::contact_repo::{ContactRepository, RepoResult};
use chrono::NaiveDate;
use log::{error, info};
use serde::Serialize;
use std::time::Instant;

/// Where aggregates are computed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AggregationSource {
    /// Aggregate in memory from one owner listing.
    #[default]
    Contacts,
    /// Delegate to the store's count queries.
    StoreCounts,
}

impl AggregationSource {
    fn as_str(self) -> &'static str {
        match self {
            Self::Contacts => "contacts",
            Self::StoreCounts => "store_counts",
        }
    }
}

/// Everything the report screen shows for one owner on one day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardSnapshot {
    pub owner: OwnerId,
    pub today: NaiveDate,
    pub gender: GenderCounts,
    pub months: MonthlyHistogram,
    pub total_contacts: u32,
    pub upcoming: Option<UpcomingBirthday>,
}

impl DashboardSnapshot {
    /// Snapshot of an owner with no contacts.
    pub fn empty(owner: OwnerId, today: NaiveDate) -> Self {
        Self {
            owner,
            today,
            gender: GenderCounts::default(),
            months: MonthlyHistogram::default(),
            total_contacts: 0,
            upcoming: None,
        }
    }
}

pub struct DashboardService<R: ContactRepository> {
    repo: R,
}

impl<R: ContactRepository> DashboardService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn load_snapshot(
        &self,
        owner: OwnerId,
        today: NaiveDate,
        source: AggregationSource,
    ) -> RepoResult<DashboardSnapshot> {
        let started_at = Instant::now();
        let result = match source {
            AggregationSource::Contacts => self.from_contacts(owner, today),
            AggregationSource::StoreCounts => self.from_store_counts(owner, today),
        };

        match &result {
            Ok(snapshot) => info!(
                "event=dashboard_load module=service status=ok source={} duration_ms={} total={} has_upcoming={}",
                source.as_str(),
                started_at.elapsed().as_millis(),
                snapshot.total_contacts,
                snapshot.upcoming.is_some()
            ),
            Err(err) => error!(
                "event=dashboard_load module=service status=error source={} duration_ms={} error={}",
                source.as_str(),
                started_at.elapsed().as_millis(),
                err
            ),
        }

        result
    }

    fn from_contacts(&self, owner: OwnerId, today: NaiveDate) -> RepoResult<DashboardSnapshot> {
        let contacts = self.repo.list_contacts_for_owner(owner)?;
        Ok(DashboardSnapshot {
            owner,
            today,
            gender: aggregate_gender(&contacts),
            months: aggregate_months(&contacts),
            total_contacts: u32::try_from(contacts.len()).unwrap_or(u32::MAX),
            upcoming: proximity::resolve(today, &contacts).map(|hit| hit.to_upcoming()),
        })
    }

    fn from_store_counts(&self, owner: OwnerId, today: NaiveDate) -> RepoResult<DashboardSnapshot> {
        let with_birthdate = self.repo.list_contacts_with_birthdate(owner)?;
        Ok(DashboardSnapshot {
            owner,
            today,
            gender: gender_from_store(&self.repo, owner)?,
            months: months_from_store(&self.repo, owner)?,
            total_contacts: self.repo.count_for_owner(owner)?,
            upcoming: proximity::resolve(today, &with_birthdate).map(|hit| hit.to_upcoming()),
        })
    }
}
