//! Core domain logic for BuddyBook.
//! This crate is the single source of truth for contact storage, birthday
//! reports and animated chart rendering.

pub mod chart;
pub mod db;
pub mod logging;
pub mod model;
pub mod report;
pub mod repo;
pub mod service;

pub use chart::context::{ChartEvent, ChartTarget, CounterValues, RenderContext};
pub use chart::draw::{DrawCommand, Viewport};
pub use chart::style::ChartConfig;
pub use chart::worker::{spawn_snapshot_refresh, AnimationRunner};
pub use chart::{BarChart, ChartRenderer, PieChart};
pub use db::{open_db, open_db_in_memory, DbError, DbResult};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::contact::{Contact, ContactId, ContactValidationError, Gender, OwnerId};
pub use report::histogram::{GenderCounts, MonthlyHistogram};
pub use report::proximity::{ProximityResult, UpcomingBirthday};
pub use repo::contact_repo::{ContactRepository, RepoError, RepoResult, SqliteContactRepository};
pub use service::contact_service::{ContactDraft, ContactService, ContactServiceError};
pub use service::dashboard_service::{AggregationSource, DashboardService, DashboardSnapshot};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
