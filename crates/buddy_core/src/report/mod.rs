//! Pure report computations over a contact collection.
//!
//! # Responsibility
//! - Resolve the nearest upcoming birthday.
//! - Aggregate gender and birth-month histograms.
//!
//! # Invariants
//! - Nothing here performs I/O except the explicit `*_from_store` helpers.
//! - Malformed birthdates are excluded locally and never surface as errors.

pub mod histogram;
pub mod proximity;
