//! Domain model for buddy records.
//!
//! # Responsibility
//! - Define the canonical contact shape consumed by storage, reports and charts.
//!
//! # Invariants
//! - Every contact is identified by a stable `ContactId`.
//! - Every contact belongs to exactly one `OwnerId`.

pub mod contact;
