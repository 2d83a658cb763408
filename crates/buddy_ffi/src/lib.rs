//! Flutter bridge for BuddyBook core.

pub mod api;
