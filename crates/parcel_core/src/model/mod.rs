//! Domain model for parcel tracking.
//!
//! # Responsibility
//! - Define the canonical parcel record shared by store, service and CLI.
//! - Own the status vocabulary so guards never compare against loose text.
//!
//! # Invariants
//! - A parcel is identified by its store-assigned `ParcelNumber`.
//! - Deletion is a hard delete; there are no tombstones.

pub mod parcel;
