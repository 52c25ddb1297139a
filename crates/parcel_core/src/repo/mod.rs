//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the data access contract for parcel records.
//! - Isolate SQLite query details from service/CLI orchestration.
//!
//! # Invariants
//! - Driver errors are passed through unchanged inside `RepoError::Db`.
//! - Guarded mutations report ineligibility as a value, never as an error.

pub mod parcel_repo;
