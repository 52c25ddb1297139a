//! Parcel use-case service.
//!
//! # Responsibility
//! - Register parcels with a server-side creation timestamp.
//! - Drive the `registered -> sent -> delivered` lifecycle.
//! - Delegate persistence to repository implementations.
//!
//! # Invariants
//! - Service APIs never bypass the repository's status guards.
//! - Service layer remains storage-agnostic.

use crate::model::parcel::{ClientId, Parcel, ParcelNumber, ParcelStatus};
use crate::repo::parcel_repo::{ParcelRepository, RepoResult, WriteOutcome};
use chrono::{SecondsFormat, Utc};
use log::info;

/// Current UTC time in the RFC 3339 form used for `Parcel::created_at`.
pub fn current_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Use-case service wrapper for parcel operations.
pub struct ParcelService<R: ParcelRepository> {
    repo: R,
}

impl<R: ParcelRepository> ParcelService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Registers a new parcel for `client` and returns the stored record.
    ///
    /// # Contract
    /// - Status starts as `ParcelStatus::Registered`.
    /// - `created_at` is the current UTC time in RFC 3339 form.
    pub fn register(&self, client: ClientId, address: impl Into<String>) -> RepoResult<Parcel> {
        self.add(Parcel::new(client, address, current_timestamp()))
    }

    /// Stores a caller-built parcel and returns it with its assigned number.
    pub fn add(&self, mut parcel: Parcel) -> RepoResult<Parcel> {
        parcel.number = self.repo.add(&parcel)?;
        info!(
            "event=parcel_add module=service status=ok number={} client={}",
            parcel.number, parcel.client
        );
        Ok(parcel)
    }

    /// Gets one parcel by number.
    pub fn parcel(&self, number: ParcelNumber) -> RepoResult<Parcel> {
        self.repo.get(number)
    }

    /// Lists all parcels of a client, sorted by number.
    pub fn client_parcels(&self, client: ClientId) -> RepoResult<Vec<Parcel>> {
        let mut parcels = self.repo.get_by_client(client)?;
        parcels.sort_by_key(|parcel| parcel.number);
        Ok(parcels)
    }

    /// Advances a parcel one step along its lifecycle.
    ///
    /// Returns the new status, or `None` when the parcel is already in a
    /// terminal or unknown state, or vanished before the write, and was
    /// left unchanged.
    pub fn next_status(&self, number: ParcelNumber) -> RepoResult<Option<ParcelStatus>> {
        let parcel = self.repo.get(number)?;
        let Some(next) = parcel.status.next() else {
            return Ok(None);
        };

        if !self.repo.set_status(number, &next)?.is_applied() {
            return Ok(None);
        }
        info!(
            "event=parcel_status module=service status=ok number={} from={} to={}",
            number, parcel.status, next
        );
        Ok(Some(next))
    }

    /// Writes an arbitrary status without transition checks.
    pub fn set_status(
        &self,
        number: ParcelNumber,
        status: &ParcelStatus,
    ) -> RepoResult<WriteOutcome> {
        self.repo.set_status(number, status)
    }

    /// Changes the delivery address of a still-registered parcel.
    pub fn change_address(&self, number: ParcelNumber, address: &str) -> RepoResult<WriteOutcome> {
        self.repo.set_address(number, address)
    }

    /// Removes a still-registered parcel.
    pub fn remove(&self, number: ParcelNumber) -> RepoResult<WriteOutcome> {
        let outcome = self.repo.delete(number)?;
        if outcome.is_applied() {
            info!("event=parcel_delete module=service status=ok number={number}");
        }
        Ok(outcome)
    }
}
