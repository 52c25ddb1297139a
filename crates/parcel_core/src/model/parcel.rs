//! Parcel domain model.
//!
//! # Responsibility
//! - Define the `Parcel` record persisted in the `parcel` table.
//! - Map lifecycle states to and from their stored lowercase text.
//!
//! # Invariants
//! - `number` is assigned by the store and never changes afterwards.
//! - `address` is mutable only while `status == ParcelStatus::Registered`.
//! - Unknown status text is preserved verbatim through `ParcelStatus::Other`.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::hash::{Hash, Hasher};

/// Store-assigned parcel identifier (auto-increment primary key).
pub type ParcelNumber = i64;

/// Identifier of the client owning a parcel.
pub type ClientId = i64;

/// Stored text of the only status that permits address changes and deletion.
pub const STATUS_REGISTERED: &str = "registered";
const STATUS_SENT: &str = "sent";
const STATUS_DELIVERED: &str = "delivered";

/// Parcel lifecycle state.
///
/// The store applies no transition rules; it only special-cases
/// `Registered`. Any other text written by callers round-trips through
/// `Other` unchanged.
///
/// Equality, hashing and every predicate go through the stored text, so
/// `Other("registered")` behaves exactly like `Registered`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ParcelStatus {
    /// Accepted but not yet handed to a carrier.
    Registered,
    /// In transit.
    Sent,
    /// Handed to the recipient.
    Delivered,
    /// Any status text outside the known vocabulary.
    Other(String),
}

impl ParcelStatus {
    /// Returns the exact text stored in `parcel.status`.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Registered => STATUS_REGISTERED,
            Self::Sent => STATUS_SENT,
            Self::Delivered => STATUS_DELIVERED,
            Self::Other(value) => value.as_str(),
        }
    }

    /// Whether address changes and deletion are allowed in this state.
    pub fn is_registered(&self) -> bool {
        self.as_str() == STATUS_REGISTERED
    }

    /// Next state in the `registered -> sent -> delivered` chain.
    ///
    /// Returns `None` for `Delivered` and for unknown states.
    pub fn next(&self) -> Option<Self> {
        match self.as_str() {
            STATUS_REGISTERED => Some(Self::Sent),
            STATUS_SENT => Some(Self::Delivered),
            _ => None,
        }
    }
}

impl PartialEq for ParcelStatus {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl Eq for ParcelStatus {}

impl Hash for ParcelStatus {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_str().hash(state);
    }
}

impl From<&str> for ParcelStatus {
    fn from(value: &str) -> Self {
        match value {
            STATUS_REGISTERED => Self::Registered,
            STATUS_SENT => Self::Sent,
            STATUS_DELIVERED => Self::Delivered,
            other => Self::Other(other.to_string()),
        }
    }
}

impl From<String> for ParcelStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            STATUS_REGISTERED | STATUS_SENT | STATUS_DELIVERED => Self::from(value.as_str()),
            _ => Self::Other(value),
        }
    }
}

impl From<ParcelStatus> for String {
    fn from(value: ParcelStatus) -> Self {
        match value {
            ParcelStatus::Other(text) => text,
            known => known.as_str().to_string(),
        }
    }
}

impl Display for ParcelStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Shipment record persisted as one row of the `parcel` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parcel {
    /// Store-assigned number. Ignored on insert.
    pub number: ParcelNumber,
    pub client: ClientId,
    pub status: ParcelStatus,
    /// Free-form delivery address.
    pub address: String,
    /// Creation time supplied by the caller; stored as-is.
    pub created_at: String,
}

impl Parcel {
    /// Creates an unsaved parcel in `Registered` state.
    ///
    /// `number` stays `0` until the store assigns one.
    pub fn new(
        client: ClientId,
        address: impl Into<String>,
        created_at: impl Into<String>,
    ) -> Self {
        Self {
            number: 0,
            client,
            status: ParcelStatus::Registered,
            address: address.into(),
            created_at: created_at.into(),
        }
    }

    /// Whether this parcel's address may still be changed or the parcel removed.
    pub fn is_mutable(&self) -> bool {
        self.status.is_registered()
    }
}
