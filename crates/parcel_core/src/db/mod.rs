//! SQLite connection bootstrap for parcel storage callers.
//!
//! # Responsibility
//! - Open and configure SQLite connections for the CLI and tests.
//! - Create the `parcel` table when it does not exist yet.
//!
//! # Invariants
//! - `ParcelStore` never opens connections or creates schema itself; it only
//!   receives connections prepared here (or by any other caller).
//! - Schema bootstrap is idempotent and never alters an existing table.

use std::error::Error;
use std::fmt::{Display, Formatter};

mod open;
pub mod schema;

pub use open::{open_db, open_db_in_memory};
pub use schema::ensure_schema;

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
