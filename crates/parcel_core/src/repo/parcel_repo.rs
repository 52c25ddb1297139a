//! Parcel repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Map parcel CRUD operations onto statements against the `parcel` table.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - `number` is generated by SQLite on insert and never written afterwards.
//! - Address updates and deletes match only rows whose status is
//!   `registered`; the guard lives in the same statement as the write.
//! - Multi-row reads impose no ordering.

use crate::db::schema::{table_columns, table_exists, PARCEL_COLUMNS, PARCEL_TABLE};
use crate::db::DbError;
use crate::model::parcel::{ClientId, Parcel, ParcelNumber, ParcelStatus, STATUS_REGISTERED};
use log::debug;
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

const PARCEL_SELECT_SQL: &str = "SELECT
    number,
    client,
    status,
    address,
    created_at
FROM parcel";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for parcel persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    NotFound(ParcelNumber),
    InvalidData(String),
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(number) => write!(f, "parcel not found: {number}"),
            Self::InvalidData(message) => write!(f, "invalid persisted parcel data: {message}"),
            Self::MissingRequiredTable(table) => {
                write!(f, "required table `{table}` is missing")
            }
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "required column `{table}.{column}` is missing")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::NotFound(_) => None,
            Self::InvalidData(_) => None,
            Self::MissingRequiredTable(_) => None,
            Self::MissingRequiredColumn { .. } => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// What a mutation did to the targeted row.
///
/// Mutations succeed whether or not a row changed; this value lets callers
/// tell a missing parcel from one that is no longer `registered`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum WriteOutcome {
    /// The row was updated or deleted.
    Applied,
    /// No parcel with that number exists.
    NotFound,
    /// The parcel exists but its status blocks the change.
    Ineligible { status: ParcelStatus },
}

impl WriteOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied)
    }
}

/// Repository interface for parcel CRUD operations.
pub trait ParcelRepository {
    /// Inserts a parcel and returns the number SQLite assigned to it.
    ///
    /// `parcel.number` is ignored.
    fn add(&self, parcel: &Parcel) -> RepoResult<ParcelNumber>;
    /// Loads one parcel, failing with `RepoError::NotFound` when absent.
    fn get(&self, number: ParcelNumber) -> RepoResult<Parcel>;
    /// Loads all parcels of one client in unspecified order.
    fn get_by_client(&self, client: ClientId) -> RepoResult<Vec<Parcel>>;
    /// Overwrites the status without any transition check.
    fn set_status(&self, number: ParcelNumber, status: &ParcelStatus) -> RepoResult<WriteOutcome>;
    /// Overwrites the address when the parcel is still `registered`.
    fn set_address(&self, number: ParcelNumber, address: &str) -> RepoResult<WriteOutcome>;
    /// Deletes the parcel when it is still `registered`.
    fn delete(&self, number: ParcelNumber) -> RepoResult<WriteOutcome>;
}

/// SQLite-backed parcel store over a caller-owned connection.
pub struct SqliteParcelStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteParcelStore<'conn> {
    /// Wraps a connection without checking its schema.
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    /// Wraps a connection after checking that the `parcel` table and every
    /// column the store uses are present.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self::new(conn))
    }

    fn classify_guarded_write(
        &self,
        event: &'static str,
        number: ParcelNumber,
        changed: usize,
    ) -> RepoResult<WriteOutcome> {
        if changed > 0 {
            return Ok(WriteOutcome::Applied);
        }

        let outcome = match self.current_status(number)? {
            None => WriteOutcome::NotFound,
            Some(status) => WriteOutcome::Ineligible { status },
        };
        debug!(
            "event={} module=repo status=skipped number={} reason={}",
            event,
            number,
            match &outcome {
                WriteOutcome::Ineligible { .. } => "not_registered",
                _ => "not_found",
            }
        );
        Ok(outcome)
    }

    fn current_status(&self, number: ParcelNumber) -> RepoResult<Option<ParcelStatus>> {
        let status = self
            .conn
            .query_row(
                "SELECT status FROM parcel WHERE number = ?1;",
                [number],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(status.map(ParcelStatus::from))
    }
}

impl ParcelRepository for SqliteParcelStore<'_> {
    fn add(&self, parcel: &Parcel) -> RepoResult<ParcelNumber> {
        self.conn.execute(
            "INSERT INTO parcel (
                client,
                status,
                address,
                created_at
            ) VALUES (?1, ?2, ?3, ?4);",
            params![
                parcel.client,
                parcel.status.as_str(),
                parcel.address.as_str(),
                parcel.created_at.as_str(),
            ],
        )?;

        Ok(self.conn.last_insert_rowid())
    }

    fn get(&self, number: ParcelNumber) -> RepoResult<Parcel> {
        let result = self.conn.query_row(
            &format!("{PARCEL_SELECT_SQL} WHERE number = ?1;"),
            [number],
            parse_parcel_row,
        );

        match result {
            Ok(parcel) => Ok(parcel),
            Err(rusqlite::Error::QueryReturnedNoRows) => Err(RepoError::NotFound(number)),
            Err(err) => Err(decode_error(err)),
        }
    }

    fn get_by_client(&self, client: ClientId) -> RepoResult<Vec<Parcel>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{PARCEL_SELECT_SQL} WHERE client = ?1;"))?;
        let mut rows = stmt.query([client])?;
        let mut parcels = Vec::new();

        while let Some(row) = rows.next()? {
            parcels.push(parse_parcel_row(row).map_err(decode_error)?);
        }

        Ok(parcels)
    }

    fn set_status(&self, number: ParcelNumber, status: &ParcelStatus) -> RepoResult<WriteOutcome> {
        let changed = self.conn.execute(
            "UPDATE parcel SET status = ?1 WHERE number = ?2;",
            params![status.as_str(), number],
        )?;

        if changed == 0 {
            debug!("event=set_status module=repo status=skipped number={number} reason=not_found");
            return Ok(WriteOutcome::NotFound);
        }

        Ok(WriteOutcome::Applied)
    }

    fn set_address(&self, number: ParcelNumber, address: &str) -> RepoResult<WriteOutcome> {
        let changed = self.conn.execute(
            "UPDATE parcel
             SET address = ?1
             WHERE number = ?2
               AND status = ?3;",
            params![address, number, STATUS_REGISTERED],
        )?;

        self.classify_guarded_write("set_address", number, changed)
    }

    fn delete(&self, number: ParcelNumber) -> RepoResult<WriteOutcome> {
        let changed = self.conn.execute(
            "DELETE FROM parcel
             WHERE number = ?1
               AND status = ?2;",
            params![number, STATUS_REGISTERED],
        )?;

        self.classify_guarded_write("delete", number, changed)
    }
}

fn ensure_connection_ready(conn: &Connection) -> RepoResult<()> {
    if !table_exists(conn, PARCEL_TABLE)? {
        return Err(RepoError::MissingRequiredTable(PARCEL_TABLE));
    }

    let present = table_columns(conn, PARCEL_TABLE)?;
    for &column in PARCEL_COLUMNS {
        if !present.iter().any(|name| name == column) {
            return Err(RepoError::MissingRequiredColumn {
                table: PARCEL_TABLE,
                column,
            });
        }
    }

    Ok(())
}

/// Separates rows that exist but cannot be read as a `Parcel` from
/// transport failures.
fn decode_error(err: rusqlite::Error) -> RepoError {
    match err {
        rusqlite::Error::FromSqlConversionFailure(..) | rusqlite::Error::InvalidColumnType(..) => {
            RepoError::InvalidData(err.to_string())
        }
        other => other.into(),
    }
}

fn parse_parcel_row(row: &Row<'_>) -> rusqlite::Result<Parcel> {
    Ok(Parcel {
        number: row.get("number")?,
        client: row.get("client")?,
        status: ParcelStatus::from(row.get::<_, String>("status")?),
        address: row.get("address")?,
        created_at: row.get("created_at")?,
    })
}
