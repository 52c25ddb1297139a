//! Parcel tracking command line front end.
//!
//! # Responsibility
//! - Parse flags/env into a database location and logging setup.
//! - Route subcommands to `ParcelService` and print JSON results.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use parcel_core::db::{open_db, open_db_in_memory};
use parcel_core::{
    current_timestamp, default_log_level, init_logging, ClientId, Parcel, ParcelNumber,
    ParcelRepository, ParcelService, ParcelStatus, SqliteParcelStore,
};
use serde_json::{json, Value};

const IN_MEMORY_DB: &str = ":memory:";

#[derive(Debug, Parser)]
#[command(name = "parcel", version, about = "Track parcels stored in SQLite")]
struct Cli {
    /// SQLite database file (`:memory:` for a throwaway database).
    #[arg(long, env = "PARCEL_DB", default_value = "parcel.db")]
    db: String,

    /// Log level: trace|debug|info|warn|error.
    #[arg(long, env = "PARCEL_LOG_LEVEL")]
    log_level: Option<String>,

    /// Absolute directory for rolling log files. Logging is off when unset.
    #[arg(long, env = "PARCEL_LOG_DIR")]
    log_dir: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Store a new parcel and print it with its assigned number.
    Add {
        #[arg(long)]
        client: ClientId,
        #[arg(long)]
        address: String,
        /// Initial status; defaults to `registered`.
        #[arg(long)]
        status: Option<String>,
        /// Creation timestamp; defaults to the current UTC time.
        #[arg(long)]
        created_at: Option<String>,
    },
    /// Print one parcel.
    Get { number: ParcelNumber },
    /// Print all parcels of a client.
    List {
        #[arg(long)]
        client: ClientId,
    },
    /// Overwrite the status of a parcel.
    SetStatus { number: ParcelNumber, status: String },
    /// Advance a parcel along registered -> sent -> delivered.
    NextStatus { number: ParcelNumber },
    /// Change the address of a registered parcel.
    SetAddress {
        number: ParcelNumber,
        address: String,
    },
    /// Delete a registered parcel.
    Delete { number: ParcelNumber },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(log_dir) = cli.log_dir.as_deref() {
        let level = cli.log_level.as_deref().unwrap_or_else(|| default_log_level());
        init_logging(level, log_dir).map_err(anyhow::Error::msg)?;
    }

    let conn = if cli.db == IN_MEMORY_DB {
        open_db_in_memory()
    } else {
        open_db(&cli.db)
    }
    .with_context(|| format!("failed to open parcel database `{}`", cli.db))?;

    let store = SqliteParcelStore::try_new(&conn)?;
    let service = ParcelService::new(store);

    let output = execute(&service, cli.command)?;
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

/// Runs one subcommand and returns its JSON output.
fn execute<R: ParcelRepository>(service: &ParcelService<R>, command: Command) -> Result<Value> {
    let output = match command {
        Command::Add {
            client,
            address,
            status,
            created_at,
        } => {
            let created_at = created_at.unwrap_or_else(current_timestamp);
            let mut parcel = Parcel::new(client, address, created_at);
            if let Some(status) = status {
                parcel.status = ParcelStatus::from(status);
            }
            serde_json::to_value(service.add(parcel)?)?
        }
        Command::Get { number } => serde_json::to_value(service.parcel(number)?)?,
        Command::List { client } => serde_json::to_value(service.client_parcels(client)?)?,
        Command::SetStatus { number, status } => {
            serde_json::to_value(service.set_status(number, &ParcelStatus::from(status))?)?
        }
        Command::NextStatus { number } => {
            let status = service.next_status(number)?;
            json!({ "number": number, "status": status })
        }
        Command::SetAddress { number, address } => {
            serde_json::to_value(service.change_address(number, &address)?)?
        }
        Command::Delete { number } => serde_json::to_value(service.remove(number)?)?,
    };

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::{execute, Cli};
    use clap::Parser;
    use parcel_core::db::open_db_in_memory;
    use parcel_core::{ParcelService, SqliteParcelStore};
    use rusqlite::Connection;
    use serde_json::{json, Value};

    fn run(conn: &Connection, args: &[&str]) -> Value {
        let cli = Cli::try_parse_from(std::iter::once("parcel").chain(args.iter().copied()))
            .unwrap();
        let service = ParcelService::new(SqliteParcelStore::try_new(conn).unwrap());
        execute(&service, cli.command).unwrap()
    }

    #[test]
    fn subcommands_print_expected_json() {
        let conn = open_db_in_memory().unwrap();

        let added = run(
            &conn,
            &["add", "--client", "7", "--address", "A", "--created-at", "t0"],
        );
        assert_eq!(
            added,
            json!({
                "number": 1,
                "client": 7,
                "status": "registered",
                "address": "A",
                "created_at": "t0"
            })
        );
        assert_eq!(run(&conn, &["get", "1"]), added);

        assert_eq!(
            run(&conn, &["set-address", "1", "B"]),
            json!({ "outcome": "applied" })
        );
        assert_eq!(
            run(&conn, &["next-status", "1"]),
            json!({ "number": 1, "status": "sent" })
        );
        assert_eq!(
            run(&conn, &["delete", "1"]),
            json!({ "outcome": "ineligible", "status": "sent" })
        );
        assert_eq!(
            run(&conn, &["set-status", "9", "lost"]),
            json!({ "outcome": "not_found" })
        );

        let listed = run(&conn, &["list", "--client", "7"]);
        assert_eq!(listed.as_array().unwrap().len(), 1);
        assert_eq!(listed[0]["address"], "B");
    }

    #[test]
    fn add_accepts_explicit_status() {
        let conn = open_db_in_memory().unwrap();

        let added = run(
            &conn,
            &["add", "--client", "1", "--address", "A", "--status", "sent"],
        );
        assert_eq!(added["status"], "sent");
        assert!(!added["created_at"].as_str().unwrap().is_empty());
    }
}
