use chrono::DateTime;
use parcel_core::db::open_db_in_memory;
use parcel_core::{ParcelService, ParcelStatus, RepoError, SqliteParcelStore, WriteOutcome};

#[test]
fn register_stores_registered_parcel_with_timestamp() {
    let conn = open_db_in_memory().unwrap();
    let service = ParcelService::new(SqliteParcelStore::try_new(&conn).unwrap());

    let parcel = service.register(1000, "Lenin sq. 1").unwrap();
    assert!(parcel.number > 0);
    assert_eq!(parcel.status, ParcelStatus::Registered);
    DateTime::parse_from_rfc3339(&parcel.created_at).unwrap();

    assert_eq!(service.parcel(parcel.number).unwrap(), parcel);
}

#[test]
fn next_status_walks_lifecycle_and_stops_at_delivered() {
    let conn = open_db_in_memory().unwrap();
    let service = ParcelService::new(SqliteParcelStore::new(&conn));
    let number = service.register(1, "A").unwrap().number;

    assert_eq!(service.next_status(number).unwrap(), Some(ParcelStatus::Sent));
    assert_eq!(
        service.next_status(number).unwrap(),
        Some(ParcelStatus::Delivered)
    );
    assert_eq!(service.next_status(number).unwrap(), None);
    assert_eq!(
        service.parcel(number).unwrap().status,
        ParcelStatus::Delivered
    );
}

#[test]
fn next_status_on_missing_parcel_is_not_found() {
    let conn = open_db_in_memory().unwrap();
    let service = ParcelService::new(SqliteParcelStore::new(&conn));

    assert!(matches!(
        service.next_status(3),
        Err(RepoError::NotFound(3))
    ));
}

#[test]
fn change_address_and_remove_respect_status_guard() {
    let conn = open_db_in_memory().unwrap();
    let service = ParcelService::new(SqliteParcelStore::new(&conn));
    let number = service.register(1, "A").unwrap().number;

    assert!(service.change_address(number, "B").unwrap().is_applied());
    service.next_status(number).unwrap();

    assert_eq!(
        service.change_address(number, "C").unwrap(),
        WriteOutcome::Ineligible {
            status: ParcelStatus::Sent
        }
    );
    assert!(!service.remove(number).unwrap().is_applied());
    assert_eq!(service.parcel(number).unwrap().address, "B");
}

#[test]
fn client_parcels_are_sorted_by_number() {
    let conn = open_db_in_memory().unwrap();
    let service = ParcelService::new(SqliteParcelStore::new(&conn));

    let first = service.register(5, "A").unwrap().number;
    service.register(6, "B").unwrap();
    let second = service.register(5, "C").unwrap().number;

    let numbers: Vec<_> = service
        .client_parcels(5)
        .unwrap()
        .into_iter()
        .map(|parcel| parcel.number)
        .collect();
    assert_eq!(numbers, vec![first, second]);
}
