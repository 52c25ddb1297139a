use parcel_core::db::open_db_in_memory;
use parcel_core::{Parcel, ParcelRepository, ParcelStatus, SqliteParcelStore};
use proptest::prelude::*;
use std::collections::{HashMap, HashSet};

fn status_strategy() -> impl Strategy<Value = ParcelStatus> {
    prop_oneof![
        Just(ParcelStatus::Registered),
        Just(ParcelStatus::Sent),
        Just(ParcelStatus::Delivered),
        "[a-z ]{1,12}".prop_map(|text: String| ParcelStatus::from(text)),
    ]
}

fn parcel_strategy() -> impl Strategy<Value = Parcel> {
    (0i64..4, status_strategy(), "[a-zA-Z0-9 .,]{0,24}", "[0-9T:-]{1,20}").prop_map(
        |(client, status, address, created_at)| Parcel {
            number: 0,
            client,
            status,
            address,
            created_at,
        },
    )
}

proptest! {
    #[test]
    fn get_returns_what_add_stored(parcel in parcel_strategy()) {
        let conn = open_db_in_memory().unwrap();
        let store = SqliteParcelStore::new(&conn);

        let number = store.add(&parcel).unwrap();
        let loaded = store.get(number).unwrap();

        prop_assert_eq!(loaded, Parcel { number, ..parcel });
    }

    #[test]
    fn get_by_client_partitions_all_parcels(parcels in prop::collection::vec(parcel_strategy(), 0..16)) {
        let conn = open_db_in_memory().unwrap();
        let store = SqliteParcelStore::new(&conn);

        let mut expected: HashMap<i64, HashSet<i64>> = HashMap::new();
        for parcel in &parcels {
            let number = store.add(parcel).unwrap();
            expected.entry(parcel.client).or_default().insert(number);
        }

        for client in 0..4 {
            let actual: HashSet<i64> = store
                .get_by_client(client)
                .unwrap()
                .into_iter()
                .map(|parcel| parcel.number)
                .collect();
            prop_assert_eq!(actual, expected.remove(&client).unwrap_or_default());
        }
    }

    #[test]
    fn guarded_writes_apply_iff_registered(parcel in parcel_strategy(), address in "[a-zA-Z0-9 .,]{0,24}") {
        let conn = open_db_in_memory().unwrap();
        let store = SqliteParcelStore::new(&conn);
        let number = store.add(&parcel).unwrap();
        let registered = parcel.status.is_registered();

        store.set_address(number, &address).unwrap();
        let after_update = store.get(number).unwrap();
        let expected_address = if registered { &address } else { &parcel.address };
        prop_assert_eq!(&after_update.address, expected_address);

        store.delete(number).unwrap();
        prop_assert_eq!(store.get(number).is_err(), registered);
    }
}
