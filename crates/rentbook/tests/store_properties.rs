//! Store behaviour checked against both storage media.

use chrono::NaiveDate;

use rentbook::model::{
    Apartment, ApartmentPatch, Category, DocumentFile, DocumentType, PaymentFrequency, Tenant,
    TenantPatch, Transaction, TransactionPatch, TransactionType,
};
use rentbook::storage::{MemoryMedium, SqliteMedium, StorageMedium, Store};
use rentbook::{Error, RecordId};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn apartment(name: &str) -> Apartment {
    Apartment {
        name: name.to_string(),
        address: format!("{name} Lane 4"),
        size: 55.0,
        rooms: 2,
        floor: 3,
        notes: "corner unit".to_string(),
    }
}

fn tenant(name: &str, apartment_id: Option<RecordId>) -> Tenant {
    Tenant {
        name: name.to_string(),
        email: format!("{}@example.com", name.to_lowercase()),
        phone: "+49 30 1234".to_string(),
        apartment_id,
        rent_amount: 850.0,
        payment_frequency: PaymentFrequency::Monthly,
        move_in_date: date(2023, 9, 1),
    }
}

fn transaction(amount: f64) -> Transaction {
    Transaction {
        kind: TransactionType::Expense,
        category: Category::Maintenance,
        amount,
        date: date(2024, 2, 10),
        apartment_id: None,
        description: "boiler".to_string(),
        is_recurring: false,
        is_paid: true,
    }
}

/// Runs `check` once over an in-memory medium and once over `SQLite`.
fn for_each_medium(check: impl Fn(&Store<Box<dyn StorageMedium>>)) {
    let memory: Box<dyn StorageMedium> = Box::new(MemoryMedium::new());
    check(&Store::new(memory));

    let sqlite: Box<dyn StorageMedium> = Box::new(SqliteMedium::open_in_memory().unwrap());
    check(&Store::new(sqlite));
}

#[test]
fn fresh_store_reads_empty_collections() {
    for_each_medium(|store| {
        assert!(store.apartments().get_all().unwrap().is_empty());
        assert!(store.tenants().get_all().unwrap().is_empty());
        assert!(store.transactions().get_all().unwrap().is_empty());
        assert!(store.documents().get_all().unwrap().is_empty());
    });
}

#[test]
fn add_returns_the_record_with_a_fresh_id() {
    for_each_medium(|store| {
        let fields = apartment("Elm");
        let added = store.apartments().add(fields.clone()).unwrap();

        assert!(!added.id.as_str().is_empty());
        assert_eq!(added.fields, fields);
        assert_eq!(store.apartments().get_all().unwrap(), vec![added]);
    });
}

#[test]
fn ids_are_unique_within_a_collection() {
    for_each_medium(|store| {
        let mut ids: Vec<RecordId> = (0..50)
            .map(|i| store.transactions().add(transaction(f64::from(i) + 1.0)).unwrap().id)
            .collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 50);
    });
}

#[test]
fn update_changes_only_the_patched_fields() {
    for_each_medium(|store| {
        let apartments = store.apartments();
        let added = apartments.add(apartment("Oak")).unwrap();
        let other = apartments.add(apartment("Ash")).unwrap();

        let patch = ApartmentPatch {
            size: Some(61.5),
            notes: Some(String::new()),
            ..ApartmentPatch::default()
        };
        assert!(apartments.update(added.id.as_str(), &patch).unwrap());

        let stored = apartments.get(added.id.as_str()).unwrap().unwrap();
        assert!((stored.size - 61.5).abs() < f64::EPSILON);
        assert_eq!(stored.notes, "");
        assert_eq!(stored.name, added.name);
        assert_eq!(stored.address, added.address);
        assert_eq!(stored.rooms, added.rooms);
        assert_eq!(stored.floor, added.floor);

        assert_eq!(apartments.get(other.id.as_str()).unwrap(), Some(other));
    });
}

#[test]
fn update_can_clear_an_apartment_reference() {
    for_each_medium(|store| {
        let home = store.apartments().add(apartment("Pine")).unwrap();
        let added = store
            .tenants()
            .add(tenant("Mia", Some(home.id.clone())))
            .unwrap();

        let patch = TenantPatch {
            apartment_id: Some(None),
            ..TenantPatch::default()
        };
        store.tenants().update(added.id.as_str(), &patch).unwrap();

        let stored = store.tenants().get(added.id.as_str()).unwrap().unwrap();
        assert_eq!(stored.apartment_id, None);
        assert_eq!(stored.name, "Mia");
    });
}

#[test]
fn update_and_delete_of_unknown_ids_leave_content_unchanged() {
    for_each_medium(|store| {
        let transactions = store.transactions();
        transactions.add(transaction(10.0)).unwrap();
        transactions.add(transaction(20.0)).unwrap();
        let before = transactions.get_all().unwrap();

        let patch = TransactionPatch {
            amount: Some(99.0),
            ..TransactionPatch::default()
        };
        assert!(!transactions.update("missing", &patch).unwrap());
        assert!(!transactions.delete("missing").unwrap());

        assert_eq!(transactions.get_all().unwrap(), before);
    });
}

#[test]
fn deleted_records_never_come_back() {
    for_each_medium(|store| {
        let documents = store.documents();
        let kept = documents
            .add(DocumentFile::new("lease.pdf", DocumentType::Contract, None, 2048))
            .unwrap();
        let gone = documents
            .add(DocumentFile::new("bill.pdf", DocumentType::Bill, None, 512))
            .unwrap();

        assert!(documents.delete(gone.id.as_str()).unwrap());
        let remaining = documents.get_all().unwrap();

        assert!(remaining.iter().all(|d| d.id != gone.id));
        assert_eq!(remaining, vec![kept]);
    });
}

#[test]
fn deleting_an_apartment_leaves_references_dangling() {
    for_each_medium(|store| {
        let home = store.apartments().add(apartment("Birch")).unwrap();
        let resident = store
            .tenants()
            .add(tenant("Noah", Some(home.id.clone())))
            .unwrap();

        store.apartments().delete(home.id.as_str()).unwrap();

        let stored = store.tenants().get(resident.id.as_str()).unwrap().unwrap();
        assert_eq!(stored.apartment_id, Some(home.id));
    });
}

#[test]
fn checked_operations_report_validation_failures() {
    for_each_medium(|store| {
        let err = store.transactions().add_checked(transaction(0.0)).unwrap_err();
        assert!(err.is_validation());
        assert!(store.transactions().get_all().unwrap().is_empty());

        let err = store
            .tenants()
            .update_checked("missing", &TenantPatch::default())
            .unwrap_err();
        assert!(matches!(err, Error::RecordNotFound { .. }));
    });
}

#[test]
fn write_failure_propagates_and_keeps_previous_value() {
    let store = Store::new(MemoryMedium::with_quota(200));
    let first = store.apartments().add(apartment("Fir")).unwrap();

    let big = Apartment {
        notes: "x".repeat(500),
        ..apartment("Spruce")
    };
    let err = store.apartments().add(big).unwrap_err();
    assert!(matches!(err, Error::MediumWrite { .. }));

    assert_eq!(store.apartments().get_all().unwrap(), vec![first]);
}

#[test]
fn sqlite_store_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("books").join("rentbook.db");

    let added = {
        let store = Store::new(SqliteMedium::open(&path).unwrap());
        store.tenants().add(tenant("Lea", None)).unwrap()
    };

    let store = Store::new(SqliteMedium::open(&path).unwrap());
    assert_eq!(store.tenants().get_all().unwrap(), vec![added]);
}

#[test]
fn stored_form_uses_camel_case_keys() {
    let store = Store::new(MemoryMedium::new());
    store.tenants().add(tenant("Ben", None)).unwrap();

    let raw = store.medium().get("vit_tenants_v2").unwrap().unwrap();
    assert!(raw.contains("\"moveInDate\":\"2023-09-01\""));
    assert!(raw.contains("\"paymentFrequency\":\"monthly\""));
    assert!(raw.contains("\"rentAmount\":850"));
}
