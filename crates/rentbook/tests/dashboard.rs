//! Dashboard figures computed from a populated store.

use chrono::NaiveDate;

use rentbook::analytics::{
    apartment_profit, expense_breakdown, monthly_rollup, summarize, ApartmentDirectory,
    FinanceView,
};
use rentbook::model::{
    Apartment, Category, PaymentFrequency, Tenant, Transaction, TransactionType,
};
use rentbook::{MemoryMedium, RecordId, Store};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn booking(
    kind: TransactionType,
    category: Category,
    amount: f64,
    on: NaiveDate,
    apartment_id: Option<&RecordId>,
) -> Transaction {
    Transaction {
        kind,
        category,
        amount,
        date: on,
        apartment_id: apartment_id.cloned(),
        description: String::new(),
        is_recurring: false,
        is_paid: true,
    }
}

fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}

#[test]
fn dashboard_over_stored_portfolio() {
    let store = Store::new(MemoryMedium::new());

    let mut ids = Vec::new();
    for name in ["North", "South", "East"] {
        let record = store
            .apartments()
            .add(Apartment {
                name: name.to_string(),
                address: format!("{name} Road"),
                ..Apartment::default()
            })
            .unwrap();
        ids.push(record.id);
    }
    let (north, south) = (&ids[0], &ids[1]);

    store
        .tenants()
        .add(Tenant {
            name: "Ida".to_string(),
            email: String::new(),
            phone: String::new(),
            apartment_id: Some(north.clone()),
            rent_amount: 900.0,
            payment_frequency: PaymentFrequency::Monthly,
            move_in_date: date(2022, 4, 1),
        })
        .unwrap();

    let transactions = store.transactions();
    for tx in [
        booking(TransactionType::Income, Category::Rent, 900.0, date(2024, 1, 3), Some(north)),
        booking(TransactionType::Expense, Category::Water, 60.0, date(2024, 1, 20), Some(north)),
        booking(TransactionType::Expense, Category::FamilySupport, 90.0, date(2024, 2, 1), None),
        booking(TransactionType::Income, Category::Rent, 900.0, date(2024, 2, 3), Some(north)),
        booking(TransactionType::Expense, Category::Maintenance, 150.0, date(2024, 2, 9), Some(south)),
        booking(TransactionType::Expense, Category::Personal, 40.0, date(2024, 2, 11), None),
    ] {
        transactions.add(tx).unwrap();
    }

    let apartments = store.apartments().get_all().unwrap();
    let tenants = store.tenants().get_all().unwrap();
    let ledger = transactions.get_all().unwrap();

    let stats = summarize(&apartments, &tenants, &ledger, 0.10);
    assert_close(stats.total_income, 1800.0);
    assert_close(stats.total_expenses, 340.0);
    assert_close(stats.net_profit, 1460.0);
    assert_close(stats.proposed_allocation, 180.0);
    assert_close(stats.occupancy_rate, 100.0 / 3.0);

    let months = monthly_rollup(&ledger);
    assert_eq!(months.len(), 2);
    assert_eq!(months[0].label, "Jan 2024");
    assert_close(months[0].income, 900.0);
    assert_close(months[0].expense, 60.0);
    assert_close(months[1].expense, 280.0);

    let profit = apartment_profit(&apartments, &ledger);
    assert_close(profit[0].profit, 1740.0);
    assert_close(profit[1].profit, -150.0);
    assert_close(profit[2].profit, 0.0);

    let upkeep = FinanceView::ApartmentExpenses.apply(&ledger);
    let upkeep_amounts: Vec<f64> = upkeep.iter().map(|tx| tx.amount).collect();
    assert_eq!(upkeep_amounts, vec![150.0, 60.0]);

    let breakdown = expense_breakdown(&ledger);
    assert_close(breakdown[&Category::FamilySupport], 90.0);
    assert_eq!(breakdown.len(), 4);

    store.apartments().delete(south.as_str()).unwrap();
    let directory = ApartmentDirectory::new(&store.apartments().get_all().unwrap());
    assert_eq!(directory.transaction_label(Some(south)), "-");
    assert_eq!(directory.transaction_label(Some(north)), "North");
}
