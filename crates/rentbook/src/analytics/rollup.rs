//! Monthly and per-apartment rollups of the transaction ledger.

use std::collections::HashMap;

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::model::{Apartment, Record, RecordId, Transaction, TransactionType};

/// Income and expense totals for one calendar month.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyTotals {
    /// Grouping label, short month name and year (`Jan 2024`).
    pub label: String,
    /// Calendar year.
    pub year: i32,
    /// Calendar month, 1-based.
    pub month: u32,
    /// Sum of income amounts in the month.
    pub income: f64,
    /// Sum of expense amounts in the month.
    pub expense: f64,
}

impl MonthlyTotals {
    fn starting_at(date: NaiveDate) -> Self {
        Self {
            label: month_label(date),
            year: date.year(),
            month: date.month(),
            income: 0.0,
            expense: 0.0,
        }
    }

    /// Income minus expense.
    #[must_use]
    pub fn net(&self) -> f64 {
        self.income - self.expense
    }
}

/// Grouping label of the month containing `date`.
#[must_use]
pub fn month_label(date: NaiveDate) -> String {
    date.format("%b %Y").to_string()
}

/// Group transactions by calendar month.
///
/// One entry per month with at least one transaction, in the order each
/// month is first met while scanning `transactions`. The result is not
/// sorted by date; use [`sort_chronologically`] for that.
#[must_use]
pub fn monthly_rollup(transactions: &[Record<Transaction>]) -> Vec<MonthlyTotals> {
    let mut months: Vec<MonthlyTotals> = Vec::new();
    let mut index: HashMap<(i32, u32), usize> = HashMap::new();

    for tx in transactions {
        let key = (tx.date.year(), tx.date.month());
        let slot = *index.entry(key).or_insert_with(|| {
            months.push(MonthlyTotals::starting_at(tx.date));
            months.len() - 1
        });

        let entry = &mut months[slot];
        match tx.kind {
            TransactionType::Income => entry.income += tx.amount,
            TransactionType::Expense => entry.expense += tx.amount,
        }
    }

    months
}

/// Order monthly totals oldest first.
pub fn sort_chronologically(months: &mut [MonthlyTotals]) {
    months.sort_by_key(|m| (m.year, m.month));
}

/// Net result of one apartment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApartmentProfit {
    /// Apartment identifier.
    pub apartment_id: RecordId,
    /// Apartment display name.
    pub name: String,
    /// Income minus expenses booked against the apartment.
    pub profit: f64,
}

/// Profit per apartment, in apartment order.
///
/// Every apartment gets an entry, zero when nothing is booked against it.
/// Transactions without a reference, or referencing an apartment that no
/// longer exists, are left out.
#[must_use]
pub fn apartment_profit(
    apartments: &[Record<Apartment>],
    transactions: &[Record<Transaction>],
) -> Vec<ApartmentProfit> {
    let mut rows: Vec<ApartmentProfit> = apartments
        .iter()
        .map(|apartment| ApartmentProfit {
            apartment_id: apartment.id.clone(),
            name: apartment.name.clone(),
            profit: 0.0,
        })
        .collect();

    let slots: HashMap<&str, usize> = apartments
        .iter()
        .enumerate()
        .map(|(i, apartment)| (apartment.id.as_str(), i))
        .collect();

    for tx in transactions {
        let Some(apartment_id) = &tx.apartment_id else {
            continue;
        };
        if let Some(&slot) = slots.get(apartment_id.as_str()) {
            rows[slot].profit += tx.signed_amount();
        }
    }

    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Category;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn tx(
        kind: TransactionType,
        amount: f64,
        on: NaiveDate,
        apartment_id: Option<&str>,
    ) -> Record<Transaction> {
        Record::new(
            RecordId::from("tx"),
            Transaction {
                kind,
                category: Category::Other,
                amount,
                date: on,
                apartment_id: apartment_id.map(RecordId::from),
                description: String::new(),
                is_recurring: false,
                is_paid: true,
            },
        )
    }

    fn apartment(id: &str, name: &str) -> Record<Apartment> {
        Record::new(
            RecordId::from(id),
            Apartment {
                name: name.to_string(),
                address: "x".to_string(),
                ..Apartment::default()
            },
        )
    }

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn test_month_label() {
        assert_eq!(month_label(date(2024, 1, 5)), "Jan 2024");
        assert_eq!(month_label(date(2023, 12, 31)), "Dec 2023");
    }

    #[test]
    fn test_monthly_rollup_example() {
        let transactions = vec![
            tx(TransactionType::Income, 100.0, date(2024, 1, 5), None),
            tx(TransactionType::Expense, 40.0, date(2024, 1, 20), None),
            tx(TransactionType::Income, 50.0, date(2024, 2, 1), None),
        ];
        let months = monthly_rollup(&transactions);

        assert_eq!(months.len(), 2);
        assert_eq!(months[0].label, "Jan 2024");
        assert_close(months[0].income, 100.0);
        assert_close(months[0].expense, 40.0);
        assert_eq!(months[1].label, "Feb 2024");
        assert_close(months[1].income, 50.0);
        assert_close(months[1].expense, 0.0);
    }

    #[test]
    fn test_monthly_rollup_first_encountered_order() {
        let transactions = vec![
            tx(TransactionType::Income, 10.0, date(2024, 3, 1), None),
            tx(TransactionType::Income, 20.0, date(2024, 1, 1), None),
            tx(TransactionType::Income, 30.0, date(2024, 3, 15), None),
        ];
        let months = monthly_rollup(&transactions);

        let labels: Vec<&str> = months.iter().map(|m| m.label.as_str()).collect();
        assert_eq!(labels, vec!["Mar 2024", "Jan 2024"]);
        assert_close(months[0].income, 40.0);
    }

    #[test]
    fn test_same_month_different_years_are_separate() {
        let transactions = vec![
            tx(TransactionType::Income, 10.0, date(2023, 5, 1), None),
            tx(TransactionType::Income, 20.0, date(2024, 5, 1), None),
        ];
        assert_eq!(monthly_rollup(&transactions).len(), 2);
    }

    #[test]
    fn test_sort_chronologically() {
        let transactions = vec![
            tx(TransactionType::Income, 10.0, date(2024, 3, 1), None),
            tx(TransactionType::Income, 20.0, date(2023, 11, 1), None),
            tx(TransactionType::Income, 30.0, date(2024, 1, 1), None),
        ];
        let mut months = monthly_rollup(&transactions);
        sort_chronologically(&mut months);

        let labels: Vec<&str> = months.iter().map(|m| m.label.as_str()).collect();
        assert_eq!(labels, vec!["Nov 2023", "Jan 2024", "Mar 2024"]);
    }

    #[test]
    fn test_monthly_rollup_empty() {
        assert!(monthly_rollup(&[]).is_empty());
    }

    #[test]
    fn test_monthly_net() {
        let transactions = vec![
            tx(TransactionType::Income, 100.0, date(2024, 1, 5), None),
            tx(TransactionType::Expense, 40.0, date(2024, 1, 20), None),
        ];
        assert_close(monthly_rollup(&transactions)[0].net(), 60.0);
    }

    #[test]
    fn test_apartment_profit_example() {
        let apartments = vec![apartment("a", "A"), apartment("b", "B")];
        let transactions = vec![
            tx(TransactionType::Income, 100.0, date(2024, 1, 1), Some("a")),
            tx(TransactionType::Expense, 30.0, date(2024, 1, 2), Some("a")),
            tx(TransactionType::Income, 20.0, date(2024, 1, 3), Some("b")),
        ];
        let rows = apartment_profit(&apartments, &transactions);

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].name, "A");
        assert_close(rows[0].profit, 70.0);
        assert_eq!(rows[1].name, "B");
        assert_close(rows[1].profit, 20.0);
    }

    #[test]
    fn test_apartment_profit_unreferenced_stays_zero() {
        let apartments = vec![apartment("a", "A"), apartment("c", "C")];
        let transactions = vec![
            tx(TransactionType::Income, 100.0, date(2024, 1, 1), Some("a")),
            tx(TransactionType::Expense, 999.0, date(2024, 1, 1), None),
            tx(TransactionType::Income, 5.0, date(2024, 1, 1), Some("deleted")),
        ];
        let rows = apartment_profit(&apartments, &transactions);

        assert_close(rows[0].profit, 100.0);
        assert_close(rows[1].profit, 0.0);
    }

    #[test]
    fn test_apartment_profit_no_apartments() {
        let transactions = vec![tx(TransactionType::Income, 1.0, date(2024, 1, 1), Some("a"))];
        assert!(apartment_profit(&[], &transactions).is_empty());
    }
}
