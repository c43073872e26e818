//! Headline figures for the dashboard.

use std::collections::{BTreeMap, HashSet};

use serde::Serialize;

use crate::model::{Apartment, Category, Record, RecordId, Tenant, Transaction};

/// Default share of income proposed for family support.
pub const DEFAULT_ALLOCATION_RATIO: f64 = 0.10;

/// Portfolio-wide totals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct SummaryStats {
    /// Sum of all income amounts.
    pub total_income: f64,
    /// Sum of all expense amounts.
    pub total_expenses: f64,
    /// Income minus expenses.
    pub net_profit: f64,
    /// Percentage of apartments with at least one tenant, 0 when there are none.
    pub occupancy_rate: f64,
    /// Number of apartments.
    pub total_apartments: usize,
    /// Number of tenants.
    pub total_tenants: usize,
    /// Advisory family-support figure, `total_income * ratio`. Never stored.
    pub proposed_allocation: f64,
}

/// Compute the headline figures.
///
/// Occupancy counts the apartments referenced by at least one tenant.
/// Unassigned tenants and references to deleted apartments are ignored,
/// so the rate stays within 0..=100.
#[must_use]
pub fn summarize(
    apartments: &[Record<Apartment>],
    tenants: &[Record<Tenant>],
    transactions: &[Record<Transaction>],
    allocation_ratio: f64,
) -> SummaryStats {
    let (total_income, total_expenses) =
        transactions
            .iter()
            .fold((0.0, 0.0), |(income, expenses), tx| {
                if tx.is_income() {
                    (income + tx.amount, expenses)
                } else {
                    (income, expenses + tx.amount)
                }
            });

    let referenced: HashSet<&str> = tenants
        .iter()
        .filter_map(|t| t.apartment_id.as_ref().map(RecordId::as_str))
        .collect();
    let occupied = apartments
        .iter()
        .filter(|a| referenced.contains(a.id.as_str()))
        .count();

    #[allow(clippy::cast_precision_loss)]
    let occupancy_rate = if apartments.is_empty() {
        0.0
    } else {
        occupied as f64 / apartments.len() as f64 * 100.0
    };

    SummaryStats {
        total_income,
        total_expenses,
        net_profit: total_income - total_expenses,
        occupancy_rate,
        total_apartments: apartments.len(),
        total_tenants: tenants.len(),
        proposed_allocation: total_income * allocation_ratio,
    }
}

/// Total spent per expense category, ordered by category.
///
/// Categories without expenses are omitted.
#[must_use]
pub fn expense_breakdown(transactions: &[Record<Transaction>]) -> BTreeMap<Category, f64> {
    let mut totals = BTreeMap::new();
    for tx in transactions.iter().filter(|tx| tx.is_expense()) {
        *totals.entry(tx.category).or_insert(0.0) += tx.amount;
    }
    totals
}
