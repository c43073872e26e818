//! Derived figures and filtered listings.
//!
//! Everything here is a pure function over a snapshot of the stored
//! collections. Nothing is persisted, and empty inputs give zeros or empty
//! results rather than errors.
//!
//! - **Summary**: income, expenses, profit, occupancy, and the proposed
//!   family-support allocation.
//! - **Rollups**: totals per calendar month and profit per apartment.
//! - **Views**: the finance pages' predicates and entry-form defaults.
//! - **Directory**: apartment names with fallbacks for missing references.
//!
//! # Example
//!
//! ```
//! use rentbook::analytics::{summarize, DEFAULT_ALLOCATION_RATIO};
//!
//! let stats = summarize(&[], &[], &[], DEFAULT_ALLOCATION_RATIO);
//! assert_eq!(stats.occupancy_rate, 0.0);
//! ```

mod directory;
mod rollup;
mod summary;
mod views;

pub use directory::{
    ApartmentDirectory, GLOBAL_DOCUMENT, NO_APARTMENT, UNASSIGNED, UNKNOWN_APARTMENT,
};
pub use rollup::{
    apartment_profit, month_label, monthly_rollup, sort_chronologically, ApartmentProfit,
    MonthlyTotals,
};
pub use summary::{expense_breakdown, summarize, SummaryStats, DEFAULT_ALLOCATION_RATIO};
pub use views::FinanceView;
