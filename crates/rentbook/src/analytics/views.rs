//! Named views over the transaction ledger.
//!
//! Each view owns a predicate, the type and category a new entry starts
//! with, and the categories its entry form offers.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::Serialize;

use crate::error::{Error, Result};
use crate::model::{Category, Record, Transaction, TransactionType};

/// A page-scoped slice of the ledger.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum FinanceView {
    /// Every transaction.
    #[default]
    All,
    /// Rent received.
    RentPayments,
    /// Money sent as family support.
    FamilySupport,
    /// Running costs of the apartments.
    ApartmentExpenses,
    /// Private spending.
    PersonalExpenses,
}

impl FinanceView {
    /// Every view, in menu order.
    pub const ALL: [Self; 5] = [
        Self::All,
        Self::RentPayments,
        Self::FamilySupport,
        Self::ApartmentExpenses,
        Self::PersonalExpenses,
    ];

    /// URL-style slug of the view.
    #[must_use]
    pub fn slug(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::RentPayments => "rent-payments",
            Self::FamilySupport => "family-support",
            Self::ApartmentExpenses => "apartment-expenses",
            Self::PersonalExpenses => "personal-expenses",
        }
    }

    /// Human-readable heading.
    #[must_use]
    pub fn title(self) -> &'static str {
        match self {
            Self::All => "All Transactions",
            Self::RentPayments => "Rent Payments",
            Self::FamilySupport => "Family Support",
            Self::ApartmentExpenses => "Apartment Expenses",
            Self::PersonalExpenses => "Personal Expenses",
        }
    }

    /// Whether `tx` belongs to this view.
    #[must_use]
    pub fn matches(self, tx: &Transaction) -> bool {
        match self {
            Self::All => true,
            Self::RentPayments => tx.is_income() && tx.category == Category::Rent,
            Self::FamilySupport => tx.is_expense() && tx.category == Category::FamilySupport,
            Self::ApartmentExpenses => {
                tx.is_expense()
                    && !matches!(tx.category, Category::FamilySupport | Category::Personal)
            }
            Self::PersonalExpenses => tx.is_expense() && tx.category == Category::Personal,
        }
    }

    /// Type a new entry starts with.
    #[must_use]
    pub fn default_type(self) -> TransactionType {
        match self {
            Self::RentPayments => TransactionType::Income,
            _ => TransactionType::Expense,
        }
    }

    /// Category a new entry starts with.
    #[must_use]
    pub fn default_category(self) -> Category {
        match self {
            Self::All => Category::Other,
            Self::RentPayments => Category::Rent,
            Self::FamilySupport => Category::FamilySupport,
            Self::ApartmentExpenses => Category::Maintenance,
            Self::PersonalExpenses => Category::Personal,
        }
    }

    /// Categories the entry form of this view offers.
    ///
    /// Income forms only offer rent; expense forms never do.
    #[must_use]
    pub fn allowed_categories(self) -> Vec<Category> {
        if self.default_type() == TransactionType::Income {
            return vec![Category::Rent];
        }

        Category::ALL
            .into_iter()
            .filter(|c| *c != Category::Rent)
            .filter(|c| match self {
                Self::FamilySupport => *c == Category::FamilySupport,
                Self::PersonalExpenses => *c == Category::Personal,
                Self::ApartmentExpenses => {
                    !matches!(c, Category::FamilySupport | Category::Personal)
                }
                Self::All | Self::RentPayments => true,
            })
            .collect()
    }

    /// Keep the matching transactions, newest first.
    ///
    /// Transactions sharing a date keep their stored order.
    #[must_use]
    pub fn apply(self, transactions: &[Record<Transaction>]) -> Vec<Record<Transaction>> {
        let mut selected: Vec<Record<Transaction>> = transactions
            .iter()
            .filter(|tx| self.matches(tx))
            .cloned()
            .collect();
        selected.sort_by(|a, b| b.date.cmp(&a.date));
        selected
    }

    /// Starting values of a new entry dated `today`.
    ///
    /// The amount is left at zero and must be filled in before saving.
    #[must_use]
    pub fn draft(self, today: NaiveDate) -> Transaction {
        Transaction {
            kind: self.default_type(),
            category: self.default_category(),
            amount: 0.0,
            date: today,
            apartment_id: None,
            description: String::new(),
            is_recurring: false,
            is_paid: true,
        }
    }
}

impl fmt::Display for FinanceView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for FinanceView {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_ascii_lowercase().replace('_', "-");
        Self::ALL
            .into_iter()
            .find(|view| view.slug() == wanted)
            .ok_or_else(|| Error::invalid_input("view", format!("unknown finance view '{s}'")))
    }
}
