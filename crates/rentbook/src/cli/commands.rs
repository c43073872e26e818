//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands and converts
//! their arguments into records and patches.

use std::path::PathBuf;
use std::str::FromStr;

use chrono::NaiveDate;
use clap::{Args, Subcommand, ValueEnum};

use crate::analytics::FinanceView;
use crate::error::Error;
use crate::model::{
    Apartment, ApartmentPatch, Category, DocumentPatch, DocumentType, PaymentFrequency, RecordId,
    Tenant, TenantPatch, Transaction, TransactionPatch, TransactionType,
};

/// Parse an argument with the model's own `FromStr`.
fn parse_arg<T: FromStr<Err = Error>>(value: &str) -> Result<T, String> {
    value.parse().map_err(|e: Error| e.to_string())
}

/// Turn an optional reference argument and a clearing flag into a patch value.
fn reference_patch(id: Option<String>, clear: bool) -> Option<Option<RecordId>> {
    if clear {
        Some(None)
    } else {
        id.map(|id| Some(RecordId::from(id)))
    }
}

/// Output format for commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Plain text output
    #[default]
    Plain,
    /// JSON output
    Json,
}

/// Listing arguments shared by every collection.
#[derive(Debug, Args)]
pub struct ListArgs {
    /// Output format
    #[arg(short, long, value_enum, default_value = "plain")]
    pub format: OutputFormat,
}

// === Apartments ===

/// Apartment commands.
#[derive(Debug, Subcommand)]
pub enum ApartmentCommand {
    /// List all apartments
    List(ListArgs),

    /// Add an apartment
    Add(ApartmentFields),

    /// Change fields of an apartment
    Update {
        /// Apartment identifier
        id: String,

        /// Fields to change; omitted flags keep their stored value
        #[command(flatten)]
        fields: ApartmentUpdate,
    },

    /// Delete an apartment (tenants and transactions keep their reference)
    Delete {
        /// Apartment identifier
        id: String,
    },
}

/// Fields of a new apartment.
#[derive(Debug, Args)]
pub struct ApartmentFields {
    /// Display name
    #[arg(short, long)]
    pub name: String,

    /// Street address
    #[arg(short, long)]
    pub address: String,

    /// Floor area in square metres
    #[arg(short, long, default_value_t = 0.0)]
    pub size: f64,

    /// Number of rooms
    #[arg(short, long, default_value_t = 0)]
    pub rooms: u32,

    /// Floor the unit is on
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    pub floor: i32,

    /// Free-text notes
    #[arg(long, default_value = "")]
    pub notes: String,
}

impl From<ApartmentFields> for Apartment {
    fn from(args: ApartmentFields) -> Self {
        Self {
            name: args.name,
            address: args.address,
            size: args.size,
            rooms: args.rooms,
            floor: args.floor,
            notes: args.notes,
        }
    }
}

/// Apartment fields to change; omitted ones are kept.
#[derive(Debug, Args)]
pub struct ApartmentUpdate {
    /// New display name
    #[arg(short, long)]
    pub name: Option<String>,

    /// New street address
    #[arg(short, long)]
    pub address: Option<String>,

    /// New floor area
    #[arg(short, long)]
    pub size: Option<f64>,

    /// New room count
    #[arg(short, long)]
    pub rooms: Option<u32>,

    /// New floor
    #[arg(long, allow_negative_numbers = true)]
    pub floor: Option<i32>,

    /// New notes
    #[arg(long)]
    pub notes: Option<String>,
}

impl From<ApartmentUpdate> for ApartmentPatch {
    fn from(args: ApartmentUpdate) -> Self {
        Self {
            name: args.name,
            address: args.address,
            size: args.size,
            rooms: args.rooms,
            floor: args.floor,
            notes: args.notes,
        }
    }
}

// === Tenants ===

/// Tenant commands.
#[derive(Debug, Subcommand)]
pub enum TenantCommand {
    /// List all tenants
    List(ListArgs),

    /// Add a tenant
    Add(TenantFields),

    /// Change fields of a tenant
    Update {
        /// Tenant identifier
        id: String,

        /// Fields to change; omitted flags keep their stored value
        #[command(flatten)]
        fields: TenantUpdate,
    },

    /// Delete a tenant
    Delete {
        /// Tenant identifier
        id: String,
    },
}

/// Fields of a new tenant.
#[derive(Debug, Args)]
pub struct TenantFields {
    /// Full name
    #[arg(short, long)]
    pub name: String,

    /// Contact email
    #[arg(short, long, default_value = "")]
    pub email: String,

    /// Contact phone number
    #[arg(short, long, default_value = "")]
    pub phone: String,

    /// Apartment the tenant occupies
    #[arg(short, long, value_name = "ID")]
    pub apartment: Option<String>,

    /// Rent due per period
    #[arg(long, default_value_t = 0.0)]
    pub rent: f64,

    /// Rent period (monthly, quarterly, yearly)
    #[arg(long, value_parser = parse_arg::<PaymentFrequency>, default_value = "monthly")]
    pub frequency: PaymentFrequency,

    /// Move-in date (YYYY-MM-DD), today if omitted
    #[arg(long, value_name = "DATE")]
    pub move_in: Option<NaiveDate>,
}

impl TenantFields {
    /// Build the tenant, dating the move-in `today` when none was given.
    #[must_use]
    pub fn into_tenant(self, today: NaiveDate) -> Tenant {
        Tenant {
            name: self.name,
            email: self.email,
            phone: self.phone,
            apartment_id: self
                .apartment
                .filter(|id| !id.is_empty())
                .map(RecordId::from),
            rent_amount: self.rent,
            payment_frequency: self.frequency,
            move_in_date: self.move_in.unwrap_or(today),
        }
    }
}

/// Tenant fields to change; omitted ones are kept.
#[derive(Debug, Args)]
pub struct TenantUpdate {
    /// New full name
    #[arg(short, long)]
    pub name: Option<String>,

    /// New contact email
    #[arg(short, long)]
    pub email: Option<String>,

    /// New phone number
    #[arg(short, long)]
    pub phone: Option<String>,

    /// Move the tenant to another apartment
    #[arg(short, long, value_name = "ID", conflicts_with = "unassign")]
    pub apartment: Option<String>,

    /// Remove the apartment assignment
    #[arg(long)]
    pub unassign: bool,

    /// New rent amount
    #[arg(long)]
    pub rent: Option<f64>,

    /// New rent period
    #[arg(long, value_parser = parse_arg::<PaymentFrequency>)]
    pub frequency: Option<PaymentFrequency>,

    /// New move-in date
    #[arg(long, value_name = "DATE")]
    pub move_in: Option<NaiveDate>,
}

impl From<TenantUpdate> for TenantPatch {
    fn from(args: TenantUpdate) -> Self {
        Self {
            name: args.name,
            email: args.email,
            phone: args.phone,
            apartment_id: reference_patch(args.apartment, args.unassign),
            rent_amount: args.rent,
            payment_frequency: args.frequency,
            move_in_date: args.move_in,
        }
    }
}

// === Transactions ===

/// Transaction commands.
#[derive(Debug, Subcommand)]
pub enum TransactionCommand {
    /// List transactions of a view, newest first
    List {
        /// Ledger view (all, rent-payments, family-support,
        /// apartment-expenses, personal-expenses)
        #[arg(long, value_parser = parse_arg::<FinanceView>, default_value = "all")]
        view: FinanceView,

        /// Output format
        #[arg(short, long, value_enum, default_value = "plain")]
        format: OutputFormat,
    },

    /// Record a transaction
    Add(TransactionFields),

    /// Change fields of a transaction
    Update {
        /// Transaction identifier
        id: String,

        /// Fields to change; omitted flags keep their stored value
        #[command(flatten)]
        fields: TransactionUpdate,
    },

    /// Delete a transaction
    Delete {
        /// Transaction identifier
        id: String,
    },

    /// Show the categories a view offers for new entries
    Categories {
        /// Ledger view
        #[arg(long, value_parser = parse_arg::<FinanceView>, default_value = "all")]
        view: FinanceView,
    },
}

/// Fields of a new transaction. Unset fields take the view's defaults.
#[derive(Debug, Args)]
pub struct TransactionFields {
    /// Amount, must be positive
    #[arg(long)]
    pub amount: f64,

    /// View whose defaults fill in type and category
    #[arg(long, value_parser = parse_arg::<FinanceView>, default_value = "all")]
    pub view: FinanceView,

    /// Income or expense
    #[arg(short = 't', long = "type", value_parser = parse_arg::<TransactionType>)]
    pub kind: Option<TransactionType>,

    /// Category (rent, maintenance, family_support, ...)
    #[arg(long, value_parser = parse_arg::<Category>)]
    pub category: Option<Category>,

    /// Booking date (YYYY-MM-DD), today if omitted
    #[arg(short, long, value_name = "DATE")]
    pub date: Option<NaiveDate>,

    /// Apartment the transaction belongs to
    #[arg(short, long, value_name = "ID")]
    pub apartment: Option<String>,

    /// Free-text description
    #[arg(long, default_value = "")]
    pub description: String,

    /// Mark as recurring
    #[arg(long)]
    pub recurring: bool,

    /// Mark as not yet paid
    #[arg(long)]
    pub unpaid: bool,
}

impl TransactionFields {
    /// Build the transaction on top of the view's draft for `today`.
    #[must_use]
    pub fn into_transaction(self, today: NaiveDate) -> Transaction {
        let mut tx = self.view.draft(self.date.unwrap_or(today));
        tx.amount = self.amount;
        if let Some(kind) = self.kind {
            tx.kind = kind;
        }
        if let Some(category) = self.category {
            tx.category = category;
        }
        tx.apartment_id = self
            .apartment
            .filter(|id| !id.is_empty())
            .map(RecordId::from);
        tx.description = self.description;
        tx.is_recurring = self.recurring;
        tx.is_paid = !self.unpaid;
        tx
    }
}

/// Transaction fields to change; omitted ones are kept.
#[derive(Debug, Args)]
pub struct TransactionUpdate {
    /// New amount
    #[arg(long)]
    pub amount: Option<f64>,

    /// New type
    #[arg(short = 't', long = "type", value_parser = parse_arg::<TransactionType>)]
    pub kind: Option<TransactionType>,

    /// New category
    #[arg(long, value_parser = parse_arg::<Category>)]
    pub category: Option<Category>,

    /// New booking date
    #[arg(short, long, value_name = "DATE")]
    pub date: Option<NaiveDate>,

    /// Book against another apartment
    #[arg(short, long, value_name = "ID", conflicts_with = "no_apartment")]
    pub apartment: Option<String>,

    /// Remove the apartment reference
    #[arg(long)]
    pub no_apartment: bool,

    /// New description
    #[arg(long)]
    pub description: Option<String>,

    /// Set the recurring flag
    #[arg(long)]
    pub recurring: Option<bool>,

    /// Set the paid flag
    #[arg(long)]
    pub paid: Option<bool>,
}

impl From<TransactionUpdate> for TransactionPatch {
    fn from(args: TransactionUpdate) -> Self {
        Self {
            kind: args.kind,
            category: args.category,
            amount: args.amount,
            date: args.date,
            apartment_id: reference_patch(args.apartment, args.no_apartment),
            description: args.description,
            is_recurring: args.recurring,
            is_paid: args.paid,
        }
    }
}

// === Documents ===

/// Document commands.
#[derive(Debug, Subcommand)]
pub enum DocumentCommand {
    /// List all documents
    List(ListArgs),

    /// Register a document
    Add(DocumentFields),

    /// Change fields of a document
    Update {
        /// Document identifier
        id: String,

        /// Fields to change; omitted flags keep their stored value
        #[command(flatten)]
        fields: DocumentUpdate,
    },

    /// Delete a document
    Delete {
        /// Document identifier
        id: String,
    },
}

/// Fields of a new document.
#[derive(Debug, Args)]
pub struct DocumentFields {
    /// Display name, the file name if omitted
    #[arg(short, long)]
    pub name: Option<String>,

    /// Document type (contract, bill, other)
    #[arg(short = 't', long = "type", value_parser = parse_arg::<DocumentType>, default_value = "contract")]
    pub kind: DocumentType,

    /// Apartment the document belongs to
    #[arg(short, long, value_name = "ID")]
    pub apartment: Option<String>,

    /// File to take the size and default name from
    #[arg(short, long, value_name = "PATH")]
    pub file: Option<PathBuf>,
}

/// Document fields to change; omitted ones are kept.
#[derive(Debug, Args)]
pub struct DocumentUpdate {
    /// New display name
    #[arg(short, long)]
    pub name: Option<String>,

    /// New type
    #[arg(short = 't', long = "type", value_parser = parse_arg::<DocumentType>)]
    pub kind: Option<DocumentType>,

    /// Attach to another apartment
    #[arg(short, long, value_name = "ID", conflicts_with = "global")]
    pub apartment: Option<String>,

    /// Detach from any apartment
    #[arg(long)]
    pub global: bool,
}

impl From<DocumentUpdate> for DocumentPatch {
    fn from(args: DocumentUpdate) -> Self {
        Self {
            name: args.name,
            kind: args.kind,
            apartment_id: reference_patch(args.apartment, args.global),
        }
    }
}

// === Dashboard ===

/// Dashboard commands.
#[derive(Debug, Subcommand)]
pub enum DashboardCommand {
    /// Income, expenses, occupancy and the proposed allocation
    Summary(ListArgs),

    /// Income and expenses per month
    Monthly {
        /// Sort oldest first instead of in ledger order
        #[arg(long)]
        chronological: bool,

        /// Output format
        #[arg(short, long, value_enum, default_value = "plain")]
        format: OutputFormat,
    },

    /// Profit per apartment
    Apartments(ListArgs),

    /// Expenses per category
    Expenses(ListArgs),
}

/// Status command arguments.
#[derive(Debug, Args)]
pub struct StatusCommand {
    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 7, 14).unwrap()
    }

    fn create_test_transaction_fields(view: FinanceView) -> TransactionFields {
        TransactionFields {
            amount: 25.0,
            view,
            kind: None,
            category: None,
            date: None,
            apartment: None,
            description: String::new(),
            recurring: false,
            unpaid: false,
        }
    }

    #[test]
    fn test_output_format_default() {
        assert_eq!(OutputFormat::default(), OutputFormat::Plain);
    }

    #[test]
    fn test_parse_arg() {
        assert_eq!(parse_arg::<Category>("family_support"), Ok(Category::FamilySupport));
        assert!(parse_arg::<Category>("groceries").is_err());
    }

    #[test]
    fn test_reference_patch() {
        assert_eq!(reference_patch(None, false), None);
        assert_eq!(reference_patch(Some("x".to_string()), true), Some(None));
        assert_eq!(
            reference_patch(Some("a1".to_string()), false),
            Some(Some(RecordId::from("a1")))
        );
    }

    #[test]
    fn test_transaction_fields_use_view_defaults() {
        let tx = create_test_transaction_fields(FinanceView::RentPayments).into_transaction(today());

        assert_eq!(tx.kind, TransactionType::Income);
        assert_eq!(tx.category, Category::Rent);
        assert_eq!(tx.date, today());
        assert!((tx.amount - 25.0).abs() < f64::EPSILON);
        assert!(tx.is_paid);
        assert!(!tx.is_recurring);
    }

    #[test]
    fn test_transaction_fields_override_defaults() {
        let mut fields = create_test_transaction_fields(FinanceView::All);
        fields.category = Some(Category::Water);
        fields.date = NaiveDate::from_ymd_opt(2024, 1, 2);
        fields.apartment = Some("a1".to_string());
        fields.unpaid = true;

        let tx = fields.into_transaction(today());
        assert_eq!(tx.kind, TransactionType::Expense);
        assert_eq!(tx.category, Category::Water);
        assert_eq!(tx.date, NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
        assert_eq!(tx.apartment_id, Some(RecordId::from("a1")));
        assert!(!tx.is_paid);
    }

    #[test]
    fn test_tenant_fields_default_move_in() {
        let fields = TenantFields {
            name: "Ana".to_string(),
            email: String::new(),
            phone: String::new(),
            apartment: Some(String::new()),
            rent: 700.0,
            frequency: PaymentFrequency::Quarterly,
            move_in: None,
        };
        let tenant = fields.into_tenant(today());

        assert_eq!(tenant.move_in_date, today());
        assert_eq!(tenant.apartment_id, None);
        assert_eq!(tenant.payment_frequency, PaymentFrequency::Quarterly);
    }

    #[test]
    fn test_tenant_update_unassign() {
        let patch = TenantPatch::from(TenantUpdate {
            name: None,
            email: None,
            phone: None,
            apartment: None,
            unassign: true,
            rent: Some(800.0),
            frequency: None,
            move_in: None,
        });

        assert_eq!(patch.apartment_id, Some(None));
        assert_eq!(patch.rent_amount, Some(800.0));
        assert!(patch.name.is_none());
    }

    #[test]
    fn test_document_update_global() {
        let patch = DocumentPatch::from(DocumentUpdate {
            name: None,
            kind: Some(DocumentType::Bill),
            apartment: None,
            global: true,
        });
        assert_eq!(patch.apartment_id, Some(None));
        assert_eq!(patch.kind, Some(DocumentType::Bill));
    }

    #[test]
    fn test_apartment_fields_conversion() {
        let apartment = Apartment::from(ApartmentFields {
            name: "Loft".to_string(),
            address: "Main St 1".to_string(),
            size: 42.5,
            rooms: 2,
            floor: -1,
            notes: String::new(),
        });
        assert_eq!(apartment.floor, -1);
        assert_eq!(apartment.rooms, 2);
    }

    #[test]
    fn test_config_command_debug() {
        let cmd = ConfigCommand::Show { json: false };
        let debug_str = format!("{cmd:?}");
        assert!(debug_str.contains("Show"));
    }
}
