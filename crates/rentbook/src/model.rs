//! Core record types for rentbook.
//!
//! This module defines the four entity kinds tracked by the ledger
//! (apartments, tenants, transactions and documents), the stored
//! [`Record`] wrapper that pairs an entity with its identifier, and the
//! patch types used for partial updates.

use std::fmt;
use std::ops::Deref;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};

/// Locator stored on documents. Uploads are not backed by real content.
pub const PLACEHOLDER_LOCATOR: &str = "#";

/// Name given to documents saved without one.
pub const UNTITLED_DOCUMENT: &str = "Untitled Document";

/// Identifier of a stored record, unique within its collection.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    /// Wrap an existing identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for RecordId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for RecordId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for RecordId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// A stored entity: its identifier plus the entity's own fields.
///
/// Serializes flat, so an apartment record reads
/// `{"id": "...", "name": "...", "address": "...", ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record<T> {
    /// Identifier assigned by the store on insert.
    pub id: RecordId,
    /// The entity fields.
    #[serde(flatten)]
    pub fields: T,
}

impl<T> Record<T> {
    /// Pair an identifier with entity fields.
    #[must_use]
    pub fn new(id: RecordId, fields: T) -> Self {
        Self { id, fields }
    }
}

impl<T> Deref for Record<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.fields
    }
}

/// An entity kind the store can hold.
pub trait Entity: Serialize + DeserializeOwned + Clone + fmt::Debug {
    /// Singular name used in messages ("apartment").
    const KIND: &'static str;

    /// Collection name used to build the storage key ("apartments").
    const COLLECTION: &'static str;

    /// Partial-update type. Serializes only the fields that are set.
    type Patch: Serialize + fmt::Debug;

    /// Entry checks applied before a record is written.
    ///
    /// The store itself never calls this; callers check before writing.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] naming the failed check.
    fn validate(&self) -> Result<()> {
        Ok(())
    }
}

/// Apply `patch` over `record` as a shallow merge.
///
/// Every top-level field present in the serialized patch replaces the
/// record's field wholesale; absent fields are kept. Nested values are
/// never merged. The identifier cannot be changed through a patch.
///
/// # Errors
///
/// Returns an error if the merged value no longer decodes as a record.
pub fn merge_shallow<T: Entity>(record: &Record<T>, patch: &T::Patch) -> Result<Record<T>> {
    let mut merged = serde_json::to_value(record)?;
    let patch = serde_json::to_value(patch)?;

    match (&mut merged, patch) {
        (Value::Object(base), Value::Object(fields)) => {
            for (key, value) in fields {
                if key != "id" {
                    base.insert(key, value);
                }
            }
        }
        (_, Value::Null) => {}
        (_, other) => {
            return Err(Error::internal(format!(
                "{} patch must serialize to an object, got {other}",
                T::KIND
            )));
        }
    }

    // Non-finite numbers in the patch serialize as null and fail here.
    serde_json::from_value(merged).map_err(|e| {
        Error::validation(T::KIND, format!("patched record is not valid: {e}"))
    })
}

/// Reads an optional apartment reference, treating `""` as no reference.
fn empty_as_none<'de, D>(deserializer: D) -> std::result::Result<Option<RecordId>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|id| !id.is_empty()).map(RecordId))
}

fn require_finite(entity: &'static str, field: &str, value: f64) -> Result<()> {
    if !value.is_finite() {
        return Err(Error::validation(
            entity,
            format!("{field} must be a finite number, got {value}"),
        ));
    }
    Ok(())
}

fn require_text(entity: &'static str, field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::validation(entity, format!("{field} is required")));
    }
    Ok(())
}

// === Apartments ===

/// A rentable unit in the portfolio.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Apartment {
    /// Display name.
    pub name: String,
    /// Street address.
    pub address: String,
    /// Floor area in square metres.
    #[serde(default)]
    pub size: f64,
    /// Number of rooms.
    #[serde(default)]
    pub rooms: u32,
    /// Floor the unit is on.
    #[serde(default)]
    pub floor: i32,
    /// Free-text notes.
    #[serde(default)]
    pub notes: String,
}

/// Partial update for an [`Apartment`].
#[allow(missing_docs)]
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApartmentPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rooms: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub floor: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Entity for Apartment {
    const KIND: &'static str = "apartment";
    const COLLECTION: &'static str = "apartments";
    type Patch = ApartmentPatch;

    fn validate(&self) -> Result<()> {
        require_text(Self::KIND, "name", &self.name)?;
        require_text(Self::KIND, "address", &self.address)?;
        require_finite(Self::KIND, "size", self.size)
    }
}

// === Tenants ===

/// How often a tenant pays rent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentFrequency {
    /// Every month.
    #[default]
    Monthly,
    /// Every three months.
    Quarterly,
    /// Once a year.
    Yearly,
}

impl fmt::Display for PaymentFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Monthly => f.pad("monthly"),
            Self::Quarterly => f.pad("quarterly"),
            Self::Yearly => f.pad("yearly"),
        }
    }
}

impl FromStr for PaymentFrequency {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "monthly" => Ok(Self::Monthly),
            "quarterly" => Ok(Self::Quarterly),
            "yearly" => Ok(Self::Yearly),
            other => Err(Error::invalid_input(
                "payment frequency",
                format!("unknown frequency '{other}'"),
            )),
        }
    }
}

/// A person renting (or about to rent) an apartment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tenant {
    /// Full name.
    pub name: String,
    /// Contact email.
    #[serde(default)]
    pub email: String,
    /// Contact phone number.
    #[serde(default)]
    pub phone: String,
    /// Apartment the tenant occupies, if any. Not integrity-checked.
    #[serde(
        default,
        deserialize_with = "empty_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub apartment_id: Option<RecordId>,
    /// Rent due per period.
    #[serde(default)]
    pub rent_amount: f64,
    /// Rent period.
    #[serde(default)]
    pub payment_frequency: PaymentFrequency,
    /// Date the tenant moved in.
    pub move_in_date: NaiveDate,
}

/// Partial update for a [`Tenant`].
#[allow(missing_docs)]
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TenantPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    /// `Some(None)` clears the reference.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub apartment_id: Option<Option<RecordId>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rent_amount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_frequency: Option<PaymentFrequency>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub move_in_date: Option<NaiveDate>,
}

impl Entity for Tenant {
    const KIND: &'static str = "tenant";
    const COLLECTION: &'static str = "tenants";
    type Patch = TenantPatch;

    fn validate(&self) -> Result<()> {
        require_text(Self::KIND, "name", &self.name)?;
        require_finite(Self::KIND, "rent amount", self.rent_amount)
    }
}

// === Transactions ===

/// Direction of a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    /// Money received.
    Income,
    /// Money spent.
    Expense,
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Income => f.pad("income"),
            Self::Expense => f.pad("expense"),
        }
    }
}

impl FromStr for TransactionType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            other => Err(Error::invalid_input(
                "transaction type",
                format!("unknown type '{other}'"),
            )),
        }
    }
}

/// What a transaction was for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Rent received from a tenant.
    Rent,
    /// Repairs and upkeep.
    Maintenance,
    /// Money sent to family.
    FamilySupport,
    /// Electricity bill.
    Electricity,
    /// Water bill.
    Water,
    /// Waste collection.
    Trash,
    /// Property or income tax.
    Tax,
    /// Private spending unrelated to the apartments.
    Personal,
    /// Anything else.
    Other,
}

impl Category {
    /// Every category, in declaration order.
    pub const ALL: [Self; 9] = [
        Self::Rent,
        Self::Maintenance,
        Self::FamilySupport,
        Self::Electricity,
        Self::Water,
        Self::Trash,
        Self::Tax,
        Self::Personal,
        Self::Other,
    ];

    /// Wire name of the category.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Rent => "rent",
            Self::Maintenance => "maintenance",
            Self::FamilySupport => "family_support",
            Self::Electricity => "electricity",
            Self::Water => "water",
            Self::Trash => "trash",
            Self::Tax => "tax",
            Self::Personal => "personal",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Category {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|category| category.as_str() == normalized)
            .ok_or_else(|| Error::invalid_input("category", format!("unknown category '{s}'")))
    }
}

/// A single income or expense entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    /// Income or expense.
    #[serde(rename = "type")]
    pub kind: TransactionType,
    /// What the money was for.
    pub category: Category,
    /// Amount, non-negative. Direction comes from `kind`.
    pub amount: f64,
    /// Booking date.
    pub date: NaiveDate,
    /// Apartment the entry belongs to; `None` for general entries.
    #[serde(
        default,
        deserialize_with = "empty_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub apartment_id: Option<RecordId>,
    /// Free-text description.
    #[serde(default)]
    pub description: String,
    /// Repeats every period.
    #[serde(default)]
    pub is_recurring: bool,
    /// Settled.
    #[serde(default = "default_paid")]
    pub is_paid: bool,
}

fn default_paid() -> bool {
    true
}

impl Transaction {
    /// Whether this entry is income.
    #[must_use]
    pub fn is_income(&self) -> bool {
        self.kind == TransactionType::Income
    }

    /// Whether this entry is an expense.
    #[must_use]
    pub fn is_expense(&self) -> bool {
        self.kind == TransactionType::Expense
    }

    /// Amount with sign applied: positive for income, negative for expense.
    #[must_use]
    pub fn signed_amount(&self) -> f64 {
        match self.kind {
            TransactionType::Income => self.amount,
            TransactionType::Expense => -self.amount,
        }
    }
}

/// Partial update for a [`Transaction`].
#[allow(missing_docs)]
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionPatch {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<TransactionType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    /// `Some(None)` clears the reference.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub apartment_id: Option<Option<RecordId>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_recurring: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_paid: Option<bool>,
}

impl Entity for Transaction {
    const KIND: &'static str = "transaction";
    const COLLECTION: &'static str = "transactions";
    type Patch = TransactionPatch;

    fn validate(&self) -> Result<()> {
        if !self.amount.is_finite() || self.amount <= 0.0 {
            return Err(Error::validation(
                Self::KIND,
                format!("amount must be a positive number, got {}", self.amount),
            ));
        }
        Ok(())
    }
}

// === Documents ===

/// Kind of stored document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentType {
    /// Lease or other contract.
    #[default]
    Contract,
    /// Utility or service bill.
    Bill,
    /// Anything else.
    Other,
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Contract => f.pad("contract"),
            Self::Bill => f.pad("bill"),
            Self::Other => f.pad("other"),
        }
    }
}

impl FromStr for DocumentType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "contract" => Ok(Self::Contract),
            "bill" => Ok(Self::Bill),
            "other" => Ok(Self::Other),
            other => Err(Error::invalid_input(
                "document type",
                format!("unknown type '{other}'"),
            )),
        }
    }
}

/// Metadata for an uploaded document.
///
/// Only metadata is kept. `url` is the placeholder locator and never
/// resolves to content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentFile {
    /// Display name.
    pub name: String,
    /// Contract, bill or other.
    #[serde(rename = "type")]
    pub kind: DocumentType,
    /// Apartment the document belongs to; `None` for global documents.
    #[serde(
        default,
        deserialize_with = "empty_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub apartment_id: Option<RecordId>,
    /// When the document was registered.
    pub upload_date: DateTime<Utc>,
    /// Size in bytes as reported by the uploader.
    #[serde(default)]
    pub size: u64,
    /// Opaque locator.
    #[serde(default = "placeholder_locator")]
    pub url: String,
}

fn placeholder_locator() -> String {
    PLACEHOLDER_LOCATOR.to_string()
}

impl DocumentFile {
    /// Register a document uploaded now.
    ///
    /// A blank name becomes [`UNTITLED_DOCUMENT`].
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        kind: DocumentType,
        apartment_id: Option<RecordId>,
        size: u64,
    ) -> Self {
        let name = name.into();
        let name = if name.trim().is_empty() {
            UNTITLED_DOCUMENT.to_string()
        } else {
            name
        };
        Self {
            name,
            kind,
            apartment_id,
            upload_date: Utc::now(),
            size,
            url: placeholder_locator(),
        }
    }
}

/// Partial update for a [`DocumentFile`].
#[allow(missing_docs)]
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<DocumentType>,
    /// `Some(None)` clears the reference.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub apartment_id: Option<Option<RecordId>>,
}

impl Entity for DocumentFile {
    const KIND: &'static str = "document";
    const COLLECTION: &'static str = "documents";
    type Patch = DocumentPatch;

    fn validate(&self) -> Result<()> {
        require_text(Self::KIND, "name", &self.name)
    }
}
