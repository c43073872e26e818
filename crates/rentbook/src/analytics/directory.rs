//! Apartment name lookup for listings.

use std::collections::HashMap;

use tracing::warn;

use crate::model::{Apartment, Record, RecordId};

/// Label for a ledger row without a resolvable apartment.
pub const NO_APARTMENT: &str = "-";

/// Label for a tenant not assigned to any apartment.
pub const UNASSIGNED: &str = "Unassigned";

/// Label for a tenant whose apartment no longer exists.
pub const UNKNOWN_APARTMENT: &str = "Unknown";

/// Label for a document not tied to an apartment.
pub const GLOBAL_DOCUMENT: &str = "Global";

/// Resolves apartment references to display names.
///
/// References are never enforced, so every lookup has a fallback label
/// depending on where the name is shown.
#[derive(Debug, Clone, Default)]
pub struct ApartmentDirectory {
    names: HashMap<RecordId, String>,
}

impl ApartmentDirectory {
    /// Build the directory from a snapshot of the apartments.
    #[must_use]
    pub fn new(apartments: &[Record<Apartment>]) -> Self {
        let names = apartments
            .iter()
            .map(|a| (a.id.clone(), a.name.clone()))
            .collect();
        Self { names }
    }

    /// Name of the apartment, if it exists.
    #[must_use]
    pub fn name_of(&self, id: &RecordId) -> Option<&str> {
        self.names.get(id).map(String::as_str)
    }

    /// Whether `id` refers to an existing apartment.
    #[must_use]
    pub fn contains(&self, id: &RecordId) -> bool {
        self.names.contains_key(id)
    }

    /// Label shown next to a transaction.
    #[must_use]
    pub fn transaction_label(&self, id: Option<&RecordId>) -> &str {
        self.resolve(id, NO_APARTMENT, NO_APARTMENT)
    }

    /// Label shown next to a tenant.
    #[must_use]
    pub fn tenant_label(&self, id: Option<&RecordId>) -> &str {
        self.resolve(id, UNASSIGNED, UNKNOWN_APARTMENT)
    }

    /// Label shown next to a document.
    #[must_use]
    pub fn document_label(&self, id: Option<&RecordId>) -> &str {
        self.resolve(id, GLOBAL_DOCUMENT, GLOBAL_DOCUMENT)
    }

    fn resolve<'a>(&'a self, id: Option<&RecordId>, absent: &'a str, dangling: &'a str) -> &'a str {
        let Some(id) = id else {
            return absent;
        };
        if let Some(name) = self.name_of(id) {
            name
        } else {
            warn!(apartment_id = %id, "reference to missing apartment");
            dangling
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn directory() -> ApartmentDirectory {
        ApartmentDirectory::new(&[Record::new(
            RecordId::from("a1"),
            Apartment {
                name: "Sunny Loft".to_string(),
                address: "Main St 1".to_string(),
                ..Apartment::default()
            },
        )])
    }

    #[test]
    fn test_resolves_existing() {
        let dir = directory();
        let id = RecordId::from("a1");

        assert_eq!(dir.name_of(&id), Some("Sunny Loft"));
        assert_eq!(dir.transaction_label(Some(&id)), "Sunny Loft");
        assert_eq!(dir.tenant_label(Some(&id)), "Sunny Loft");
        assert_eq!(dir.document_label(Some(&id)), "Sunny Loft");
    }

    #[test]
    fn test_absent_reference_labels() {
        let dir = directory();
        assert_eq!(dir.transaction_label(None), "-");
        assert_eq!(dir.tenant_label(None), "Unassigned");
        assert_eq!(dir.document_label(None), "Global");
    }

    #[test]
    fn test_dangling_reference_labels() {
        let dir = directory();
        let gone = RecordId::from("gone");

        assert!(!dir.contains(&gone));
        assert_eq!(dir.transaction_label(Some(&gone)), "-");
        assert_eq!(dir.tenant_label(Some(&gone)), "Unknown");
        assert_eq!(dir.document_label(Some(&gone)), "Global");
    }

    #[test]
    fn test_empty_directory() {
        let dir = ApartmentDirectory::default();
        assert_eq!(dir.name_of(&RecordId::from("a1")), None);
    }
}
