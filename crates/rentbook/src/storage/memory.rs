//! In-process storage medium.

use std::cell::RefCell;
use std::collections::HashMap;

use crate::error::{Error, Result};

use super::StorageMedium;

/// A [`StorageMedium`] kept in a map for the life of the process.
///
/// An optional quota caps the total stored bytes; a write that would
/// exceed it fails and leaves the previous value in place, the way a
/// full browser storage area behaves.
#[derive(Debug, Default)]
pub struct MemoryMedium {
    entries: RefCell<HashMap<String, String>>,
    quota_bytes: Option<usize>,
}

impl MemoryMedium {
    /// Create an empty, unbounded medium.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty medium that holds at most `quota_bytes` of keys and values.
    #[must_use]
    pub fn with_quota(quota_bytes: usize) -> Self {
        Self {
            entries: RefCell::default(),
            quota_bytes: Some(quota_bytes),
        }
    }

    /// Number of keys stored.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    /// Whether nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    /// Total bytes of keys and values stored.
    #[must_use]
    pub fn used_bytes(&self) -> usize {
        self.entries
            .borrow()
            .iter()
            .map(|(k, v)| k.len() + v.len())
            .sum()
    }
}

impl StorageMedium for MemoryMedium {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        if let Some(quota) = self.quota_bytes {
            let current = self
                .entries
                .borrow()
                .get(key)
                .map_or(0, |v| key.len() + v.len());
            let needed = self.used_bytes() - current + key.len() + value.len();
            if needed > quota {
                return Err(Error::medium_write(
                    key,
                    format!("quota of {quota} bytes exceeded ({needed} needed)"),
                ));
            }
        }

        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_absent() {
        let medium = MemoryMedium::new();
        assert!(medium.get("missing").unwrap().is_none());
        assert!(medium.is_empty());
    }

    #[test]
    fn test_set_and_get() {
        let medium = MemoryMedium::new();
        medium.set("k", "[]").unwrap();
        assert_eq!(medium.get("k").unwrap().as_deref(), Some("[]"));
        assert_eq!(medium.len(), 1);
    }

    #[test]
    fn test_set_overwrites() {
        let medium = MemoryMedium::new();
        medium.set("k", "one").unwrap();
        medium.set("k", "two").unwrap();
        assert_eq!(medium.get("k").unwrap().as_deref(), Some("two"));
        assert_eq!(medium.used_bytes(), 4);
    }

    #[test]
    fn test_quota_rejects_and_keeps_previous_value() {
        let medium = MemoryMedium::with_quota(10);
        medium.set("k", "small").unwrap();

        let err = medium.set("k", "far too large a value").unwrap_err();
        assert!(err.to_string().contains("quota"));
        assert_eq!(medium.get("k").unwrap().as_deref(), Some("small"));
    }

    #[test]
    fn test_quota_counts_replaced_value_once() {
        let medium = MemoryMedium::with_quota(6);
        medium.set("k", "abcde").unwrap();
        medium.set("k", "edcba").unwrap();
        assert_eq!(medium.used_bytes(), 6);
    }
}
