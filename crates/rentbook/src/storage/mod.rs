//! Storage layer for rentbook.
//!
//! Every collection is kept as one serialized JSON array under its own
//! key in a [`StorageMedium`]. All writes are a full read-modify-write of
//! that one key; there is no locking and no atomicity across collections.

pub mod ids;
pub mod memory;
pub mod migrations;
pub mod schema;
pub mod sqlite;

use std::marker::PhantomData;

use serde::Serialize;
use tracing::{debug, trace};

use crate::config::StorageConfig;
use crate::error::{Error, Result};
use crate::model::{merge_shallow, Apartment, DocumentFile, Entity, Record, Tenant, Transaction};

pub use ids::IdGenerator;
pub use memory::MemoryMedium;
pub use sqlite::{KeyStats, MediumStats, SqliteMedium};

/// Default namespace prefix for collection keys.
pub const DEFAULT_KEY_PREFIX: &str = "vit";

/// Default generation marker for collection keys.
pub const DEFAULT_GENERATION: &str = "v2";

/// A string key-value medium holding the serialized collections.
///
/// A `set` must either fully replace the value under `key` or fail and
/// leave the previous value intact.
pub trait StorageMedium {
    /// Read the value stored under `key`, or `None` if the key is absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the medium cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Replace the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the medium rejects the write.
    fn set(&self, key: &str, value: &str) -> Result<()>;
}

impl<M: StorageMedium + ?Sized> StorageMedium for Box<M> {
    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }
}

impl<M: StorageMedium + ?Sized> StorageMedium for &M {
    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }
}

/// Naming scheme for collection keys: `{prefix}_{collection}_{generation}`.
///
/// Bumping the generation hides all data written under the previous one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeySpace {
    prefix: String,
    generation: String,
}

impl KeySpace {
    /// Create a key space.
    #[must_use]
    pub fn new(prefix: impl Into<String>, generation: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            generation: generation.into(),
        }
    }

    /// Storage key of the given collection.
    #[must_use]
    pub fn key_for(&self, collection: &str) -> String {
        format!("{}_{}_{}", self.prefix, collection, self.generation)
    }

    /// The generation marker.
    #[must_use]
    pub fn generation(&self) -> &str {
        &self.generation
    }
}

impl Default for KeySpace {
    fn default() -> Self {
        Self::new(DEFAULT_KEY_PREFIX, DEFAULT_GENERATION)
    }
}

/// Record store over a storage medium.
///
/// Hands out one [`Collection`] per entity kind. The store owns the
/// serialized form of every collection; callers get disposable copies.
#[derive(Debug)]
pub struct Store<M> {
    medium: M,
    keys: KeySpace,
    ids: IdGenerator,
}

impl<M: StorageMedium> Store<M> {
    /// Create a store with the default key space and identifier length.
    #[must_use]
    pub fn new(medium: M) -> Self {
        Self::with_options(medium, KeySpace::default(), IdGenerator::default())
    }

    /// Create a store with explicit key space and identifier generator.
    #[must_use]
    pub fn with_options(medium: M, keys: KeySpace, ids: IdGenerator) -> Self {
        Self { medium, keys, ids }
    }

    /// Create a store using the storage section of the configuration.
    #[must_use]
    pub fn from_config(medium: M, config: &StorageConfig) -> Self {
        Self::with_options(
            medium,
            KeySpace::new(config.key_prefix.clone(), config.generation.clone()),
            IdGenerator::new(config.id_length),
        )
    }

    /// The underlying medium.
    #[must_use]
    pub fn medium(&self) -> &M {
        &self.medium
    }

    /// The key space in use.
    #[must_use]
    pub fn keys(&self) -> &KeySpace {
        &self.keys
    }

    /// Collection handle for any entity kind.
    #[must_use]
    pub fn collection<T: Entity>(&self) -> Collection<'_, M, T> {
        Collection {
            store: self,
            key: self.keys.key_for(T::COLLECTION),
            _entity: PhantomData,
        }
    }

    /// The apartments collection.
    #[must_use]
    pub fn apartments(&self) -> Collection<'_, M, Apartment> {
        self.collection()
    }

    /// The tenants collection.
    #[must_use]
    pub fn tenants(&self) -> Collection<'_, M, Tenant> {
        self.collection()
    }

    /// The transactions collection.
    #[must_use]
    pub fn transactions(&self) -> Collection<'_, M, Transaction> {
        self.collection()
    }

    /// The documents collection.
    #[must_use]
    pub fn documents(&self) -> Collection<'_, M, DocumentFile> {
        self.collection()
    }

    /// Count the records in every collection.
    ///
    /// # Errors
    ///
    /// Returns an error if a collection cannot be read or decoded.
    pub fn stats(&self) -> Result<StoreStats> {
        Ok(StoreStats {
            apartments: self.apartments().count()?,
            tenants: self.tenants().count()?,
            transactions: self.transactions().count()?,
            documents: self.documents().count()?,
        })
    }
}

/// Record counts per collection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StoreStats {
    /// Number of apartments.
    pub apartments: usize,
    /// Number of tenants.
    pub tenants: usize,
    /// Number of transactions.
    pub transactions: usize,
    /// Number of documents.
    pub documents: usize,
}

impl std::fmt::Display for StoreStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Apartments:    {}", self.apartments)?;
        writeln!(f, "Tenants:       {}", self.tenants)?;
        writeln!(f, "Transactions:  {}", self.transactions)?;
        write!(f, "Documents:     {}", self.documents)
    }
}

/// CRUD access to one collection.
#[derive(Debug)]
pub struct Collection<'s, M, T> {
    store: &'s Store<M>,
    key: String,
    _entity: PhantomData<T>,
}

impl<M: StorageMedium, T: Entity> Collection<'_, M, T> {
    /// Storage key of this collection.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Every stored record, in storage order.
    ///
    /// An absent key reads as an empty collection.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CorruptCollection`] if the stored value is not a
    /// valid serialized collection, or a medium error if the read fails.
    pub fn get_all(&self) -> Result<Vec<Record<T>>> {
        let Some(raw) = self.store.medium.get(&self.key)? else {
            trace!("{} is absent, reading as empty", self.key);
            return Ok(Vec::new());
        };

        serde_json::from_str(&raw).map_err(|source| Error::CorruptCollection {
            key: self.key.clone(),
            source,
        })
    }

    /// Look up a single record by identifier.
    ///
    /// # Errors
    ///
    /// Returns an error if the collection cannot be read.
    pub fn get(&self, id: &str) -> Result<Option<Record<T>>> {
        Ok(self
            .get_all()?
            .into_iter()
            .find(|record| record.id.as_str() == id))
    }

    /// Number of stored records.
    ///
    /// # Errors
    ///
    /// Returns an error if the collection cannot be read.
    pub fn count(&self) -> Result<usize> {
        Ok(self.get_all()?.len())
    }

    /// Store a new record and return it with its assigned identifier.
    ///
    /// # Errors
    ///
    /// Returns an error if the collection cannot be read or written.
    pub fn add(&self, fields: T) -> Result<Record<T>> {
        let mut records = self.get_all()?;
        let id = self
            .store
            .ids
            .generate(|candidate| records.iter().any(|r| r.id.as_str() == candidate));

        let record = Record::new(id, fields);
        records.push(record.clone());
        self.save(&records)?;

        debug!("Added {} {}", T::KIND, record.id);
        Ok(record)
    }

    /// Shallow-merge `patch` over the record with the given identifier.
    ///
    /// Fields set in the patch replace the stored fields wholesale;
    /// unset fields are kept. The collection is rewritten even when no
    /// record matches. Returns whether a record matched.
    ///
    /// # Errors
    ///
    /// Returns an error if the collection cannot be read or written, or
    /// if the merged record no longer decodes.
    pub fn update(&self, id: &str, patch: &T::Patch) -> Result<bool> {
        let mut records = self.get_all()?;
        let mut matched = false;

        for record in &mut records {
            if record.id.as_str() == id {
                *record = merge_shallow(record, patch)?;
                matched = true;
            }
        }

        self.save(&records)?;
        if matched {
            debug!("Updated {} {}", T::KIND, id);
        } else {
            debug!("No {} {} to update", T::KIND, id);
        }
        Ok(matched)
    }

    /// Remove the record with the given identifier.
    ///
    /// The collection is rewritten even when no record matches. Returns
    /// whether a record was removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the collection cannot be read or written.
    pub fn delete(&self, id: &str) -> Result<bool> {
        let records = self.get_all()?;
        let before = records.len();
        let kept: Vec<Record<T>> = records
            .into_iter()
            .filter(|record| record.id.as_str() != id)
            .collect();
        let removed = kept.len() < before;

        self.save(&kept)?;
        if removed {
            debug!("Deleted {} {}", T::KIND, id);
        }
        Ok(removed)
    }

    /// Validate `fields`, then [`add`](Self::add) them.
    ///
    /// # Errors
    ///
    /// Returns a validation error without touching the medium if the
    /// record is incomplete, otherwise any error of `add`.
    pub fn add_checked(&self, fields: T) -> Result<Record<T>> {
        fields.validate()?;
        self.add(fields)
    }

    /// Apply `patch` only if the record exists and stays valid afterwards.
    ///
    /// Returns the record as stored after the update.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RecordNotFound`] for an unknown identifier and a
    /// validation error if the merged record is incomplete. The medium is
    /// not written in either case.
    pub fn update_checked(&self, id: &str, patch: &T::Patch) -> Result<Record<T>> {
        let existing = self.get(id)?.ok_or_else(|| Error::not_found(T::KIND, id))?;
        let merged = merge_shallow(&existing, patch)?;
        merged.validate()?;
        self.update(id, patch)?;
        Ok(merged)
    }

    /// Replace the whole stored collection.
    ///
    /// Refuses to write a value that would not decode again, so one bad
    /// record cannot make the collection unreadable.
    fn save(&self, records: &[Record<T>]) -> Result<()> {
        let raw = serde_json::to_string(records)?;
        if let Err(e) = serde_json::from_str::<Vec<Record<T>>>(&raw) {
            return Err(Error::validation(
                T::KIND,
                format!("record would not read back: {e}"),
            ));
        }
        trace!("Writing {} records ({} bytes) to {}", records.len(), raw.len(), self.key);
        self.store.medium.set(&self.key, &raw)
    }
}

/// Serialize a collection the way the store persists it.
///
/// # Errors
///
/// Returns an error if a record cannot be serialized.
pub fn encode_collection<T: Entity>(records: &[Record<T>]) -> Result<String> {
    Ok(serde_json::to_string(records)?)
}

/// Decode a collection previously produced by [`encode_collection`].
///
/// # Errors
///
/// Returns an error if `raw` is not a valid serialized collection.
pub fn decode_collection<T: Entity>(raw: &str) -> Result<Vec<Record<T>>> {
    Ok(serde_json::from_str(raw)?)
}
