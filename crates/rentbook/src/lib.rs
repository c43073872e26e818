//! `rentbook` - A local ledger for a small rental portfolio
//!
//! This library keeps apartments, tenants, transactions, and documents in a
//! string key-value medium and derives the dashboard figures from them.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod analytics;
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod model;
pub mod storage;

pub use config::Config;
pub use error::{Error, Result};
pub use logging::init_logging;
pub use model::{Apartment, DocumentFile, Entity, Record, RecordId, Tenant, Transaction};
pub use storage::{MemoryMedium, SqliteMedium, StorageMedium, Store, StoreStats};
