//! # Storage Module
//!
//! Durable, partitioned local storage for media records.
//!
//! ## Storage Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         STORAGE SYSTEM                                  │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │  LocalMediaStore (async, cloneable handle)                      │   │
//! │  │  ─────────────────────────────────────────                       │   │
//! │  │  put / get / get_all / delete, one transaction per call         │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │  SQLite Database                                                │   │
//! │  │  ───────────────                                                 │   │
//! │  │                                                                 │   │
//! │  │  Partitions (one table each):                                  │   │
//! │  │  • profilePicture - singleton, key "current"                   │   │
//! │  │  • gallery        - generated keys, createdAt index            │   │
//! │  │  • resume         - singleton, key "current"                   │   │
//! │  │                                                                 │   │
//! │  │  Versioning: single integer, additive upgrades only            │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod database;
mod schema;
mod store;

pub use database::{Database, DatabaseConfig};
pub use schema::{OrderIndex, PartitionSpec, DEFAULT_SCHEMA_VERSION};
pub use store::LocalMediaStore;

use crate::error::Result;

/// Open the store described by `config`.
pub async fn init(config: DatabaseConfig) -> Result<LocalMediaStore> {
    LocalMediaStore::open(config).await
}
