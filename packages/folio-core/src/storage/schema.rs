//! # Store Schema
//!
//! SQL for the partition catalog and per-partition tables.
//!
//! ## Schema Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          STORE SCHEMA                                   │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  ┌─────────────────┐    ┌─────────────────┐    ┌───────────────────┐   │
//! │  │   store_meta    │    │   partitions    │    │  part_<name>      │   │
//! │  ├─────────────────┤    ├─────────────────┤    ├───────────────────┤   │
//! │  │ id (=1)         │    │ name            │───►│ record_key (PK)   │   │
//! │  │ name            │    │ key_path        │    │ id                │   │
//! │  │ version         │    │ order_index     │    │ name              │   │
//! │  └─────────────────┘    │ created_at      │    │ mime_type, kind   │   │
//! │                         └─────────────────┘    │ encoded_data      │   │
//! │                                                │ size_bytes        │   │
//! │                                                │ created_at        │   │
//! │                                                └───────────────────┘   │
//! │                                                                         │
//! │  Upgrades are additive: a higher version creates missing partitions    │
//! │  and indexes. Nothing is ever dropped or rewritten.                    │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::{Error, Result};
use crate::media::MediaRecord;

/// Schema version used when the configuration does not name one
pub const DEFAULT_SCHEMA_VERSION: u32 = 1;

/// Longest accepted partition name
pub const MAX_PARTITION_NAME_LEN: usize = 64;

/// SQL to create the catalog tables
pub const CREATE_CATALOG: &str = r#"
-- Store name and schema version (single row)
CREATE TABLE IF NOT EXISTS store_meta (
    id INTEGER PRIMARY KEY CHECK (id = 1),
    name TEXT NOT NULL,
    version INTEGER NOT NULL
);

-- Declared partitions
CREATE TABLE IF NOT EXISTS partitions (
    name TEXT PRIMARY KEY,
    -- Record field used as the key ('id' or 'name')
    key_path TEXT NOT NULL,
    -- Record field with a secondary ordering index, if any
    order_index TEXT,
    created_at INTEGER NOT NULL
);
"#;

/// Record field that can carry a secondary ordering index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OrderIndex {
    /// `createdAt`
    CreatedAt,
    /// `name`
    Name,
    /// `sizeBytes`
    SizeBytes,
}

impl OrderIndex {
    /// Record field name as declared in specs.
    pub fn field(&self) -> &'static str {
        match self {
            OrderIndex::CreatedAt => "createdAt",
            OrderIndex::Name => "name",
            OrderIndex::SizeBytes => "sizeBytes",
        }
    }

    /// Backing column.
    pub fn column(&self) -> &'static str {
        match self {
            OrderIndex::CreatedAt => "created_at",
            OrderIndex::Name => "name",
            OrderIndex::SizeBytes => "size_bytes",
        }
    }

    /// Parse a field name from the catalog.
    pub fn from_field(field: &str) -> Option<Self> {
        match field {
            "createdAt" => Some(OrderIndex::CreatedAt),
            "name" => Some(OrderIndex::Name),
            "sizeBytes" => Some(OrderIndex::SizeBytes),
            _ => None,
        }
    }
}

/// Declaration of one partition: its name, key field and optional index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionSpec {
    /// Partition name (`[A-Za-z0-9_]+`)
    pub name: String,
    /// Record field used as the key
    pub key_path: String,
    /// Optional secondary ordering index
    pub order_index: Option<OrderIndex>,
}

impl PartitionSpec {
    /// Declare a partition keyed by `key_path`.
    pub fn new(name: impl Into<String>, key_path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            key_path: key_path.into(),
            order_index: None,
        }
    }

    /// Add a secondary ordering index.
    pub fn with_order_index(mut self, index: OrderIndex) -> Self {
        self.order_index = Some(index);
        self
    }

    /// Reject names that cannot be used as table identifiers and unknown key paths.
    pub fn validate(&self) -> Result<()> {
        let name_ok = !self.name.is_empty()
            && self.name.len() <= MAX_PARTITION_NAME_LEN
            && self.name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
        if !name_ok {
            return Err(Error::InvalidPartition(format!(
                "'{}' must be 1-{} ASCII letters, digits or underscores",
                self.name, MAX_PARTITION_NAME_LEN
            )));
        }

        if !matches!(self.key_path.as_str(), "id" | "name") {
            return Err(Error::InvalidPartition(format!(
                "'{}' has unsupported key path '{}'",
                self.name, self.key_path
            )));
        }

        Ok(())
    }

    /// Backing table name.
    pub fn table_name(&self) -> String {
        format!("part_{}", self.name)
    }

    /// Key of `record` under this partition's key path.
    pub fn key_of<'a>(&self, record: &'a MediaRecord) -> &'a str {
        match self.key_path.as_str() {
            "name" => &record.name,
            _ => &record.id,
        }
    }

    /// SQL creating this partition's table and index.
    pub fn create_sql(&self) -> String {
        let table = self.table_name();
        let mut sql = format!(
            r#"
CREATE TABLE IF NOT EXISTS "{table}" (
    record_key TEXT PRIMARY KEY,
    id TEXT NOT NULL,
    name TEXT NOT NULL,
    mime_type TEXT NOT NULL,
    kind TEXT NOT NULL,
    encoded_data TEXT NOT NULL,
    size_bytes INTEGER NOT NULL,
    created_at INTEGER NOT NULL
);
"#
        );

        if let Some(index) = self.order_index {
            sql.push_str(&format!(
                "CREATE INDEX IF NOT EXISTS \"idx_{table}_{col}\" ON \"{table}\"({col});\n",
                table = table,
                col = index.column(),
            ));
        }

        sql
    }
}
