//! # Database
//!
//! SQLite-backed partitioned record store.
//!
//! ## Database Operations
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      DATABASE OPERATIONS                                │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  ┌─────────────────┐                                                   │
//! │  │ LocalMediaStore │  Async API (blocking pool)                        │
//! │  └────────┬────────┘                                                   │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  ┌─────────────────┐                                                   │
//! │  │    Database     │  Synchronous API                                  │
//! │  │   (this file)   │  - open: catalog + partitions, one transaction    │
//! │  │                 │  - put / get / get_all / delete per partition     │
//! │  └────────┬────────┘                                                   │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  ┌─────────────────┐                                                   │
//! │  │   SQLite DB     │  - In-memory for tests                            │
//! │  │                 │  - File for production                            │
//! │  └─────────────────┘                                                   │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every write is a single statement, so a replace is atomic and a partially
//! written record is never observable. SQLite serializes concurrent writers;
//! this type adds no locking beyond guarding the one connection.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use rusqlite::{params, Connection, ErrorCode, OptionalExtension, Row, TransactionBehavior};

use super::schema::{self, OrderIndex, PartitionSpec};
use crate::error::{Error, Result};
use crate::media::{MediaKind, MediaRecord};

/// How long to wait on a lock held by another connection before giving up.
const BUSY_TIMEOUT: Duration = Duration::from_millis(2_000);

const RECORD_COLUMNS: &str = "id, name, mime_type, kind, encoded_data, size_bytes, created_at";

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Path to the database file (None for in-memory)
    pub path: Option<PathBuf>,
    /// Store name, recorded in the catalog
    pub name: String,
    /// Requested schema version
    pub version: u32,
    /// Partitions that must exist after open
    pub partitions: Vec<PartitionSpec>,
}

impl DatabaseConfig {
    /// In-memory store with the given partitions at the default version.
    pub fn in_memory(name: impl Into<String>, partitions: Vec<PartitionSpec>) -> Self {
        Self {
            path: None,
            name: name.into(),
            version: schema::DEFAULT_SCHEMA_VERSION,
            partitions,
        }
    }
}

/// The main database handle
pub struct Database {
    /// The underlying SQLite connection
    conn: Arc<Mutex<Connection>>,
    /// Store name
    name: String,
    /// Schema version after open
    version: u32,
    /// Every partition in the catalog, by name
    partitions: HashMap<String, PartitionSpec>,
}

impl Database {
    /// Open or create a store and make sure every declared partition exists.
    ///
    /// Fails with `StorageUnavailable` when the file cannot be opened,
    /// `StorageBlocked` when another connection holds the write lock past the
    /// busy timeout, and `StorageVersionConflict` when the file was written by
    /// a newer schema.
    pub fn open(config: &DatabaseConfig) -> Result<Self> {
        let mut seen = std::collections::HashSet::new();
        for spec in &config.partitions {
            spec.validate()?;
            if !seen.insert(spec.name.as_str()) {
                return Err(Error::InvalidPartition(format!(
                    "'{}' declared more than once",
                    spec.name
                )));
            }
        }

        let mut conn = match &config.path {
            Some(path) => {
                if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    std::fs::create_dir_all(parent).map_err(|e| {
                        Error::StorageUnavailable(format!(
                            "Failed to create {}: {}",
                            parent.display(),
                            e
                        ))
                    })?;
                }
                Connection::open(path).map_err(|e| {
                    Error::StorageUnavailable(format!("Failed to open database: {}", e))
                })?
            }
            None => Connection::open_in_memory().map_err(|e| {
                Error::StorageUnavailable(format!("Failed to create in-memory database: {}", e))
            })?,
        };

        conn.busy_timeout(BUSY_TIMEOUT).map_err(open_err)?;

        let (version, partitions) = Self::init_schema(&mut conn, config)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            name: config.name.clone(),
            version,
            partitions,
        })
    }

    /// Create the catalog, bump the version and create missing partitions,
    /// all inside one immediate transaction.
    fn init_schema(
        conn: &mut Connection,
        config: &DatabaseConfig,
    ) -> Result<(u32, HashMap<String, PartitionSpec>)> {
        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(open_err)?;

        tx.execute_batch(schema::CREATE_CATALOG).map_err(open_err)?;

        let found: Option<u32> = tx
            .query_row("SELECT version FROM store_meta WHERE id = 1", [], |row| row.get(0))
            .optional()
            .map_err(open_err)?;

        let now = crate::time::now_timestamp_millis();

        match found {
            None => {
                tx.execute(
                    "INSERT INTO store_meta (id, name, version) VALUES (1, ?1, ?2)",
                    params![config.name, config.version],
                )
                .map_err(open_err)?;
                tracing::info!(
                    store = config.name.as_str(),
                    "Store schema created (version {})",
                    config.version
                );
            }
            Some(v) if v > config.version => {
                return Err(Error::StorageVersionConflict {
                    found: v,
                    requested: config.version,
                });
            }
            Some(v) if v < config.version => {
                tracing::info!(
                    store = config.name.as_str(),
                    "Store schema version {} is older than requested {}, creating missing partitions",
                    v,
                    config.version
                );
                tx.execute(
                    "UPDATE store_meta SET version = ?1 WHERE id = 1",
                    params![config.version],
                )
                .map_err(open_err)?;
            }
            Some(v) => {
                tracing::debug!(store = config.name.as_str(), "Store schema version: {}", v);
            }
        }

        let existing = load_catalog(&tx)?;

        for spec in &config.partitions {
            if let Some(prev) = existing.get(&spec.name) {
                if prev.key_path != spec.key_path {
                    return Err(Error::InvalidPartition(format!(
                        "'{}' is keyed by '{}', cannot re-declare with '{}'",
                        spec.name, prev.key_path, spec.key_path
                    )));
                }
            } else {
                tracing::info!(partition = spec.name.as_str(), "Creating partition");
            }

            tx.execute_batch(&spec.create_sql()).map_err(open_err)?;
            tx.execute(
                "INSERT INTO partitions (name, key_path, order_index, created_at)
                 VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(name) DO UPDATE SET
                    order_index = COALESCE(excluded.order_index, partitions.order_index)",
                params![
                    spec.name,
                    spec.key_path,
                    spec.order_index.map(|i| i.field()),
                    now,
                ],
            )
            .map_err(open_err)?;
        }

        let version = config.version.max(found.unwrap_or(0));
        let partitions = load_catalog(&tx)?;

        tx.commit().map_err(open_err)?;

        Ok((version, partitions))
    }

    // ========================================================================
    // CATALOG
    // ========================================================================

    /// Store name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Schema version after open
    pub fn version(&self) -> u32 {
        self.version
    }

    /// Names of every partition, sorted
    pub fn partition_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.partitions.keys().cloned().collect();
        names.sort();
        names
    }

    /// Spec of a partition
    pub fn partition(&self, name: &str) -> Result<&PartitionSpec> {
        self.partitions
            .get(name)
            .ok_or_else(|| Error::UnknownPartition(name.to_string()))
    }

    /// Run raw SQL on the connection, bypassing the partition catalog.
    #[cfg(test)]
    pub(crate) fn execute_raw(&self, sql: &str) {
        self.conn.lock().execute_batch(sql).unwrap();
    }

    // ========================================================================
    // RECORD OPERATIONS
    // ========================================================================

    /// Insert or replace a record under its key.
    pub fn put_record(&self, partition: &str, record: &MediaRecord) -> Result<()> {
        let spec = self.partition(partition)?;
        let key = spec.key_of(record);
        let conn = self.conn.lock();

        conn.execute(
            &format!(
                "INSERT OR REPLACE INTO \"{}\" (record_key, {}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                spec.table_name(),
                RECORD_COLUMNS
            ),
            params![
                key,
                record.id,
                record.name,
                record.mime_type,
                record.kind.as_str(),
                record.encoded_data,
                record.size_bytes as i64,
                record.created_at,
            ],
        )
        .map_err(|e| write_err(partition, e))?;

        tracing::debug!(partition, key, size = record.size_bytes, "Record stored");
        Ok(())
    }

    /// Point lookup. `None` when the key is absent.
    pub fn get_record(&self, partition: &str, key: &str) -> Result<Option<MediaRecord>> {
        let spec = self.partition(partition)?;
        let conn = self.conn.lock();

        conn.query_row(
            &format!(
                "SELECT {} FROM \"{}\" WHERE record_key = ?1",
                RECORD_COLUMNS,
                spec.table_name()
            ),
            params![key],
            row_to_record,
        )
        .optional()
        .map_err(|e| read_err(partition, e))
    }

    /// Every record of a partition, in no particular order.
    pub fn get_all_records(&self, partition: &str) -> Result<Vec<MediaRecord>> {
        let spec = self.partition(partition)?;
        let sql = format!("SELECT {} FROM \"{}\"", RECORD_COLUMNS, spec.table_name());
        self.query_records(partition, &sql)
    }

    /// Every record of a partition, ordered by its secondary index.
    pub fn get_all_records_ordered(&self, partition: &str) -> Result<Vec<MediaRecord>> {
        let spec = self.partition(partition)?;
        let index: OrderIndex = spec.order_index.ok_or_else(|| {
            Error::InvalidPartition(format!("'{}' has no ordering index", partition))
        })?;
        let sql = format!(
            "SELECT {} FROM \"{}\" ORDER BY {}, record_key",
            RECORD_COLUMNS,
            spec.table_name(),
            index.column()
        );
        self.query_records(partition, &sql)
    }

    /// Remove a record. Returns whether anything was removed; an absent key
    /// is not an error.
    pub fn delete_record(&self, partition: &str, key: &str) -> Result<bool> {
        let spec = self.partition(partition)?;
        let conn = self.conn.lock();

        let rows = conn
            .execute(
                &format!("DELETE FROM \"{}\" WHERE record_key = ?1", spec.table_name()),
                params![key],
            )
            .map_err(|e| write_err(partition, e))?;

        tracing::debug!(partition, key, removed = rows > 0, "Record deleted");
        Ok(rows > 0)
    }

    /// Number of records in a partition.
    pub fn count_records(&self, partition: &str) -> Result<usize> {
        let spec = self.partition(partition)?;
        let conn = self.conn.lock();

        let count: i64 = conn
            .query_row(
                &format!("SELECT COUNT(*) FROM \"{}\"", spec.table_name()),
                [],
                |row| row.get(0),
            )
            .map_err(|e| read_err(partition, e))?;

        Ok(count as usize)
    }

    fn query_records(&self, partition: &str, sql: &str) -> Result<Vec<MediaRecord>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(sql).map_err(|e| read_err(partition, e))?;

        let rows = stmt
            .query_map([], row_to_record)
            .map_err(|e| read_err(partition, e))?;

        let mut records = Vec::new();
        for row in rows {
            records.push(row.map_err(|e| read_err(partition, e))?);
        }

        Ok(records)
    }
}

// ============================================================================
// HELPERS
// ============================================================================

fn load_catalog(conn: &Connection) -> Result<HashMap<String, PartitionSpec>> {
    let mut stmt = conn
        .prepare("SELECT name, key_path, order_index FROM partitions")
        .map_err(open_err)?;

    let rows = stmt
        .query_map([], |row| {
            let order_index: Option<String> = row.get(2)?;
            Ok(PartitionSpec {
                name: row.get(0)?,
                key_path: row.get(1)?,
                order_index: order_index.as_deref().and_then(OrderIndex::from_field),
            })
        })
        .map_err(open_err)?;

    let mut catalog = HashMap::new();
    for row in rows {
        let spec = row.map_err(open_err)?;
        catalog.insert(spec.name.clone(), spec);
    }

    Ok(catalog)
}

fn row_to_record(row: &Row<'_>) -> rusqlite::Result<MediaRecord> {
    let mime_type: String = row.get(2)?;
    let kind: String = row.get(3)?;
    let size_bytes: i64 = row.get(5)?;

    Ok(MediaRecord {
        id: row.get(0)?,
        name: row.get(1)?,
        kind: MediaKind::parse(&kind).unwrap_or_else(|| MediaKind::from_mime(&mime_type)),
        mime_type,
        encoded_data: row.get(4)?,
        size_bytes: size_bytes.max(0) as u64,
        created_at: row.get(6)?,
    })
}

fn error_code(err: &rusqlite::Error) -> Option<ErrorCode> {
    match err {
        rusqlite::Error::SqliteFailure(e, _) => Some(e.code),
        _ => None,
    }
}

fn open_err(err: rusqlite::Error) -> Error {
    match error_code(&err) {
        Some(ErrorCode::DatabaseBusy) | Some(ErrorCode::DatabaseLocked) => {
            Error::StorageBlocked(err.to_string())
        }
        _ => Error::StorageUnavailable(err.to_string()),
    }
}

fn write_err(partition: &str, err: rusqlite::Error) -> Error {
    let reason = match error_code(&err) {
        Some(ErrorCode::DiskFull) => "quota exceeded".to_string(),
        _ => err.to_string(),
    };
    tracing::error!(partition, error = %err, "Store write failed");
    Error::StorageWriteError(format!("{}: {}", partition, reason))
}

fn read_err(partition: &str, err: rusqlite::Error) -> Error {
    tracing::error!(partition, error = %err, "Store read failed");
    Error::StorageReadError(format!("{}: {}", partition, err))
}

// ============================================================================
// TESTS
// ============================================================================
