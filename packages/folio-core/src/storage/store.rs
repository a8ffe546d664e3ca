//! Async front of the record store.
//!
//! One `LocalMediaStore` is opened at startup and cloned into whoever needs
//! it. Each call hops to the blocking pool, so SQLite I/O never stalls the
//! event loop, and each call is its own transaction.

use std::sync::Arc;

use super::database::{Database, DatabaseConfig};
use crate::error::Result;
use crate::media::MediaRecord;

/// Shared handle to the partitioned media store.
#[derive(Clone)]
pub struct LocalMediaStore {
    db: Arc<Database>,
}

impl LocalMediaStore {
    /// Open the store, creating missing partitions.
    pub async fn open(config: DatabaseConfig) -> Result<Self> {
        let db = tokio::task::spawn_blocking(move || Database::open(&config)).await??;

        tracing::info!(
            store = db.name(),
            version = db.version(),
            partitions = ?db.partition_names(),
            "Local media store opened"
        );

        Ok(Self { db: Arc::new(db) })
    }

    /// Wrap an already opened database.
    pub fn from_database(db: Database) -> Self {
        Self { db: Arc::new(db) }
    }

    /// Store name
    pub fn name(&self) -> &str {
        self.db.name()
    }

    /// Schema version
    pub fn version(&self) -> u32 {
        self.db.version()
    }

    /// Names of every partition
    pub fn partitions(&self) -> Vec<String> {
        self.db.partition_names()
    }

    /// Upsert `record` by key.
    pub async fn put(&self, partition: &str, record: MediaRecord) -> Result<()> {
        let partition = partition.to_string();
        self.run(move |db| db.put_record(&partition, &record)).await
    }

    /// Point lookup; `None` when nothing is stored under `key`.
    pub async fn get(&self, partition: &str, key: &str) -> Result<Option<MediaRecord>> {
        let (partition, key) = (partition.to_string(), key.to_string());
        self.run(move |db| db.get_record(&partition, &key)).await
    }

    /// Every record of a partition, unordered.
    pub async fn get_all(&self, partition: &str) -> Result<Vec<MediaRecord>> {
        let partition = partition.to_string();
        self.run(move |db| db.get_all_records(&partition)).await
    }

    /// Every record of a partition, ordered by its declared index.
    pub async fn get_all_ordered(&self, partition: &str) -> Result<Vec<MediaRecord>> {
        let partition = partition.to_string();
        self.run(move |db| db.get_all_records_ordered(&partition)).await
    }

    /// Remove the record under `key`. Removing an absent key succeeds and
    /// returns `false`.
    pub async fn delete(&self, partition: &str, key: &str) -> Result<bool> {
        let (partition, key) = (partition.to_string(), key.to_string());
        self.run(move |db| db.delete_record(&partition, &key)).await
    }

    /// Number of records in a partition.
    pub async fn count(&self, partition: &str) -> Result<usize> {
        let partition = partition.to_string();
        self.run(move |db| db.count_records(&partition)).await
    }

    /// Run raw SQL on the underlying connection.
    #[cfg(test)]
    pub(crate) fn execute_raw(&self, sql: &str) {
        self.db.execute_raw(sql);
    }

    async fn run<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Database) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let db = Arc::clone(&self.db);
        tokio::task::spawn_blocking(move || f(db.as_ref())).await?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::media::{MediaKind, Partition, SENTINEL_ID};

    async fn store() -> LocalMediaStore {
        LocalMediaStore::open(DatabaseConfig::in_memory("test", Partition::specs()))
            .await
            .unwrap()
    }

    fn pdf(name: &str) -> MediaRecord {
        MediaRecord {
            id: SENTINEL_ID.to_string(),
            name: name.to_string(),
            mime_type: "application/pdf".to_string(),
            encoded_data: "data:application/pdf;base64,JVBERi0=".to_string(),
            size_bytes: 5,
            created_at: 1,
            kind: MediaKind::Document,
        }
    }

    #[tokio::test]
    async fn test_async_round_trip() {
        let store = store().await;
        store.put("resume", pdf("cv.pdf")).await.unwrap();

        let loaded = store.get("resume", SENTINEL_ID).await.unwrap().unwrap();
        assert_eq!(loaded, pdf("cv.pdf"));
        assert_eq!(store.count("resume").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_clones_share_one_store() {
        let store = store().await;
        let other = store.clone();
        store.put("resume", pdf("cv.pdf")).await.unwrap();
        assert!(other.get("resume", SENTINEL_ID).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_delete_absent_is_ok() {
        let store = store().await;
        assert!(!store.delete("gallery", "missing").await.unwrap());
    }

    #[tokio::test]
    async fn test_unknown_partition_reported() {
        let store = store().await;
        assert!(matches!(store.get_all("mediaItems").await, Err(Error::UnknownPartition(_))));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_puts_all_land() {
        let store = store().await;
        let mut handles = Vec::new();
        for i in 0..16 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                let mut record = pdf(&format!("{}.pdf", i));
                record.id = format!("id-{}", i);
                store.put("gallery", record).await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }
        assert_eq!(store.get_all("gallery").await.unwrap().len(), 16);
    }
}
