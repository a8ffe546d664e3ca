//! # Upload Controller
//!
//! Gatekeeping and encoding before anything reaches the store.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       UPLOAD STATE MACHINE                              │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  Idle ──► Validating ──┬──► Rejected                 (terminal)        │
//! │                        │                                                │
//! │                        └──► Encoding ──┬──► ReadFailed  (terminal)     │
//! │                                        │                                │
//! │                                        └──► Persisting ──┬──► WriteFailed│
//! │                                                          │              │
//! │                                                          └──► Rendered  │
//! │                                                                         │
//! │  No automatic retries. Encoding and persisting hold the region's       │
//! │  busy guard; validation does not.                                      │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::fmt;

use futures::stream::{FuturesUnordered, StreamExt};

use super::busy::BusyTracker;
use super::encoding::encode_data_uri;
use super::policy::KindPolicy;
use super::source::FileSource;
use super::{MediaRecord, Partition};
use crate::error::{Error, Result};
use crate::storage::LocalMediaStore;

/// Where an upload is, or where it stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadStage {
    /// Not started
    Idle,
    /// Checking type and size
    Validating,
    /// Failed validation
    Rejected,
    /// Reading and encoding contents
    Encoding,
    /// Contents could not be read
    ReadFailed,
    /// Writing to the store
    Persisting,
    /// Store write failed
    WriteFailed,
    /// Stored and handed to the renderer
    Rendered,
}

impl UploadStage {
    /// Whether the upload can make no further progress.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            UploadStage::Rejected
                | UploadStage::ReadFailed
                | UploadStage::WriteFailed
                | UploadStage::Rendered
        )
    }

    /// Stable name for logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            UploadStage::Idle => "idle",
            UploadStage::Validating => "validating",
            UploadStage::Rejected => "rejected",
            UploadStage::Encoding => "encoding",
            UploadStage::ReadFailed => "read_failed",
            UploadStage::Persisting => "persisting",
            UploadStage::WriteFailed => "write_failed",
            UploadStage::Rendered => "rendered",
        }
    }
}

/// A failed upload: which file, where it stopped, and why.
#[derive(Debug)]
pub struct UploadFailure {
    /// Original filename
    pub file_name: String,
    /// Target partition
    pub partition: Partition,
    /// Terminal stage reached
    pub stage: UploadStage,
    /// Cause
    pub error: Error,
}

impl UploadFailure {
    /// Toast text naming the file.
    pub fn message(&self) -> String {
        match self.stage {
            UploadStage::WriteFailed => {
                format!("Error saving {} to {}", self.file_name, self.partition.label())
            }
            _ => self.error.user_message(),
        }
    }
}

impl fmt::Display for UploadFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}): {}", self.file_name, self.stage.as_str(), self.error)
    }
}

impl std::error::Error for UploadFailure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

/// Encoded file contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Encoded {
    /// `data:<mime>;base64,...`
    pub data_uri: String,
    /// Bytes actually read
    pub size_bytes: u64,
}

/// Outcome of a multi-file upload.
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Records stored, in completion order
    pub stored: Vec<MediaRecord>,
    /// Files that failed, in completion order
    pub failures: Vec<UploadFailure>,
}

impl BatchReport {
    /// Number of files stored
    pub fn success_count(&self) -> usize {
        self.stored.len()
    }

    /// Number of files that failed
    pub fn failure_count(&self) -> usize {
        self.failures.len()
    }
}

/// Validates, encodes and persists uploads.
///
/// Without a store the controller still produces records, which then live
/// only for the session.
#[derive(Clone)]
pub struct UploadController {
    store: Option<LocalMediaStore>,
    busy: BusyTracker,
}

impl UploadController {
    /// Create a controller writing to `store`.
    pub fn new(store: Option<LocalMediaStore>) -> Self {
        Self {
            store,
            busy: BusyTracker::new(),
        }
    }

    /// Busy indicators for each region.
    pub fn busy(&self) -> &BusyTracker {
        &self.busy
    }

    /// Whether uploads are persisted.
    pub fn is_persistent(&self) -> bool {
        self.store.is_some()
    }

    /// Check a file's declared type and size against `policy`.
    pub fn validate(file: &dyn FileSource, policy: &KindPolicy) -> Result<()> {
        policy.validate(file.name(), file.mime_type(), file.size())
    }

    /// Read a file fully and encode it as a data URI.
    pub async fn encode(file: &dyn FileSource) -> Result<Encoded> {
        let bytes = file.read_all().await.map_err(|e| Error::ReadError {
            file: file.name().to_string(),
            reason: e.to_string(),
        })?;

        Ok(Encoded {
            data_uri: encode_data_uri(file.mime_type(), &bytes),
            size_bytes: bytes.len() as u64,
        })
    }

    /// Validate, encode and store one file.
    pub async fn ingest(
        &self,
        file: &dyn FileSource,
        partition: Partition,
        policy: &KindPolicy,
    ) -> std::result::Result<MediaRecord, UploadFailure> {
        let name = file.name();
        let failure = |stage: UploadStage, error: Error| {
            tracing::warn!(
                file = name,
                partition = partition.name(),
                stage = stage.as_str(),
                error = %error,
                "Upload failed"
            );
            UploadFailure {
                file_name: name.to_string(),
                partition,
                stage,
                error,
            }
        };

        trace_stage(name, partition, UploadStage::Validating);
        if let Err(e) = Self::validate(file, policy) {
            return Err(failure(UploadStage::Rejected, e));
        }

        let _busy = self.busy.begin(partition);

        trace_stage(name, partition, UploadStage::Encoding);
        let encoded = match Self::encode(file).await {
            Ok(encoded) => encoded,
            Err(e) => return Err(failure(UploadStage::ReadFailed, e)),
        };

        // The declared size can differ from what was read.
        if let Err(e) = policy.validate(name, file.mime_type(), encoded.size_bytes) {
            return Err(failure(UploadStage::Rejected, e));
        }

        let record = MediaRecord::new(
            partition,
            name,
            file.mime_type(),
            encoded.data_uri,
            encoded.size_bytes,
        );

        trace_stage(name, partition, UploadStage::Persisting);
        match &self.store {
            Some(store) => {
                if let Err(e) = store.put(partition.name(), record.clone()).await {
                    return Err(failure(UploadStage::WriteFailed, e));
                }
            }
            None => {
                tracing::warn!(
                    file = name,
                    partition = partition.name(),
                    "No persistent store, keeping upload for this session only"
                );
            }
        }

        trace_stage(name, partition, UploadStage::Rendered);
        tracing::info!(
            file = name,
            partition = partition.name(),
            id = record.id.as_str(),
            size = record.size_bytes,
            "Upload stored"
        );

        Ok(record)
    }

    /// Ingest several files concurrently.
    ///
    /// Each file is its own transaction; one failure never aborts the rest.
    /// `on_complete` runs as each file finishes, in completion order.
    pub async fn ingest_batch<F>(
        &self,
        files: &[Box<dyn FileSource>],
        partition: Partition,
        policy: &KindPolicy,
        mut on_complete: F,
    ) -> BatchReport
    where
        F: FnMut(std::result::Result<&MediaRecord, &UploadFailure>),
    {
        let mut pending: FuturesUnordered<_> = files
            .iter()
            .map(|file| self.ingest(file.as_ref(), partition, policy))
            .collect();

        let mut report = BatchReport::default();
        while let Some(outcome) = pending.next().await {
            match outcome {
                Ok(record) => {
                    on_complete(Ok(&record));
                    report.stored.push(record);
                }
                Err(failure) => {
                    on_complete(Err(&failure));
                    report.failures.push(failure);
                }
            }
        }

        tracing::info!(
            partition = partition.name(),
            stored = report.success_count(),
            failed = report.failure_count(),
            "Batch upload finished"
        );

        report
    }
}

fn trace_stage(file: &str, partition: Partition, stage: UploadStage) {
    tracing::trace!(file, partition = partition.name(), stage = stage.as_str(), "Upload stage");
}
