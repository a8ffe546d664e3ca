//! # Media
//!
//! The record model shared by storage, uploads and presentation.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          UPLOAD PIPELINE                                │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  FileSource ──► validate ──► encode ──► LocalMediaStore::put ──► render │
//! │                 (policy)     (data URI)  (one transaction)             │
//! │                                                                         │
//! │  profilePicture  sentinel id "current"   image/*                 5 MB  │
//! │  gallery         generated id            image/* video/* pdf    50 MB  │
//! │  resume          sentinel id "current"   application/pdf        10 MB  │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod busy;
pub mod encoding;
pub mod policy;
pub mod source;
pub mod upload;

pub use busy::{BusyGuard, BusyTracker};
pub use encoding::{decode_data_uri, encode_data_uri, format_file_size, DecodedDataUri};
pub use policy::{KindPolicy, PolicyTable};
pub use source::{mime_from_extension, DiskFile, FileSource, MemoryFile};
pub use upload::{BatchReport, UploadController, UploadFailure, UploadStage};

use serde::Serialize;

use crate::error::Result;
use crate::storage::{OrderIndex, PartitionSpec};

/// Fixed key used by partitions that hold at most one record.
pub const SENTINEL_ID: &str = "current";

/// Coarse media category that drives the renderer choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    /// Rendered with an image element
    Image,
    /// Rendered with a video element
    Video,
    /// Rendered as a placeholder tile, opened in a document frame
    Document,
}

impl MediaKind {
    /// Derive the kind from a MIME type.
    pub fn from_mime(mime_type: &str) -> Self {
        let mime = mime_type.to_ascii_lowercase();
        if mime.starts_with("video/") {
            MediaKind::Video
        } else if mime.starts_with("image/") {
            MediaKind::Image
        } else {
            MediaKind::Document
        }
    }

    /// Stable lowercase tag, as stored.
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Image => "image",
            MediaKind::Video => "video",
            MediaKind::Document => "document",
        }
    }

    /// Parse a stored tag.
    pub fn parse(tag: &str) -> Option<Self> {
        match tag {
            "image" => Some(MediaKind::Image),
            "video" => Some(MediaKind::Video),
            "document" => Some(MediaKind::Document),
            _ => None,
        }
    }
}

/// The three partitions of the portfolio page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Partition {
    /// Singleton: the current profile picture
    ProfilePicture,
    /// Many records, ordered by `created_at`
    Gallery,
    /// Singleton: the current résumé
    Resume,
}

impl Partition {
    /// All partitions, in declaration order.
    pub const ALL: [Partition; 3] = [Partition::ProfilePicture, Partition::Gallery, Partition::Resume];

    /// Storage name of the partition.
    pub fn name(&self) -> &'static str {
        match self {
            Partition::ProfilePicture => "profilePicture",
            Partition::Gallery => "gallery",
            Partition::Resume => "resume",
        }
    }

    /// Human label used in toasts and busy indicators.
    pub fn label(&self) -> &'static str {
        match self {
            Partition::ProfilePicture => "profile picture",
            Partition::Gallery => "gallery",
            Partition::Resume => "resume",
        }
    }

    /// Whether this partition holds at most one record under [`SENTINEL_ID`].
    pub fn is_singleton(&self) -> bool {
        !matches!(self, Partition::Gallery)
    }

    /// Look up a partition by its storage name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.name() == name)
    }

    /// How this partition is declared at open.
    pub fn spec(&self) -> PartitionSpec {
        match self {
            Partition::Gallery => {
                PartitionSpec::new(self.name(), "id").with_order_index(OrderIndex::CreatedAt)
            }
            _ => PartitionSpec::new(self.name(), "id"),
        }
    }

    /// Specs for every portfolio partition.
    pub fn specs() -> Vec<PartitionSpec> {
        Self::ALL.iter().map(Partition::spec).collect()
    }
}

/// One stored upload plus its metadata.
///
/// Records are replaced whole; there are no partial field updates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaRecord {
    /// Key, unique per partition
    pub id: String,
    /// Original filename (display only)
    pub name: String,
    /// Validated MIME type
    pub mime_type: String,
    /// `data:<mime>;base64,<payload>`
    pub encoded_data: String,
    /// Original byte length
    pub size_bytes: u64,
    /// Insertion time, epoch milliseconds
    pub created_at: i64,
    /// Renderer choice
    pub kind: MediaKind,
}

impl MediaRecord {
    /// Build a record for `partition`, choosing the key the partition expects.
    pub fn new(
        partition: Partition,
        name: &str,
        mime_type: &str,
        encoded_data: String,
        size_bytes: u64,
    ) -> Self {
        let id = if partition.is_singleton() {
            SENTINEL_ID.to_string()
        } else {
            generate_id()
        };

        Self {
            id,
            name: name.to_string(),
            mime_type: mime_type.to_string(),
            encoded_data,
            size_bytes,
            created_at: crate::time::now_timestamp_millis(),
            kind: MediaKind::from_mime(mime_type),
        }
    }

    /// Human-readable size, e.g. `"1.5 MB"`.
    pub fn size_label(&self) -> String {
        format_file_size(self.size_bytes)
    }
}

/// Record metadata without the payload, as listed in exports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordSummary {
    /// Key
    pub id: String,
    /// Original filename
    pub name: String,
    /// Validated MIME type
    pub mime_type: String,
    /// Renderer choice
    pub kind: MediaKind,
    /// Original byte length
    pub size_bytes: u64,
    /// Insertion time, epoch milliseconds
    pub created_at: i64,
}

impl From<&MediaRecord> for RecordSummary {
    fn from(record: &MediaRecord) -> Self {
        Self {
            id: record.id.clone(),
            name: record.name.clone(),
            mime_type: record.mime_type.clone(),
            kind: record.kind,
            size_bytes: record.size_bytes,
            created_at: record.created_at,
        }
    }
}

/// Pretty-printed JSON array of record summaries, in the order given.
pub fn summaries_json(records: &[MediaRecord]) -> Result<String> {
    let summaries: Vec<RecordSummary> = records.iter().map(RecordSummary::from).collect();
    Ok(serde_json::to_string_pretty(&summaries)?)
}

/// Generate a unique gallery id: millisecond timestamp followed by random bits.
pub fn generate_id() -> String {
    let timestamp = crate::time::now_timestamp_millis() as u64;
    let random_part: u64 = rand::random();
    format!("{:016x}{:016x}", timestamp, random_part)
}

/// Sort records oldest first, the order the gallery renders in.
pub fn sort_by_created(records: &mut [MediaRecord]) {
    records.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_from_mime() {
        assert_eq!(MediaKind::from_mime("image/png"), MediaKind::Image);
        assert_eq!(MediaKind::from_mime("video/quicktime"), MediaKind::Video);
        assert_eq!(MediaKind::from_mime("application/pdf"), MediaKind::Document);
        assert_eq!(MediaKind::from_mime("IMAGE/JPEG"), MediaKind::Image);
    }

    #[test]
    fn test_kind_tag_round_trip() {
        for kind in [MediaKind::Image, MediaKind::Video, MediaKind::Document] {
            assert_eq!(MediaKind::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(MediaKind::parse("audio"), None);
    }

    #[test]
    fn test_singleton_records_use_sentinel() {
        let record = MediaRecord::new(Partition::Resume, "cv.pdf", "application/pdf", "data:".into(), 4);
        assert_eq!(record.id, SENTINEL_ID);
        assert_eq!(record.kind, MediaKind::Document);

        let a = MediaRecord::new(Partition::Gallery, "a.png", "image/png", "data:".into(), 4);
        let b = MediaRecord::new(Partition::Gallery, "b.png", "image/png", "data:".into(), 4);
        assert_ne!(a.id, SENTINEL_ID);
        assert_ne!(a.id, b.id);
        assert_eq!(a.id.len(), 32);
    }

    #[test]
    fn test_partition_lookup() {
        assert_eq!(Partition::from_name("gallery"), Some(Partition::Gallery));
        assert_eq!(Partition::from_name("mediaItems"), None);
        assert!(Partition::ProfilePicture.is_singleton());
        assert!(!Partition::Gallery.is_singleton());
        assert!(Partition::Gallery.spec().order_index.is_some());
    }

    #[test]
    fn test_record_serializes_camel_case() {
        let record = MediaRecord::new(Partition::Gallery, "a.png", "image/png", "data:".into(), 4);
        let json = serde_json::to_value(&record).unwrap();
        assert!(json.get("mimeType").is_some());
        assert!(json.get("encodedData").is_some());
        assert_eq!(json["kind"], "image");
    }

    #[test]
    fn test_summaries_leave_out_payload() {
        let mut record = MediaRecord::new(Partition::Gallery, "talk.mp4", "video/mp4", "data:video/mp4;base64,AAAA".into(), 3);
        record.created_at = 42;

        let text = summaries_json(&[record.clone()]).unwrap();
        let json: serde_json::Value = serde_json::from_str(&text).unwrap();
        let entry = &json.as_array().unwrap()[0];
        assert_eq!(entry["id"], record.id.as_str());
        assert_eq!(entry["mimeType"], "video/mp4");
        assert_eq!(entry["kind"], "video");
        assert_eq!(entry["sizeBytes"], 3);
        assert_eq!(entry["createdAt"], 42);
        assert!(entry.get("encodedData").is_none());
        assert!(!text.contains("base64"));

        assert_eq!(summaries_json(&[]).unwrap(), "[]");
    }
}
