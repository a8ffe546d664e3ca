//! Per-partition upload policies: allowed MIME types and a size cap.

use super::Partition;
use crate::error::{Error, Result};

const MIB: u64 = 1024 * 1024;

/// Image types accepted everywhere images are.
pub const IMAGE_TYPES: &[&str] = &["image/jpeg", "image/jpg", "image/png", "image/gif", "image/webp"];

/// Video types accepted by the gallery.
pub const VIDEO_TYPES: &[&str] = &["video/mp4", "video/mov", "video/webm", "video/quicktime"];

/// Document types accepted by the gallery and the résumé.
pub const DOCUMENT_TYPES: &[&str] = &["application/pdf"];

/// Profile picture cap (5 MB).
pub const PROFILE_PICTURE_MAX_BYTES: u64 = 5 * MIB;

/// Gallery cap (50 MB).
pub const GALLERY_MAX_BYTES: u64 = 50 * MIB;

/// Résumé cap (10 MB).
pub const RESUME_MAX_BYTES: u64 = 10 * MIB;

/// Allowed MIME types and maximum byte size for one partition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KindPolicy {
    /// MIME allow-list, compared case-insensitively
    pub allowed_types: Vec<String>,
    /// Inclusive size limit in bytes
    pub max_bytes: u64,
}

impl KindPolicy {
    /// Build a policy from static type lists.
    pub fn new(type_groups: &[&[&str]], max_bytes: u64) -> Self {
        Self {
            allowed_types: type_groups
                .iter()
                .flat_map(|group| group.iter().map(|t| t.to_string()))
                .collect(),
            max_bytes,
        }
    }

    /// Images only, 5 MB.
    pub fn profile_picture() -> Self {
        Self::new(&[IMAGE_TYPES], PROFILE_PICTURE_MAX_BYTES)
    }

    /// Images, videos and PDFs, 50 MB.
    pub fn gallery() -> Self {
        Self::new(&[IMAGE_TYPES, VIDEO_TYPES, DOCUMENT_TYPES], GALLERY_MAX_BYTES)
    }

    /// PDF only, 10 MB.
    pub fn resume() -> Self {
        Self::new(&[DOCUMENT_TYPES], RESUME_MAX_BYTES)
    }

    /// Whether `mime_type` is on the allow-list.
    pub fn allows(&self, mime_type: &str) -> bool {
        self.allowed_types
            .iter()
            .any(|allowed| allowed.eq_ignore_ascii_case(mime_type))
    }

    /// Check a file's declared type and size.
    ///
    /// Type is checked first, so a file that is both the wrong type and too
    /// large reports `UnsupportedType`.
    pub fn validate(&self, file_name: &str, mime_type: &str, size: u64) -> Result<()> {
        if !self.allows(mime_type) {
            return Err(Error::UnsupportedType {
                file: file_name.to_string(),
                mime_type: mime_type.to_string(),
            });
        }

        if size > self.max_bytes {
            return Err(Error::TooLarge {
                file: file_name.to_string(),
                size,
                max: self.max_bytes,
            });
        }

        Ok(())
    }
}

/// One policy per partition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyTable {
    /// Profile picture policy
    pub profile_picture: KindPolicy,
    /// Gallery policy
    pub gallery: KindPolicy,
    /// Résumé policy
    pub resume: KindPolicy,
}

impl Default for PolicyTable {
    fn default() -> Self {
        Self {
            profile_picture: KindPolicy::profile_picture(),
            gallery: KindPolicy::gallery(),
            resume: KindPolicy::resume(),
        }
    }
}

impl PolicyTable {
    /// The policy governing `partition`.
    pub fn for_partition(&self, partition: Partition) -> &KindPolicy {
        match partition {
            Partition::ProfilePicture => &self.profile_picture,
            Partition::Gallery => &self.gallery,
            Partition::Resume => &self.resume,
        }
    }

    /// Mutable access, used when applying configuration overrides.
    pub fn for_partition_mut(&mut self, partition: Partition) -> &mut KindPolicy {
        match partition {
            Partition::ProfilePicture => &mut self.profile_picture,
            Partition::Gallery => &mut self.gallery,
            Partition::Resume => &mut self.resume,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_picture_accepts_images_only() {
        let policy = KindPolicy::profile_picture();
        assert!(policy.validate("me.jpg", "image/jpeg", 2 * MIB).is_ok());
        assert!(policy.validate("me.webp", "image/webp", 1).is_ok());
        assert!(matches!(
            policy.validate("me.mp4", "video/mp4", 1),
            Err(Error::UnsupportedType { .. })
        ));
    }

    #[test]
    fn test_limit_is_inclusive() {
        let policy = KindPolicy::resume();
        assert!(policy.validate("cv.pdf", "application/pdf", RESUME_MAX_BYTES).is_ok());
        assert!(matches!(
            policy.validate("cv.pdf", "application/pdf", RESUME_MAX_BYTES + 1),
            Err(Error::TooLarge { max, .. }) if max == RESUME_MAX_BYTES
        ));
    }

    #[test]
    fn test_type_checked_before_size() {
        let policy = KindPolicy::resume();
        assert!(matches!(
            policy.validate("movie.mov", "video/quicktime", 1024 * MIB),
            Err(Error::UnsupportedType { .. })
        ));
    }

    #[test]
    fn test_gallery_allows_all_kinds() {
        let policy = KindPolicy::gallery();
        for mime in ["image/png", "video/webm", "application/pdf", "VIDEO/MP4"] {
            assert!(policy.allows(mime), "{} should be allowed", mime);
        }
        assert!(!policy.allows("text/html"));
    }

    #[test]
    fn test_policy_table_lookup() {
        let mut table = PolicyTable::default();
        table.for_partition_mut(Partition::Resume).max_bytes = 5 * MIB;
        assert_eq!(table.for_partition(Partition::Resume).max_bytes, 5 * MIB);
        assert_eq!(table.for_partition(Partition::Gallery).max_bytes, GALLERY_MAX_BYTES);
    }
}
