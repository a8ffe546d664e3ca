//! # Presentation
//!
//! The boundary between the core and whatever draws the page. The core
//! decides *what* to show; a [`Presenter`] decides *how*.

pub mod recording;
pub mod viewer;

pub use recording::{PresenterEvent, RecordingPresenter};
pub use viewer::{LocalObjectRegistry, ObjectUrl, ObjectUrlRegistry, ViewerContent, ViewerModal};

use crate::media::{MediaKind, MediaRecord};

/// Toast severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    /// Neutral information
    Info,
    /// An action completed
    Success,
    /// An action failed
    Error,
}

/// What a gallery tile shows for a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GalleryTile {
    /// Inline image
    Image {
        /// Record id, used by the delete affordance
        id: String,
        /// Data URI
        src: String,
        /// Alt text (the filename)
        alt: String,
    },
    /// Muted video preview with a play badge
    Video {
        /// Record id
        id: String,
        /// Data URI
        src: String,
    },
    /// Placeholder tile with the filename
    Document {
        /// Record id
        id: String,
        /// Filename shown on the tile
        name: String,
    },
}

impl GalleryTile {
    /// Pick the tile for a record by its kind.
    pub fn for_record(record: &MediaRecord) -> Self {
        match record.kind {
            MediaKind::Image => GalleryTile::Image {
                id: record.id.clone(),
                src: record.encoded_data.clone(),
                alt: record.name.clone(),
            },
            MediaKind::Video => GalleryTile::Video {
                id: record.id.clone(),
                src: record.encoded_data.clone(),
            },
            MediaKind::Document => GalleryTile::Document {
                id: record.id.clone(),
                name: record.name.clone(),
            },
        }
    }

    /// Id passed back to `delete_media_item`.
    pub fn id(&self) -> &str {
        match self {
            GalleryTile::Image { id, .. } | GalleryTile::Video { id, .. } | GalleryTile::Document { id, .. } => id,
        }
    }
}

/// Filename and human-readable size of the stored résumé.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResumeSummary {
    /// Original filename
    pub file_name: String,
    /// e.g. `"1.5 MB"`
    pub size_label: String,
}

impl From<&MediaRecord> for ResumeSummary {
    fn from(record: &MediaRecord) -> Self {
        Self {
            file_name: record.name.clone(),
            size_label: record.size_label(),
        }
    }
}

/// Draws the page.
///
/// Calls arrive from the page controller after each state change. A
/// presenter never touches the store itself; its delete and close
/// affordances call back into the controller.
pub trait Presenter: Send + Sync {
    /// Show the stored profile picture.
    fn show_profile_picture(&self, record: &MediaRecord);

    /// Revert to the placeholder profile picture.
    fn clear_profile_picture(&self);

    /// Append a gallery tile.
    fn render_gallery_item(&self, tile: &GalleryTile);

    /// Remove the gallery tile for `id`.
    fn remove_gallery_item(&self, id: &str);

    /// Show filename and size of the stored résumé.
    fn display_resume_summary(&self, summary: &ResumeSummary);

    /// Hide the résumé summary.
    fn clear_resume_summary(&self);

    /// Open the full-size viewer.
    fn show_viewer(&self, content: &ViewerContent);

    /// Close the viewer.
    fn hide_viewer(&self);

    /// Show a transient message.
    fn toast(&self, message: &str, kind: ToastKind);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::Partition;

    #[test]
    fn test_tile_follows_kind() {
        let image = MediaRecord::new(Partition::Gallery, "a.png", "image/png", "data:image/png;base64,".into(), 0);
        assert!(matches!(GalleryTile::for_record(&image), GalleryTile::Image { alt, .. } if alt == "a.png"));

        let video = MediaRecord::new(Partition::Gallery, "b.mp4", "video/mp4", "data:video/mp4;base64,".into(), 0);
        assert!(matches!(GalleryTile::for_record(&video), GalleryTile::Video { .. }));

        let pdf = MediaRecord::new(Partition::Gallery, "c.pdf", "application/pdf", "data:application/pdf;base64,".into(), 0);
        let tile = GalleryTile::for_record(&pdf);
        assert!(matches!(&tile, GalleryTile::Document { name, .. } if name == "c.pdf"));
        assert_eq!(tile.id(), pdf.id);
    }

    #[test]
    fn test_resume_summary() {
        let record = MediaRecord::new(Partition::Resume, "cv.pdf", "application/pdf", String::new(), 1536);
        let summary = ResumeSummary::from(&record);
        assert_eq!(summary.file_name, "cv.pdf");
        assert_eq!(summary.size_label, "1.5 KB");
    }
}
