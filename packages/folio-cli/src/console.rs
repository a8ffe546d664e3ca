//! Terminal presenter.
//!
//! Toasts go to stderr. Page updates print to stdout once rendering is
//! switched on, so the initial load does not flood the terminal.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use folio_core::media::format_file_size;
use folio_core::presentation::{
    GalleryTile, LocalObjectRegistry, Presenter, ResumeSummary, ToastKind, ViewerContent,
};
use folio_core::MediaRecord;

pub struct ConsolePresenter {
    rendering: AtomicBool,
    registry: Arc<LocalObjectRegistry>,
}

impl ConsolePresenter {
    pub fn new(registry: Arc<LocalObjectRegistry>) -> Self {
        Self {
            rendering: AtomicBool::new(false),
            registry,
        }
    }

    /// Start printing page updates.
    pub fn enable_rendering(&self) {
        self.rendering.store(true, Ordering::SeqCst);
    }

    fn rendering(&self) -> bool {
        self.rendering.load(Ordering::SeqCst)
    }
}

pub fn describe_tile(tile: &GalleryTile) -> String {
    match tile {
        GalleryTile::Image { id, alt, .. } => format!("{}  [image]     {}", id, alt),
        GalleryTile::Video { id, .. } => format!("{}  [video]", id),
        GalleryTile::Document { id, name } => format!("{}  [document]  {}", id, name),
    }
}

impl Presenter for ConsolePresenter {
    fn show_profile_picture(&self, record: &MediaRecord) {
        if self.rendering() {
            println!("Profile picture: {} ({})", record.name, record.size_label());
        }
    }

    fn clear_profile_picture(&self) {
        if self.rendering() {
            println!("Profile picture: placeholder");
        }
    }

    fn render_gallery_item(&self, tile: &GalleryTile) {
        if self.rendering() {
            println!("+ {}", describe_tile(tile));
        }
    }

    fn remove_gallery_item(&self, id: &str) {
        if self.rendering() {
            println!("- {}", id);
        }
    }

    fn display_resume_summary(&self, summary: &ResumeSummary) {
        if self.rendering() {
            println!("Resume: {} ({})", summary.file_name, summary.size_label);
        }
    }

    fn clear_resume_summary(&self) {
        if self.rendering() {
            println!("Resume: none");
        }
    }

    fn show_viewer(&self, content: &ViewerContent) {
        match content {
            ViewerContent::Image { id, alt, .. } => println!("Viewing image {} ({})", alt, id),
            ViewerContent::Video { id, .. } => println!("Viewing video {}", id),
            ViewerContent::Document { name, url, .. } => {
                let size = self
                    .registry
                    .resolve(url)
                    .map(|(_, bytes)| format_file_size(bytes.len() as u64))
                    .unwrap_or_else(|| "released".to_string());
                println!("Viewing {} at {} ({})", name, url, size);
            }
            ViewerContent::DocumentFallback { name, .. } => {
                println!("{} cannot be previewed; export it instead", name)
            }
        }
    }

    fn hide_viewer(&self) {
        tracing::debug!("Viewer closed");
    }

    fn toast(&self, message: &str, kind: ToastKind) {
        let marker = match kind {
            ToastKind::Info => "i",
            ToastKind::Success => "✓",
            ToastKind::Error => "✗",
        };
        eprintln!("{} {}", marker, message);
    }
}
