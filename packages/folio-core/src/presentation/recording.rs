//! Presenter that records every call instead of drawing.
//!
//! Used by tests and by headless callers that want to inspect what the page
//! would show.

use parking_lot::Mutex;

use super::{GalleryTile, Presenter, ResumeSummary, ToastKind, ViewerContent};
use crate::media::MediaRecord;

/// One recorded presenter call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PresenterEvent {
    /// Profile picture shown (filename)
    ProfilePictureShown(String),
    /// Placeholder restored
    ProfilePictureCleared,
    /// Gallery tile appended
    GalleryItemRendered(GalleryTile),
    /// Gallery tile removed
    GalleryItemRemoved(String),
    /// Résumé summary shown
    ResumeShown(ResumeSummary),
    /// Résumé summary hidden
    ResumeCleared,
    /// Viewer opened
    ViewerShown(ViewerContent),
    /// Viewer closed
    ViewerHidden,
    /// Toast shown
    Toast(String, ToastKind),
}

/// Records presenter calls in order.
#[derive(Default)]
pub struct RecordingPresenter {
    events: Mutex<Vec<PresenterEvent>>,
}

impl RecordingPresenter {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything recorded so far.
    pub fn events(&self) -> Vec<PresenterEvent> {
        self.events.lock().clone()
    }

    /// Drain and return everything recorded so far.
    pub fn take(&self) -> Vec<PresenterEvent> {
        std::mem::take(&mut *self.events.lock())
    }

    /// Toasts only, as `(message, kind)`.
    pub fn toasts(&self) -> Vec<(String, ToastKind)> {
        self.events
            .lock()
            .iter()
            .filter_map(|e| match e {
                PresenterEvent::Toast(message, kind) => Some((message.clone(), *kind)),
                _ => None,
            })
            .collect()
    }

    /// Ids of gallery tiles currently on the page, in render order.
    pub fn gallery_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = Vec::new();
        for event in self.events.lock().iter() {
            match event {
                PresenterEvent::GalleryItemRendered(tile) => ids.push(tile.id().to_string()),
                PresenterEvent::GalleryItemRemoved(id) => ids.retain(|i| i != id),
                _ => {}
            }
        }
        ids
    }

    fn push(&self, event: PresenterEvent) {
        self.events.lock().push(event);
    }
}

impl Presenter for RecordingPresenter {
    fn show_profile_picture(&self, record: &MediaRecord) {
        self.push(PresenterEvent::ProfilePictureShown(record.name.clone()));
    }

    fn clear_profile_picture(&self) {
        self.push(PresenterEvent::ProfilePictureCleared);
    }

    fn render_gallery_item(&self, tile: &GalleryTile) {
        self.push(PresenterEvent::GalleryItemRendered(tile.clone()));
    }

    fn remove_gallery_item(&self, id: &str) {
        self.push(PresenterEvent::GalleryItemRemoved(id.to_string()));
    }

    fn display_resume_summary(&self, summary: &ResumeSummary) {
        self.push(PresenterEvent::ResumeShown(summary.clone()));
    }

    fn clear_resume_summary(&self) {
        self.push(PresenterEvent::ResumeCleared);
    }

    fn show_viewer(&self, content: &ViewerContent) {
        self.push(PresenterEvent::ViewerShown(content.clone()));
    }

    fn hide_viewer(&self) {
        self.push(PresenterEvent::ViewerHidden);
    }

    fn toast(&self, message: &str, kind: ToastKind) {
        self.push(PresenterEvent::Toast(message.to_string(), kind));
    }
}
