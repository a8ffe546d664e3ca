//! # Portfolio Page Controller
//!
//! Ties the store, the upload controller and a [`Presenter`] together. Every
//! user action on the page maps to one method here.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        PAGE CONTROLLER                                  │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  start ──► LocalMediaStore::open ──┬──► load_all ──► Presenter         │
//! │                                    │                                    │
//! │                                    └──► (failed) session-only mode     │
//! │                                                                         │
//! │  upload_*  ──► UploadController::ingest ──► session ──► Presenter      │
//! │  delete_*  ──► LocalMediaStore::delete  ──► session ──► Presenter      │
//! │  view / open_viewer ──► ViewerModal (owns temporary handles)           │
//! │  download_* ──► decoded bytes + filename                                │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! No method fails the page. Errors are toasted and returned so callers can
//! inspect them, but the controller stays usable after any of them.

use std::path::Path;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::config::FolioConfig;
use crate::error::{Error, Result};
use crate::media::{
    decode_data_uri, sort_by_created, summaries_json, BatchReport, BusyTracker, DiskFile,
    FileSource, MediaKind, MediaRecord, Partition, PolicyTable, UploadController, UploadFailure,
    UploadStage, SENTINEL_ID,
};
use crate::presentation::{
    GalleryTile, ObjectUrlRegistry, Presenter, ResumeSummary, ToastKind, ViewerContent,
    ViewerModal,
};
use crate::storage::LocalMediaStore;

/// Snapshot of what the page holds, for status displays and debugging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppState {
    /// Gallery records in the session
    pub media_items: usize,
    /// Whether a résumé is loaded
    pub has_resume: bool,
    /// Whether a profile picture is loaded
    pub has_profile_pic: bool,
    /// Whether a persistent store is open
    pub database_connected: bool,
}

/// Decoded bytes ready to be saved by the front end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Download {
    /// Suggested filename (the original one)
    pub file_name: String,
    /// MIME type from the stored payload
    pub mime_type: String,
    /// File contents
    pub bytes: Vec<u8>,
}

#[derive(Default)]
struct Session {
    profile: Option<MediaRecord>,
    media_items: Vec<MediaRecord>,
    resume: Option<MediaRecord>,
}

/// The portfolio page.
pub struct PortfolioApp {
    store: Option<LocalMediaStore>,
    uploads: UploadController,
    policies: PolicyTable,
    presenter: Arc<dyn Presenter>,
    viewer: ViewerModal,
    session: Mutex<Session>,
    /// Held across store write and session update, so the session's
    /// profile picture is always the one the store kept.
    profile_writes: tokio::sync::Mutex<()>,
    resume_writes: tokio::sync::Mutex<()>,
}

impl PortfolioApp {
    /// Open the store and load everything saved.
    ///
    /// If the store cannot be opened the page still starts, without
    /// persistence.
    pub async fn start(
        config: &FolioConfig,
        presenter: Arc<dyn Presenter>,
        registry: Arc<dyn ObjectUrlRegistry>,
    ) -> Self {
        let store = match LocalMediaStore::open(config.database_config()).await {
            Ok(store) => Some(store),
            Err(e) => {
                tracing::error!(error = %e, code = e.code(), "Store unavailable, running without persistence");
                presenter.toast(
                    "Database initialization failed. Some features may not work.",
                    ToastKind::Error,
                );
                None
            }
        };

        let app = Self::new(store, config.policies.clone(), presenter, registry);
        // Already toasted; the page stays usable.
        let _ = app.load_all().await;
        app
    }

    /// Build a controller around an already opened store (or none).
    pub fn new(
        store: Option<LocalMediaStore>,
        policies: PolicyTable,
        presenter: Arc<dyn Presenter>,
        registry: Arc<dyn ObjectUrlRegistry>,
    ) -> Self {
        Self {
            uploads: UploadController::new(store.clone()),
            store,
            policies,
            presenter,
            viewer: ViewerModal::new(registry),
            session: Mutex::new(Session::default()),
            profile_writes: tokio::sync::Mutex::new(()),
            resume_writes: tokio::sync::Mutex::new(()),
        }
    }

    /// Whether a persistent store is open.
    pub fn is_connected(&self) -> bool {
        self.store.is_some()
    }

    /// Busy indicators for each region.
    pub fn busy(&self) -> &BusyTracker {
        self.uploads.busy()
    }

    /// Upload policies in effect.
    pub fn policies(&self) -> &PolicyTable {
        &self.policies
    }

    // ========================================================================
    // LOADING
    // ========================================================================

    /// Read all three partitions and render them.
    ///
    /// A failing partition is skipped; the others still load. One
    /// "Error loading saved data" toast is shown no matter how many fail.
    pub async fn load_all(&self) -> Result<()> {
        let Some(store) = &self.store else {
            return Ok(());
        };

        let mut first_error: Option<Error> = None;

        match store.get(Partition::ProfilePicture.name(), SENTINEL_ID).await {
            Ok(Some(record)) => {
                self.presenter.show_profile_picture(&record);
                self.session.lock().profile = Some(record);
            }
            Ok(None) => {}
            Err(e) => first_error = first_error.or(Some(e)),
        }

        match store.get_all(Partition::Gallery.name()).await {
            Ok(mut items) => {
                sort_by_created(&mut items);
                for item in &items {
                    self.presenter.render_gallery_item(&GalleryTile::for_record(item));
                }
                self.session.lock().media_items = items;
            }
            Err(e) => first_error = first_error.or(Some(e)),
        }

        match store.get(Partition::Resume.name(), SENTINEL_ID).await {
            Ok(Some(record)) => {
                self.presenter.display_resume_summary(&ResumeSummary::from(&record));
                self.session.lock().resume = Some(record);
            }
            Ok(None) => {}
            Err(e) => first_error = first_error.or(Some(e)),
        }

        match first_error {
            Some(e) => {
                tracing::error!(error = %e, "Failed to load saved data");
                self.presenter.toast("Error loading saved data", ToastKind::Error);
                Err(e)
            }
            None => {
                let state = self.state();
                tracing::info!(
                    media_items = state.media_items,
                    has_resume = state.has_resume,
                    has_profile_pic = state.has_profile_pic,
                    "Saved data loaded"
                );
                Ok(())
            }
        }
    }

    // ========================================================================
    // UPLOADS
    // ========================================================================

    /// Replace the profile picture.
    pub async fn upload_profile_picture(
        &self,
        file: &dyn FileSource,
    ) -> std::result::Result<MediaRecord, UploadFailure> {
        let policy = self.policies.for_partition(Partition::ProfilePicture);
        let _serial = self.profile_writes.lock().await;
        match self.uploads.ingest(file, Partition::ProfilePicture, policy).await {
            Ok(record) => {
                self.presenter.show_profile_picture(&record);
                self.session.lock().profile = Some(record.clone());
                self.presenter
                    .toast("Profile picture saved successfully!", ToastKind::Success);
                Ok(record)
            }
            Err(failure) => {
                self.presenter.toast(&failure.message(), ToastKind::Error);
                Err(failure)
            }
        }
    }

    /// Add files to the gallery.
    ///
    /// Each file renders as soon as it is stored; failures are toasted one by
    /// one, and the success count is toasted once at the end.
    pub async fn upload_media(&self, files: &[Box<dyn FileSource>]) -> BatchReport {
        if files.is_empty() {
            return BatchReport::default();
        }

        let policy = self.policies.for_partition(Partition::Gallery);
        let report = self
            .uploads
            .ingest_batch(files, Partition::Gallery, policy, |outcome| match outcome {
                Ok(record) => {
                    self.presenter.render_gallery_item(&GalleryTile::for_record(record));
                    self.session.lock().media_items.push(record.clone());
                }
                Err(failure) => {
                    self.presenter.toast(&failure.message(), ToastKind::Error);
                }
            })
            .await;

        if report.success_count() > 0 {
            self.presenter.toast(
                &format!("{} file(s) saved successfully!", report.success_count()),
                ToastKind::Success,
            );
        }

        report
    }

    /// Add files from disk to the gallery.
    ///
    /// A path that cannot be opened fails like an unreadable file, with its
    /// own toast; every other path is still uploaded.
    pub async fn upload_media_paths<P: AsRef<Path>>(&self, paths: &[P]) -> BatchReport {
        let mut files: Vec<Box<dyn FileSource>> = Vec::with_capacity(paths.len());
        let mut unopened = Vec::new();

        for path in paths {
            match DiskFile::open(path).await {
                Ok(file) => files.push(Box::new(file)),
                Err(error) => {
                    let file_name = match &error {
                        Error::ReadError { file, .. } => file.clone(),
                        _ => path.as_ref().display().to_string(),
                    };
                    tracing::warn!(file = file_name.as_str(), error = %error, "Skipping unopenable file");
                    let failure = UploadFailure {
                        file_name,
                        partition: Partition::Gallery,
                        stage: UploadStage::ReadFailed,
                        error,
                    };
                    self.presenter.toast(&failure.message(), ToastKind::Error);
                    unopened.push(failure);
                }
            }
        }

        let mut report = self.upload_media(&files).await;
        unopened.append(&mut report.failures);
        report.failures = unopened;
        report
    }

    /// Replace the résumé.
    pub async fn upload_resume(
        &self,
        file: &dyn FileSource,
    ) -> std::result::Result<MediaRecord, UploadFailure> {
        let policy = self.policies.for_partition(Partition::Resume);
        let _serial = self.resume_writes.lock().await;
        match self.uploads.ingest(file, Partition::Resume, policy).await {
            Ok(record) => {
                self.presenter.display_resume_summary(&ResumeSummary::from(&record));
                self.session.lock().resume = Some(record.clone());
                self.presenter.toast("Resume saved successfully!", ToastKind::Success);
                Ok(record)
            }
            Err(failure) => {
                self.presenter.toast(&failure.message(), ToastKind::Error);
                Err(failure)
            }
        }
    }

    // ========================================================================
    // DELETION
    // ========================================================================

    /// Remove one gallery item. Returns whether anything was removed.
    pub async fn delete_media_item(&self, id: &str) -> Result<bool> {
        let stored = match self.delete_stored(Partition::Gallery, id).await {
            Ok(stored) => stored,
            Err(e) => {
                self.presenter.toast("Error deleting media item", ToastKind::Error);
                return Err(e);
            }
        };

        let in_session = {
            let mut session = self.session.lock();
            let before = session.media_items.len();
            session.media_items.retain(|item| item.id != id);
            session.media_items.len() != before
        };

        if self.viewer.is_showing(id) {
            self.close_viewer();
        }

        self.presenter.remove_gallery_item(id);
        self.presenter.toast("Media item deleted", ToastKind::Success);
        tracing::info!(id, "Media item deleted");

        Ok(stored || in_session)
    }

    /// Remove the résumé. Returns whether one was stored.
    pub async fn delete_resume(&self) -> Result<bool> {
        let stored = match self.delete_stored(Partition::Resume, SENTINEL_ID).await {
            Ok(stored) => stored,
            Err(e) => {
                self.presenter.toast("Error deleting resume", ToastKind::Error);
                return Err(e);
            }
        };

        let had = self.session.lock().resume.take().is_some();
        if self.viewer.is_showing(SENTINEL_ID) {
            self.close_viewer();
        }

        self.presenter.clear_resume_summary();
        self.presenter.toast("Resume deleted", ToastKind::Success);
        tracing::info!("Resume deleted");

        Ok(stored || had)
    }

    /// Revert to the placeholder profile picture.
    pub async fn delete_profile_picture(&self) -> Result<bool> {
        let stored = match self.delete_stored(Partition::ProfilePicture, SENTINEL_ID).await {
            Ok(stored) => stored,
            Err(e) => {
                self.presenter
                    .toast("Error deleting profile picture", ToastKind::Error);
                return Err(e);
            }
        };

        let had = self.session.lock().profile.take().is_some();
        self.presenter.clear_profile_picture();
        self.presenter.toast("Profile picture removed", ToastKind::Success);

        Ok(stored || had)
    }

    async fn delete_stored(&self, partition: Partition, key: &str) -> Result<bool> {
        match &self.store {
            Some(store) => store.delete(partition.name(), key).await,
            None => Ok(false),
        }
    }

    // ========================================================================
    // VIEWER
    // ========================================================================

    /// Open a gallery item full size.
    pub fn open_viewer(&self, id: &str) -> Option<ViewerContent> {
        let record = self
            .session
            .lock()
            .media_items
            .iter()
            .find(|item| item.id == id)
            .cloned()?;

        let content = self.viewer.open(&record);
        self.presenter.show_viewer(&content);
        Some(content)
    }

    /// Close the viewer, releasing any temporary handle. Returns whether it
    /// was open.
    pub fn close_viewer(&self) -> bool {
        let was_open = self.viewer.close();
        if was_open {
            self.presenter.hide_viewer();
        }
        was_open
    }

    /// What the viewer shows, if open.
    pub fn viewer_content(&self) -> Option<ViewerContent> {
        self.viewer.current()
    }

    /// Open the résumé as a document.
    pub fn view_resume(&self) -> Option<ViewerContent> {
        let record = self.session.lock().resume.clone()?;
        let content = self.viewer.open(&record);
        if matches!(content, ViewerContent::DocumentFallback { .. }) {
            self.presenter.toast("Error viewing resume", ToastKind::Error);
        }
        self.presenter.show_viewer(&content);
        Some(content)
    }

    // ========================================================================
    // DOWNLOADS
    // ========================================================================

    /// Decoded résumé bytes, or `None` when no résumé is loaded.
    pub fn download_resume(&self) -> Result<Option<Download>> {
        let Some(record) = self.session.lock().resume.clone() else {
            return Ok(None);
        };

        match Self::materialize(&record) {
            Ok(download) => {
                self.presenter.toast("Resume downloaded!", ToastKind::Success);
                Ok(Some(download))
            }
            Err(e) => {
                tracing::warn!(error = %e, "Resume payload unreadable");
                self.presenter.toast("Error downloading resume", ToastKind::Error);
                Err(e)
            }
        }
    }

    /// Decoded bytes of a gallery item, or `None` when `id` is unknown.
    pub fn download_media(&self, id: &str) -> Result<Option<Download>> {
        let record = self
            .session
            .lock()
            .media_items
            .iter()
            .find(|item| item.id == id)
            .cloned();
        let Some(record) = record else {
            return Ok(None);
        };

        match Self::materialize(&record) {
            Ok(download) => {
                let message = match record.kind {
                    MediaKind::Document => "PDF downloaded!".to_string(),
                    _ => format!("{} downloaded!", record.name),
                };
                self.presenter.toast(&message, ToastKind::Success);
                Ok(Some(download))
            }
            Err(e) => {
                tracing::warn!(id, error = %e, "Media payload unreadable");
                self.presenter
                    .toast(&format!("Error downloading {}", record.name), ToastKind::Error);
                Err(e)
            }
        }
    }

    fn materialize(record: &MediaRecord) -> Result<Download> {
        let decoded = decode_data_uri(&record.encoded_data)?;
        Ok(Download {
            file_name: record.name.clone(),
            mime_type: decoded.mime_type,
            bytes: decoded.bytes,
        })
    }

    // ========================================================================
    // STATE
    // ========================================================================

    /// Current page snapshot.
    pub fn state(&self) -> AppState {
        let session = self.session.lock();
        AppState {
            media_items: session.media_items.len(),
            has_resume: session.resume.is_some(),
            has_profile_pic: session.profile.is_some(),
            database_connected: self.store.is_some(),
        }
    }

    /// Gallery records, oldest first.
    pub fn media_items(&self) -> Vec<MediaRecord> {
        let mut items = self.session.lock().media_items.clone();
        sort_by_created(&mut items);
        items
    }

    /// Gallery listing as JSON, oldest first, without payloads.
    pub fn gallery_json(&self) -> Result<String> {
        summaries_json(&self.media_items())
    }

    /// The loaded profile picture.
    pub fn profile_picture(&self) -> Option<MediaRecord> {
        self.session.lock().profile.clone()
    }

    /// The loaded résumé.
    pub fn resume(&self) -> Option<MediaRecord> {
        self.session.lock().resume.clone()
    }
}
