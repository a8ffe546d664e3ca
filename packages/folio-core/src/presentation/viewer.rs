//! # Viewer Modal
//!
//! Full-size view of one record. Documents are shown through a temporary
//! object handle that must be released when the modal closes or when another
//! record replaces it.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::media::{decode_data_uri, MediaKind, MediaRecord};

/// Handle to temporary bytes, like a browser `blob:` URL.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectUrl(String);

impl ObjectUrl {
    /// Wrap a handle string.
    pub fn new(url: impl Into<String>) -> Self {
        Self(url.into())
    }

    /// The handle as a string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ObjectUrl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Creates and releases temporary object handles.
pub trait ObjectUrlRegistry: Send + Sync {
    /// Register bytes and return a handle to them.
    fn create(&self, bytes: Vec<u8>, mime_type: &str) -> ObjectUrl;

    /// Release a handle. Releasing an unknown handle does nothing.
    fn revoke(&self, url: &ObjectUrl);
}

/// In-process registry. Keeps bytes until revoked.
#[derive(Default)]
pub struct LocalObjectRegistry {
    live: Mutex<HashMap<ObjectUrl, (String, Arc<Vec<u8>>)>>,
}

impl LocalObjectRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of handles not yet revoked.
    pub fn live_count(&self) -> usize {
        self.live.lock().len()
    }

    /// Resolve a live handle to its MIME type and bytes.
    pub fn resolve(&self, url: &ObjectUrl) -> Option<(String, Arc<Vec<u8>>)> {
        self.live.lock().get(url).cloned()
    }
}

impl ObjectUrlRegistry for LocalObjectRegistry {
    fn create(&self, bytes: Vec<u8>, mime_type: &str) -> ObjectUrl {
        let url = ObjectUrl(format!("blob:folio/{}", uuid::Uuid::new_v4()));
        self.live
            .lock()
            .insert(url.clone(), (mime_type.to_string(), Arc::new(bytes)));
        url
    }

    fn revoke(&self, url: &ObjectUrl) {
        if self.live.lock().remove(url).is_some() {
            tracing::trace!(url = url.as_str(), "Object URL revoked");
        }
    }
}

/// What the viewer shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewerContent {
    /// Full-size image
    Image {
        /// Record id
        id: String,
        /// Data URI
        src: String,
        /// Alt text
        alt: String,
    },
    /// Video with controls, autoplaying
    Video {
        /// Record id
        id: String,
        /// Data URI
        src: String,
    },
    /// Document frame backed by a temporary handle
    Document {
        /// Record id
        id: String,
        /// Filename
        name: String,
        /// Temporary handle to the decoded bytes
        url: ObjectUrl,
    },
    /// Document whose payload could not be decoded: filename and a download
    /// affordance only
    DocumentFallback {
        /// Record id
        id: String,
        /// Filename
        name: String,
    },
}

impl ViewerContent {
    /// Id of the record on display.
    pub fn record_id(&self) -> &str {
        match self {
            ViewerContent::Image { id, .. }
            | ViewerContent::Video { id, .. }
            | ViewerContent::Document { id, .. }
            | ViewerContent::DocumentFallback { id, .. } => id,
        }
    }

    fn object_url(&self) -> Option<&ObjectUrl> {
        match self {
            ViewerContent::Document { url, .. } => Some(url),
            _ => None,
        }
    }
}

/// Modal state plus the handle it owns.
pub struct ViewerModal {
    registry: Arc<dyn ObjectUrlRegistry>,
    current: Mutex<Option<ViewerContent>>,
}

impl ViewerModal {
    /// Create a closed modal.
    pub fn new(registry: Arc<dyn ObjectUrlRegistry>) -> Self {
        Self {
            registry,
            current: Mutex::new(None),
        }
    }

    /// Show `record`, releasing whatever the modal held before.
    pub fn open(&self, record: &MediaRecord) -> ViewerContent {
        let content = match record.kind {
            MediaKind::Image => ViewerContent::Image {
                id: record.id.clone(),
                src: record.encoded_data.clone(),
                alt: record.name.clone(),
            },
            MediaKind::Video => ViewerContent::Video {
                id: record.id.clone(),
                src: record.encoded_data.clone(),
            },
            MediaKind::Document => match decode_data_uri(&record.encoded_data) {
                Ok(decoded) => ViewerContent::Document {
                    id: record.id.clone(),
                    name: record.name.clone(),
                    url: self.registry.create(decoded.bytes, &decoded.mime_type),
                },
                Err(e) => {
                    tracing::warn!(id = record.id.as_str(), error = %e, "Document payload unreadable");
                    ViewerContent::DocumentFallback {
                        id: record.id.clone(),
                        name: record.name.clone(),
                    }
                }
            },
        };

        let previous = self.current.lock().replace(content.clone());
        if let Some(previous) = previous {
            self.release(&previous);
        }

        content
    }

    /// Close the modal. Returns whether it was open.
    pub fn close(&self) -> bool {
        let previous = self.current.lock().take();
        match previous {
            Some(previous) => {
                self.release(&previous);
                true
            }
            None => false,
        }
    }

    /// Whether the modal is open.
    pub fn is_open(&self) -> bool {
        self.current.lock().is_some()
    }

    /// What is on display, if anything.
    pub fn current(&self) -> Option<ViewerContent> {
        self.current.lock().clone()
    }

    /// Whether the modal shows the record `id`.
    pub fn is_showing(&self, id: &str) -> bool {
        self.current
            .lock()
            .as_ref()
            .map(|c| c.record_id() == id)
            .unwrap_or(false)
    }

    fn release(&self, content: &ViewerContent) {
        if let Some(url) = content.object_url() {
            self.registry.revoke(url);
        }
    }
}

impl Drop for ViewerModal {
    fn drop(&mut self) {
        if let Some(content) = self.current.get_mut().take() {
            self.release(&content);
        }
    }
}
