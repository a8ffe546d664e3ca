//! # Folio Core
//!
//! Client-side persistence and upload handling for a personal portfolio
//! page: a profile picture, a media gallery and a résumé, all stored locally.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         FOLIO CORE MODULES                              │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  ┌───────────────────────────────────────────────────────────────────┐  │
//! │  │                        PortfolioApp                               │  │
//! │  │  start · load_all · upload_* · delete_* · viewer · download_*     │  │
//! │  └──────┬───────────────────────┬────────────────────────┬───────────┘  │
//! │         │                       │                        │              │
//! │  ┌──────▼──────┐  ┌─────────────▼─────────┐  ┌───────────▼──────────┐   │
//! │  │   Media     │  │      Storage          │  │    Presentation      │   │
//! │  │             │  │                       │  │                      │   │
//! │  │ - Records   │  │ - LocalMediaStore     │  │ - Presenter trait    │   │
//! │  │ - Policies  │──► - SQLite partitions   │  │ - Gallery tiles      │   │
//! │  │ - Uploads   │  │ - Schema versioning   │  │ - Viewer modal       │   │
//! │  │ - Busy      │  │                       │  │ - Object handles     │   │
//! │  └─────────────┘  └───────────────────────┘  └──────────────────────┘   │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Hierarchy
//!
//! - [`error`] - Error types for the entire library
//! - [`config`] - Store identity and upload policies
//! - [`media`] - Records, upload policies, file sources, upload controller
//! - [`storage`] - Partitioned, versioned local record store
//! - [`presentation`] - Rendering contract and viewer modal
//! - [`portfolio`] - The page controller tying it all together
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use folio_core::{FolioConfig, PortfolioApp, MemoryFile};
//! use folio_core::presentation::{LocalObjectRegistry, RecordingPresenter};
//!
//! let config = FolioConfig::default().with_storage_path("folio.db");
//! let app = PortfolioApp::start(
//!     &config,
//!     Arc::new(RecordingPresenter::new()),
//!     Arc::new(LocalObjectRegistry::new()),
//! )
//! .await;
//!
//! let photo = MemoryFile::new("me.jpg", "image/jpeg", bytes);
//! app.upload_profile_picture(&photo).await?;
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

// ============================================================================
// MODULE DECLARATIONS
// ============================================================================

pub mod config;
pub mod error;
pub mod media;
pub mod portfolio;
pub mod presentation;
pub mod storage;
/// Time utilities.
pub mod time;

// ============================================================================
// RE-EXPORTS
// ============================================================================

pub use config::FolioConfig;
pub use error::{Error, Result};
pub use media::{
    BatchReport, DiskFile, FileSource, KindPolicy, MediaKind, MediaRecord, MemoryFile,
    Partition, PolicyTable, UploadController, UploadFailure, UploadStage,
};
pub use portfolio::{AppState, Download, PortfolioApp};
pub use storage::{DatabaseConfig, LocalMediaStore};

// ============================================================================
// VERSION INFO
// ============================================================================

/// Returns the version of Folio Core
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

/// Returns build information for debugging
pub fn build_info() -> BuildInfo {
    BuildInfo {
        version: env!("CARGO_PKG_VERSION"),
        target: std::env::consts::OS,
        profile: if cfg!(debug_assertions) {
            "debug"
        } else {
            "release"
        },
    }
}

/// Build information for debugging
#[derive(Debug, Clone)]
pub struct BuildInfo {
    /// Crate version
    pub version: &'static str,
    /// Target operating system
    pub target: &'static str,
    /// Build profile (debug/release)
    pub profile: &'static str,
}

// ============================================================================
// TESTS
// ============================================================================
