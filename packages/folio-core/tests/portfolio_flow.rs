//! End-to-end page flows against an on-disk store.

use std::sync::Arc;

use folio_core::presentation::{
    LocalObjectRegistry, PresenterEvent, RecordingPresenter, ToastKind, ViewerContent,
};
use folio_core::{
    DiskFile, Error, FileSource, FolioConfig, LocalMediaStore, MediaKind, MemoryFile,
    Partition, PortfolioApp, UploadStage,
};

const MIB: usize = 1024 * 1024;

struct Page {
    app: PortfolioApp,
    presenter: Arc<RecordingPresenter>,
    registry: Arc<LocalObjectRegistry>,
}

async fn start(config: &FolioConfig) -> Page {
    let presenter = Arc::new(RecordingPresenter::new());
    let registry = Arc::new(LocalObjectRegistry::new());
    let app = PortfolioApp::start(config, presenter.clone(), registry.clone()).await;
    Page {
        app,
        presenter,
        registry,
    }
}

fn on_disk(dir: &tempfile::TempDir) -> FolioConfig {
    FolioConfig::default().with_storage_path(dir.path().join("folio.db"))
}

#[tokio::test]
async fn profile_picture_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let config = on_disk(&dir);

    let jpeg = vec![0xabu8; 2 * MIB];
    let stored = {
        let page = start(&config).await;
        page.app
            .upload_profile_picture(&MemoryFile::new("me.jpg", "image/jpeg", jpeg.clone()))
            .await
            .unwrap()
    };
    assert!(stored.encoded_data.starts_with("data:image/jpeg;base64,"));

    let page = start(&config).await;
    assert_eq!(page.app.profile_picture(), Some(stored.clone()));
    assert!(page
        .presenter
        .events()
        .contains(&PresenterEvent::ProfilePictureShown("me.jpg".into())));

    let store = LocalMediaStore::open(config.database_config()).await.unwrap();
    let direct = store.get("profilePicture", "current").await.unwrap().unwrap();
    assert_eq!(direct, stored);
}

#[tokio::test]
async fn second_profile_picture_replaces_first() {
    let dir = tempfile::tempdir().unwrap();
    let config = on_disk(&dir);
    let page = start(&config).await;

    page.app
        .upload_profile_picture(&MemoryFile::new("old.png", "image/png", vec![1; 16]))
        .await
        .unwrap();
    page.app
        .upload_profile_picture(&MemoryFile::new("new.png", "image/png", vec![2; 16]))
        .await
        .unwrap();

    let store = LocalMediaStore::open(config.database_config()).await.unwrap();
    assert_eq!(store.count("profilePicture").await.unwrap(), 1);
    assert_eq!(
        store.get("profilePicture", "current").await.unwrap().unwrap().name,
        "new.png"
    );
}

#[tokio::test]
async fn gallery_batch_with_oversized_file() {
    let dir = tempfile::tempdir().unwrap();
    let page = start(&on_disk(&dir)).await;

    let files: Vec<Box<dyn FileSource>> = vec![
        Box::new(MemoryFile::new("one.png", "image/png", vec![1; 128])),
        Box::new(MemoryFile::new("two.mp4", "video/mp4", vec![2; 128])),
        Box::new(MemoryFile::new("three.pdf", "application/pdf", vec![3; 51 * MIB])),
        Box::new(MemoryFile::new("four.gif", "image/gif", vec![4; 128])),
        Box::new(MemoryFile::new("five.pdf", "application/pdf", vec![5; 128])),
    ];

    let report = page.app.upload_media(&files).await;
    assert_eq!(report.success_count(), 4);
    assert_eq!(report.failure_count(), 1);
    assert_eq!(report.failures[0].stage, UploadStage::Rejected);

    let errors: Vec<String> = page
        .presenter
        .toasts()
        .into_iter()
        .filter(|(_, kind)| *kind == ToastKind::Error)
        .map(|(message, _)| message)
        .collect();
    assert_eq!(errors, vec!["three.pdf is too large (max 50 MB)".to_string()]);
    assert!(page
        .presenter
        .toasts()
        .contains(&("4 file(s) saved successfully!".to_string(), ToastKind::Success)));

    assert_eq!(page.presenter.gallery_ids().len(), 4);
    assert_eq!(page.app.state().media_items, 4);
}

#[tokio::test]
async fn gallery_reloads_in_creation_order() {
    let dir = tempfile::tempdir().unwrap();
    let config = on_disk(&dir);

    {
        let page = start(&config).await;
        for name in ["a.png", "b.png", "c.png"] {
            let files: Vec<Box<dyn FileSource>> =
                vec![Box::new(MemoryFile::new(name, "image/png", vec![0; 8]))];
            page.app.upload_media(&files).await;
            tokio::time::sleep(std::time::Duration::from_millis(3)).await;
        }
    }

    let page = start(&config).await;
    let names: Vec<String> = page.app.media_items().into_iter().map(|r| r.name).collect();
    assert_eq!(names, vec!["a.png", "b.png", "c.png"]);
    assert_eq!(
        page.presenter.gallery_ids(),
        page.app.media_items().into_iter().map(|r| r.id).collect::<Vec<_>>()
    );
}

#[tokio::test]
async fn oversized_resume_is_rejected_without_write() {
    let dir = tempfile::tempdir().unwrap();
    let config = on_disk(&dir);
    let page = start(&config).await;

    let failure = page
        .app
        .upload_resume(&MemoryFile::new("cv.pdf", "application/pdf", vec![0; 11 * MIB]))
        .await
        .unwrap_err();

    assert!(matches!(failure.error, Error::TooLarge { .. }));
    assert_eq!(
        page.presenter.toasts(),
        vec![("cv.pdf is too large (max 10 MB)".to_string(), ToastKind::Error)]
    );

    let store = LocalMediaStore::open(config.database_config()).await.unwrap();
    assert!(store.get("resume", "current").await.unwrap().is_none());
}

#[tokio::test]
async fn resume_limit_follows_config() {
    let mut config = FolioConfig::from_toml_str("[policies.resume]\nmax_bytes = 5242880").unwrap();
    config.storage_path = None;
    let page = start(&config).await;

    let failure = page
        .app
        .upload_resume(&MemoryFile::new("cv.pdf", "application/pdf", vec![0; 6 * MIB]))
        .await
        .unwrap_err();
    assert_eq!(failure.message(), "cv.pdf is too large (max 5 MB)");
}

#[tokio::test]
async fn resume_view_export_delete() {
    let dir = tempfile::tempdir().unwrap();
    let pdf_path = dir.path().join("Resume 2026.pdf");
    std::fs::write(&pdf_path, b"%PDF-1.7 body").unwrap();

    let page = start(&on_disk(&dir)).await;
    let file = DiskFile::open(&pdf_path).await.unwrap();
    assert_eq!(file.mime_type(), "application/pdf");

    let record = page.app.upload_resume(&file).await.unwrap();
    assert_eq!(record.kind, MediaKind::Document);
    assert!(page.app.state().has_resume);

    let content = page.app.view_resume().unwrap();
    let ViewerContent::Document { url, name, .. } = &content else {
        panic!("expected a document, got {:?}", content);
    };
    assert_eq!(name, "Resume 2026.pdf");
    assert_eq!(page.registry.resolve(url).unwrap().1.as_slice(), b"%PDF-1.7 body");

    let download = page.app.download_resume().unwrap().unwrap();
    assert_eq!(download.bytes, b"%PDF-1.7 body");
    assert_eq!(download.mime_type, "application/pdf");

    assert!(page.app.delete_resume().await.unwrap());
    assert!(!page.app.state().has_resume);
    assert_eq!(page.registry.live_count(), 0);
    assert!(page.presenter.events().contains(&PresenterEvent::ResumeCleared));

    // Deleting again is still a success.
    assert!(!page.app.delete_resume().await.unwrap());
}

#[tokio::test]
async fn viewer_releases_on_replace_and_close() {
    let page = start(&FolioConfig::default()).await;
    let files: Vec<Box<dyn FileSource>> = vec![
        Box::new(MemoryFile::new("a.pdf", "application/pdf", b"%PDF-a".to_vec())),
        Box::new(MemoryFile::new("b.pdf", "application/pdf", b"%PDF-b".to_vec())),
        Box::new(MemoryFile::new("c.webp", "image/webp", vec![9; 4])),
    ];
    let report = page.app.upload_media(&files).await;
    let id_of = |name: &str| {
        report
            .stored
            .iter()
            .find(|r| r.name == name)
            .map(|r| r.id.clone())
            .unwrap()
    };

    page.app.open_viewer(&id_of("a.pdf")).unwrap();
    page.app.open_viewer(&id_of("b.pdf")).unwrap();
    assert_eq!(page.registry.live_count(), 1);

    assert!(matches!(
        page.app.open_viewer(&id_of("c.webp")),
        Some(ViewerContent::Image { .. })
    ));
    assert_eq!(page.registry.live_count(), 0);

    page.app.open_viewer(&id_of("a.pdf")).unwrap();
    assert!(page.app.close_viewer());
    assert_eq!(page.registry.live_count(), 0);
    assert!(page.app.open_viewer("unknown").is_none());
}

#[tokio::test]
async fn unopenable_store_degrades_to_session_only() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("not-a-dir");
    std::fs::write(&blocker, b"x").unwrap();
    let config = FolioConfig::default().with_storage_path(blocker.join("folio.db"));

    let page = start(&config).await;
    assert!(!page.app.state().database_connected);
    assert_eq!(
        page.presenter.toasts(),
        vec![(
            "Database initialization failed. Some features may not work.".to_string(),
            ToastKind::Error
        )]
    );

    page.app
        .upload_profile_picture(&MemoryFile::new("me.png", "image/png", vec![1; 8]))
        .await
        .unwrap();
    assert!(page.app.state().has_profile_pic);
}

#[tokio::test]
async fn locked_store_degrades_to_session_only() {
    let dir = tempfile::tempdir().unwrap();
    let config = on_disk(&dir);
    let holder = rusqlite::Connection::open(dir.path().join("folio.db")).unwrap();
    holder.execute_batch("BEGIN IMMEDIATE").unwrap();

    let err = LocalMediaStore::open(config.database_config()).await.err().unwrap();
    assert!(matches!(err, Error::StorageBlocked(_)));

    let page = start(&config).await;
    assert!(!page.app.state().database_connected);
    assert_eq!(
        page.presenter.toasts(),
        vec![(
            "Database initialization failed. Some features may not work.".to_string(),
            ToastKind::Error
        )]
    );

    page.app
        .upload_resume(&MemoryFile::new("cv.pdf", "application/pdf", b"%PDF".to_vec()))
        .await
        .unwrap();
    assert!(page.app.state().has_resume);

    holder.execute_batch("ROLLBACK").unwrap();
}

#[tokio::test]
async fn gallery_add_from_disk_skips_missing_path() {
    let dir = tempfile::tempdir().unwrap();
    let config = on_disk(&dir);
    let ok = dir.path().join("ok.png");
    std::fs::write(&ok, vec![7u8; 64]).unwrap();

    let page = start(&config).await;
    let report = page
        .app
        .upload_media_paths(&[ok.clone(), dir.path().join("missing.png")])
        .await;
    assert_eq!(report.success_count(), 1);
    assert_eq!(report.failures[0].message(), "Error reading missing.png");

    let store = LocalMediaStore::open(config.database_config()).await.unwrap();
    let stored = store.get_all("gallery").await.unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].name, "ok.png");
}

#[tokio::test]
async fn newer_schema_on_disk_degrades() {
    let dir = tempfile::tempdir().unwrap();
    let mut newer = on_disk(&dir);
    newer.schema_version = 2;
    drop(LocalMediaStore::open(newer.database_config()).await.unwrap());

    let page = start(&on_disk(&dir)).await;
    assert!(!page.app.is_connected());

    let err = LocalMediaStore::open(on_disk(&dir).database_config())
        .await
        .err()
        .unwrap();
    assert!(matches!(
        err,
        Error::StorageVersionConflict {
            found: 2,
            requested: 1
        }
    ));
}

#[tokio::test]
async fn busy_indicator_clears_after_upload() {
    let page = start(&FolioConfig::default()).await;
    let mut watcher = page.app.busy().subscribe(Partition::Gallery);
    assert!(!*watcher.borrow_and_update());

    let files: Vec<Box<dyn FileSource>> =
        vec![Box::new(MemoryFile::new("x.png", "image/png", vec![0; 8]))];
    page.app.upload_media(&files).await;

    assert!(watcher.has_changed().unwrap());
    assert!(!*watcher.borrow_and_update());
    assert!(!page.app.busy().is_busy(Partition::Gallery));
}
