//! # Portfolio Walkthrough Example
//!
//! Drives the page controller through a full session against an in-memory
//! store and prints what a renderer would be asked to draw.
//!
//! ## Run
//!
//! ```bash
//! cargo run --example portfolio_walkthrough
//! ```

use std::sync::Arc;

use folio_core::presentation::{LocalObjectRegistry, PresenterEvent, RecordingPresenter};
use folio_core::{FileSource, FolioConfig, MemoryFile, PortfolioApp};

#[tokio::main]
async fn main() {
    println!("=== Folio Core: Portfolio Walkthrough ===\n");

    let presenter = Arc::new(RecordingPresenter::new());
    let registry = Arc::new(LocalObjectRegistry::new());
    let app = PortfolioApp::start(&FolioConfig::default(), presenter.clone(), registry.clone()).await;

    // Step 1: Profile picture
    println!("Step 1: Uploading a profile picture...");
    app.upload_profile_picture(&MemoryFile::new("me.jpg", "image/jpeg", vec![0xff; 64 * 1024]))
        .await
        .expect("Failed to store profile picture");
    println!("  Stored: {:?}", app.profile_picture().map(|p| p.size_label()));
    println!();

    // Step 2: Gallery batch with one file of the wrong type
    println!("Step 2: Dropping three files on the gallery...");
    let files: Vec<Box<dyn FileSource>> = vec![
        Box::new(MemoryFile::new("talk.mp4", "video/mp4", vec![1; 4096])),
        Box::new(MemoryFile::new("notes.txt", "text/plain", vec![2; 16])),
        Box::new(MemoryFile::new("paper.pdf", "application/pdf", b"%PDF-1.7".to_vec())),
    ];
    let report = app.upload_media(&files).await;
    println!("  Stored: {}  Failed: {}", report.success_count(), report.failure_count());
    for failure in &report.failures {
        println!("  [{}] {}", failure.stage.as_str(), failure.message());
    }
    println!();

    // Step 3: Open a document in the viewer, then close it
    println!("Step 3: Viewing the PDF...");
    if let Some(pdf) = app.media_items().into_iter().find(|r| r.name == "paper.pdf") {
        app.open_viewer(&pdf.id);
        println!("  Live object handles while open: {}", registry.live_count());
        app.close_viewer();
        println!("  Live object handles after close: {}", registry.live_count());
    }
    println!();

    // Step 4: What the renderer saw
    println!("Step 4: Presenter calls");
    for event in presenter.events() {
        match event {
            PresenterEvent::Toast(message, kind) => println!("  toast {:?}: {}", kind, message),
            other => println!("  {}", short(&other)),
        }
    }
    println!();

    println!("State: {:?}", app.state());
    println!("\n=== Example Complete ===");
}

fn short(event: &PresenterEvent) -> String {
    let text = format!("{:?}", event);
    if text.chars().count() > 72 {
        format!("{}...", text.chars().take(72).collect::<String>())
    } else {
        text
    }
}
