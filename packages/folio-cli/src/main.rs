//! Folio CLI
//!
//! Terminal front end for the portfolio page. Every subcommand is one user
//! action on the page: pick a profile picture, drop files on the gallery,
//! upload, view, export or delete the résumé.
//!
//! State lives in a SQLite file under the data directory
//! (`$FOLIO_DATA_DIR`, or the platform data dir), so successive invocations
//! see the same portfolio.

mod console;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{bail, eyre, WrapErr};
use color_eyre::Result;

use folio_core::presentation::{GalleryTile, LocalObjectRegistry};
use folio_core::{DiskFile, Download, FolioConfig, Partition, PortfolioApp};

use console::{describe_tile, ConsolePresenter};

// ── CLI Arguments ─────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "folio", version, about = "Manage a local portfolio: profile picture, gallery and résumé")]
struct Args {
    /// Directory holding the database and the default config file
    #[arg(long, env = "FOLIO_DATA_DIR", global = true)]
    data_dir: Option<PathBuf>,

    /// Configuration file (TOML)
    #[arg(long, env = "FOLIO_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Keep everything in memory for this invocation only
    #[arg(long, global = true)]
    in_memory: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show what the portfolio holds
    Status,
    /// Profile picture
    Profile {
        #[command(subcommand)]
        action: ProfileAction,
    },
    /// Media gallery
    Gallery {
        #[command(subcommand)]
        action: GalleryAction,
    },
    /// Résumé
    Resume {
        #[command(subcommand)]
        action: ResumeAction,
    },
}

#[derive(Subcommand, Debug)]
enum ProfileAction {
    /// Replace the profile picture
    Set { path: PathBuf },
    /// Show the current profile picture
    Show,
    /// Revert to the placeholder
    Remove,
}

#[derive(Subcommand, Debug)]
enum GalleryAction {
    /// Add one or more files
    Add {
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },
    /// List gallery items, oldest first
    List {
        /// Print records as JSON (without payloads)
        #[arg(long)]
        json: bool,
    },
    /// Delete an item
    Remove { id: String },
    /// Open an item in the viewer
    View { id: String },
    /// Write an item's original bytes to disk
    Export {
        id: String,
        /// Output path (defaults to the original filename)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
}

#[derive(Subcommand, Debug)]
enum ResumeAction {
    /// Replace the résumé
    Set { path: PathBuf },
    /// Show filename and size
    Show,
    /// Open the résumé in the viewer
    View,
    /// Write the résumé to disk
    Export {
        /// Output path (defaults to the original filename)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// Delete the résumé
    Remove,
}

// ── Entry Point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "folio=info,folio_core=info".into()),
        )
        .init();

    let args = Args::parse();
    let config = resolve_config(&args)?;

    let registry = Arc::new(LocalObjectRegistry::new());
    let presenter = Arc::new(ConsolePresenter::new(registry.clone()));
    let app = PortfolioApp::start(&config, presenter.clone(), registry).await;
    presenter.enable_rendering();

    let outcome = run(&app, args.command).await;
    app.close_viewer();
    outcome
}

fn resolve_config(args: &Args) -> Result<FolioConfig> {
    let data_dir = match &args.data_dir {
        Some(dir) => dir.clone(),
        None => dirs::data_dir()
            .map(|d| d.join("folio"))
            .ok_or_else(|| eyre!("no data directory on this platform; pass --data-dir"))?,
    };

    let config_path = args
        .config
        .clone()
        .or_else(|| Some(data_dir.join("folio.toml")).filter(|p| p.exists()));

    let mut config = match config_path {
        Some(path) => FolioConfig::load(&path)
            .wrap_err_with(|| format!("loading {}", path.display()))?,
        None => FolioConfig::default(),
    };

    if args.in_memory {
        config.storage_path = None;
    } else if config.storage_path.is_none() {
        config.storage_path = Some(data_dir.join("folio.db"));
    }

    tracing::debug!(
        storage = ?config.storage_path,
        database = config.database_name.as_str(),
        "Configuration resolved"
    );

    Ok(config)
}

// ── Commands ──────────────────────────────────────────────────────────────────

async fn run(app: &PortfolioApp, command: Command) -> Result<()> {
    match command {
        Command::Status => status(app),
        Command::Profile { action } => profile(app, action).await,
        Command::Gallery { action } => gallery(app, action).await,
        Command::Resume { action } => resume(app, action).await,
    }
}

fn status(app: &PortfolioApp) -> Result<()> {
    let state = app.state();
    let info = folio_core::build_info();

    println!("folio {} ({}, {})", info.version, info.target, info.profile);
    println!(
        "Storage:         {}",
        if state.database_connected { "persistent" } else { "session only" }
    );
    println!(
        "Profile picture: {}",
        app.profile_picture()
            .map(|p| format!("{} ({})", p.name, p.size_label()))
            .unwrap_or_else(|| "placeholder".to_string())
    );
    println!("Gallery items:   {}", state.media_items);
    println!(
        "Resume:          {}",
        app.resume()
            .map(|r| format!("{} ({})", r.name, r.size_label()))
            .unwrap_or_else(|| "none".to_string())
    );

    for partition in Partition::ALL {
        let policy = app.policies().for_partition(partition);
        println!(
            "  {:<15} max {}, {}",
            partition.label(),
            folio_core::media::format_file_size(policy.max_bytes),
            policy.allowed_types.join(", ")
        );
    }

    Ok(())
}

async fn profile(app: &PortfolioApp, action: ProfileAction) -> Result<()> {
    match action {
        ProfileAction::Set { path } => {
            let file = DiskFile::open(&path).await?;
            app.upload_profile_picture(&file).await?;
        }
        ProfileAction::Show => match app.profile_picture() {
            Some(record) => println!("{} ({}, {})", record.name, record.mime_type, record.size_label()),
            None => println!("No profile picture"),
        },
        ProfileAction::Remove => {
            app.delete_profile_picture().await?;
        }
    }
    Ok(())
}

async fn gallery(app: &PortfolioApp, action: GalleryAction) -> Result<()> {
    match action {
        GalleryAction::Add { paths } => {
            let report = app.upload_media_paths(&paths).await;
            if report.success_count() == 0 {
                bail!("no files were added");
            }
        }
        GalleryAction::List { json } => {
            let items = app.media_items();
            if json {
                println!("{}", app.gallery_json()?);
            } else if items.is_empty() {
                println!("Gallery is empty");
            } else {
                for item in &items {
                    println!("{}  {}", describe_tile(&GalleryTile::for_record(item)), item.size_label());
                }
            }
        }
        GalleryAction::Remove { id } => {
            if !app.delete_media_item(&id).await? {
                tracing::warn!(id = id.as_str(), "No such gallery item");
            }
        }
        GalleryAction::View { id } => {
            if app.open_viewer(&id).is_none() {
                bail!("no gallery item {}", id);
            }
        }
        GalleryAction::Export { id, out } => match app.download_media(&id)? {
            Some(download) => save(download, out).await?,
            None => bail!("no gallery item {}", id),
        },
    }
    Ok(())
}

async fn resume(app: &PortfolioApp, action: ResumeAction) -> Result<()> {
    match action {
        ResumeAction::Set { path } => {
            let file = DiskFile::open(&path).await?;
            app.upload_resume(&file).await?;
        }
        ResumeAction::Show => match app.resume() {
            Some(record) => println!("{} ({})", record.name, record.size_label()),
            None => println!("No resume"),
        },
        ResumeAction::View => {
            if app.view_resume().is_none() {
                bail!("no resume stored");
            }
        }
        ResumeAction::Export { out } => match app.download_resume()? {
            Some(download) => save(download, out).await?,
            None => bail!("no resume stored"),
        },
        ResumeAction::Remove => {
            app.delete_resume().await?;
        }
    }
    Ok(())
}

async fn save(download: Download, out: Option<PathBuf>) -> Result<()> {
    let target = out.unwrap_or_else(|| {
        // Stored names are display-only; keep just the final component.
        Path::new(&download.file_name)
            .file_name()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("download"))
    });

    tokio::fs::write(&target, &download.bytes)
        .await
        .wrap_err_with(|| format!("writing {}", target.display()))?;

    println!("Saved {} ({} bytes)", target.display(), download.bytes.len());
    Ok(())
}
