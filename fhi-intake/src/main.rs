//! fhi-intake - operator console for family health intake
//!
//! Works against the local cache in `<root folder>/fhi-intake.db` and, when a
//! server location is configured, the central record store.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use fhi_common::config::{resolve_root_folder, TomlConfig};
use fhi_common::model::RecordPatch;
use fhi_intake::cache::DATABASE_FILE;
use fhi_intake::{
    DashboardStats, DraftChoice, ImportOutcome, LocalCache, RecordBuilder, SyncFacade,
};
use tracing::info;
use uuid::Uuid;

/// Command-line arguments for fhi-intake
#[derive(Parser, Debug)]
#[command(name = "fhi-intake")]
#[command(about = "Operator console for family health intake")]
#[command(version)]
struct Args {
    /// Folder holding the local cache
    #[arg(short, long, global = true)]
    root_folder: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List saved records, newest first
    List,
    /// Show dashboard statistics
    Stats,
    /// Start a record, resuming the pending draft unless told otherwise
    New {
        /// JSON file with section edits to apply
        #[arg(long)]
        patch: Option<PathBuf>,
        /// Save the result as a draft instead of finalizing
        #[arg(long)]
        keep_draft: bool,
        /// Start blank even if a draft is pending
        #[arg(long)]
        discard_draft: bool,
    },
    /// Apply section edits to a saved record
    Edit {
        id: Uuid,
        /// JSON file with section edits to apply
        #[arg(long)]
        patch: PathBuf,
    },
    /// Delete a record by id
    Delete { id: Uuid },
    /// Write all local records to a dated backup file
    Export {
        /// Target folder (defaults to the current directory)
        #[arg(short, long, default_value = ".")]
        dir: PathBuf,
    },
    /// Replace local records with the contents of a backup file
    Import { file: PathBuf },
    /// Show or set the record store location ("" for local-only mode)
    Server { url: Option<String> },
    /// Manage the unfinished draft
    Draft {
        #[command(subcommand)]
        action: DraftAction,
    },
}

#[derive(Subcommand, Debug)]
enum DraftAction {
    Show,
    Discard,
    /// Save the draft as a record and clear it
    Finalize,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = TomlConfig::load_or_default();

    // Logs go to stderr; stdout carries command output
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("fhi_intake={}", config.log_level).into()),
        )
        .init();

    let root_folder = resolve_root_folder(args.root_folder.as_deref(), &config);
    let db_path = root_folder.join(DATABASE_FILE);
    info!("Local cache: {}", db_path.display());

    let cache = LocalCache::open(&db_path)
        .await
        .context("Failed to open local cache")?;

    // Changing the location must not require a reachable store
    if let Command::Server { url } = &args.command {
        return server_location(&cache, &config, url.as_deref()).await;
    }

    let facade = SyncFacade::connect(cache, &config)
        .await
        .context("Failed to set up record sync")?;

    match args.command {
        Command::List => {
            let records = facade.list().await?;
            if records.is_empty() {
                println!("No records");
            }
            for record in &records {
                println!(
                    "{}  {}  {} {}  {} member(s)  {}",
                    record.id,
                    record.created_at.format("%Y-%m-%d %H:%M"),
                    record.family_info.head_last_name1,
                    record.family_info.head_last_name2,
                    record.family_info.members.len(),
                    record.general_data.municipality,
                );
            }
        }
        Command::Stats => {
            let records = facade.list().await?;
            print!("{}", DashboardStats::compute(&records));
        }
        Command::New {
            patch,
            keep_draft,
            discard_draft,
        } => new_record(facade, &config, patch.as_deref(), keep_draft, discard_draft).await?,
        Command::Edit { id, patch } => edit_record(facade, &config, id, &patch).await?,
        Command::Delete { id } => {
            facade.delete(id).await?;
            println!("Deleted {}", id);
        }
        Command::Export { dir } => {
            let path = facade.export_to_dir(&dir).await?;
            println!("{}", path.display());
        }
        Command::Import { file } => {
            let payload = tokio::fs::read_to_string(&file)
                .await
                .with_context(|| format!("Failed to read {}", file.display()))?;
            match facade.import(&payload).await? {
                ImportOutcome::Imported(count) => println!("Imported {} record(s)", count),
                ImportOutcome::Rejected(reason) => {
                    anyhow::bail!("Import rejected, local records unchanged: {}", reason)
                }
            }
        }
        Command::Draft { action } => match action {
            DraftAction::Show => match facade.load_draft().await? {
                Some(draft) => println!("{}", serde_json::to_string_pretty(&draft)?),
                None => println!("No draft"),
            },
            DraftAction::Discard => {
                facade.clear_draft().await?;
                println!("Draft discarded");
            }
            DraftAction::Finalize => finalize_draft(facade, &config).await?,
        },
        Command::Server { .. } => {}
    }

    Ok(())
}

async fn read_patch(path: &Path) -> Result<RecordPatch> {
    let text = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("Invalid patch in {}", path.display()))
}

async fn new_record(
    facade: SyncFacade,
    config: &TomlConfig,
    patch: Option<&Path>,
    keep_draft: bool,
    discard_draft: bool,
) -> Result<()> {
    let patch = match patch {
        Some(path) => Some(read_patch(path).await?),
        None => None,
    };

    let choice = if discard_draft {
        DraftChoice::Discard
    } else {
        DraftChoice::Resume
    };
    let mut builder =
        RecordBuilder::open_new(Arc::new(facade), config.draft_quiet(), |_| choice).await?;
    if let Some(patch) = &patch {
        builder.apply_patch(patch);
    }

    let id = builder.record().id;
    if keep_draft {
        builder.save_draft().await?;
        println!("Draft saved {}", id);
        return Ok(());
    }

    while !builder.step().is_last() {
        builder.next();
    }
    report_saved(id, builder.finalize().await?);
    Ok(())
}

async fn edit_record(facade: SyncFacade, config: &TomlConfig, id: Uuid, patch: &Path) -> Result<()> {
    let patch = read_patch(patch).await?;
    let mut builder =
        RecordBuilder::open_existing(Arc::new(facade), config.draft_quiet(), id).await?;
    if builder.record().id != id {
        anyhow::bail!("No record {}", id);
    }

    builder.apply_patch(&patch);
    report_saved(id, builder.force_save().await?);
    Ok(())
}

fn report_saved(id: Uuid, synced: bool) {
    if synced {
        println!("Saved {}", id);
    } else {
        println!("Saved {} locally; record store unavailable", id);
    }
}

async fn finalize_draft(facade: SyncFacade, config: &TomlConfig) -> Result<()> {
    let facade = Arc::new(facade);
    if facade.load_draft().await?.is_none() {
        println!("No draft");
        return Ok(());
    }

    let mut builder =
        RecordBuilder::open_new(facade, config.draft_quiet(), |_| DraftChoice::Resume).await?;
    while !builder.step().is_last() {
        builder.next();
    }
    let id = builder.record().id;
    report_saved(id, builder.finalize().await?);
    Ok(())
}

async fn server_location(cache: &LocalCache, config: &TomlConfig, url: Option<&str>) -> Result<()> {
    match url {
        Some(url) => {
            cache.set_server_url(url).await?;
            if url.trim().is_empty() {
                println!("Local-only mode");
            } else {
                println!("Server location set to {}", url.trim());
            }
        }
        None => match cache.server_url().await? {
            Some(url) if url.is_empty() => println!("Local-only mode"),
            Some(url) => println!("{}", url),
            None => println!("{} (default)", config.default_server_url),
        },
    }
    Ok(())
}
