use std::sync::Arc;

use clap::{Parser, Subcommand};
use log::{debug, info};
use tokio::io::{AsyncBufReadExt, BufReader};
use trackshelf::clients::{CatalogClient, CatalogConfig, MemoryStore, TrackStore, errors::Result};
use trackshelf::workflow::{AddOutcome, ConfigBuilder, RemoveOutcome, View, WorkflowController};

#[derive(Parser)]
#[command(name = "trackshelf")]
#[command(version, about = "Look up an artist's top tracks and keep the ones you like", long_about = None)]
struct Cli {
    /// Keep saved tracks in memory for this run instead of Firebase
    #[arg(long, global = true)]
    memory: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the top tracks of an artist
    Search { artist: String },
    /// Print saved tracks with their ids
    Saved {},
    /// Save a track label
    Add { label: String },
    /// Remove a saved track by id
    Remove { id: String },
    /// Interactive session
    Shell {},
}

// Environment from ./.env first, then from the user config directory
fn load_env() {
    if let Ok(path) = dotenvy::dotenv() {
        debug!("Loaded environment from {}", path.display());
    }
    if let Some(dir) = dirs::config_dir() {
        let path = dir.join("trackshelf").join(".env");
        if dotenvy::from_path(&path).is_ok() {
            debug!("Loaded environment from {}", path.display());
        }
    }
}

pub async fn run() -> Result<()> {
    let cli = Cli::parse();
    load_env();

    info!("Building config ...");
    let mut workflow = WorkflowController::new(config_builder(&cli).build()?);

    match &cli.command {
        Commands::Search { artist } => {
            workflow.submit_search(artist).await;
            print_view(&workflow);
        }
        Commands::Saved {} => {
            workflow.view_saved().await;
            print_view(&workflow);
        }
        Commands::Add { label } => match workflow.add_track(label).await {
            AddOutcome::Added(id) => println!("Saved {label} as {id}"),
            AddOutcome::AlreadyAdded => println!("{label} is already saved"),
            AddOutcome::NotATrack => println!("{label} is not a track"),
            AddOutcome::Failed => println!("Could not save {label}, see the log for details"),
        },
        Commands::Remove { id } => match workflow.remove_track(id).await {
            RemoveOutcome::Removed => println!("Removed {id}"),
            RemoveOutcome::Restored => println!("Could not remove {id}, see the log for details"),
        },
        Commands::Shell {} => shell(&mut workflow).await?,
    }
    Ok(())
}

impl Commands {
    fn uses_catalog(&self) -> bool {
        matches!(self, Commands::Search { .. } | Commands::Shell {})
    }

    fn uses_store(&self) -> bool {
        !matches!(self, Commands::Search { .. })
    }
}

// Parts a command never touches are stubbed so their settings are not required
fn config_builder(cli: &Cli) -> ConfigBuilder {
    let mut builder = ConfigBuilder::new();
    if cli.memory || !cli.command.uses_store() {
        builder = builder.store(Arc::new(MemoryStore::new()) as Arc<dyn TrackStore>);
    }
    if !cli.command.uses_catalog() {
        builder = builder.catalog(CatalogClient::new(CatalogConfig::new(String::new())));
    }
    builder
}

fn print_view(workflow: &WorkflowController) {
    if let Some(notice) = workflow.notice() {
        println!("! {notice}");
    }
    match workflow.view() {
        View::Search => {
            if let Some(placeholder) = workflow.search_error() {
                println!("     {placeholder}");
                return;
            }
            for (n, label) in workflow.track_results().iter().enumerate() {
                let mark = if workflow.is_added(label) { " (added)" } else { "" };
                println!("{:>3}. {label}{mark}", n + 1);
            }
        }
        View::SavedList => {
            println!("Saved Tracks");
            if workflow.saved_tracks().is_empty() {
                println!("  (none)");
            }
            for (n, track) in workflow.saved_tracks().iter().enumerate() {
                println!("{:>3}. {}  [{}]", n + 1, track.label, track.id);
            }
        }
    }
}

const SHELL_HELP: &str = "\
commands:
  search <artist>   fetch top tracks (search view)
  add <n>           save result number n (search view)
  saved             show saved tracks
  remove <n>        remove saved track number n (saved view)
  back              return to the search view
  quit";

// Picks the 1-based entry `arg` from `items`
fn pick<'a, T>(items: &'a [T], arg: &str) -> Option<&'a T> {
    let n: usize = arg.trim().parse().ok()?;
    items.get(n.checked_sub(1)?)
}

async fn shell(workflow: &mut WorkflowController) -> Result<()> {
    println!("{SHELL_HELP}");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let (command, arg) = line.trim().split_once(' ').unwrap_or((line.trim(), ""));
        match (workflow.view(), command) {
            (_, "quit" | "exit") => break,
            (_, "") => continue,
            (View::Search, "search") => workflow.submit_search(arg).await,
            (View::Search, "add") => {
                let Some(label) = pick(workflow.found_tracks(), arg).cloned() else {
                    println!("No result number {arg:?}");
                    continue;
                };
                match workflow.add_track(&label).await {
                    AddOutcome::Added(_) => println!("Added {label}"),
                    AddOutcome::AlreadyAdded => println!("{label} was already added"),
                    AddOutcome::NotATrack => println!("{label} is not a track"),
                    AddOutcome::Failed => println!("Could not add {label}"),
                }
                continue;
            }
            (View::Search, "saved") => workflow.view_saved().await,
            (View::SavedList, "remove") => {
                let Some(id) = pick(workflow.saved_tracks(), arg).map(|t| t.id.clone()) else {
                    println!("No saved track number {arg:?}");
                    continue;
                };
                if workflow.remove_track(&id).await == RemoveOutcome::Restored {
                    println!("Could not remove the track");
                }
            }
            (View::SavedList, "back") => workflow.back_to_search(),
            _ => {
                println!("{SHELL_HELP}");
                continue;
            }
        }
        print_view(workflow);
    }
    Ok(())
}
