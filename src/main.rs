use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use frontcat::backends::{
    Backends, DocumentStore, FilePicker, MemoryDocumentStore, MemoryObjectStorage,
};
use frontcat::catalog::{self, demo_roster};
use frontcat::config::{BackendKind, Config};
use frontcat::models::{DraftOverrides, MediaKind, PlayerDraft, PlayerId, VideoChoice};
use frontcat::services::{
    FetchOutcome, FilterCriterion, MediaResolver, PlayerEditor, RosterChange, RosterLoader,
};

#[derive(Parser)]
#[command(name = "frontcat", about = "NBA player roster manager", version)]
struct Cli {
    /// Config file to use instead of the default location
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the roster, optionally loading more pages and filtering
    List {
        #[arg(long, default_value_t = 1)]
        pages: usize,
        /// name | position | age (Spanish labels accepted)
        #[arg(long, default_value = "name")]
        by: FilterCriterion,
        #[arg(long)]
        search: Option<String>,
    },
    /// Follow the first roster page and print every change
    Watch,
    /// Show one player and where their media would load from
    Show { id: String },
    /// Create a player, or update one with --id; fields not given keep their stored value
    Save {
        #[arg(long)]
        id: Option<String>,
        #[arg(long, required_unless_present = "id")]
        name: Option<String>,
        #[arg(long)]
        last_name: Option<String>,
        #[arg(long)]
        alias: Option<String>,
        #[arg(long)]
        position: Option<String>,
        #[arg(long)]
        age: Option<String>,
        #[arg(long)]
        team: Option<String>,
        /// Photo file to attach
        #[arg(long)]
        photo: Option<PathBuf>,
        /// Bundled clip name
        #[arg(long, conflicts_with = "video_file")]
        clip: Option<String>,
        /// Video file to copy into app storage
        #[arg(long)]
        video_file: Option<PathBuf>,
    },
    /// List bundled clips and teams
    Catalog,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("frontcat=info")),
        )
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    let backends = match config.backend.kind {
        BackendKind::Memory => {
            info!("Using in-memory backend with demo roster");
            let store = MemoryDocumentStore::with_players(demo_roster()).await;
            Backends::new(
                Arc::new(store),
                Some(Arc::new(MemoryObjectStorage::default())),
            )
        }
        BackendKind::Firebase => {
            Backends::connect(&config).context("Failed to connect to Firebase")?
        }
    };

    match cli.command {
        Command::List { pages, by, search } => {
            list(&backends, &config, pages, by, search.as_deref()).await
        }
        Command::Watch => watch(&backends, &config).await,
        Command::Show { id } => show(&backends, &id).await,
        Command::Save {
            id,
            name,
            last_name,
            alias,
            position,
            age,
            team,
            photo,
            clip,
            video_file,
        } => {
            let editor = PlayerEditor::new(
                backends.store.clone(),
                backends.storage.clone(),
                config.media.clone(),
            );

            let mut draft = match &id {
                Some(id) => match backends.store.get(&PlayerId::new(id.as_str())).await? {
                    Some(player) => PlayerDraft::from_player(&player),
                    None => PlayerDraft::default(),
                },
                None => PlayerDraft::default(),
            };
            draft.apply(DraftOverrides {
                alias,
                name,
                last_name,
                position,
                age,
                teams: team,
            });

            let picker = FilePicker::new(photo, video_file);
            let draft = match pick_media(&editor, &picker, draft, clip).await {
                Ok(draft) => draft,
                Err(e) => {
                    eprintln!("{}", e.user_message());
                    return Err(e.into());
                }
            };

            let existing = id.map(PlayerId::new);
            let receipt = match editor.save(&draft, existing.as_ref()).await {
                Ok(receipt) => receipt,
                Err(e) => {
                    eprintln!("{}", e.user_message());
                    return Err(e.into());
                }
            };
            println!("Saved player {}", receipt.id);

            if let Some(upload) = receipt.upload {
                match upload.wait().await {
                    Ok(report) => println!("Uploaded {} to {}", report.kind, report.url),
                    Err(e) => {
                        warn!("Upload failed: {}", e);
                        eprintln!("{}", e.user_message());
                    }
                }
            }
            Ok(())
        }
        Command::Catalog => {
            let registry = catalog::AssetRegistry::bundled();
            println!("Clips:");
            for name in registry.names(MediaKind::Video) {
                println!("  {}", name);
            }
            println!("Teams:");
            for team in catalog::NBA_TEAMS {
                println!("  {}", team.name);
            }
            println!("Featured: {}", catalog::random_highlight().url);
            Ok(())
        }
    }
}

async fn pick_media(
    editor: &PlayerEditor,
    picker: &FilePicker,
    draft: PlayerDraft,
    clip: Option<String>,
) -> frontcat::Result<PlayerDraft> {
    let draft = editor.attach_picked_photo(picker, draft).await?;
    match clip {
        Some(clip) => Ok(draft.with_video(VideoChoice::Bundled(clip))),
        None => editor.attach_picked_video(picker, draft).await,
    }
}

async fn list(
    backends: &Backends,
    config: &Config,
    pages: usize,
    by: FilterCriterion,
    search: Option<&str>,
) -> Result<()> {
    let loader = RosterLoader::new(backends.store.clone());
    let subscription = loader.subscribe_first_page(config.roster.page_size).await?;

    for _ in 1..pages {
        match loader.fetch_next_page(config.roster.page_size).await? {
            FetchOutcome::Appended(_) => {}
            FetchOutcome::Exhausted | FetchOutcome::Skipped => break,
        }
    }
    subscription.shutdown().await;

    let players = loader.filtered(by, search.unwrap_or_default()).await;
    for player in &players {
        println!(
            "{:<22} {:<28} {:<10} {:>3}",
            player.id,
            player.to_string(),
            player.record.position,
            player.record.age
        );
    }
    println!("{} of {} loaded players", players.len(), loader.len().await);
    Ok(())
}

async fn watch(backends: &Backends, config: &Config) -> Result<()> {
    let loader = RosterLoader::new(backends.store.clone());
    let mut changes = loader.changes();
    let subscription = loader.subscribe_first_page(config.roster.page_size).await?;
    println!("Following first {} players, Ctrl-C to stop", config.roster.page_size);

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            change = changes.recv() => match change {
                Ok(RosterChange::Reset(count)) => {
                    let names: Vec<String> =
                        loader.players().await.iter().map(ToString::to_string).collect();
                    println!("{} players: {}", count, names.join(", "));
                }
                Ok(RosterChange::Appended(_)) => {}
                Err(e) => {
                    warn!("Missed roster changes: {}", e);
                }
            }
        }
    }

    subscription.shutdown().await;
    Ok(())
}

async fn show(backends: &Backends, id: &str) -> Result<()> {
    let player = backends
        .store
        .get(&PlayerId::new(id))
        .await?
        .with_context(|| format!("No player with id {}", id))?;
    let resolver = MediaResolver::default();

    println!("{} (#{})", player, player.record.alias);
    println!("  position: {}", player.record.position);
    println!("  age:      {}", player.record.age);
    match catalog::find_team(&player.record.teams) {
        Some(team) => println!("  team:     {} ({})", team.name, team.logo),
        None => println!("  team:     {}", player.record.teams),
    }
    println!("  photo:    {}", resolver.player_photo_or_placeholder(&player));
    println!("  video:    {}", resolver.player_video(&player));
    Ok(())
}
