use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use reelboard_core::board::board_path;
use reelboard_core::edit::TimeField;
use reelboard_core::types::{Board, ItemId, ItemKind};
use reelboard_sync::config::SyncConfig;
use reelboard_sync::http::HttpRemoteStore;
use reelboard_sync::{SyncCoordinator, SyncedBoard};
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(name = "reelboard", about = "Reorder and time short-drama boards", version)]
struct Cli {
    /// Board file
    #[arg(long, default_value = "board.reelboard")]
    board: PathBuf,

    /// Sync config (JSON)
    #[arg(long, default_value = "reelboard.json")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create an empty board file
    Init {
        name: String,
        #[arg(long, default_value = "storyboard")]
        kind: ItemKind,
    },
    /// Print the board in order
    Show,
    /// Drag SOURCE onto TARGET
    Move { source: ItemId, target: ItemId },
    /// Put an item at a 1-based rank
    Rank { id: ItemId, rank: u32 },
    /// Set an item's window, e.g. `set-range 7 00:10 00:15`
    SetRange { id: ItemId, start: String, end: String },
    /// Delete an item
    Remove { id: ItemId },
    /// Replace local items with the backend's
    Pull,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();
    let path = board_path(&cli.board);
    match cli.command {
        Command::Init { name, kind } => {
            let board = Board::new(name, kind);
            board
                .save_to_file(&path)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            tracing::info!("Created {} board {}", kind, path.display());
            Ok(())
        }
        Command::Show => {
            let board = load_board(&path)?;
            print_board(&board);
            Ok(())
        }
        command => {
            let board = load_board(&path)?;
            let synced = connect(&cli.config, board).await?;
            run_synced(&synced, command).await?;
            let board = synced.into_board();
            board
                .save_to_file(&path)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            print_board(&board);
            Ok(())
        }
    }
}

async fn run_synced(synced: &SyncedBoard, command: Command) -> Result<()> {
    match command {
        Command::Move { source, target } => {
            let change = synced
                .move_item(&source, &target)
                .await
                .with_context(|| format!("Move {source} onto {target} not saved"))?;
            tracing::info!("{:?}", change);
        }
        Command::Rank { id, rank } => {
            synced
                .update_rank(&id, rank)
                .await
                .with_context(|| format!("Rank change for {id} not saved"))?;
        }
        Command::SetRange { id, start, end } => {
            let (start_m, start_s) = split_clock(&start)?;
            let (end_m, end_s) = split_clock(&end)?;
            synced.start_edit(&id)?;
            synced.update_component(TimeField::StartMinutes, start_m)?;
            synced.update_component(TimeField::StartSeconds, start_s)?;
            synced.update_component(TimeField::EndMinutes, end_m)?;
            synced.update_component(TimeField::EndSeconds, end_s)?;
            synced
                .commit_edit()
                .await
                .with_context(|| format!("Time range for {id} not saved"))?;
        }
        Command::Remove { id } => {
            synced
                .remove_item(&id)
                .await
                .with_context(|| format!("Removal of {id} not saved"))?;
        }
        Command::Pull => {
            synced.refresh().await.context("Pull failed")?;
        }
        other => anyhow::bail!("{other:?} runs without a connection"),
    }
    Ok(())
}

async fn connect(config_path: &Path, board: Board) -> Result<SyncedBoard> {
    let config = SyncConfig::load(config_path).await?;
    let store = HttpRemoteStore::new(&config)?;
    let coordinator = SyncCoordinator::new(Arc::new(store), config.session());
    tracing::info!("Syncing {} board with {}", board.kind, config.base_url);
    Ok(SyncedBoard::new(board, coordinator))
}

fn load_board(path: &Path) -> Result<Board> {
    Board::load_from_file(path).with_context(|| format!("Failed to load board {}", path.display()))
}

/// `"MM:SS"` into its two text fields. A bare number is taken as seconds.
fn split_clock(value: &str) -> Result<(&str, &str)> {
    match value.split_once(':') {
        Some((m, s)) => Ok((m, s)),
        None if !value.trim().is_empty() => Ok(("0", value)),
        None => anyhow::bail!("empty time value"),
    }
}

fn print_board(board: &Board) {
    println!("{} ({})", board.name, board.kind);
    for item in board.collection.items() {
        let window = item
            .time_range
            .map(|r| r.to_string())
            .unwrap_or_else(|| "--:-- - --:--".to_string());
        println!(
            "{:>3}. [{}] {:<12} {}",
            item.rank,
            window,
            item.id.to_string(),
            item.title
        );
    }
}
