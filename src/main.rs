use std::cell::RefCell;
use std::io;
use std::rc::Rc;

use anyhow::{Context, Result};
use chess_rules::{replay, Game};
use clap::Parser;
use tracing::{info, warn};

use chesstable::cli::{Cli, Command};
use chesstable::core::{init_logging, save_settings, settings_or_default, settings_path, GameSettings};
use chesstable::ui::{PromptPromotion, Session};

fn main() -> Result<()> {
    let cli = Cli::parse();

    let path = settings_path();
    let (mut settings, load_error) = settings_or_default(&path);
    cli.apply(&mut settings);
    init_logging(&settings.log_filter);
    match load_error {
        Some(e) => warn!("[SETTINGS] Could not load {}: {}. Using defaults.", path.display(), e),
        None => info!("[SETTINGS] Using settings from {}", path.display()),
    }

    if cli.save {
        save_settings(&path, &settings)
            .with_context(|| format!("Failed to save settings to {}", path.display()))?;
        info!("[SETTINGS] Saved to {}", path.display());
    }

    match cli.command() {
        Command::Play => play(settings),
        Command::Replay { moves, json } => replay_moves(&moves, json, &settings),
        Command::Settings => {
            println!("{}", path.display());
            println!("{}", serde_json::to_string_pretty(&settings)?);
            Ok(())
        }
    }
}

fn play(settings: GameSettings) -> Result<()> {
    let input = Rc::new(RefCell::new(io::stdin().lock()));
    let promoter = PromptPromotion::new(Rc::clone(&input), io::stdout());
    let game = Game::new(promoter).context("Failed to set up the starting position")?;
    info!("[GAME] New game started");

    let mut session = Session::new(game, settings, io::stdout());
    session.run(&*input)
}

fn replay_moves(moves: &[String], json: bool, settings: &GameSettings) -> Result<()> {
    let game = replay(moves).context("Replay failed")?;
    let snapshot = game.snapshot();

    if json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
        return Ok(());
    }

    print!("{}", snapshot.render(settings.unicode_pieces, None));
    let notation: Vec<&str> = game.move_history().iter().map(|m| m.notation()).collect();
    println!("{}", notation.join(" "));
    println!("{}", game.game_result());
    Ok(())
}
