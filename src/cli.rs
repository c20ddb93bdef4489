//! Command-line interface

use clap::{Parser, Subcommand};

use crate::core::GameSettings;

/// Two-player chess in the terminal
#[derive(Debug, Parser)]
#[command(name = "chesstable", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Draw pieces with chess glyphs
    #[arg(long, global = true, conflicts_with = "ascii")]
    pub unicode: bool,

    /// Draw pieces with letters
    #[arg(long, global = true)]
    pub ascii: bool,

    /// Show move and capture hints for the selected piece
    #[arg(long, global = true)]
    pub hints: bool,

    /// Write the resulting settings back to the settings file
    #[arg(long, global = true)]
    pub save: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Play an interactive game on stdin (default)
    Play,

    /// Replay notation from the start position and print the result
    Replay {
        /// Moves in the notation the game records, e.g. e4 e5 Nf3 O-O
        #[arg(required = true)]
        moves: Vec<String>,

        /// Print the final position as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the settings file location and its resolved contents
    Settings,
}

impl Cli {
    /// Apply command-line overrides on top of persisted settings
    pub fn apply(&self, settings: &mut GameSettings) {
        if self.unicode {
            settings.unicode_pieces = true;
        }
        if self.ascii {
            settings.unicode_pieces = false;
        }
        if self.hints {
            settings.show_hints = true;
        }
    }

    pub fn command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Play)
    }
}
