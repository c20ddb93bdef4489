//! Interactive terminal session
//!
//! Reads one command per line. Squares are pressed in order like board
//! clicks, so `e2 e4` selects the e2 pawn and moves it. Other commands:
//!
//! - `play <move>` plays recorded notation, e.g. `play Nf3`
//! - `board`, `history`, `help`, `quit`

use std::cell::RefCell;
use std::io::{BufRead, Write};

use anyhow::Result;
use chess_rules::{play_notation, Coord, Game, GameResult, RulesError};
use tracing::{debug, warn};

use crate::core::GameSettings;

const HELP: &str = "\
Commands:
  <square>...     press squares like board clicks, e.g. `e2 e4`
  play <move>     play a move in notation, e.g. `play Nf3`, `play O-O`
  board           redraw the board
  history         list the moves played so far
  quit            leave the game";

/// Whether the session keeps reading input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// A game bound to an output stream
pub struct Session<W: Write> {
    game: Game,
    settings: GameSettings,
    out: W,
}

impl<W: Write> Session<W> {
    pub fn new(game: Game, settings: GameSettings, out: W) -> Self {
        Self { game, settings, out }
    }

    pub fn game(&self) -> &Game {
        &self.game
    }

    pub fn into_output(self) -> W {
        self.out
    }

    /// Run until `quit`, end of input, or the end of the game
    ///
    /// The input is borrowed one line at a time so a promotion prompt can
    /// read from it mid-move.
    pub fn run<R: BufRead>(&mut self, input: &RefCell<R>) -> Result<()> {
        self.draw()?;
        loop {
            let mut line = String::new();
            if input.borrow_mut().read_line(&mut line)? == 0 {
                return Ok(());
            }
            if self.handle_line(&line)? == Flow::Quit {
                return Ok(());
            }
        }
    }

    pub fn handle_line(&mut self, line: &str) -> Result<Flow> {
        let mut words = line.split_whitespace();
        let Some(first) = words.next() else {
            return Ok(Flow::Continue);
        };

        match first {
            "quit" | "exit" => return Ok(Flow::Quit),
            "help" => writeln!(self.out, "{}", HELP)?,
            "board" => self.draw()?,
            "history" => self.print_history()?,
            "play" => {
                let text = words.collect::<Vec<_>>().join(" ");
                match play_notation(&mut self.game, &text) {
                    Ok(()) => self.after_move()?,
                    Err(e) => writeln!(self.out, "{}", e)?,
                }
            }
            _ => {
                let mut squares = Vec::new();
                for word in line.split_whitespace() {
                    match word.parse::<Coord>() {
                        Ok(coord) => squares.push(coord),
                        Err(e) => {
                            writeln!(self.out, "{}. Type `help` for commands.", e)?;
                            return Ok(Flow::Continue);
                        }
                    }
                }
                for coord in squares {
                    self.press(coord)?;
                }
            }
        }

        Ok(if self.game.game_result() == GameResult::Ongoing {
            Flow::Continue
        } else {
            Flow::Quit
        })
    }

    fn press(&mut self, coord: Coord) -> Result<()> {
        let ply = self.game.ply();
        match self.game.press(coord) {
            Ok(true) if self.game.ply() > ply => self.after_move()?,
            Ok(true) => {
                if self.settings.show_hints && self.game.selected().is_some() {
                    self.draw()?;
                }
            }
            Ok(false) => {
                debug!("[TURN] Press on {} ignored", coord);
                writeln!(self.out, "Nothing to do on {}.", coord)?;
            }
            Err(RulesError::PromotionUnanswered { at }) => {
                warn!("[PROMOTION] Move to {} withdrawn", at);
                writeln!(self.out, "Promotion on {} cancelled.", at)?;
            }
            Err(e) => return Err(e.into()),
        }
        Ok(())
    }

    fn after_move(&mut self) -> Result<()> {
        if let Some(last) = self.game.move_history().last() {
            let number = (self.game.ply() + 1) / 2;
            writeln!(self.out, "{}. {} played {}", number, last.player, last)?;
        }
        self.draw()?;
        match self.game.game_result() {
            GameResult::Ongoing if self.game.is_in_check() => {
                writeln!(self.out, "{} is in check.", self.game.active_player())?
            }
            GameResult::Ongoing => {}
            result => writeln!(self.out, "{}", result)?,
        }
        Ok(())
    }

    fn draw(&mut self) -> Result<()> {
        let hints = if self.settings.show_hints {
            self.game.selected_destinations()
        } else {
            None
        };
        let board = self
            .game
            .snapshot()
            .render(self.settings.unicode_pieces, hints.as_ref());
        write!(self.out, "{}", board)?;
        if self.game.game_result() == GameResult::Ongoing {
            writeln!(self.out, "{} to move.", self.game.active_player())?;
        }
        Ok(())
    }

    fn print_history(&mut self) -> Result<()> {
        for (index, pair) in self.game.move_history().chunks(2).enumerate() {
            let black = pair.get(1).map(|m| m.notation()).unwrap_or("");
            writeln!(self.out, "{:>3}. {:<8} {}", index + 1, pair[0].notation(), black)?;
        }
        Ok(())
    }
}
