//! Replaying recorded notation
//!
//! Each notation string is parsed into a [`MoveText`], resolved against the
//! legal destinations of the side to move, and then played through the
//! ordinary intents of [`Game`]. The promotion letter in the text is fed
//! through the promotion callback like any other answer.

use std::str::FromStr;

use thiserror::Error;
use tracing::{debug, info};

use crate::coord::{file_from_char, rank_from_char, Coord};
use crate::error::RulesError;
use crate::piece::{PieceKind, Player};
use crate::promotion::{FixedPromotion, Unanswered};
use crate::special::CastleSide;
use crate::turn::{Game, TurnPhase};

/// Errors raised while replaying notation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NotationError {
    #[error("Cannot parse move text '{text}'")]
    Malformed { text: String },

    #[error("No {player} piece can play '{text}'")]
    NoMatch { text: String, player: Player },

    #[error("'{text}' fits {count} {player} pieces")]
    Ambiguous {
        text: String,
        player: Player,
        count: usize,
    },

    #[error("The game rejected '{text}'")]
    Rejected { text: String },

    #[error("'{text}' was played after the game ended")]
    GameOver { text: String },

    #[error(transparent)]
    Rules(#[from] RulesError),
}

/// Parsed form of one notation string
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveText {
    pub kind: PieceKind,
    pub from_file: Option<i8>,
    pub from_rank: Option<i8>,
    pub capture: bool,
    pub to: Coord,
    pub promotion: Option<PieceKind>,
    pub castle: Option<CastleSide>,
}

impl MoveText {
    fn castle(side: CastleSide) -> Self {
        MoveText {
            kind: PieceKind::King,
            from_file: None,
            from_rank: None,
            capture: false,
            to: Coord::ORIGIN,
            promotion: None,
            castle: Some(side),
        }
    }
}

impl FromStr for MoveText {
    type Err = NotationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || NotationError::Malformed {
            text: s.to_string(),
        };
        let text = s.trim();

        let bare = text.trim_end_matches(['+', '#']);
        match bare {
            "O-O-O" | "0-0-0" => return Ok(MoveText::castle(CastleSide::Long)),
            "O-O" | "0-0" => return Ok(MoveText::castle(CastleSide::Short)),
            _ => {}
        }

        let mut chars: Vec<char> = text.chars().collect();

        let mut promotion = None;
        if let Some(&last) = chars.last() {
            if let Some(kind) = PieceKind::from_letter(last) {
                if !kind.is_promotion_target() {
                    return Err(malformed());
                }
                promotion = Some(kind);
                chars.pop();
                if chars.last() == Some(&'=') {
                    chars.pop();
                }
            }
        }
        while matches!(chars.last(), Some('+') | Some('#')) {
            chars.pop();
        }

        let kind = match chars.first().copied().and_then(PieceKind::from_letter) {
            Some(kind) => {
                chars.remove(0);
                kind
            }
            None => PieceKind::Pawn,
        };

        if chars.len() < 2 {
            return Err(malformed());
        }
        let rank = chars.pop().and_then(rank_from_char).ok_or_else(malformed)?;
        let file = chars.pop().and_then(file_from_char).ok_or_else(malformed)?;
        let to = Coord::new(rank, file);

        let capture = chars.last() == Some(&'x');
        if capture {
            chars.pop();
        }

        let (mut from_file, mut from_rank) = (None, None);
        for c in chars {
            if let Some(f) = file_from_char(c).filter(|_| from_file.is_none() && from_rank.is_none()) {
                from_file = Some(f);
            } else if let Some(r) = rank_from_char(c).filter(|_| from_rank.is_none()) {
                from_rank = Some(r);
            } else {
                return Err(malformed());
            }
        }

        if promotion.is_some() && kind != PieceKind::Pawn {
            return Err(malformed());
        }

        Ok(MoveText {
            kind,
            from_file,
            from_rank,
            capture,
            to,
            promotion,
            castle: None,
        })
    }
}

/// Play one notation string on `game`
pub fn play_notation(game: &mut Game, text: &str) -> Result<(), NotationError> {
    if game.phase() == TurnPhase::GameOver {
        return Err(NotationError::GameOver {
            text: text.to_string(),
        });
    }
    if game.phase() == TurnPhase::Move {
        game.deselect()?;
    }

    let parsed: MoveText = text.parse()?;
    let player = game.active_player();

    let (from, to) = match parsed.castle {
        Some(side) => {
            let king = game.board().king(player)?;
            (king.coord, Coord::new(player.back_rank(), side.king_to_file()))
        }
        None => (resolve(game, &parsed, text)?, parsed.to),
    };

    match parsed.promotion {
        Some(kind) => game.set_promoter(FixedPromotion(kind)),
        None => game.set_promoter(Unanswered),
    }

    if !game.select(from)? {
        return Err(NotationError::Rejected {
            text: text.to_string(),
        });
    }
    let capture = game
        .selected()
        .is_some_and(|piece| piece.captures.contains(&to));
    let played = if capture {
        game.capture_at(to)?
    } else {
        game.move_to(to)?
    };
    if !played {
        game.deselect()?;
        return Err(NotationError::Rejected {
            text: text.to_string(),
        });
    }

    debug!("[REPLAY] {} played {}", player, text);
    Ok(())
}

/// Origin square of the single active piece the text can refer to
fn resolve(game: &Game, parsed: &MoveText, text: &str) -> Result<Coord, NotationError> {
    let player = game.active_player();
    let candidates: Vec<Coord> = game
        .board()
        .pieces_of(player)
        .filter(|p| p.kind == parsed.kind)
        .filter(|p| parsed.from_file.is_none_or(|f| p.coord.file == f))
        .filter(|p| parsed.from_rank.is_none_or(|r| p.coord.rank == r))
        .filter(|p| {
            if parsed.capture {
                p.captures.contains(&parsed.to)
            } else {
                p.legal_moves.contains(&parsed.to)
            }
        })
        .map(|p| p.coord)
        .collect();

    match candidates.as_slice() {
        [from] => Ok(*from),
        [] => Err(NotationError::NoMatch {
            text: text.to_string(),
            player,
        }),
        _ => Err(NotationError::Ambiguous {
            text: text.to_string(),
            player,
            count: candidates.len(),
        }),
    }
}

/// Replay a notation sequence from the standard start position
pub fn replay<S: AsRef<str>>(moves: &[S]) -> Result<Game, NotationError> {
    let mut game = Game::new(Unanswered)?;
    for (index, text) in moves.iter().enumerate() {
        let text = text.as_ref();
        play_notation(&mut game, text).inspect_err(|e| {
            info!("[REPLAY] Stopped at move {} '{}': {}", index + 1, text, e);
        })?;
    }
    game.set_promoter(Unanswered);
    info!("[REPLAY] Replayed {} half-moves: {}", moves.len(), game.game_result());
    Ok(game)
}
