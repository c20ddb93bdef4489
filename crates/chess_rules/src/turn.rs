//! Turn controller
//!
//! [`Game`] is the single mutating path into a board. Hosts feed it intents
//! (select, move, capture, en passant, deselect) and read state back through
//! queries. Each intent answers `Ok(true)` when it changed state and
//! `Ok(false)` when it was not legal in the current phase or position, in
//! which case nothing changed.
//!
//! ```text
//! Select ──select──▶ Move ──move/capture/castle/en passant──▶ EndTurn
//!   ▲                 │ ▲                                         │
//!   └───deselect──────┘ └─select other                            │
//!   ▲                                                             │
//!   └─────────────────────────analysis, history, flip─────────────┘
//!                                                 └──▶ GameOver (terminal)
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::analysis::analyze;
use crate::board::Board;
use crate::coord::Coord;
use crate::error::{RulesError, RulesResult};
use crate::notation::{disambiguator, GameMove};
use crate::piece::{EnPassant, Piece, PieceId, PieceKind, Player};
use crate::promotion::{PromotionChooser, PromotionRequest};
use crate::snapshot::{BoardSnapshot, Destinations};
use crate::special::{apply_castle, apply_promotion, CastleSide};

/// Phase within the current player's turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TurnPhase {
    /// Waiting for the active player to pick a piece
    ///
    /// Valid transitions: → Move
    #[default]
    Select,

    /// A piece is selected and its destinations are exposed
    ///
    /// Valid transitions: → Move (reselect), → Select (deselect), → EndTurn
    Move,

    /// A move was applied; analysis and bookkeeping are running
    ///
    /// Valid transitions: → Select, → GameOver
    EndTurn,

    /// Checkmate or stalemate
    ///
    /// Terminal state
    GameOver,
}

impl TurnPhase {
    pub fn accepts_input(self) -> bool {
        matches!(self, TurnPhase::Select | TurnPhase::Move)
    }

    pub fn can_transition_to(self, next: TurnPhase) -> bool {
        matches!(
            (self, next),
            (TurnPhase::Select, TurnPhase::Move)
                | (TurnPhase::Move, TurnPhase::Move)
                | (TurnPhase::Move, TurnPhase::Select)
                | (TurnPhase::Move, TurnPhase::EndTurn)
                | (TurnPhase::EndTurn, TurnPhase::Select)
                | (TurnPhase::EndTurn, TurnPhase::GameOver)
        )
    }
}

/// Outcome of the game so far
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameResult {
    Ongoing,
    Checkmate { winner: Player },
    Stalemate,
}

impl fmt::Display for GameResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameResult::Ongoing => write!(f, "Game in progress"),
            GameResult::Checkmate { winner } => write!(f, "Checkmate, {} wins", winner),
            GameResult::Stalemate => write!(f, "Stalemate"),
        }
    }
}

/// How a committed move changes the board
#[derive(Debug, Clone, Copy)]
enum Action {
    Quiet,
    Capture(PieceId),
    EnPassant(EnPassant),
    Castle(CastleSide),
}

/// One live game: the board plus the selection and the promotion source
pub struct Game {
    board: Board,
    selected: Option<PieceId>,
    promoter: Box<dyn PromotionChooser>,
}

impl fmt::Debug for Game {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Game")
            .field("board", &self.board)
            .field("selected", &self.selected)
            .finish_non_exhaustive()
    }
}

impl Game {
    /// Standard start position, White to move
    pub fn new(promoter: impl PromotionChooser + 'static) -> RulesResult<Self> {
        Game::from_board(Board::standard()?, Player::White, promoter)
    }

    /// Start from an arbitrary position
    ///
    /// The position is analyzed for `active` before any intent is accepted.
    /// A position that is already mate or stalemate starts in `GameOver`.
    pub fn from_board(
        mut board: Board,
        active: Player,
        promoter: impl PromotionChooser + 'static,
    ) -> RulesResult<Self> {
        board.active_player = active;
        board.phase = TurnPhase::Select;
        analyze(&mut board, active)?;
        if board.flags.checkmate || board.flags.stalemate {
            board.phase = TurnPhase::GameOver;
        }
        Ok(Game {
            board,
            selected: None,
            promoter: Box::new(promoter),
        })
    }

    pub fn set_promoter(&mut self, promoter: impl PromotionChooser + 'static) {
        self.promoter = Box::new(promoter);
    }

    fn transition_to(&mut self, next: TurnPhase) {
        let current = self.board.phase;
        debug_assert!(
            current.can_transition_to(next),
            "Invalid turn state transition: {:?} -> {:?}",
            current,
            next
        );
        debug!("[TURN] {:?} -> {:?}", current, next);
        self.board.phase = next;
    }

    // ------------------------------------------------------------------
    // Intents
    // ------------------------------------------------------------------

    /// Select one of the active player's pieces
    pub fn select(&mut self, coord: Coord) -> RulesResult<bool> {
        if !self.board.phase.accepts_input() {
            return Ok(false);
        }
        let Some(piece) = self.board.piece_at(coord) else {
            debug!("[TURN] Nothing to select on {}", coord);
            return Ok(false);
        };
        if piece.player != self.board.active_player {
            debug!("[TURN] {} does not own the piece on {}", self.board.active_player, coord);
            return Ok(false);
        }

        self.selected = Some(piece.id);
        self.transition_to(TurnPhase::Move);
        Ok(true)
    }

    /// Drop the current selection
    pub fn deselect(&mut self) -> RulesResult<bool> {
        if self.board.phase != TurnPhase::Move {
            return Ok(false);
        }
        self.selected = None;
        self.transition_to(TurnPhase::Select);
        Ok(true)
    }

    /// Move the selected piece to an empty legal square (castles included)
    pub fn move_to(&mut self, to: Coord) -> RulesResult<bool> {
        let Some(piece) = self.selected_piece()? else {
            return Ok(false);
        };
        if !piece.legal_moves.contains(&to) {
            debug!("[TURN] {} is not a legal move for {:?} on {}", to, piece.kind, piece.coord);
            return Ok(false);
        }

        let action = match piece.kind {
            PieceKind::King if (to.file - piece.coord.file).abs() == 2 => {
                match CastleSide::for_king_move(piece.coord, to) {
                    Some(side) => Action::Castle(side),
                    None => Action::Quiet,
                }
            }
            _ => Action::Quiet,
        };
        self.commit(piece.id, to, action)
    }

    /// Capture with the selected piece
    ///
    /// Targeting the en passant landing square performs the en passant.
    pub fn capture_at(&mut self, at: Coord) -> RulesResult<bool> {
        let Some(piece) = self.selected_piece()? else {
            return Ok(false);
        };
        if !piece.captures.contains(&at) {
            debug!("[TURN] {} is not a legal capture for {:?} on {}", at, piece.kind, piece.coord);
            return Ok(false);
        }

        if let Some(option) = piece.en_passant.filter(|ep| ep.target == at) {
            return self.commit(piece.id, at, Action::EnPassant(option));
        }
        let victim = self
            .board
            .square(at)?
            .occupant()
            .ok_or(RulesError::EmptySquare { coord: at })?;
        self.commit(piece.id, at, Action::Capture(victim))
    }

    /// Capture en passant with the selected pawn, landing on `target`
    pub fn attempt_en_passant(&mut self, target: Coord) -> RulesResult<bool> {
        let Some(piece) = self.selected_piece()? else {
            return Ok(false);
        };
        match piece.en_passant {
            Some(option) if option.target == target && piece.captures.contains(&target) => {
                self.commit(piece.id, target, Action::EnPassant(option))
            }
            _ => {
                debug!("[TURN] No en passant onto {} for the piece on {}", target, piece.coord);
                Ok(false)
            }
        }
    }

    /// Board click: select, reselect, deselect or act, by what is on `coord`
    pub fn press(&mut self, coord: Coord) -> RulesResult<bool> {
        match self.board.phase {
            TurnPhase::Select => self.select(coord),
            TurnPhase::Move => {
                let Some(selected) = self.selected_piece()? else {
                    return self.deselect();
                };
                let (selected_id, en_passant) = (selected.id, selected.en_passant);
                let (in_moves, in_captures) = (
                    selected.legal_moves.contains(&coord),
                    selected.captures.contains(&coord),
                );

                let occupant = self.board.piece_at(coord).map(|p| (p.id, p.player));
                match occupant {
                    Some((id, _)) if id == selected_id => self.deselect(),
                    Some((_, owner)) if owner == self.board.active_player => self.select(coord),
                    Some(_) if in_captures => self.capture_at(coord),
                    None if in_moves => self.move_to(coord),
                    None if en_passant.is_some_and(|ep| ep.target == coord) => {
                        self.attempt_en_passant(coord)
                    }
                    _ => Ok(false),
                }
            }
            TurnPhase::EndTurn | TurnPhase::GameOver => Ok(false),
        }
    }

    fn selected_piece(&self) -> RulesResult<Option<Piece>> {
        if self.board.phase != TurnPhase::Move {
            return Ok(None);
        }
        match self.selected {
            Some(id) => Ok(Some(self.board.piece(id)?.clone())),
            None => Ok(None),
        }
    }

    // ------------------------------------------------------------------
    // Commit
    // ------------------------------------------------------------------

    /// Ask the chooser for a promotion piece if `to` is the promotion rank
    fn promotion_for(&mut self, piece: &Piece, to: Coord, capture: bool) -> RulesResult<Option<PieceKind>> {
        if piece.kind != PieceKind::Pawn || to.rank != piece.player.promotion_rank() {
            return Ok(None);
        }

        let request = PromotionRequest {
            player: piece.player,
            from: piece.coord,
            to,
            capture,
        };
        info!("[PROMOTION] {} pawn reaches {}, awaiting choice", piece.player, to);
        match self.promoter.choose(&request) {
            Some(kind) if kind.is_promotion_target() => Ok(Some(kind)),
            Some(kind) => Err(RulesError::InvalidPromotion { kind }),
            None => {
                warn!("[PROMOTION] No piece chosen for {}, move withdrawn", to);
                Err(RulesError::PromotionUnanswered { at: to })
            }
        }
    }

    fn commit(&mut self, id: PieceId, to: Coord, action: Action) -> RulesResult<bool> {
        let piece = self.board.piece(id)?.clone();
        let (player, from) = (piece.player, piece.coord);
        let is_capture = matches!(action, Action::Capture(_) | Action::EnPassant(_));

        // Everything that can refuse the move runs before the board changes.
        let promotion = self.promotion_for(&piece, to, is_capture)?;
        let hint = disambiguator(&self.board, id, to)?;

        self.transition_to(TurnPhase::EndTurn);
        self.board.flags.reset_move();

        let captured = match action {
            Action::Quiet => {
                self.board.relocate(id, to)?;
                if piece.kind == PieceKind::Pawn && (to.rank - from.rank).abs() == 2 {
                    self.board.piece_mut(id)?.double_moved_at = Some(self.board.ply);
                }
                None
            }
            Action::Capture(victim) => {
                let kind = self.board.capture(victim)?;
                self.board.relocate(id, to)?;
                Some(kind)
            }
            Action::EnPassant(option) => {
                let kind = self.board.capture(option.victim)?;
                self.board.relocate(id, to)?;
                Some(kind)
            }
            Action::Castle(side) => {
                apply_castle(&mut self.board, player, side)?;
                match side {
                    CastleSide::Short => self.board.flags.did_castle_short = true,
                    CastleSide::Long => self.board.flags.did_castle_long = true,
                }
                None
            }
        };
        self.board.flags.is_capture = captured.is_some();

        if let Some(kind) = promotion {
            apply_promotion(&mut self.board, id, kind)?;
        }

        let number = self.move_number();
        self.board.ply += 1;
        analyze(&mut self.board, player.opponent())?;
        let flags = self.board.flags;

        let castle = match action {
            Action::Castle(side) => Some(side),
            _ => None,
        };
        let record = GameMove::new(
            player,
            piece.kind,
            id,
            from,
            to,
            hint,
            promotion,
            captured,
            castle,
            matches!(action, Action::EnPassant(_)),
            flags.in_check,
            flags.checkmate,
        );
        info!("[NOTATION] {}. {} {}", number, player, record.notation());
        self.board.history.push(record);
        self.selected = None;

        if flags.checkmate || flags.stalemate {
            self.transition_to(TurnPhase::GameOver);
            info!("[TURN] Game over: {}", self.game_result());
        } else {
            self.board.active_player = player.opponent();
            self.transition_to(TurnPhase::Select);
        }
        Ok(true)
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Legal destinations of a piece
    ///
    /// Only the side to move has legal destinations; the opponent's pieces
    /// and every piece after the game ended report none.
    pub fn legal_destinations_for(&self, id: PieceId) -> RulesResult<Destinations> {
        let piece = self.board.piece(id)?;
        if piece.player != self.board.active_player || self.board.phase == TurnPhase::GameOver {
            return Ok(Destinations::default());
        }
        Ok(Destinations::of(piece))
    }

    pub fn snapshot(&self) -> BoardSnapshot {
        BoardSnapshot::of(&self.board)
    }

    pub fn is_in_check(&self) -> bool {
        self.board.flags.in_check
    }

    pub fn game_result(&self) -> GameResult {
        let flags = self.board.flags;
        if flags.checkmate {
            GameResult::Checkmate {
                winner: self.board.active_player.opponent(),
            }
        } else if flags.stalemate {
            GameResult::Stalemate
        } else {
            GameResult::Ongoing
        }
    }

    pub fn move_history(&self) -> &[GameMove] {
        self.board.history()
    }

    pub fn selected(&self) -> Option<&Piece> {
        self.selected.and_then(|id| self.board.piece(id).ok())
    }

    /// Destinations of the selected piece, for move and capture hints
    pub fn selected_destinations(&self) -> Option<Destinations> {
        self.selected().map(Destinations::of)
    }

    pub fn phase(&self) -> TurnPhase {
        self.board.phase
    }

    pub fn active_player(&self) -> Player {
        self.board.active_player
    }

    /// Half-moves committed so far
    pub fn ply(&self) -> u32 {
        self.board.ply
    }

    /// Full-move number, incremented after Black's ply
    pub fn move_number(&self) -> u32 {
        self.board.ply / 2 + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::promotion::{FixedPromotion, Unanswered};

    fn sq(s: &str) -> Coord {
        s.parse().unwrap()
    }

    fn play(game: &mut Game, from: &str, to: &str) -> bool {
        assert!(game.select(sq(from)).unwrap(), "cannot select {}", from);
        game.press(sq(to)).unwrap()
    }

    #[test]
    fn test_phase_transitions() {
        assert!(TurnPhase::Select.can_transition_to(TurnPhase::Move));
        assert!(TurnPhase::Move.can_transition_to(TurnPhase::Select));
        assert!(TurnPhase::EndTurn.can_transition_to(TurnPhase::GameOver));
        assert!(!TurnPhase::Select.can_transition_to(TurnPhase::EndTurn));
        assert!(!TurnPhase::GameOver.can_transition_to(TurnPhase::Select));
    }

    #[test]
    fn test_select_rejects_empty_and_enemy_squares() {
        let mut game = Game::new(Unanswered).unwrap();

        assert!(!game.select(sq("e4")).unwrap());
        assert!(!game.select(sq("e7")).unwrap());
        assert_eq!(game.phase(), TurnPhase::Select);

        assert!(game.select(sq("e2")).unwrap());
        assert_eq!(game.phase(), TurnPhase::Move);
        assert_eq!(game.selected().unwrap().coord, sq("e2"));
    }

    #[test]
    fn test_press_reselects_and_deselects() {
        let mut game = Game::new(Unanswered).unwrap();

        assert!(game.press(sq("g1")).unwrap());
        assert!(game.press(sq("b1")).unwrap(), "reselect another own piece");
        assert_eq!(game.selected().unwrap().coord, sq("b1"));
        assert_eq!(game.phase(), TurnPhase::Move);

        assert!(game.press(sq("b1")).unwrap(), "same piece deselects");
        assert_eq!(game.phase(), TurnPhase::Select);
        assert!(game.selected().is_none());
    }

    #[test]
    fn test_illegal_target_is_a_no_op() {
        let mut game = Game::new(Unanswered).unwrap();
        game.select(sq("e2")).unwrap();

        assert!(!game.move_to(sq("e5")).unwrap());
        assert!(!game.capture_at(sq("d3")).unwrap());
        assert!(!game.press(sq("a6")).unwrap());
        assert_eq!(game.phase(), TurnPhase::Move);
        assert_eq!(game.ply(), 0);
    }

    #[test]
    fn test_move_flips_player_and_records_history() {
        let mut game = Game::new(Unanswered).unwrap();

        assert!(play(&mut game, "g1", "f3"));
        assert_eq!(game.active_player(), Player::Black);
        assert_eq!(game.phase(), TurnPhase::Select);
        assert_eq!(game.ply(), 1);
        assert_eq!(game.move_number(), 1);
        assert_eq!(game.move_history()[0].notation(), "Nf3");

        assert!(play(&mut game, "d7", "d5"));
        assert_eq!(game.move_number(), 2);
    }

    #[test]
    fn test_opponent_pieces_have_no_destinations() {
        let game = Game::new(Unanswered).unwrap();
        let black_knight = game.board().piece_at(sq("g8")).unwrap().id;
        let white_knight = game.board().piece_at(sq("g1")).unwrap().id;

        assert!(game.legal_destinations_for(black_knight).unwrap().is_empty());
        assert_eq!(game.legal_destinations_for(white_knight).unwrap().len(), 2);
    }

    #[test]
    fn test_unanswered_promotion_leaves_board_untouched() {
        let mut board = Board::empty();
        board.place(PieceKind::King, Player::White, sq("e1")).unwrap();
        board.place(PieceKind::Pawn, Player::White, sq("b7")).unwrap();
        board.place(PieceKind::King, Player::Black, sq("h8")).unwrap();
        let mut game = Game::from_board(board, Player::White, Unanswered).unwrap();

        game.select(sq("b7")).unwrap();
        assert_eq!(
            game.move_to(sq("b8")),
            Err(RulesError::PromotionUnanswered { at: sq("b8") })
        );
        assert_eq!(game.board().piece_at(sq("b7")).unwrap().kind, PieceKind::Pawn);
        assert!(game.move_history().is_empty());
        assert_eq!(game.phase(), TurnPhase::Move);

        game.set_promoter(FixedPromotion(PieceKind::Knight));
        assert!(game.move_to(sq("b8")).unwrap());
        assert_eq!(game.board().piece_at(sq("b8")).unwrap().kind, PieceKind::Knight);
        assert_eq!(game.move_history()[0].notation(), "b8N");
    }

    #[test]
    fn test_game_over_rejects_intents() {
        let mut board = Board::empty();
        board.place(PieceKind::King, Player::Black, sq("h8")).unwrap();
        board.place(PieceKind::Queen, Player::White, sq("g7")).unwrap();
        board.place(PieceKind::King, Player::White, sq("g6")).unwrap();
        let mut game = Game::from_board(board, Player::Black, Unanswered).unwrap();

        assert_eq!(game.phase(), TurnPhase::GameOver);
        assert_eq!(game.game_result(), GameResult::Checkmate { winner: Player::White });
        assert!(!game.select(sq("h8")).unwrap());
        assert!(!game.press(sq("h8")).unwrap());
    }
}
