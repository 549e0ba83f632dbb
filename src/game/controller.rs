use std::collections::BTreeMap;

use image::GrayImage;
use tracing::{debug, info, warn};

use super::eval::{Evaluation, Evaluator};
use super::prompt::Prompter;
use super::resolver::{MoveResolver, ResolvedMove};
use super::rules::RulesEngine;
use crate::board::{Board, Color, Piece, PieceKind, Square};
use crate::error::{Error, Result};
use crate::vision::{FrameStore, MoveDetector};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    AwaitingFirstMove,
    AwaitingSubsequentMove,
    Complete,
}

/// Turn, counters and everything recorded so far
#[derive(Debug, Clone, PartialEq)]
pub struct GameState {
    pub turn: Color,
    /// Half-move counter, starting at 1
    pub move_number: u32,
    pub white_castled: bool,
    pub black_castled: bool,
    pub positions: BTreeMap<u32, String>,
    pub evaluations: BTreeMap<u32, Evaluation>,
    pub current_uci: String,
}

impl GameState {
    pub fn new() -> Self {
        GameState {
            turn: Color::White,
            move_number: 1,
            white_castled: false,
            black_castled: false,
            positions: BTreeMap::new(),
            evaluations: BTreeMap::new(),
            current_uci: String::new(),
        }
    }

    pub fn has_castled(&self, color: Color) -> bool {
        match color {
            Color::White => self.white_castled,
            Color::Black => self.black_castled,
        }
    }

    fn mark_castled(&mut self, color: Color) {
        match color {
            Color::White => self.white_castled = true,
            Color::Black => self.black_castled = true,
        }
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}

/// One accepted move of the game record
#[derive(Debug, Clone, PartialEq)]
pub struct MoveRecord {
    pub number: u32,
    pub color: Color,
    pub uci: String,
    pub san: String,
    pub fen: String,
    pub evaluation: Option<Evaluation>,
}

/// Runs one game: every new frame becomes one move on the board and in the
/// rules engine.
///
/// Nothing here retries or rolls back. A rejected move leaves the board
/// already updated and the error goes straight to the caller.
pub struct GameController {
    board: Board,
    state: GameState,
    phase: GamePhase,
    frames: FrameStore,
    detector: MoveDetector,
    resolver: MoveResolver,
    rules: Box<dyn RulesEngine>,
    evaluator: Option<Box<dyn Evaluator>>,
    prompter: Box<dyn Prompter>,
    records: Vec<MoveRecord>,
}

impl GameController {
    pub fn new(rules: Box<dyn RulesEngine>, prompter: Box<dyn Prompter>) -> Self {
        GameController {
            board: Board::starting_position(),
            state: GameState::new(),
            phase: GamePhase::AwaitingFirstMove,
            frames: FrameStore::new(),
            detector: MoveDetector::new(),
            resolver: MoveResolver::new(),
            rules,
            evaluator: None,
            prompter,
            records: Vec::new(),
        }
    }

    pub fn with_evaluator(mut self, evaluator: Box<dyn Evaluator>) -> Self {
        self.evaluator = Some(evaluator);
        self
    }

    pub fn with_underpromotions(mut self, underpromotions: bool) -> Self {
        self.resolver = self.resolver.with_underpromotions(underpromotions);
        self
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn records(&self) -> &[MoveRecord] {
        &self.records
    }

    /// Feeds the next preprocessed frame.
    ///
    /// The very first frame only primes the store; each later one yields the
    /// move played between it and its predecessor.
    pub fn push_frame(&mut self, frame: GrayImage) -> Result<Option<MoveRecord>> {
        if self.phase == GamePhase::Complete {
            return Err(Error::GameComplete);
        }
        self.frames.advance(frame);

        let turn = self.state.turn;
        let castle_check = self.phase == GamePhase::AwaitingSubsequentMove && !self.state.has_castled(turn);
        let squares = match self.frames.pair() {
            Some((previous, current)) => {
                self.detector
                    .detect(previous, current, castle_check, turn, &self.board)?
            }
            None => return Ok(None),
        };

        self.play_squares(squares.0, squares.1).map(Some)
    }

    /// Plays the move between two changed squares, in either order
    pub fn play_squares(&mut self, first: Square, second: Square) -> Result<MoveRecord> {
        if self.phase == GamePhase::Complete {
            return Err(Error::GameComplete);
        }
        let resolved = self.resolver.resolve(
            &self.board,
            (first, second),
            self.state.turn,
            self.prompter.as_mut(),
        )?;
        self.play(resolved)
    }

    /// Applies a resolved move to the board, submits it and records the result
    pub fn play(&mut self, resolved: ResolvedMove) -> Result<MoveRecord> {
        let uci = resolved.uci();
        info!("Move {}: {} plays {}", self.state.move_number, self.state.turn, uci);
        self.state.current_uci = uci.clone();

        self.apply_move(&resolved)?;

        let accepted = self.rules.submit(&uci)?;
        let number = self.state.move_number;
        self.state.positions.insert(number, accepted.fen.clone());

        let evaluation = match self.evaluator.as_mut() {
            Some(evaluator) => {
                let evaluation = evaluator.evaluate(&accepted.fen)?;
                debug!("Evaluation after move {}: {}", number, evaluation);
                self.state.evaluations.insert(number, evaluation);
                Some(evaluation)
            }
            None => None,
        };

        let record = MoveRecord {
            number,
            color: self.state.turn,
            uci,
            san: accepted.san,
            fen: accepted.fen,
            evaluation,
        };
        self.records.push(record.clone());

        self.state.move_number += 1;
        self.state.turn = self.state.turn.opposite();
        self.phase = GamePhase::AwaitingSubsequentMove;
        Ok(record)
    }

    /// Board side of a move: castling rook, en passant victim, capture,
    /// promotion. Turn and counters are left alone.
    pub fn apply_move(&mut self, resolved: &ResolvedMove) -> Result<()> {
        let turn = self.state.turn;
        let (from, to) = (resolved.from, resolved.to);
        let mut piece = self
            .board
            .get_piece(from)
            .ok_or(Error::EmptySource { square: from })?;

        if piece.kind == PieceKind::King {
            self.handle_castling(from, to, turn);
        }

        if piece.kind == PieceKind::Pawn && self.board.is_en_passant(from, to, turn) {
            let victim = Square::new(from.row(), to.col());
            debug!("En passant: removing pawn on {}", victim);
            self.board.clear_piece(victim);
        }

        if self.board.is_occupied(to) {
            debug!("Capture on {}", to);
            self.board.clear_piece(to);
        }

        if let Some(kind) = resolved.promotion {
            if piece.kind == PieceKind::Pawn {
                debug!("Pawn promotes to {:?} on {}", kind, to);
                piece.kind = kind;
            }
        }

        self.board.place_piece(piece, to);
        self.board.clear_piece(from);
        Ok(())
    }

    /// Moves the rook for a two-file king step, at most once per colour
    fn handle_castling(&mut self, from: Square, to: Square, turn: Color) {
        let is_castle = from.row() == to.row() && (from.col() as i8 - to.col() as i8).abs() == 2;
        if !is_castle {
            return;
        }
        if self.state.has_castled(turn) {
            warn!("{} has already castled; ignoring rook for {}{}", turn, from, to);
            return;
        }

        let row = from.row();
        let (rook_from, rook_to) = if to.col() > from.col() {
            (Square::new(row, 7), Square::new(row, 5))
        } else {
            (Square::new(row, 0), Square::new(row, 3))
        };
        debug!("{} castles: rook {} -> {}", turn, rook_from, rook_to);

        let rook = self
            .board
            .clear_piece(rook_from)
            .unwrap_or_else(|| Piece::new(turn, PieceKind::Rook));
        self.board.place_piece(rook, rook_to);
        self.state.mark_castled(turn);
    }

    /// Marks the game finished; later frames are refused
    pub fn finish(&mut self) {
        self.phase = GamePhase::Complete;
    }
}
