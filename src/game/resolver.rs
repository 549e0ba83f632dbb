use std::fmt;

use tracing::debug;

use super::prompt::Prompter;
use crate::board::{Board, Color, PieceKind, Square};
use crate::error::{Error, Result};

/// A move on the grid, ready to be rendered as a UCI-style string
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedMove {
    pub from: Square,
    pub to: Square,
    pub promotion: Option<PieceKind>,
}

impl ResolvedMove {
    pub fn new(from: Square, to: Square) -> Self {
        ResolvedMove { from, to, promotion: None }
    }

    /// Source square, destination square, optional promotion letter
    pub fn uci(&self) -> String {
        let mut uci = format!("{}{}", self.from, self.to);
        if let Some(kind) = self.promotion {
            uci.push(kind.to_char());
        }
        uci
    }
}

impl fmt::Display for ResolvedMove {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.uci())
    }
}

/// Turns two changed squares into an ordered move
#[derive(Debug, Clone, Copy, Default)]
pub struct MoveResolver {
    underpromotions: bool,
}

impl MoveResolver {
    pub fn new() -> Self {
        MoveResolver { underpromotions: false }
    }

    /// When set, every promotion asks which piece the pawn became
    pub fn with_underpromotions(mut self, underpromotions: bool) -> Self {
        self.underpromotions = underpromotions;
        self
    }

    /// Decides which candidate is the source.
    ///
    /// One occupied square is the source. With both occupied (a capture) the
    /// one holding a piece of `turn` moves. Two empty squares are an error.
    pub fn order(&self, board: &Board, first: Square, second: Square, turn: Color) -> Result<(Square, Square)> {
        match (board.is_occupied(first), board.is_occupied(second)) {
            (true, true) => {
                if board.piece_color(first) == Some(turn) {
                    Ok((first, second))
                } else {
                    Ok((second, first))
                }
            }
            (true, false) => Ok((first, second)),
            (false, true) => Ok((second, first)),
            (false, false) => Err(Error::NoPieceOnCandidates { first, second }),
        }
    }

    pub fn resolve(
        &self,
        board: &Board,
        candidates: (Square, Square),
        turn: Color,
        prompter: &mut dyn Prompter,
    ) -> Result<ResolvedMove> {
        let (from, to) = self.order(board, candidates.0, candidates.1, turn)?;
        let (from, to) = castle_correction(board, from, to, turn).unwrap_or((from, to));

        let mut resolved = ResolvedMove::new(from, to);
        let is_pawn = board
            .get_piece(from)
            .is_some_and(|piece| piece.kind == PieceKind::Pawn);
        if is_pawn && board.is_promotable(from, turn) {
            let kind = if self.underpromotions {
                prompter.promotion_piece()?
            } else {
                PieceKind::Queen
            };
            resolved.promotion = Some(kind);
        }

        debug!("Resolved {} {} as {}", candidates.0, candidates.1, resolved);
        Ok(resolved)
    }
}

/// King move when the pair is the mover's own king and rook on one rank.
///
/// The rook squares can outshine the king's, leaving king and rook as the
/// two brightest cells; the king still lands two files over.
fn castle_correction(board: &Board, from: Square, to: Square, turn: Color) -> Option<(Square, Square)> {
    let mover = board.get_piece(from)?;
    let other = board.get_piece(to)?;
    if mover.color != turn || other.color != turn || from.row() != to.row() {
        return None;
    }

    let (king, rook) = match (mover.kind, other.kind) {
        (PieceKind::King, PieceKind::Rook) => (from, to),
        (PieceKind::Rook, PieceKind::King) => (to, from),
        _ => return None,
    };
    if king != Square::new(turn.home_row(), 4) {
        return None;
    }
    let col = if rook.col() > king.col() { 6 } else { 2 };
    Some((king, Square::new(king.row(), col)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Piece;
    use crate::vision::CropRect;

    struct Answer(PieceKind);

    impl Prompter for Answer {
        fn confirm(&mut self, _question: &str) -> Result<bool> {
            Ok(true)
        }
        fn promotion_piece(&mut self) -> Result<PieceKind> {
            Ok(self.0)
        }
        fn crop_rect(&mut self) -> Result<CropRect> {
            Ok(CropRect { x_min: 0, x_max: 8, y_min: 0, y_max: 8 })
        }
    }

    fn sq(name: &str) -> Square {
        Square::from_algebraic(name).unwrap()
    }

    #[test]
    fn test_order_single_occupied() {
        let board = Board::starting_position();
        let resolver = MoveResolver::new();
        assert_eq!(
            resolver.order(&board, sq("e4"), sq("e2"), Color::White).unwrap(),
            (sq("e2"), sq("e4"))
        );
        assert_eq!(
            resolver.order(&board, sq("g1"), sq("f3"), Color::White).unwrap(),
            (sq("g1"), sq("f3"))
        );
    }

    #[test]
    fn test_order_capture_uses_turn() {
        let mut board = Board::starting_position();
        board.place_piece(Piece::new(Color::Black, PieceKind::Pawn), sq("d5"));
        board.place_piece(Piece::new(Color::White, PieceKind::Pawn), sq("e4"));
        let resolver = MoveResolver::new();
        assert_eq!(
            resolver.order(&board, sq("d5"), sq("e4"), Color::White).unwrap(),
            (sq("e4"), sq("d5"))
        );
        assert_eq!(
            resolver.order(&board, sq("d5"), sq("e4"), Color::Black).unwrap(),
            (sq("d5"), sq("e4"))
        );
    }

    #[test]
    fn test_order_nothing_occupied_fails() {
        let board = Board::starting_position();
        let err = MoveResolver::new().order(&board, sq("e4"), sq("e5"), Color::White);
        assert!(matches!(err, Err(Error::NoPieceOnCandidates { .. })));
    }

    #[test]
    fn test_promotion_defaults_to_queen() {
        let mut board = Board::empty();
        board.place_piece(Piece::new(Color::White, PieceKind::Pawn), sq("b7"));
        let resolved = MoveResolver::new()
            .resolve(&board, (sq("b8"), sq("b7")), Color::White, &mut Answer(PieceKind::Knight))
            .unwrap();
        assert_eq!(resolved.uci(), "b7b8q");
    }

    #[test]
    fn test_underpromotion_asks() {
        let mut board = Board::empty();
        board.place_piece(Piece::new(Color::Black, PieceKind::Pawn), sq("g2"));
        board.place_piece(Piece::new(Color::White, PieceKind::Rook), sq("h1"));
        let resolved = MoveResolver::new()
            .with_underpromotions(true)
            .resolve(&board, (sq("h1"), sq("g2")), Color::Black, &mut Answer(PieceKind::Knight))
            .unwrap();
        assert_eq!(resolved.uci(), "g2h1n");
    }

    #[test]
    fn test_castle_correction() {
        let mut board = Board::starting_position();
        board.clear_piece(sq("f1"));
        board.clear_piece(sq("g1"));
        let resolved = MoveResolver::new()
            .resolve(&board, (sq("h1"), sq("e1")), Color::White, &mut Answer(PieceKind::Queen))
            .unwrap();
        assert_eq!(resolved.uci(), "e1g1");

        board.clear_piece(sq("b8"));
        board.clear_piece(sq("c8"));
        board.clear_piece(sq("d8"));
        let resolved = MoveResolver::new()
            .resolve(&board, (sq("e8"), sq("a8")), Color::Black, &mut Answer(PieceKind::Queen))
            .unwrap();
        assert_eq!(resolved.uci(), "e8c8");
    }

    #[test]
    fn test_plain_move_string() {
        let board = Board::starting_position();
        let resolved = MoveResolver::new()
            .resolve(&board, (sq("e4"), sq("e2")), Color::White, &mut Answer(PieceKind::Queen))
            .unwrap();
        assert_eq!(resolved.uci(), "e2e4");
        assert_eq!(resolved.promotion, None);
    }
}
