use std::fmt;

use super::piece::{Color, Piece, PieceKind};
use super::square::Square;

/// Colour of the square itself, fixed when the board is built
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shade {
    Light,
    Dark,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tile {
    pub piece: Option<Piece>,
    pub shade: Shade,
}

impl Tile {
    pub fn is_occupied(&self) -> bool {
        self.piece.is_some()
    }
}

const BACK_RANK: [PieceKind; 8] = [
    PieceKind::Rook,
    PieceKind::Knight,
    PieceKind::Bishop,
    PieceKind::Queen,
    PieceKind::King,
    PieceKind::Bishop,
    PieceKind::Knight,
    PieceKind::Rook,
];

/// The physical board as seen in the photographs.
///
/// This is a bookkeeping grid, not a rules engine: it trusts every move it
/// is given and only knows enough to order and apply them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    tiles: [Tile; 64],
}

impl Board {
    /// Board with no pieces on it
    pub fn empty() -> Self {
        let mut tiles = [Tile {
            piece: None,
            shade: Shade::Light,
        }; 64];
        for square in Square::all() {
            tiles[square.index()].shade = if (square.row() + square.col()) % 2 == 0 {
                Shade::Light
            } else {
                Shade::Dark
            };
        }
        Board { tiles }
    }

    /// Standard initial arrangement, black on rows 0-1 and white on rows 6-7
    pub fn starting_position() -> Self {
        let mut board = Board::empty();
        for col in 0..8u8 {
            let kind = BACK_RANK[col as usize];
            board.place_piece(Piece::new(Color::Black, kind), Square::new(0, col));
            board.place_piece(Piece::new(Color::Black, PieceKind::Pawn), Square::new(1, col));
            board.place_piece(Piece::new(Color::White, PieceKind::Pawn), Square::new(6, col));
            board.place_piece(Piece::new(Color::White, kind), Square::new(7, col));
        }
        board
    }

    pub fn tile(&self, square: Square) -> &Tile {
        &self.tiles[square.index()]
    }

    pub fn get_piece(&self, square: Square) -> Option<Piece> {
        self.tiles[square.index()].piece
    }

    pub fn piece_color(&self, square: Square) -> Option<Color> {
        self.get_piece(square).map(|piece| piece.color)
    }

    pub fn place_piece(&mut self, piece: Piece, square: Square) {
        self.tiles[square.index()].piece = Some(piece);
    }

    /// Empties the square, returning whatever stood there
    pub fn clear_piece(&mut self, square: Square) -> Option<Piece> {
        self.tiles[square.index()].piece.take()
    }

    pub fn is_occupied(&self, square: Square) -> bool {
        self.tiles[square.index()].is_occupied()
    }

    pub fn algebraic_name(&self, square: Square) -> &'static str {
        square.name()
    }

    pub fn occupied_count(&self) -> usize {
        self.tiles.iter().filter(|tile| tile.is_occupied()).count()
    }

    /// True when a pawn of `turn` standing on `square` lands on the far back
    /// rank with its next step.
    pub fn is_promotable(&self, square: Square, turn: Color) -> bool {
        square.row() == turn.promotion_approach_row()
    }

    /// Diagonal single step onto an empty square.
    ///
    /// Assumes the move itself is legal; for a pawn this shape can only be
    /// an en passant capture.
    pub fn is_en_passant(&self, src: Square, dst: Square, _turn: Color) -> bool {
        let row_delta = (src.row() as i8 - dst.row() as i8).abs();
        let col_delta = (src.col() as i8 - dst.col() as i8).abs();
        row_delta == 1 && col_delta == 1 && !self.is_occupied(dst)
    }

    /// Grid of piece letters, `*` for empty squares
    pub fn to_piece_names(&self) -> [[char; 8]; 8] {
        let mut names = [['*'; 8]; 8];
        for square in Square::all() {
            if let Some(piece) = self.get_piece(square) {
                names[square.row() as usize][square.col() as usize] = piece.symbol();
            }
        }
        names
    }
}

impl Default for Board {
    fn default() -> Self {
        Board::starting_position()
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for row in self.to_piece_names() {
            for symbol in row {
                write!(f, "{} ", symbol)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(name: &str) -> Square {
        Square::from_algebraic(name).unwrap()
    }

    #[test]
    fn test_starting_position() {
        let board = Board::starting_position();
        assert_eq!(board.occupied_count(), 32);
        assert_eq!(
            board.get_piece(sq("e1")),
            Some(Piece::new(Color::White, PieceKind::King))
        );
        assert_eq!(
            board.get_piece(sq("d8")),
            Some(Piece::new(Color::Black, PieceKind::Queen))
        );
        assert!(!board.is_occupied(sq("e4")));
    }

    #[test]
    fn test_tile_shades() {
        let board = Board::empty();
        assert_eq!(board.tile(sq("a8")).shade, Shade::Light);
        assert_eq!(board.tile(sq("a1")).shade, Shade::Dark);
        assert_eq!(board.tile(sq("h1")).shade, Shade::Light);
    }

    #[test]
    fn test_place_and_clear() {
        let mut board = Board::empty();
        let knight = Piece::new(Color::White, PieceKind::Knight);
        board.place_piece(knight, sq("f3"));
        assert!(board.is_occupied(sq("f3")));
        assert_eq!(board.piece_color(sq("f3")), Some(Color::White));
        assert_eq!(board.clear_piece(sq("f3")), Some(knight));
        assert!(!board.is_occupied(sq("f3")));
        assert_eq!(board.clear_piece(sq("f3")), None);
    }

    #[test]
    fn test_is_promotable() {
        let board = Board::empty();
        assert!(board.is_promotable(sq("c7"), Color::White));
        assert!(!board.is_promotable(sq("c6"), Color::White));
        assert!(board.is_promotable(sq("c2"), Color::Black));
        assert!(!board.is_promotable(sq("c7"), Color::Black));
    }

    #[test]
    fn test_is_en_passant() {
        let mut board = Board::empty();
        board.place_piece(Piece::new(Color::White, PieceKind::Pawn), sq("e5"));
        board.place_piece(Piece::new(Color::Black, PieceKind::Pawn), sq("d5"));
        assert!(board.is_en_passant(sq("e5"), sq("d6"), Color::White));

        board.place_piece(Piece::new(Color::Black, PieceKind::Knight), sq("f6"));
        assert!(!board.is_en_passant(sq("e5"), sq("f6"), Color::White));
        assert!(!board.is_en_passant(sq("e5"), sq("e6"), Color::White));
    }

    #[test]
    fn test_board_display() {
        let rendered = Board::starting_position().to_string();
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines.len(), 8);
        assert_eq!(lines[0], "r n b q k b n r ");
        assert_eq!(lines[3], "* * * * * * * * ");
        assert_eq!(lines[7], "R N B Q K B N R ");
    }
}
