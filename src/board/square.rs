use std::fmt;

/// Algebraic names indexed by `row * 8 + col`.
///
/// Row 0 is the black back rank (rank 8) and row 7 the white back rank
/// (rank 1); columns run from file `a` to file `h`.
#[rustfmt::skip]
const SQUARE_NAMES: [&str; 64] = [
    "a8", "b8", "c8", "d8", "e8", "f8", "g8", "h8",
    "a7", "b7", "c7", "d7", "e7", "f7", "g7", "h7",
    "a6", "b6", "c6", "d6", "e6", "f6", "g6", "h6",
    "a5", "b5", "c5", "d5", "e5", "f5", "g5", "h5",
    "a4", "b4", "c4", "d4", "e4", "f4", "g4", "h4",
    "a3", "b3", "c3", "d3", "e3", "f3", "g3", "h3",
    "a2", "b2", "c2", "d2", "e2", "f2", "g2", "h2",
    "a1", "b1", "c1", "d1", "e1", "f1", "g1", "h1",
];

/// A `(row, column)` grid coordinate on the 8x8 board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Square {
    row: u8,
    col: u8,
}

impl Square {
    /// Panics when either coordinate is outside `0..8`.
    pub fn new(row: u8, col: u8) -> Square {
        assert!(row < 8 && col < 8, "square out of range: ({}, {})", row, col);
        Square { row, col }
    }

    pub fn row(self) -> u8 {
        self.row
    }

    pub fn col(self) -> u8 {
        self.col
    }

    pub fn index(self) -> usize {
        self.row as usize * 8 + self.col as usize
    }

    /// Algebraic name such as `e4`
    pub fn name(self) -> &'static str {
        SQUARE_NAMES[self.index()]
    }

    /// Inverse of [`Square::name`]
    pub fn from_algebraic(notation: &str) -> Option<Square> {
        let bytes = notation.as_bytes();
        if bytes.len() != 2 {
            return None;
        }
        let col = match bytes[0] {
            b'a'..=b'h' => bytes[0] - b'a',
            _ => return None,
        };
        let row = match bytes[1] {
            b'1'..=b'8' => 7 - (bytes[1] - b'1'),
            _ => return None,
        };
        Some(Square { row, col })
    }

    /// All 64 squares in row-major order
    pub fn all() -> impl Iterator<Item = Square> {
        (0..8u8).flat_map(|row| (0..8u8).map(move |col| Square { row, col }))
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}
