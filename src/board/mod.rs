pub mod grid;
pub mod piece;
pub mod square;

pub use grid::{Board, Shade, Tile};
pub use piece::{Color, Piece, PieceKind};
pub use square::Square;
