//! Photo to PGN Converter Library
//!
//! Reconstructs a chess game from photographs of the board taken after
//! every move. Consecutive frames are diffed to find the changed squares,
//! the squares are resolved into moves on an internal board, and each move
//! is checked by a rules engine that also yields the position after it.

pub mod board;
pub mod error;
pub mod game;
pub mod pgn;
pub mod vision;

pub use board::{Board, Color, Piece, PieceKind, Square};
pub use error::{Error, Result};
pub use game::{GameController, MoveRecord, Session};
