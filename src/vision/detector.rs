use image::{GrayImage, Luma};
use tracing::{debug, trace};

use crate::board::{Board, Color, PieceKind, Square};
use crate::error::{Error, Result};

const GRID_SIZE: u32 = 8;
const KING_FILE: u8 = 4;
const KINGSIDE_FILE: u8 = 6;
const QUEENSIDE_FILE: u8 = 2;

/// One grid cell and how much it changed between two frames
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Candidate {
    pub brightness: u64,
    pub square: Square,
}

/// Finds the squares that changed between two preprocessed frames.
///
/// The difference image is cut into an 8x8 grid (remainder pixels on the
/// right and bottom edges are ignored) and cells are ranked by the sum of
/// their pixel differences. No threshold is applied: the top cells are
/// trusted as-is.
#[derive(Debug, Default, Clone, Copy)]
pub struct MoveDetector;

impl MoveDetector {
    pub fn new() -> Self {
        MoveDetector
    }

    /// Absolute per-pixel difference of two equally sized frames
    pub fn difference(&self, previous: &GrayImage, current: &GrayImage) -> Result<GrayImage> {
        if previous.dimensions() != current.dimensions() {
            return Err(Error::FrameSizeMismatch {
                previous: previous.dimensions(),
                current: current.dimensions(),
            });
        }
        let (width, height) = current.dimensions();
        Ok(GrayImage::from_fn(width, height, |x, y| {
            let a = previous.get_pixel(x, y).0[0];
            let b = current.get_pixel(x, y).0[0];
            Luma([a.abs_diff(b)])
        }))
    }

    /// All 64 cells sorted by brightness, brightest first.
    ///
    /// Equal scores keep row-major order; this is an artefact of the stable
    /// sort, not something callers should rely on.
    pub fn rank_cells(&self, difference: &GrayImage) -> Vec<Candidate> {
        let (width, height) = difference.dimensions();
        let cell_w = width / GRID_SIZE;
        let cell_h = height / GRID_SIZE;

        let mut ranking: Vec<Candidate> = Square::all()
            .map(|square| {
                let x0 = square.col() as u32 * cell_w;
                let y0 = square.row() as u32 * cell_h;
                let mut brightness = 0u64;
                for y in y0..y0 + cell_h {
                    for x in x0..x0 + cell_w {
                        brightness += difference.get_pixel(x, y).0[0] as u64;
                    }
                }
                Candidate { brightness, square }
            })
            .collect();

        ranking.sort_by(|a, b| b.brightness.cmp(&a.brightness));
        ranking
    }

    /// Two changed squares for the move between `previous` and `current`
    pub fn detect(
        &self,
        previous: &GrayImage,
        current: &GrayImage,
        castle_check: bool,
        turn: Color,
        board: &Board,
    ) -> Result<(Square, Square)> {
        let difference = self.difference(previous, current)?;
        Ok(self.detect_from_difference(&difference, castle_check, turn, board))
    }

    /// Same as [`MoveDetector::detect`] on an already computed difference map
    pub fn detect_from_difference(
        &self,
        difference: &GrayImage,
        castle_check: bool,
        turn: Color,
        board: &Board,
    ) -> (Square, Square) {
        let ranking = self.rank_cells(difference);
        trace!("Cell ranking: {:?}", ranking);
        debug!(
            "Brightest cells: {}",
            ranking
                .iter()
                .take(4)
                .map(|c| format!("{}={}", c.square, c.brightness))
                .collect::<Vec<_>>()
                .join(" ")
        );

        let top_two = (ranking[0].square, ranking[1].square);
        if !castle_check {
            return top_two;
        }

        let top_four: Vec<Square> = ranking.iter().take(4).map(|c| c.square).collect();
        match castle_squares(&top_four, turn, board) {
            Some(king_move) => {
                debug!("Castling pattern for {}: {} {}", turn, king_move.0, king_move.1);
                king_move
            }
            None => top_two,
        }
    }
}

/// King destination and origin if the four brightest cells show a castle.
///
/// Queenside is checked before kingside. The rook's own hop is not read
/// from the pixels; the board applies it when the king move lands.
fn castle_squares(top_four: &[Square], turn: Color, board: &Board) -> Option<(Square, Square)> {
    let home = turn.home_row();
    let king_origin = Square::new(home, KING_FILE);
    let king_home = board
        .get_piece(king_origin)
        .is_some_and(|piece| piece.kind == PieceKind::King && piece.color == turn);
    if !king_home || !top_four.contains(&king_origin) {
        return None;
    }

    [QUEENSIDE_FILE, KINGSIDE_FILE]
        .into_iter()
        .map(|file| Square::new(home, file))
        .find(|destination| top_four.contains(destination))
        .map(|destination| (destination, king_origin))
}
