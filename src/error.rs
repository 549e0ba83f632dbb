//! Error types for the photo-to-PGN pipeline
//!
//! Every failure is fatal: the game loop never retries, so these errors
//! travel straight up to `main`.

use std::path::PathBuf;

use crate::board::Square;

/// Errors that can occur while reconstructing a game
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The picture directory holds no usable images
    #[error("No images found in '{}'", dir.display())]
    NoFrames { dir: PathBuf },

    /// At least two photographs are needed to see a single move
    #[error("Need at least two images to detect a move, found {found}")]
    NotEnoughFrames { found: usize },

    #[error("Crop rectangle ({x_min}, {x_max}, {y_min}, {y_max}) does not fit a {width}x{height} image")]
    InvalidCrop {
        x_min: u32,
        x_max: u32,
        y_min: u32,
        y_max: u32,
        width: u32,
        height: u32,
    },

    #[error("Frame sizes differ: {previous:?} vs {current:?}")]
    FrameSizeMismatch {
        previous: (u32, u32),
        current: (u32, u32),
    },

    /// Neither detected square holds a piece, so no source can be chosen
    #[error("Neither candidate square {first} nor {second} is occupied")]
    NoPieceOnCandidates { first: Square, second: Square },

    #[error("No piece on source square {square}")]
    EmptySource { square: Square },

    /// The rules engine refused the detected move
    #[error("Illegal move {uci}: {reason}")]
    IllegalMove { uci: String, reason: String },

    #[error("Malformed move string: {0}")]
    InvalidUci(String),

    #[error("Evaluation engine failed: {0}")]
    Engine(String),

    #[error("Game is already complete")]
    GameComplete,
}

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, Error>;
