use tracing::info;

use super::controller::{GameController, MoveRecord};
use crate::error::{Error, Result};
use crate::vision::{ImageSource, Preprocessor};

/// Feeds every photograph of a directory through a [`GameController`]
pub struct Session {
    source: ImageSource,
    preprocessor: Preprocessor,
    controller: GameController,
}

impl Session {
    pub fn new(source: ImageSource, preprocessor: Preprocessor, controller: GameController) -> Self {
        Session {
            source,
            preprocessor,
            controller,
        }
    }

    /// Processes the photographs in order, one move per photograph after
    /// the first. `on_move` sees the controller after each applied move.
    pub fn run<F>(mut self, mut on_move: F) -> Result<GameController>
    where
        F: FnMut(&GameController, &MoveRecord),
    {
        if self.source.len() < 2 {
            return Err(Error::NotEnoughFrames {
                found: self.source.len(),
            });
        }

        info!(
            "Processing {} images from {}",
            self.source.len(),
            self.source.dir().display()
        );

        for path in self.source.files() {
            let frame = self.preprocessor.load(path)?;
            if let Some(record) = self.controller.push_frame(frame)? {
                on_move(&self.controller, &record);
            }
        }

        self.controller.finish();
        Ok(self.controller)
    }
}
