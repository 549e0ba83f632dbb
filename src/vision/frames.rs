use image::GrayImage;

/// The two most recent preprocessed frames.
///
/// `advance` shifts current into previous, so the store never holds more
/// than two images.
#[derive(Debug, Default)]
pub struct FrameStore {
    previous: Option<GrayImage>,
    current: Option<GrayImage>,
}

impl FrameStore {
    pub fn new() -> Self {
        FrameStore {
            previous: None,
            current: None,
        }
    }

    /// Pushes a new frame, dropping the oldest one
    pub fn advance(&mut self, frame: GrayImage) {
        self.previous = self.current.take();
        self.current = Some(frame);
    }

    /// `(previous, current)` once two frames have been seen
    pub fn pair(&self) -> Option<(&GrayImage, &GrayImage)> {
        match (&self.previous, &self.current) {
            (Some(previous), Some(current)) => Some((previous, current)),
            _ => None,
        }
    }
}
