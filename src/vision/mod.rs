pub mod crop;
pub mod detector;
pub mod frames;
pub mod preprocess;
pub mod source;

pub use crop::CropRect;
pub use detector::{Candidate, MoveDetector};
pub use frames::FrameStore;
pub use preprocess::Preprocessor;
pub use source::ImageSource;
