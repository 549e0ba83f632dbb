pub mod exporter;
pub mod positions;

pub use exporter::{GameHeaders, PgnExporter};
pub use positions::PositionLog;
