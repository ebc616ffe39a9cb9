// Per-contest points reconciliation: canonical 3-decimal formatting, the
// two-layer edit buffer, and the per-team save workflow.

pub mod buffer;
pub mod editor;
pub mod format;

pub use buffer::PointsBuffer;
pub use editor::{PointsEditor, SaveError};
pub use format::{format_points, parse_points, round_points};
