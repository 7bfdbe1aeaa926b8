pub mod calibration;
pub mod document;
pub mod history;
pub mod mapper;
pub mod types;

pub use calibration::{AxisCalibrator, AxisPoint, CalibrationPhase, CalibrationValues};
pub use document::{Document, Line, LinePoint, Mode, ViewState, recompute_all_point_data};
pub use history::HistoryStore;
pub use mapper::{AxisMapping, CalibrationParams, CoordinateMapper};
pub use types::{Axis, CanvasPoint, CanvasSize, DataPoint, LineColor, Rgba};
