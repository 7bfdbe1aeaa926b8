mod calibration_controller;
mod engine;
mod point_controller;
mod session;
mod trace_controller;

pub use engine::DigitizerEngine;
pub use session::{SessionAxisPoint, SessionLine, SessionPoint, SessionState};
pub use trace_controller::TraceSummary;
