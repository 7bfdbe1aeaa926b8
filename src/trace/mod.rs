pub mod snap;
pub mod tracer;

pub use snap::SnapEngine;
pub use tracer::{TraceOutcome, detect_line_color, refine_perpendicular, resample, trace};
