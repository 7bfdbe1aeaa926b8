use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

use crate::core::calibration::AxisPoints;
use crate::core::mapper::{CalibrationParams, CoordinateMapper};
use crate::core::types::CanvasPoint;

/// Hit-test radius for selecting an existing point, in canvas px at zoom 1.
pub const POINT_HIT_RADIUS: f64 = 10.0;

/// Multiplicative step used by the zoom-in/zoom-out actions.
pub const ZOOM_STEP: f64 = 1.2;

pub const DEFAULT_MAGNIFIER_ZOOM: f64 = 2.0;
pub const DEFAULT_LINE_NAME: &str = "Line 1";

/// Active interaction mode. Closed set: adding a mode requires updating
/// every consumer match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    None,
    Axes,
    Add,
    Adjust,
    Delete,
    Highlight,
}

impl Mode {
    /// Digitizing modes are unavailable until a calibration exists.
    #[must_use]
    pub fn requires_calibration(self) -> bool {
        matches!(self, Mode::Add | Mode::Adjust | Mode::Delete | Mode::Highlight)
    }
}

/// A digitized point in dual canvas/data representation.
///
/// `data_x`/`data_y` are always derived from `(x, y)` through the current
/// coordinate mapper, never hand-set. `stale` flags points whose last
/// reconversion failed (or whose calibration was reset); their previous data
/// values are retained rather than dropped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinePoint {
    pub x: f64,
    pub y: f64,
    pub data_x: Option<f64>,
    pub data_y: Option<f64>,
    pub order: u64,
    #[serde(skip)]
    pub stale: bool,
}

/// A named polyline of digitized points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Line {
    pub name: String,
    pub points: Vec<LinePoint>,
    /// Toggles the view/export order; storage order is never mutated.
    pub sorted: bool,
    /// Source of the next `order` value; only ever increases.
    pub order_counter: u64,
}

impl Line {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            points: Vec::new(),
            sorted: false,
            order_counter: 0,
        }
    }

    pub fn next_order(&mut self) -> u64 {
        self.order_counter += 1;
        self.order_counter
    }

    /// Points in display/export order: insertion order, or dataX-ascending
    /// when `sorted` (unconverted points last).
    #[must_use]
    pub fn view_points(&self) -> Vec<LinePoint> {
        let mut points = self.points.clone();
        if self.sorted {
            points.sort_by_key(|p| OrderedFloat(p.data_x.unwrap_or(f64::NAN)));
        } else {
            points.sort_by_key(|p| p.order);
        }
        points
    }
}

/// Zoom/pan view transform. Pure view state: coordinate math elsewhere is
/// independent of it except for zoom-scaled hit thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewState {
    pub zoom: f64,
    pub pan_x: f64,
    pub pan_y: f64,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            zoom: 1.0,
            pan_x: 0.0,
            pan_y: 0.0,
        }
    }
}

impl ViewState {
    pub fn zoom_in(&mut self) {
        self.zoom *= ZOOM_STEP;
    }

    pub fn zoom_out(&mut self) {
        self.zoom /= ZOOM_STEP;
    }

    /// Anchored zoom: the given client position stays fixed on screen.
    pub fn zoom_at(&mut self, anchor_x: f64, anchor_y: f64, factor: f64) {
        self.pan_x = anchor_x - factor * (anchor_x - self.pan_x);
        self.pan_y = anchor_y - factor * (anchor_y - self.pan_y);
        self.zoom *= factor;
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// The full mutable document state: lines, calibration, view and display
/// flags. Owned by the engine; history stores deep-copied snapshots of it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub lines: Vec<Line>,
    pub current_line_index: usize,
    pub axis_points: AxisPoints,
    pub calibration: Option<CalibrationParams>,
    pub log_x: bool,
    pub log_y: bool,
    pub view: ViewState,
    pub show_grid: bool,
    pub mode: Mode,
    pub magnifier_zoom: f64,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    #[must_use]
    pub fn new() -> Self {
        Self {
            lines: vec![Line::new(DEFAULT_LINE_NAME)],
            current_line_index: 0,
            axis_points: AxisPoints::new(),
            calibration: None,
            log_x: false,
            log_y: false,
            view: ViewState::default(),
            show_grid: false,
            mode: Mode::None,
            magnifier_zoom: DEFAULT_MAGNIFIER_ZOOM,
        }
    }

    #[must_use]
    pub fn is_calibrated(&self) -> bool {
        self.calibration.is_some()
    }

    #[must_use]
    pub fn mapper(&self) -> Option<CoordinateMapper> {
        self.calibration
            .as_ref()
            .map(CoordinateMapper::from_params)
    }

    #[must_use]
    pub fn current_line(&self) -> &Line {
        &self.lines[self.current_line_index]
    }

    pub fn current_line_mut(&mut self) -> &mut Line {
        &mut self.lines[self.current_line_index]
    }

    #[must_use]
    pub fn has_line_named(&self, name: &str) -> bool {
        self.lines.iter().any(|line| line.name == name)
    }

    /// Index of the closest point of the current line within the zoom-scaled
    /// hit radius, or `None` when nothing is close enough.
    #[must_use]
    pub fn nearest_point_index(&self, target: CanvasPoint) -> Option<usize> {
        let threshold = POINT_HIT_RADIUS / self.view.zoom;
        let mut best: Option<(usize, f64)> = None;
        for (index, point) in self.current_line().points.iter().enumerate() {
            let distance = CanvasPoint::new(point.x, point.y).distance_to(target);
            if distance < threshold && best.is_none_or(|(_, d)| distance < d) {
                best = Some((index, distance));
            }
        }
        best.map(|(index, _)| index)
    }
}

/// Conversion counters reported by [`recompute_all_point_data`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RecomputeStats {
    pub converted: usize,
    pub failed: usize,
}

/// Reconverts every point's data coordinates through the current mapper.
///
/// Invoked by every mutation that changes the coordinate mapper (calibrate,
/// log toggles). Points whose conversion fails keep their previous data
/// values and are flagged stale; without a mapper all points become stale.
pub fn recompute_all_point_data(document: &mut Document) -> RecomputeStats {
    let mut stats = RecomputeStats::default();
    let Some(mapper) = document.mapper() else {
        for line in &mut document.lines {
            for point in &mut line.points {
                point.stale = true;
                stats.failed += 1;
            }
        }
        return stats;
    };

    for line in &mut document.lines {
        for point in &mut line.points {
            match mapper.to_data(CanvasPoint::new(point.x, point.y)) {
                Ok(data) => {
                    point.data_x = Some(data.x);
                    point.data_y = Some(data.y);
                    point.stale = false;
                    stats.converted += 1;
                }
                Err(_) => {
                    point.stale = true;
                    stats.failed += 1;
                }
            }
        }
    }
    stats
}
