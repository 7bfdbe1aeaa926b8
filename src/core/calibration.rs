use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::core::document::{Document, Mode};
use crate::core::mapper::CalibrationParams;
use crate::core::types::{Axis, CanvasPoint};
use crate::error::{DigitizerError, DigitizerResult};

/// Minimum pixel span between the two reference clicks of one axis.
const MIN_PIXEL_SPAN: f64 = 1e-10;

pub const AXIS_LABELS: [&str; 4] = ["X1", "X2", "Y1", "Y2"];
pub const SHARED_ORIGIN_LABEL: &str = "Origin (X1/Y1)";

/// Collected reference clicks; at most four per calibration.
pub type AxisPoints = SmallVec<[AxisPoint; 4]>;

/// Raw canvas pixel location of one calibration click.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxisPoint {
    pub x: f64,
    pub y: f64,
    pub label: String,
}

/// The four user-entered axis reference values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalibrationValues {
    pub x1: f64,
    pub x2: f64,
    pub y1: f64,
    pub y2: f64,
}

impl CalibrationValues {
    pub fn new(x1: f64, x2: f64, y1: f64, y2: f64) -> DigitizerResult<Self> {
        if [x1, x2, y1, y2].iter().any(|v| !v.is_finite()) {
            return Err(DigitizerError::InvalidNumeric(
                "axis values must be finite numbers".to_owned(),
            ));
        }
        Ok(Self { x1, x2, y1, y2 })
    }

    /// Parses the four calibration form fields.
    pub fn parse(x1: &str, x2: &str, y1: &str, y2: &str) -> DigitizerResult<Self> {
        let parse = |input: &str| {
            input.trim().parse::<f64>().map_err(|_| {
                DigitizerError::InvalidNumeric(format!("cannot parse axis value '{input}'"))
            })
        };
        Self::new(parse(x1)?, parse(x2)?, parse(y1)?, parse(y2)?)
    }
}

/// Calibration protocol progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalibrationPhase {
    Idle,
    CollectingPoints,
    ReadyToCalibrate,
    Calibrated,
}

/// Collects axis reference clicks and derives the coordinate-mapper parameters.
///
/// Topology toggles and the last successfully entered values are form state
/// owned by the calibrator; the collected points and the derived parameters
/// live in the [`Document`] so history snapshots cover them.
#[derive(Debug, Clone, Default)]
pub struct AxisCalibrator {
    shared_origin: bool,
    orthogonal_axes: bool,
    last_values: Option<CalibrationValues>,
}

impl AxisCalibrator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Calibrator with preset topology toggles (e.g. inferred on import).
    #[must_use]
    pub fn with_topology(shared_origin: bool, orthogonal_axes: bool) -> Self {
        Self {
            shared_origin,
            orthogonal_axes,
            last_values: None,
        }
    }

    #[must_use]
    pub fn shared_origin(&self) -> bool {
        self.shared_origin
    }

    #[must_use]
    pub fn orthogonal_axes(&self) -> bool {
        self.orthogonal_axes
    }

    #[must_use]
    pub fn last_values(&self) -> Option<CalibrationValues> {
        self.last_values
    }

    #[must_use]
    pub fn required_points(&self) -> usize {
        if self.shared_origin { 3 } else { 4 }
    }

    #[must_use]
    pub fn phase(&self, document: &Document) -> CalibrationPhase {
        if document.is_calibrated() {
            CalibrationPhase::Calibrated
        } else if document.mode != Mode::Axes {
            CalibrationPhase::Idle
        } else if document.axis_points.len() >= self.required_points() {
            CalibrationPhase::ReadyToCalibrate
        } else {
            CalibrationPhase::CollectingPoints
        }
    }

    /// Returns `true` when a partial point collection was discarded.
    pub fn set_shared_origin(&mut self, document: &mut Document, enabled: bool) -> bool {
        if self.shared_origin == enabled {
            return false;
        }
        self.shared_origin = enabled;
        self.reset_partial_collection(document)
    }

    /// Returns `true` when a partial point collection was discarded.
    pub fn set_orthogonal_axes(&mut self, document: &mut Document, enabled: bool) -> bool {
        if self.orthogonal_axes == enabled {
            return false;
        }
        self.orthogonal_axes = enabled;
        self.reset_partial_collection(document)
    }

    fn reset_partial_collection(&self, document: &mut Document) -> bool {
        if document.mode == Mode::Axes && !document.axis_points.is_empty() {
            document.axis_points.clear();
            true
        } else {
            false
        }
    }

    /// Starts a fresh capture: clears collected points and enters axes mode.
    pub fn begin_capture(&self, document: &mut Document) {
        document.axis_points.clear();
        document.mode = Mode::Axes;
    }

    /// Records one reference click. Clicks beyond the required count are ignored.
    pub fn push_point(&mut self, document: &mut Document, click: CanvasPoint) -> CalibrationPhase {
        let required = self.required_points();
        if document.axis_points.len() >= required {
            return self.phase(document);
        }

        let label = self.label_for(document.axis_points.len());
        document.axis_points.push(AxisPoint {
            x: click.x,
            y: click.y,
            label: label.to_owned(),
        });

        if !self.shared_origin && self.orthogonal_axes && document.axis_points.len() == 3 {
            // Y2 is synthesized by rotating the X1->X2 vector 90 degrees about X1,
            // so the Y reference axis is pixel-perpendicular to the X axis.
            let (p1x, p1y) = (document.axis_points[0].x, document.axis_points[0].y);
            let (p2x, p2y) = (document.axis_points[1].x, document.axis_points[1].y);
            document.axis_points.push(AxisPoint {
                x: p1x - (p2y - p1y),
                y: p1y + (p2x - p1x),
                label: AXIS_LABELS[3].to_owned(),
            });
        }

        self.phase(document)
    }

    fn label_for(&self, index: usize) -> &'static str {
        if self.shared_origin {
            match index {
                0 => SHARED_ORIGIN_LABEL,
                1 => AXIS_LABELS[1],
                _ => AXIS_LABELS[3],
            }
        } else {
            AXIS_LABELS[index.min(3)]
        }
    }

    /// Derives and stores the calibration parameters from the collected points
    /// and entered values. The document is left untouched on any failure.
    pub fn calibrate(
        &mut self,
        document: &mut Document,
        values: CalibrationValues,
    ) -> DigitizerResult<()> {
        let required = self.required_points();
        if document.axis_points.len() != required {
            return Err(DigitizerError::InvalidData(format!(
                "expected {required} axis points, have {}",
                document.axis_points.len()
            )));
        }
        if values.x1 == values.x2 || values.y1 == values.y2 {
            return Err(DigitizerError::DuplicateAxisValue);
        }

        let points = &document.axis_points;
        let (x1_pix, x2_pix) = (points[0].x, points[1].x);
        // Shared origin: the Y span runs from the origin's y to the dedicated
        // Y2 click. The origin's y is always the Y1 pixel.
        let (y1_pix, y2_pix) = if self.shared_origin {
            (points[0].y, points[2].y)
        } else {
            (points[2].y, points[3].y)
        };

        if (x2_pix - x1_pix).abs() < MIN_PIXEL_SPAN {
            return Err(DigitizerError::DegenerateGeometry(Axis::X));
        }
        if (y2_pix - y1_pix).abs() < MIN_PIXEL_SPAN {
            return Err(DigitizerError::DegenerateGeometry(Axis::Y));
        }
        if document.log_x && (values.x1 <= 0.0 || values.x2 <= 0.0) {
            return Err(DigitizerError::NonPositiveLogValue(Axis::X));
        }
        if document.log_y && (values.y1 <= 0.0 || values.y2 <= 0.0) {
            return Err(DigitizerError::NonPositiveLogValue(Axis::Y));
        }

        let (scale_x, offset_x) = derive_axis(x1_pix, x2_pix, values.x1, values.x2, document.log_x)
            .ok_or(DigitizerError::NonFinite)?;
        let (scale_y, offset_y) = derive_axis(y1_pix, y2_pix, values.y1, values.y2, document.log_y)
            .ok_or(DigitizerError::NonFinite)?;

        document.calibration = Some(CalibrationParams {
            scale_x,
            offset_x,
            scale_y,
            offset_y,
            log_x: document.log_x,
            log_y: document.log_y,
        });
        self.last_values = Some(values);
        Ok(())
    }

    /// Clears collected points and parameters; point pixel coordinates are
    /// kept but their data coordinates become stale until recalibration.
    pub fn reset(&mut self, document: &mut Document) {
        document.axis_points.clear();
        document.calibration = None;
        self.last_values = None;
        for line in &mut document.lines {
            for point in &mut line.points {
                point.stale = true;
            }
        }
    }

    /// Re-derives one axis from the stored axis-point pixels and the last
    /// entered values, for a log-mode toggle on a calibrated axis.
    ///
    /// Returns `None` when the toggle must be reverted: log domain violated,
    /// no stored values (e.g. after session import), or missing axis points.
    #[must_use]
    pub fn rederive_log_axis(
        &self,
        document: &Document,
        axis: Axis,
        log: bool,
    ) -> Option<(f64, f64)> {
        let values = self.last_values?;
        let points = &document.axis_points;
        match axis {
            Axis::X => {
                if points.len() < 2 {
                    return None;
                }
                if log && (values.x1 <= 0.0 || values.x2 <= 0.0) {
                    return None;
                }
                derive_axis(points[0].x, points[1].x, values.x1, values.x2, log)
            }
            Axis::Y => {
                let (i0, i1) = if self.shared_origin { (0, 2) } else { (2, 3) };
                if points.len() <= i1 {
                    return None;
                }
                if log && (values.y1 <= 0.0 || values.y2 <= 0.0) {
                    return None;
                }
                derive_axis(points[i0].y, points[i1].y, values.y1, values.y2, log)
            }
        }
    }
}

/// `scale = pixelDelta / valueDelta`, `offset = pix1 - t(v1) * scale` where
/// `t` is `log10` on a log axis and identity otherwise.
fn derive_axis(pix1: f64, pix2: f64, v1: f64, v2: f64, log: bool) -> Option<(f64, f64)> {
    let t1 = if log { v1.log10() } else { v1 };
    let t2 = if log { v2.log10() } else { v2 };
    let delta_val = t2 - t1;
    if delta_val == 0.0 || !delta_val.is_finite() {
        return None;
    }
    let scale = (pix2 - pix1) / delta_val;
    let offset = pix1 - t1 * scale;
    if scale.is_finite() && offset.is_finite() {
        Some((scale, offset))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::document::Document;

    #[test]
    fn shared_origin_labels_follow_click_order() {
        let mut calibrator = AxisCalibrator::new();
        let mut document = Document::new();
        calibrator.set_shared_origin(&mut document, true);
        calibrator.begin_capture(&mut document);

        calibrator.push_point(&mut document, CanvasPoint::new(0.0, 0.0));
        calibrator.push_point(&mut document, CanvasPoint::new(10.0, 0.0));
        calibrator.push_point(&mut document, CanvasPoint::new(0.0, 10.0));

        let labels: Vec<&str> = document
            .axis_points
            .iter()
            .map(|p| p.label.as_str())
            .collect();
        assert_eq!(labels, vec![SHARED_ORIGIN_LABEL, "X2", "Y2"]);
    }

    #[test]
    fn clicks_beyond_required_count_are_ignored() {
        let mut calibrator = AxisCalibrator::new();
        let mut document = Document::new();
        calibrator.begin_capture(&mut document);

        for i in 0..6 {
            calibrator.push_point(&mut document, CanvasPoint::new(f64::from(i) * 5.0, 1.0));
        }
        assert_eq!(document.axis_points.len(), 4);
    }
}
