use tracing::{debug, trace, warn};

use crate::core::calibration::{CalibrationPhase, CalibrationValues};
use crate::core::document::{Mode, recompute_all_point_data};
use crate::core::types::{Axis, CanvasPoint};
use crate::error::{DigitizerError, DigitizerResult};

use super::DigitizerEngine;

impl DigitizerEngine {
    /// Starts (or restarts) axis capture: clears collected points and enters
    /// axes mode. No snapshot; the first click pushes one.
    pub fn begin_axis_capture(&mut self) {
        self.calibrator.begin_capture(&mut self.document);
    }

    /// Switches between 4-point and 3-point shared-origin capture. Discards a
    /// partial point collection (snapshotting the discard).
    pub fn set_shared_origin(&mut self, enabled: bool) {
        if self.calibrator.set_shared_origin(&mut self.document, enabled) {
            self.history.push(&self.document);
        }
    }

    /// Toggles the derived-perpendicular-Y-axis constraint. Discards a
    /// partial point collection (snapshotting the discard).
    pub fn set_orthogonal_axes(&mut self, enabled: bool) {
        if self.calibrator.set_orthogonal_axes(&mut self.document, enabled) {
            self.history.push(&self.document);
        }
    }

    /// Records one calibration reference click.
    pub fn axis_click(&mut self, point: CanvasPoint) -> DigitizerResult<CalibrationPhase> {
        if self.document.mode != Mode::Axes {
            return Err(DigitizerError::InvalidData(
                "axis capture is not active".to_owned(),
            ));
        }
        let phase = self.calibrator.push_point(&mut self.document, point);
        self.history.push(&self.document);
        Ok(phase)
    }

    /// Derives the coordinate mapping from the collected points and entered
    /// values, then reconverts every existing point. On failure the document
    /// is left unchanged.
    pub fn calibrate(&mut self, values: CalibrationValues) -> DigitizerResult<()> {
        self.calibrator.calibrate(&mut self.document, values)?;
        self.document.mode = Mode::Add;

        let stats = recompute_all_point_data(&mut self.document);
        if stats.failed > 0 {
            warn!(
                failed = stats.failed,
                "points outside the calibrated domain were flagged stale"
            );
        }
        debug!(
            converted = stats.converted,
            "calibration complete"
        );
        self.history.push(&self.document);
        Ok(())
    }

    /// Drops the calibration and collected axis points. Point pixel
    /// coordinates survive; their data coordinates become stale.
    pub fn reset_calibration(&mut self) {
        self.calibrator.reset(&mut self.document);
        self.document.mode = Mode::None;
        self.history.push(&self.document);
    }

    /// Toggles logarithmic mode for the X axis.
    ///
    /// On a calibrated axis the scale/offset are re-derived from the stored
    /// axis points and last entered values, and every point is reconverted.
    /// When the new log requirement is violated the toggle reverts silently
    /// and nothing is touched.
    pub fn toggle_log_x(&mut self) {
        self.toggle_log_axis(Axis::X);
    }

    /// Toggles logarithmic mode for the Y axis. Same semantics as
    /// [`DigitizerEngine::toggle_log_x`].
    pub fn toggle_log_y(&mut self) {
        self.toggle_log_axis(Axis::Y);
    }

    fn toggle_log_axis(&mut self, axis: Axis) {
        let target = match axis {
            Axis::X => !self.document.log_x,
            Axis::Y => !self.document.log_y,
        };

        if !self.document.is_calibrated() {
            match axis {
                Axis::X => self.document.log_x = target,
                Axis::Y => self.document.log_y = target,
            }
            self.history.push(&self.document);
            return;
        }

        let Some((scale, offset)) = self
            .calibrator
            .rederive_log_axis(&self.document, axis, target)
        else {
            trace!(%axis, "log toggle reverted");
            return;
        };

        let Some(params) = self.document.calibration.as_mut() else {
            return;
        };
        match axis {
            Axis::X => {
                params.scale_x = scale;
                params.offset_x = offset;
                params.log_x = target;
                self.document.log_x = target;
            }
            Axis::Y => {
                params.scale_y = scale;
                params.offset_y = offset;
                params.log_y = target;
                self.document.log_y = target;
            }
        }

        let stats = recompute_all_point_data(&mut self.document);
        if stats.failed > 0 {
            warn!(
                %axis,
                failed = stats.failed,
                "points outside the log domain were flagged stale"
            );
        }
        self.history.push(&self.document);
    }
}
