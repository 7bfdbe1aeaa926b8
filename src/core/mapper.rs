use serde::{Deserialize, Serialize};

use crate::core::types::{Axis, CanvasPoint, DataPoint};
use crate::error::{DigitizerError, DigitizerResult};

/// Parameters derived by a successful calibration.
///
/// For a linear axis `data = (canvas - offset) / scale`; for a logarithmic
/// axis the same quotient is the base-10 exponent of the data value. The
/// parameters are immutable outside explicit recalibration or log re-derivation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalibrationParams {
    pub scale_x: f64,
    pub offset_x: f64,
    pub scale_y: f64,
    pub offset_y: f64,
    pub log_x: bool,
    pub log_y: bool,
}

/// One axis of the canvas/data mapping.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisMapping {
    scale: f64,
    offset: f64,
    log: bool,
}

impl AxisMapping {
    #[must_use]
    pub fn new(scale: f64, offset: f64, log: bool) -> Self {
        Self { scale, offset, log }
    }

    #[must_use]
    pub fn is_log(self) -> bool {
        self.log
    }

    fn usable(self) -> bool {
        self.scale.is_finite() && self.scale != 0.0 && self.offset.is_finite()
    }

    /// Maps a canvas coordinate into data space.
    ///
    /// Fails with `NonFinite` when the mapping parameters are unusable or the
    /// result falls outside the axis domain (non-finite, or non-positive on a
    /// log axis). Callers must treat the failure as "calibration invalid" and
    /// never substitute the raw pixel value.
    pub fn to_data(self, canvas_coord: f64) -> DigitizerResult<f64> {
        if !self.usable() || !canvas_coord.is_finite() {
            return Err(DigitizerError::NonFinite);
        }

        let quotient = (canvas_coord - self.offset) / self.scale;
        let value = if self.log {
            10_f64.powf(quotient)
        } else {
            quotient
        };

        if !value.is_finite() || (self.log && value <= 0.0) {
            return Err(DigitizerError::NonFinite);
        }
        Ok(value)
    }

    /// Maps a data value back onto the canvas (inverse of `to_data`).
    pub fn to_canvas(self, data_value: f64) -> DigitizerResult<f64> {
        if !self.usable() || !data_value.is_finite() {
            return Err(DigitizerError::NonFinite);
        }

        let transformed = if self.log {
            if data_value <= 0.0 {
                return Err(DigitizerError::NonFinite);
            }
            data_value.log10()
        } else {
            data_value
        };

        let coord = transformed * self.scale + self.offset;
        if !coord.is_finite() {
            return Err(DigitizerError::NonFinite);
        }
        Ok(coord)
    }
}

/// Converts canvas pixel positions to and from chart-data values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinateMapper {
    x: AxisMapping,
    y: AxisMapping,
}

impl CoordinateMapper {
    #[must_use]
    pub fn from_params(params: &CalibrationParams) -> Self {
        Self {
            x: AxisMapping::new(params.scale_x, params.offset_x, params.log_x),
            y: AxisMapping::new(params.scale_y, params.offset_y, params.log_y),
        }
    }

    #[must_use]
    pub fn axis(&self, axis: Axis) -> AxisMapping {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
        }
    }

    pub fn to_data(&self, canvas: CanvasPoint) -> DigitizerResult<DataPoint> {
        Ok(DataPoint::new(
            self.x.to_data(canvas.x)?,
            self.y.to_data(canvas.y)?,
        ))
    }

    pub fn to_canvas(&self, data: DataPoint) -> DigitizerResult<CanvasPoint> {
        Ok(CanvasPoint::new(
            self.x.to_canvas(data.x)?,
            self.y.to_canvas(data.y)?,
        ))
    }
}
