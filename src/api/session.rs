use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::calibration::{AxisCalibrator, AxisPoint, AxisPoints};
use crate::core::document::{DEFAULT_LINE_NAME, DEFAULT_MAGNIFIER_ZOOM, Document, Line, LinePoint, Mode, ViewState};
use crate::core::mapper::CalibrationParams;
use crate::error::{DigitizerError, DigitizerResult};

use super::DigitizerEngine;

fn default_zoom() -> f64 {
    1.0
}

fn default_magnifier_zoom() -> f64 {
    DEFAULT_MAGNIFIER_ZOOM
}

/// One exported point. `dataX`/`dataY` are nullable; `order` may be absent in
/// documents produced by older exporters and is synthesized on import.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionPoint {
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub data_x: Option<f64>,
    #[serde(default)]
    pub data_y: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionLine {
    pub name: String,
    #[serde(default)]
    pub points: Vec<SessionPoint>,
    #[serde(default)]
    pub sorted: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_counter: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionAxisPoint {
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub label: String,
}

/// The documented persistence contract consumed and produced by external
/// file-I/O collaborators. Field names are stable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    #[serde(default)]
    pub lines: Vec<SessionLine>,
    #[serde(default)]
    pub axis_points: Vec<SessionAxisPoint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale_x: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale_y: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset_x: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset_y: Option<f64>,
    #[serde(default)]
    pub log_x: bool,
    #[serde(default)]
    pub log_y: bool,
    #[serde(default)]
    pub is_calibrated: bool,
    #[serde(default = "default_zoom")]
    pub zoom: f64,
    #[serde(default)]
    pub pan_x: f64,
    #[serde(default)]
    pub pan_y: f64,
    #[serde(default)]
    pub show_grid: bool,
    #[serde(default)]
    pub mode: Mode,
    #[serde(default)]
    pub current_line_index: usize,
    #[serde(default = "default_magnifier_zoom")]
    pub magnifier_zoom: f64,
}

impl SessionState {
    #[must_use]
    pub fn from_document(document: &Document) -> Self {
        let calibration = document.calibration.as_ref();
        Self {
            lines: document
                .lines
                .iter()
                .map(|line| SessionLine {
                    name: line.name.clone(),
                    points: line
                        .points
                        .iter()
                        .map(|point| SessionPoint {
                            x: point.x,
                            y: point.y,
                            data_x: point.data_x,
                            data_y: point.data_y,
                            order: Some(point.order),
                        })
                        .collect(),
                    sorted: line.sorted,
                    order_counter: Some(line.order_counter),
                })
                .collect(),
            axis_points: document
                .axis_points
                .iter()
                .map(|point| SessionAxisPoint {
                    x: point.x,
                    y: point.y,
                    label: point.label.clone(),
                })
                .collect(),
            scale_x: calibration.map(|params| params.scale_x),
            scale_y: calibration.map(|params| params.scale_y),
            offset_x: calibration.map(|params| params.offset_x),
            offset_y: calibration.map(|params| params.offset_y),
            log_x: document.log_x,
            log_y: document.log_y,
            is_calibrated: document.is_calibrated(),
            zoom: document.view.zoom,
            pan_x: document.view.pan_x,
            pan_y: document.view.pan_y,
            show_grid: document.show_grid,
            mode: document.mode,
            current_line_index: document.current_line_index,
            magnifier_zoom: document.magnifier_zoom,
        }
    }

    /// Rebuilds a document, tolerating the gaps older exporters leave:
    /// missing `sorted`, `order` and `orderCounter` get defaults, the current
    /// line index is clamped, and a digitizing mode without a calibration
    /// falls back to idle.
    #[must_use]
    pub fn into_document(self) -> Document {
        let mut lines: Vec<Line> = self
            .lines
            .into_iter()
            .map(|session_line| {
                let mut max_order = 0_u64;
                let points: Vec<LinePoint> = session_line
                    .points
                    .into_iter()
                    .map(|point| {
                        let order = match point.order {
                            Some(order) => {
                                max_order = max_order.max(order);
                                order
                            }
                            None => {
                                max_order += 1;
                                max_order
                            }
                        };
                        LinePoint {
                            x: point.x,
                            y: point.y,
                            data_x: point.data_x,
                            data_y: point.data_y,
                            order,
                            stale: false,
                        }
                    })
                    .collect();
                // The counter only ever increases; never trust one below the
                // highest existing order.
                let order_counter = session_line.order_counter.unwrap_or(0).max(max_order);
                Line {
                    name: session_line.name,
                    points,
                    sorted: session_line.sorted,
                    order_counter,
                }
            })
            .collect();
        if lines.is_empty() {
            lines.push(Line::new(DEFAULT_LINE_NAME));
        }

        let calibration = if self.is_calibrated {
            match (self.scale_x, self.offset_x, self.scale_y, self.offset_y) {
                (Some(scale_x), Some(offset_x), Some(scale_y), Some(offset_y))
                    if [scale_x, offset_x, scale_y, offset_y]
                        .iter()
                        .all(|v| v.is_finite())
                        && scale_x != 0.0
                        && scale_y != 0.0 =>
                {
                    Some(CalibrationParams {
                        scale_x,
                        offset_x,
                        scale_y,
                        offset_y,
                        log_x: self.log_x,
                        log_y: self.log_y,
                    })
                }
                _ => None,
            }
        } else {
            None
        };

        let mode = if calibration.is_none() && self.mode.requires_calibration() {
            Mode::None
        } else {
            self.mode
        };

        let zoom = if self.zoom.is_finite() && self.zoom > 0.0 {
            self.zoom
        } else {
            default_zoom()
        };

        let current_line_index = self.current_line_index.min(lines.len() - 1);

        Document {
            current_line_index,
            axis_points: self
                .axis_points
                .into_iter()
                .map(|point| AxisPoint {
                    x: point.x,
                    y: point.y,
                    label: point.label,
                })
                .collect::<AxisPoints>(),
            calibration,
            log_x: self.log_x,
            log_y: self.log_y,
            view: ViewState {
                zoom,
                pan_x: self.pan_x,
                pan_y: self.pan_y,
            },
            show_grid: self.show_grid,
            mode,
            magnifier_zoom: self.magnifier_zoom,
            lines,
        }
    }
}

impl DigitizerEngine {
    #[must_use]
    pub fn export_session(&self) -> SessionState {
        SessionState::from_document(&self.document)
    }

    pub fn export_session_json(&self) -> DigitizerResult<String> {
        serde_json::to_string_pretty(&self.export_session())
            .map_err(|err| DigitizerError::InvalidData(format!("session export failed: {err}")))
    }

    /// Replaces the document with an imported session and re-baselines
    /// history. The loaded image, if any, is kept.
    pub fn import_session(&mut self, session: SessionState) {
        let document = session.into_document();
        // Entered calibration values are not part of the contract, so log
        // re-derivation stays unavailable until the next calibration. A
        // 3-point capture implies shared-origin topology.
        self.calibrator = AxisCalibrator::with_topology(document.axis_points.len() == 3, false);
        self.document = document;
        self.abort_gestures();
        self.history.clear();
        self.history.push(&self.document);
        debug!(
            lines = self.document.lines.len(),
            calibrated = self.document.is_calibrated(),
            "session imported"
        );
    }

    pub fn import_session_json(&mut self, json: &str) -> DigitizerResult<()> {
        let session: SessionState = serde_json::from_str(json)
            .map_err(|err| DigitizerError::InvalidData(format!("invalid session JSON: {err}")))?;
        self.import_session(session);
        Ok(())
    }
}
