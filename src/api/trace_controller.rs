use tracing::{debug, warn};

use crate::core::document::{Line, LinePoint, Mode};
use crate::core::types::{CanvasPoint, LineColor};
use crate::error::{DigitizerError, DigitizerResult};
use crate::trace::{resample, trace};

use super::DigitizerEngine;

/// Minimum pointer travel (canvas px at zoom 1) before a new path sample is
/// recorded during the freehand gesture.
pub const TRACE_MIN_MOVE_CANVAS: f64 = 5.0;

/// Result of committing a freehand trace.
#[derive(Debug, Clone, PartialEq)]
pub struct TraceSummary {
    pub line_index: usize,
    pub committed: usize,
    pub skipped: usize,
    pub line_color: Option<LineColor>,
}

impl DigitizerEngine {
    /// Begins a freehand highlight gesture at the given canvas position.
    pub fn begin_trace(&mut self, point: CanvasPoint) -> DigitizerResult<()> {
        if self.document.mode != Mode::Highlight {
            return Err(DigitizerError::InvalidData(
                "highlight mode is not active".to_owned(),
            ));
        }
        if self.is_tracing {
            return Err(DigitizerError::InvalidData(
                "a trace is already in progress".to_owned(),
            ));
        }
        self.trace_path.clear();
        self.trace_path.push(point);
        self.is_tracing = true;
        Ok(())
    }

    /// Extends the gesture path. Samples closer than the zoom-scaled minimum
    /// move distance to the previous sample are dropped. Transient: no
    /// snapshot.
    pub fn extend_trace(&mut self, point: CanvasPoint) {
        if !self.is_tracing {
            return;
        }
        let threshold = TRACE_MIN_MOVE_CANVAS / self.document.view.zoom;
        match self.trace_path.last() {
            Some(last) if last.distance_to(point) <= threshold => {}
            _ => self.trace_path.push(point),
        }
    }

    /// Discards the gesture path without touching the document.
    pub fn cancel_trace(&mut self) {
        self.trace_path.clear();
        self.is_tracing = false;
    }

    /// The in-progress gesture path (for preview rendering).
    #[must_use]
    pub fn trace_path(&self) -> &[CanvasPoint] {
        &self.trace_path
    }

    /// Parses the user-entered target point count. A count below 2 is an
    /// input error, rejected rather than clamped.
    pub fn parse_point_count(input: &str) -> DigitizerResult<usize> {
        let count = input.trim().parse::<usize>().map_err(|_| {
            DigitizerError::InvalidNumeric(format!("cannot parse point count '{input}'"))
        })?;
        if count < 2 {
            return Err(DigitizerError::InvalidNumeric(
                "number of points must be at least 2".to_owned(),
            ));
        }
        Ok(count)
    }

    /// Commits the gesture into a new line.
    ///
    /// With `auto_trace` and a loaded image the full pipeline runs (color
    /// detection, resample, perpendicular refine, one forced snap per point);
    /// otherwise the path is resampled and snapped only per the magnet
    /// toggle. Points whose data conversion fails are skipped, never
    /// exported. One snapshot covers the whole commit.
    pub fn commit_trace(
        &mut self,
        name: Option<&str>,
        target_count: usize,
        auto_trace: bool,
    ) -> DigitizerResult<TraceSummary> {
        if !self.is_tracing {
            return Err(DigitizerError::InvalidData(
                "no trace is in progress".to_owned(),
            ));
        }
        self.is_tracing = false;
        let path = std::mem::take(&mut self.trace_path);

        if path.len() < 2 {
            return Err(DigitizerError::EmptyOrShortPath);
        }
        if target_count < 2 {
            return Err(DigitizerError::InvalidNumeric(
                "number of points must be at least 2".to_owned(),
            ));
        }
        let mapper = self.document.mapper().ok_or(DigitizerError::NotCalibrated)?;

        let (candidates, line_color) = {
            match self.sampler() {
                Some(sampler) if auto_trace => {
                    let outcome = trace(&sampler, &self.snap, &path, target_count);
                    (outcome.points, outcome.line_color)
                }
                Some(sampler) => {
                    let spaced = resample(&path, target_count);
                    let snapped = spaced
                        .into_iter()
                        .map(|p| self.snap.snap(&sampler, p, false))
                        .collect();
                    (snapped, None)
                }
                None => (resample(&path, target_count), None),
            }
        };

        let mut line = Line::new(self.resolve_trace_line_name(name));
        let mut committed = 0;
        let mut skipped = 0;
        for candidate in candidates {
            match mapper.to_data(candidate) {
                Ok(data) => {
                    let order = line.next_order();
                    line.points.push(LinePoint {
                        x: candidate.x,
                        y: candidate.y,
                        data_x: Some(data.x),
                        data_y: Some(data.y),
                        order,
                        stale: false,
                    });
                    committed += 1;
                }
                Err(_) => skipped += 1,
            }
        }
        if skipped > 0 {
            warn!(skipped, "trace points outside the data domain were skipped");
        }

        self.document.lines.push(line);
        self.document.current_line_index = self.document.lines.len() - 1;
        self.history.push(&self.document);
        debug!(committed, skipped, "trace committed");
        Ok(TraceSummary {
            line_index: self.document.current_line_index,
            committed,
            skipped,
            line_color,
        })
    }

    fn resolve_trace_line_name(&self, requested: Option<&str>) -> String {
        let base = requested
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(ToOwned::to_owned)
            .unwrap_or_else(|| format!("Highlighted Line {}", self.document.lines.len() + 1));

        let mut candidate = base.clone();
        let mut suffix = 1;
        while self.document.has_line_named(&candidate) {
            candidate = format!("{base} ({suffix})");
            suffix += 1;
        }
        candidate
    }
}
