use tracing::{debug, trace};

use crate::core::document::{Line, LinePoint, Mode};
use crate::core::types::{CanvasPoint, DataPoint};
use crate::error::{DigitizerError, DigitizerResult};

use super::engine::DragState;
use super::DigitizerEngine;

impl DigitizerEngine {
    /// Magnet snap gated by the user toggle; identity when no image is loaded.
    pub(super) fn toggle_snapped(&self, point: CanvasPoint) -> CanvasPoint {
        match self.sampler() {
            Some(sampler) => self.snap.snap(&sampler, point, false),
            None => point,
        }
    }

    /// Adds a point to the current line at the (optionally snapped) click
    /// position. Rejects the whole operation when the position cannot be
    /// converted to data coordinates.
    pub fn add_point(&mut self, point: CanvasPoint) -> DigitizerResult<DataPoint> {
        if self.document.mode != Mode::Add {
            return Err(DigitizerError::InvalidData(
                "add mode is not active".to_owned(),
            ));
        }
        let mapper = self.document.mapper().ok_or(DigitizerError::NotCalibrated)?;

        let snapped = self.toggle_snapped(point);
        let data = mapper.to_data(snapped)?;

        let line = self.document.current_line_mut();
        let order = line.next_order();
        line.points.push(LinePoint {
            x: snapped.x,
            y: snapped.y,
            data_x: Some(data.x),
            data_y: Some(data.y),
            order,
            stale: false,
        });
        trace!(order, "point added");
        self.history.push(&self.document);
        Ok(data)
    }

    /// Starts an adjust drag on the nearest point within the hit radius.
    /// Returns the selected index, or `None` when nothing is close enough.
    pub fn begin_adjust(&mut self, point: CanvasPoint) -> Option<usize> {
        if self.document.mode != Mode::Adjust {
            return None;
        }
        let index = self.document.nearest_point_index(point)?;
        self.drag = Some(DragState { point_index: index });
        Some(index)
    }

    /// Moves the dragged point. Transient: no snapshot is pushed, and a move
    /// whose data conversion fails is ignored rather than applied.
    pub fn move_adjust(&mut self, point: CanvasPoint) {
        let Some(drag) = self.drag else {
            return;
        };
        let Some(mapper) = self.document.mapper() else {
            return;
        };

        let snapped = self.toggle_snapped(point);
        let Ok(data) = mapper.to_data(snapped) else {
            return;
        };

        let line = self.document.current_line_mut();
        let Some(existing) = line.points.get_mut(drag.point_index) else {
            return;
        };
        existing.x = snapped.x;
        existing.y = snapped.y;
        existing.data_x = Some(data.x);
        existing.data_y = Some(data.y);
        existing.stale = false;
    }

    /// Ends an adjust drag, committing one snapshot for the whole gesture.
    /// Returns `false` when no drag was in progress.
    pub fn end_adjust(&mut self) -> bool {
        if self.drag.take().is_none() {
            return false;
        }
        self.history.push(&self.document);
        true
    }

    /// Deletes the nearest point within the hit radius. Returns the removed
    /// index, or `None` when nothing is close enough.
    pub fn delete_point(&mut self, point: CanvasPoint) -> Option<usize> {
        if self.document.mode != Mode::Delete {
            return None;
        }
        let index = self.document.nearest_point_index(point)?;
        self.document.current_line_mut().points.remove(index);
        debug!(index, "point deleted");
        self.history.push(&self.document);
        Some(index)
    }

    /// Creates a new empty line and makes it current.
    pub fn new_line(&mut self, name: &str) -> DigitizerResult<()> {
        let name = validated_line_name(name)?;
        if self.document.has_line_named(&name) {
            return Err(DigitizerError::DuplicateName(name));
        }
        self.document.lines.push(Line::new(name));
        self.document.current_line_index = self.document.lines.len() - 1;
        self.history.push(&self.document);
        Ok(())
    }

    /// Renames the current line.
    pub fn rename_line(&mut self, name: &str) -> DigitizerResult<()> {
        let name = validated_line_name(name)?;
        let current = self.document.current_line_index;
        let collision = self
            .document
            .lines
            .iter()
            .enumerate()
            .any(|(index, line)| index != current && line.name == name);
        if collision {
            return Err(DigitizerError::DuplicateName(name));
        }
        self.document.current_line_mut().name = name;
        self.history.push(&self.document);
        Ok(())
    }

    /// Switches the current line. Not a document mutation worth a snapshot.
    pub fn select_line(&mut self, index: usize) -> DigitizerResult<()> {
        if index >= self.document.lines.len() {
            return Err(DigitizerError::InvalidData(format!(
                "line index {index} out of range"
            )));
        }
        self.document.current_line_index = index;
        Ok(())
    }

    /// Clears all points of the current line and resets its order counter.
    pub fn clear_points(&mut self) {
        let line = self.document.current_line_mut();
        line.points.clear();
        line.order_counter = 0;
        line.sorted = false;
        self.history.push(&self.document);
    }

    /// Toggles the current line's view order between insertion order and
    /// dataX-ascending.
    pub fn toggle_sort(&mut self) {
        let line = self.document.current_line_mut();
        line.sorted = !line.sorted;
        self.history.push(&self.document);
    }
}

fn validated_line_name(name: &str) -> DigitizerResult<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(DigitizerError::InvalidData(
            "line name cannot be empty".to_owned(),
        ));
    }
    Ok(trimmed.to_owned())
}
