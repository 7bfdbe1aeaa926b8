use tracing::debug;

use crate::core::calibration::{AxisCalibrator, CalibrationPhase};
use crate::core::document::{Document, Mode};
use crate::core::history::HistoryStore;
use crate::core::types::{CanvasPoint, CanvasSize};
use crate::error::{DigitizerError, DigitizerResult};
use crate::image::{PixelBuffer, PixelSampler};
use crate::trace::SnapEngine;

/// Image buffers plus the logical canvas resolution they are rendered at.
#[derive(Debug, Clone)]
pub(super) struct LoadedImage {
    pub(super) raw: PixelBuffer,
    pub(super) processed: Option<PixelBuffer>,
    pub(super) canvas: CanvasSize,
}

#[derive(Debug, Clone, Copy)]
pub(super) struct DragState {
    pub(super) point_index: usize,
}

/// Facade orchestrating the document, history, calibrator, image buffers and
/// transient gesture state.
///
/// All operations are synchronous and run on the caller's thread; state flows
/// through this value only, never through ambient globals. Every mutating
/// operation pushes exactly one history snapshot unless noted otherwise on
/// the method.
pub struct DigitizerEngine {
    pub(super) document: Document,
    pub(super) history: HistoryStore,
    pub(super) calibrator: AxisCalibrator,
    pub(super) image: Option<LoadedImage>,
    pub(super) snap: SnapEngine,
    pub(super) drag: Option<DragState>,
    pub(super) trace_path: Vec<CanvasPoint>,
    pub(super) is_tracing: bool,
}

impl Default for DigitizerEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl DigitizerEngine {
    #[must_use]
    pub fn new() -> Self {
        let document = Document::new();
        let mut history = HistoryStore::new();
        history.push(&document);
        Self {
            document,
            history,
            calibrator: AxisCalibrator::new(),
            image: None,
            snap: SnapEngine::default(),
            drag: None,
            trace_path: Vec::new(),
            is_tracing: false,
        }
    }

    #[must_use]
    pub fn document(&self) -> &Document {
        &self.document
    }

    #[must_use]
    pub fn calibrator(&self) -> &AxisCalibrator {
        &self.calibrator
    }

    #[must_use]
    pub fn phase(&self) -> CalibrationPhase {
        self.calibrator.phase(&self.document)
    }

    #[must_use]
    pub fn is_calibrated(&self) -> bool {
        self.document.is_calibrated()
    }

    #[must_use]
    pub fn has_image(&self) -> bool {
        self.image.is_some()
    }

    #[must_use]
    pub fn snap_to_line(&self) -> bool {
        self.snap.is_enabled()
    }

    /// Magnet-snap toggle. Not a document mutation: no snapshot.
    pub fn set_snap_to_line(&mut self, enabled: bool) {
        self.snap.set_enabled(enabled);
    }

    /// Switches the interaction mode. Digitizing modes require an active
    /// calibration. No snapshot: the mode is recorded by the snapshots of the
    /// operations performed in it.
    pub fn set_mode(&mut self, mode: Mode) -> DigitizerResult<()> {
        if mode.requires_calibration() && !self.document.is_calibrated() {
            return Err(DigitizerError::NotCalibrated);
        }
        self.document.mode = mode;
        Ok(())
    }

    /// Stores the raw capture of a newly loaded image and resets the view.
    pub fn load_image(&mut self, raw: PixelBuffer, canvas: CanvasSize) -> DigitizerResult<()> {
        if !canvas.is_valid() {
            return Err(DigitizerError::InvalidData(
                "canvas size must be finite and positive".to_owned(),
            ));
        }
        debug!(
            width = raw.width(),
            height = raw.height(),
            "image loaded"
        );
        self.document.view.reset();
        self.image = Some(LoadedImage {
            raw,
            processed: None,
            canvas,
        });
        self.history.push(&self.document);
        Ok(())
    }

    /// Installs or clears the enhancement collaborator's processed buffer.
    /// Consumed read-only by snapping and tracing. No snapshot.
    pub fn set_processed_buffer(&mut self, processed: Option<PixelBuffer>) -> DigitizerResult<()> {
        let Some(image) = self.image.as_mut() else {
            return Err(DigitizerError::InvalidData(
                "no image is loaded".to_owned(),
            ));
        };
        if let Some(buffer) = &processed {
            if buffer.width() != image.raw.width() || buffer.height() != image.raw.height() {
                return Err(DigitizerError::InvalidData(
                    "processed buffer dimensions must match the raw buffer".to_owned(),
                ));
            }
        }
        image.processed = processed;
        Ok(())
    }

    /// Sampler over the loaded buffers, or `None` when no image is loaded.
    #[must_use]
    pub fn sampler(&self) -> Option<PixelSampler<'_>> {
        let image = self.image.as_ref()?;
        PixelSampler::new(&image.raw, image.processed.as_ref(), image.canvas).ok()
    }

    pub fn toggle_grid(&mut self) {
        self.document.show_grid = !self.document.show_grid;
        self.history.push(&self.document);
    }

    /// No snapshot: zoom/pan is continuous view manipulation.
    pub fn zoom_in(&mut self) {
        self.document.view.zoom_in();
    }

    /// No snapshot: zoom/pan is continuous view manipulation.
    pub fn zoom_out(&mut self) {
        self.document.view.zoom_out();
    }

    /// Anchored wheel zoom. No snapshot.
    pub fn zoom_at(&mut self, anchor_x: f64, anchor_y: f64, factor: f64) {
        self.document.view.zoom_at(anchor_x, anchor_y, factor);
    }

    pub fn reset_view(&mut self) {
        self.document.view.reset();
        self.history.push(&self.document);
    }

    /// Magnifier zoom factor, clamped to at least 1. No snapshot.
    pub fn set_magnifier_zoom(&mut self, zoom: f64) {
        self.document.magnifier_zoom = if zoom.is_finite() { zoom.max(1.0) } else { 1.0 };
    }

    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Restores the previous snapshot. Returns `false` at the bottom of the
    /// stack. The restore is atomic: the document is replaced wholesale.
    pub fn undo(&mut self) -> bool {
        match self.history.undo() {
            Some(snapshot) => {
                self.document = snapshot;
                self.abort_gestures();
                true
            }
            None => false,
        }
    }

    /// Restores the next snapshot. Returns `false` at the top of the stack.
    pub fn redo(&mut self) -> bool {
        match self.history.redo() {
            Some(snapshot) => {
                self.document = snapshot;
                self.abort_gestures();
                true
            }
            None => false,
        }
    }

    /// Full reset: fresh document, empty history (re-baselined), image and
    /// gesture state dropped.
    pub fn reset(&mut self) {
        self.document = Document::new();
        self.calibrator = AxisCalibrator::new();
        self.image = None;
        self.snap = SnapEngine::default();
        self.abort_gestures();
        self.history.clear();
        self.history.push(&self.document);
    }

    pub(super) fn abort_gestures(&mut self) {
        self.drag = None;
        self.trace_path.clear();
        self.is_tracing = false;
    }
}
