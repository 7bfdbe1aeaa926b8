use crate::core::types::{CanvasPoint, CanvasSize, Rgba};
use crate::error::{DigitizerError, DigitizerResult};

/// Raw RGBA raster captured once per loaded image. Never mutated by the core;
/// enhancement collaborators supply derived buffers of the same shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl PixelBuffer {
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> DigitizerResult<Self> {
        if width == 0 || height == 0 {
            return Err(DigitizerError::InvalidData(
                "pixel buffer dimensions must be non-zero".to_owned(),
            ));
        }
        let expected = width as usize * height as usize * 4;
        if data.len() != expected {
            return Err(DigitizerError::InvalidData(format!(
                "pixel buffer length {} does not match {width}x{height} RGBA ({expected})",
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Sample at integer pixel coordinates; out-of-range coordinates clamp to
    /// the buffer edge.
    #[must_use]
    pub fn pixel(&self, px: u32, py: u32) -> Rgba {
        let px = px.min(self.width - 1) as usize;
        let py = py.min(self.height - 1) as usize;
        let offset = (py * self.width as usize + px) * 4;
        Rgba::new(
            self.data[offset],
            self.data[offset + 1],
            self.data[offset + 2],
            self.data[offset + 3],
        )
    }

    /// Nearest-pixel sample at fractional image coordinates (rounded, clamped).
    #[must_use]
    pub fn pixel_at(&self, image_x: f64, image_y: f64) -> Rgba {
        let px = image_x.clamp(0.0, f64::from(self.width - 1)).round() as u32;
        let py = image_y.clamp(0.0, f64::from(self.height - 1)).round() as u32;
        self.pixel(px, py)
    }
}

/// Image-space position (pixels of the underlying raster).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImagePoint {
    pub x: f64,
    pub y: f64,
}

impl ImagePoint {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Samples a raster buffer at image coordinates derived from canvas-space
/// positions via the fixed `image_dimension / canvas_dimension` ratio,
/// independent of the zoom/pan view transform.
///
/// When a processed (enhanced) buffer is present, luma and trace sampling
/// read it; the raw buffer stays available unmodified. "No buffer loaded" is
/// represented by the absence of a sampler, not by an empty one.
#[derive(Debug, Clone, Copy)]
pub struct PixelSampler<'a> {
    raw: &'a PixelBuffer,
    processed: Option<&'a PixelBuffer>,
    canvas: CanvasSize,
}

impl<'a> PixelSampler<'a> {
    pub fn new(
        raw: &'a PixelBuffer,
        processed: Option<&'a PixelBuffer>,
        canvas: CanvasSize,
    ) -> DigitizerResult<Self> {
        if !canvas.is_valid() {
            return Err(DigitizerError::InvalidData(
                "canvas size must be finite and positive".to_owned(),
            ));
        }
        if let Some(processed) = processed {
            if processed.width() != raw.width() || processed.height() != raw.height() {
                return Err(DigitizerError::InvalidData(
                    "processed buffer dimensions must match the raw buffer".to_owned(),
                ));
            }
        }
        Ok(Self {
            raw,
            processed,
            canvas,
        })
    }

    #[must_use]
    pub fn canvas(&self) -> CanvasSize {
        self.canvas
    }

    #[must_use]
    pub fn raw(&self) -> &PixelBuffer {
        self.raw
    }

    /// The buffer auto-trace and snapping should read: the processed variant
    /// when the enhancement collaborator supplied one, else the raw capture.
    #[must_use]
    pub fn active(&self) -> &PixelBuffer {
        self.processed.unwrap_or(self.raw)
    }

    #[must_use]
    pub fn canvas_to_image(&self, point: CanvasPoint) -> ImagePoint {
        ImagePoint::new(
            point.x * (f64::from(self.raw.width()) / self.canvas.width),
            point.y * (f64::from(self.raw.height()) / self.canvas.height),
        )
    }

    #[must_use]
    pub fn image_to_canvas(&self, point: ImagePoint) -> CanvasPoint {
        CanvasPoint::new(
            point.x * (self.canvas.width / f64::from(self.raw.width())),
            point.y * (self.canvas.height / f64::from(self.raw.height())),
        )
    }

    /// Luma of the active buffer at fractional image coordinates, in `[0, 255]`.
    #[must_use]
    pub fn sample_luma(&self, image_x: f64, image_y: f64) -> f64 {
        self.active().pixel_at(image_x, image_y).luma()
    }

    /// RGBA of the raw (unenhanced) capture at fractional image coordinates.
    #[must_use]
    pub fn sample_rgb(&self, image_x: f64, image_y: f64) -> Rgba {
        self.raw.pixel_at(image_x, image_y)
    }
}
