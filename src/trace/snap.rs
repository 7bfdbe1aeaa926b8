use crate::core::types::CanvasPoint;
use crate::image::{ImagePoint, PixelSampler};

/// Search radius around the candidate point, in canvas px.
pub const SNAP_RADIUS_CANVAS: f64 = 18.0;

/// Luma above which the whole search disk is treated as blank background.
const LIGHT_BACKGROUND_LUMA: f64 = 230.0;

/// Band above the darkest sample still counted toward the centroid.
const DARK_BAND: f64 = 30.0;

/// Magnet snap: relocates a canvas point onto the centroid of the darkest
/// nearby pixels, anchoring imprecise clicks to the plotted curve or axis.
#[derive(Debug, Clone, Copy, Default)]
pub struct SnapEngine {
    enabled: bool,
}

impl SnapEngine {
    #[must_use]
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Returns the input unchanged when snapping is off (and not forced), the
    /// local area reads as light background, or no pixel falls in the dark band.
    #[must_use]
    pub fn snap(&self, sampler: &PixelSampler<'_>, point: CanvasPoint, force: bool) -> CanvasPoint {
        if !self.enabled && !force {
            return point;
        }

        let buffer = sampler.active();
        let image = sampler.canvas_to_image(point);
        let width = i64::from(buffer.width());
        let height = i64::from(buffer.height());
        let radius = ((SNAP_RADIUS_CANVAS * f64::from(buffer.width()) / sampler.canvas().width)
            .round() as i64)
            .max(4);
        let center_x = image.x.round() as i64;
        let center_y = image.y.round() as i64;

        let mut min_luma = 255.0_f64;
        for dy in -radius..=radius {
            for dx in -radius..=radius {
                if dx * dx + dy * dy > radius * radius {
                    continue;
                }
                let px = center_x + dx;
                let py = center_y + dy;
                if px < 0 || py < 0 || px >= width || py >= height {
                    continue;
                }
                let luma = buffer.pixel(px as u32, py as u32).luma();
                if luma < min_luma {
                    min_luma = luma;
                }
            }
        }

        if min_luma > LIGHT_BACKGROUND_LUMA {
            return point;
        }

        let threshold = min_luma + DARK_BAND;
        let mut sum_x = 0.0;
        let mut sum_y = 0.0;
        let mut count = 0_u64;
        for dy in -radius..=radius {
            for dx in -radius..=radius {
                if dx * dx + dy * dy > radius * radius {
                    continue;
                }
                let px = center_x + dx;
                let py = center_y + dy;
                if px < 0 || py < 0 || px >= width || py >= height {
                    continue;
                }
                if buffer.pixel(px as u32, py as u32).luma() <= threshold {
                    sum_x += px as f64;
                    sum_y += py as f64;
                    count += 1;
                }
            }
        }

        if count == 0 {
            return point;
        }
        sampler.image_to_canvas(ImagePoint::new(
            sum_x / count as f64,
            sum_y / count as f64,
        ))
    }
}
