use indexmap::IndexMap;
use tracing::debug;

use crate::core::types::{CanvasPoint, LineColor};
use crate::image::{ImagePoint, PixelSampler};
use crate::trace::snap::SnapEngine;

/// Maximum samples taken along the path during color detection.
const COLOR_SAMPLE_CAP: usize = 300;

/// Luma above which a sampled pixel is treated as background during detection.
const BACKGROUND_LUMA: f64 = 220.0;

/// Half-width of the perpendicular refinement band, in canvas px.
pub const REFINE_BAND_CANVAS: f64 = 18.0;

/// Euclidean RGB distance below which a pixel matches the target color.
const COLOR_TOLERANCE: f64 = 55.0;

#[derive(Debug, Default)]
struct ColorBucket {
    r_sum: u64,
    g_sum: u64,
    b_sum: u64,
    luma_sum: f64,
    count: u64,
}

/// Output of the freehand trace pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct TraceOutcome {
    pub points: Vec<CanvasPoint>,
    pub line_color: Option<LineColor>,
}

/// Detects the dominant stroke color along a freehand path.
///
/// Samples at most 300 evenly-spaced path points, ignores near-white pixels,
/// and buckets the rest by coarse-quantized RGB (3 bits per channel). Returns
/// the mean color and luma of the largest bucket, or `None` when every sample
/// read as background (blank image region).
#[must_use]
pub fn detect_line_color(sampler: &PixelSampler<'_>, path: &[CanvasPoint]) -> Option<LineColor> {
    if path.len() < 2 {
        return None;
    }

    let buffer = sampler.active();
    let step = (path.len() / COLOR_SAMPLE_CAP).max(1);
    let mut buckets: IndexMap<(u8, u8, u8), ColorBucket> = IndexMap::new();

    for point in path.iter().step_by(step) {
        let image = sampler.canvas_to_image(*point);
        let rgb = buffer.pixel_at(image.x, image.y);
        let luma = rgb.luma();
        if luma > BACKGROUND_LUMA {
            continue;
        }
        let bucket = buckets
            .entry((rgb.r >> 5, rgb.g >> 5, rgb.b >> 5))
            .or_default();
        bucket.r_sum += u64::from(rgb.r);
        bucket.g_sum += u64::from(rgb.g);
        bucket.b_sum += u64::from(rgb.b);
        bucket.luma_sum += luma;
        bucket.count += 1;
    }

    // First-inserted bucket wins ties, keeping detection deterministic.
    let mut best: Option<&ColorBucket> = None;
    for bucket in buckets.values() {
        if best.is_none_or(|current| bucket.count > current.count) {
            best = Some(bucket);
        }
    }
    let best = best?;

    let mean = |sum: u64| ((sum as f64) / (best.count as f64)).round() as u8;
    Some(LineColor {
        r: mean(best.r_sum),
        g: mean(best.g_sum),
        b: mean(best.b_sum),
        luma: best.luma_sum / best.count as f64,
    })
}

/// Arc-length resampling of a freehand path down to `requested` points.
///
/// The internal clamp of `requested` to at least 2 guards the segment-length
/// division; rejecting bad user input happens at the gesture layer. The
/// output always starts with the path's first point and never exceeds
/// `requested` points; a zero-length path collapses to its first point.
#[must_use]
pub fn resample(path: &[CanvasPoint], requested: usize) -> Vec<CanvasPoint> {
    let n = requested.max(2);
    if path.len() < 2 {
        return path.iter().copied().take(n).collect();
    }

    let total: f64 = path.windows(2).map(|w| w[0].distance_to(w[1])).sum();
    if total == 0.0 {
        return vec![path[0]];
    }

    let segment_length = total / (n - 1) as f64;
    let mut result = Vec::with_capacity(n);
    result.push(path[0]);
    let mut accumulated = 0.0;

    for i in 1..path.len() {
        if result.len() >= n {
            break;
        }
        let prev = path[i - 1];
        let curr = path[i];
        let dx = curr.x - prev.x;
        let dy = curr.y - prev.y;
        let segment = dx.hypot(dy);
        accumulated += segment;
        if segment <= 0.0 {
            continue;
        }
        while result.len() < n && accumulated >= segment_length * result.len() as f64 {
            let t = (segment_length * result.len() as f64 - (accumulated - segment)) / segment;
            result.push(CanvasPoint::new(prev.x + t * dx, prev.y + t * dy));
        }
    }

    result.truncate(n);
    result
}

/// Moves a resampled point toward the target color along the perpendicular of
/// its local tangent.
///
/// Scans a segment of half-width `band_canvas` (converted to image px) normal
/// to `tangent` and relocates the point to the centroid of pixels within the
/// color tolerance; the point is returned unchanged when nothing matches.
#[must_use]
pub fn refine_perpendicular(
    sampler: &PixelSampler<'_>,
    point: CanvasPoint,
    tangent: (f64, f64),
    target: LineColor,
    band_canvas: f64,
) -> CanvasPoint {
    let buffer = sampler.active();
    let image = sampler.canvas_to_image(point);
    let width = i64::from(buffer.width());
    let height = i64::from(buffer.height());

    let (tx, ty) = tangent;
    let length = {
        let l = tx.hypot(ty);
        if l == 0.0 { 1.0 } else { l }
    };
    let normal_x = -ty / length;
    let normal_y = tx / length;

    let band = ((band_canvas * f64::from(buffer.width()) / sampler.canvas().width).round() as i64)
        .max(3);

    let mut sum_x = 0.0;
    let mut sum_y = 0.0;
    let mut count = 0_u64;

    for s in -band..=band {
        let sx = (image.x + normal_x * s as f64).round() as i64;
        let sy = (image.y + normal_y * s as f64).round() as i64;
        if sx < 0 || sy < 0 || sx >= width || sy >= height {
            continue;
        }
        let rgb = buffer.pixel(sx as u32, sy as u32);
        let dr = f64::from(rgb.r) - f64::from(target.r);
        let dg = f64::from(rgb.g) - f64::from(target.g);
        let db = f64::from(rgb.b) - f64::from(target.b);
        if (dr * dr + dg * dg + db * db).sqrt() < COLOR_TOLERANCE {
            sum_x += sx as f64;
            sum_y += sy as f64;
            count += 1;
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

/// Runs the full trace pipeline: color detection, arc-length resampling,
/// perpendicular color-band refinement, then one forced snap per point.
///
/// The snap pass runs exactly once here; a second pass over-converges onto
/// local minima and must not be applied by callers.
#[must_use]
pub fn trace(
    sampler: &PixelSampler<'_>,
    snap: &SnapEngine,
    path: &[CanvasPoint],
    target_count: usize,
) -> TraceOutcome {
    let line_color = detect_line_color(sampler, path);
    let spaced = resample(path, target_count);

    let mut points = Vec::with_capacity(spaced.len());
    for (i, point) in spaced.iter().enumerate() {
        let prev = spaced[i.saturating_sub(1)];
        let next = spaced[(i + 1).min(spaced.len() - 1)];
        let tangent = (next.x - prev.x, next.y - prev.y);

        let refined = match line_color {
            Some(color) => refine_perpendicular(sampler, *point, tangent, color, REFINE_BAND_CANVAS),
            None => *point,
        };
        points.push(snap.snap(sampler, refined, true));
    }

    debug!(
        input = path.len(),
        output = points.len(),
        color_detected = line_color.is_some(),
        "trace pipeline complete"
    );
    TraceOutcome { points, line_color }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resample_clamps_internal_count_to_two() {
        let path = vec![CanvasPoint::new(0.0, 0.0), CanvasPoint::new(10.0, 0.0)];
        let result = resample(&path, 0);
        assert_eq!(result.len(), 2);
        assert_eq!(result[0], CanvasPoint::new(0.0, 0.0));
        assert_eq!(result[1], CanvasPoint::new(10.0, 0.0));
    }

    #[test]
    fn resample_degenerate_path_returns_first_point() {
        let path = vec![CanvasPoint::new(3.0, 4.0); 5];
        let result = resample(&path, 10);
        assert_eq!(result, vec![CanvasPoint::new(3.0, 4.0)]);
    }

    #[test]
    fn resample_always_starts_with_the_first_point() {
        let path: Vec<CanvasPoint> = (0..50)
            .map(|i| CanvasPoint::new(f64::from(i), f64::from(i % 7)))
            .collect();
        let result = resample(&path, 12);
        assert!(result.len() <= 12);
        assert_eq!(result[0], path[0]);
    }
}
