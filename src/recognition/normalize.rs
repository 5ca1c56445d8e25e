//! $1 Unistroke Normalization
//!
//! Brings a stroke into a canonical frame so that strokes drawn at different
//! sizes, positions and orientations can be compared point by point:
//!
//! 1. resample to [`NUM_POINTS`] equidistant points
//! 2. rotate about the centroid by the negative indicative angle
//! 3. scale each axis so the bounding box becomes a [`SQUARE_SIZE`] square
//! 4. translate the centroid to the origin
//!
//! Scaling is non-uniform, so the pipeline is only approximately idempotent:
//! a second pass over an asymmetric stroke resamples and re-rotates it
//! slightly differently.

use super::{NUM_POINTS, SQUARE_SIZE};
use crate::geometry::{bounding_box, centroid, path_length, Point};

/// Axis extents below this are treated as degenerate (a straight line)
const DEGENERATE_EXTENT: f64 = 1e-9;

/// Resample a path to exactly `n` points spaced evenly along its length.
///
/// Walks the path accumulating distance; every time the accumulated
/// distance reaches the interval `length / (n - 1)` a point is interpolated
/// at that boundary and measuring restarts from it. Floating-point rounding
/// can leave the walk one point short, in which case the final input point
/// is appended. A zero-length path is padded with its only position.
pub fn resample(points: &[Point], n: usize) -> Vec<Point> {
    let (first, last) = match (points.first(), points.last()) {
        (Some(&first), Some(&last)) => (first, last),
        _ => return Vec::new(),
    };
    if n < 2 {
        return vec![first];
    }

    let interval = path_length(points) / (n - 1) as f64;
    let mut resampled = Vec::with_capacity(n);
    resampled.push(first);

    if interval > 0.0 {
        let mut accumulated = 0.0;
        let mut prev = first;
        let mut i = 1;
        while i < points.len() && resampled.len() < n {
            let current = points[i];
            let d = prev.distance_to(&current);
            if d > 0.0 && accumulated + d >= interval {
                let q = prev.lerp(&current, (interval - accumulated) / d);
                resampled.push(q);
                // q becomes the start of the remaining segment
                prev = q;
                accumulated = 0.0;
            } else {
                accumulated += d;
                prev = current;
                i += 1;
            }
        }
    }

    while resampled.len() < n {
        resampled.push(last);
    }
    resampled
}

/// Angle from the first point to the centroid (radians)
pub fn indicative_angle(points: &[Point]) -> f64 {
    let Some(first) = points.first() else {
        return 0.0;
    };
    let c = centroid(points);
    (c.y - first.y).atan2(c.x - first.x)
}

/// Rotate all points about their centroid by `radians`
pub fn rotate_by(points: &[Point], radians: f64) -> Vec<Point> {
    let c = centroid(points);
    let (sin, cos) = radians.sin_cos();
    points
        .iter()
        .map(|p| {
            let dx = p.x - c.x;
            let dy = p.y - c.y;
            Point::new(dx * cos - dy * sin + c.x, dx * sin + dy * cos + c.y)
        })
        .collect()
}

/// Scale each axis independently so the bounding box becomes `size` x `size`.
///
/// A degenerate axis (a perfectly straight stroke) borrows the other axis'
/// factor; a single repeated point is left unscaled.
pub fn scale_to_square(points: &[Point], size: f64) -> Vec<Point> {
    let Some(bb) = bounding_box(points) else {
        return Vec::new();
    };
    let sx = (bb.width() > DEGENERATE_EXTENT).then(|| size / bb.width());
    let sy = (bb.height() > DEGENERATE_EXTENT).then(|| size / bb.height());
    let (sx, sy) = match (sx, sy) {
        (Some(sx), Some(sy)) => (sx, sy),
        (Some(s), None) | (None, Some(s)) => (s, s),
        (None, None) => (1.0, 1.0),
    };
    points
        .iter()
        .map(|p| Point::new(p.x * sx, p.y * sy))
        .collect()
}

/// Translate so the centroid lands on `target`
pub fn translate_to(points: &[Point], target: Point) -> Vec<Point> {
    let c = centroid(points);
    points
        .iter()
        .map(|p| Point::new(p.x + target.x - c.x, p.y + target.y - c.y))
        .collect()
}

/// Full normalization pipeline
pub fn normalize(points: &[Point]) -> Vec<Point> {
    let resampled = resample(points, NUM_POINTS);
    let angle = indicative_angle(&resampled);
    let rotated = rotate_by(&resampled, -angle);
    let scaled = scale_to_square(&rotated, SQUARE_SIZE);
    translate_to(&scaled, Point::new(0.0, 0.0))
}
