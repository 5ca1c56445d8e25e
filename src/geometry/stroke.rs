//! Points and Strokes
//!
//! A stroke is the ordered point sequence captured from one continuous
//! pointer drag. Strokes are never mutated once captured; every transform
//! produces a new point vector.

use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};

/// Point in 2D space
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "PointRepr")]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// Accepted wire shapes for a point: `{"x": .., "y": ..}` or `[x, y]`
#[derive(Deserialize)]
#[serde(untagged)]
enum PointRepr {
    Object { x: f64, y: f64 },
    Pair([f64; 2]),
}

impl From<PointRepr> for Point {
    fn from(repr: PointRepr) -> Self {
        match repr {
            PointRepr::Object { x, y } => Point { x, y },
            PointRepr::Pair([x, y]) => Point { x, y },
        }
    }
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Calculate Euclidean distance to another point
    pub fn distance_to(&self, other: &Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Linear interpolation towards `other`; `t = 0` is `self`, `t = 1` is `other`
    pub fn lerp(&self, other: &Point, t: f64) -> Point {
        Point {
            x: self.x + t * (other.x - self.x),
            y: self.y + t * (other.y - self.y),
        }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl BoundingBox {
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }
}

/// Bounding box of a point set, `None` when empty
pub fn bounding_box(points: &[Point]) -> Option<BoundingBox> {
    let first = points.first()?;
    let mut bb = BoundingBox {
        min_x: first.x,
        min_y: first.y,
        max_x: first.x,
        max_y: first.y,
    };
    for p in &points[1..] {
        bb.min_x = bb.min_x.min(p.x);
        bb.min_y = bb.min_y.min(p.y);
        bb.max_x = bb.max_x.max(p.x);
        bb.max_y = bb.max_y.max(p.y);
    }
    Some(bb)
}

/// Arithmetic mean of the points; the origin for an empty set
pub fn centroid(points: &[Point]) -> Point {
    if points.is_empty() {
        return Point::new(0.0, 0.0);
    }
    let (sx, sy) = points
        .iter()
        .fold((0.0, 0.0), |(sx, sy), p| (sx + p.x, sy + p.y));
    let n = points.len() as f64;
    Point::new(sx / n, sy / n)
}

/// Total length of the polyline through the points
pub fn path_length(points: &[Point]) -> f64 {
    points
        .windows(2)
        .map(|w| w[0].distance_to(&w[1]))
        .sum()
}

/// Ordered sequence of points from one pointer drag
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Stroke {
    points: Vec<Point>,
}

impl Stroke {
    pub fn new(points: Vec<Point>) -> Self {
        Self { points }
    }

    /// Build a stroke from `(x, y)` pairs
    pub fn from_coords(coords: &[(f64, f64)]) -> Self {
        Self {
            points: coords.iter().map(|&(x, y)| Point::new(x, y)).collect(),
        }
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn centroid(&self) -> Point {
        centroid(&self.points)
    }

    pub fn path_length(&self) -> f64 {
        path_length(&self.points)
    }

    pub fn bounding_box(&self) -> Option<BoundingBox> {
        bounding_box(&self.points)
    }

    /// New stroke with `f` applied to every point
    pub fn map_points<F>(&self, f: F) -> Stroke
    where
        F: Fn(&Point) -> Point,
    {
        Stroke {
            points: self.points.iter().map(f).collect(),
        }
    }

    /// Stable hash of the exact coordinates.
    ///
    /// Used as part of the normalized-sample cache key, so two strokes with
    /// bit-identical points share an entry and any edit produces a new one.
    pub fn content_hash(&self) -> u64 {
        let mut hasher = std::collections::hash_map::DefaultHasher::new();
        self.points.len().hash(&mut hasher);
        for p in &self.points {
            p.x.to_bits().hash(&mut hasher);
            p.y.to_bits().hash(&mut hasher);
        }
        hasher.finish()
    }
}

impl From<Vec<Point>> for Stroke {
    fn from(points: Vec<Point>) -> Self {
        Self::new(points)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StrokeFile {
    Many(Vec<Stroke>),
    One(Stroke),
}

/// Parse one stroke or an array of strokes from JSON.
///
/// Points may be written as objects (`{"x": 1, "y": 2}`) or pairs (`[1, 2]`).
pub fn strokes_from_json(json: &str) -> crate::Result<Vec<Stroke>> {
    let parsed: StrokeFile = serde_json::from_str(json)?;
    Ok(match parsed {
        StrokeFile::Many(strokes) => strokes,
        StrokeFile::One(stroke) => vec![stroke],
    })
}
