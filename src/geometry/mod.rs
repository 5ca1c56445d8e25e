//! Geometry primitives
//!
//! Points, strokes and the handful of pure measurements the recognizer
//! needs: bounding box, centroid and path length.

pub mod stroke;

pub use stroke::{bounding_box, centroid, path_length, strokes_from_json, BoundingBox, Point, Stroke};
