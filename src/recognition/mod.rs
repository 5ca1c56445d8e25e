//! Stroke recognition and gesture validation
//!
//! This module turns a drawn stroke into a routine decision using:
//! - $1 Unistroke normalization (resample, rotate, scale, translate)
//! - Golden-section search over rotation for the best path distance
//! - A registration-time validator that keeps gestures distinguishable
//! - An async engine that applies the recognition threshold
//! - A session guard allowing one in-flight request per drawing surface

pub mod normalize;
pub mod recognizer;
pub mod cache;
pub mod validator;
pub mod engine;
pub mod session;

pub use cache::NormalizedSampleCache;
pub use engine::{RecognitionEngine, RecognitionOutcome, RecognitionResult};
pub use recognizer::{Match, Recognizer, Template};
pub use session::{RecognitionSession, SessionOutcome};
pub use validator::{GestureValidator, ValidationResult};

/// Strokes with fewer points are rejected before any processing
pub const MIN_POINTS: usize = 5;

/// Resample target point count
pub const NUM_POINTS: usize = 64;

/// Side of the reference square strokes are scaled into
pub const SQUARE_SIZE: f64 = 250.0;

/// Half-width of the rotation search range (radians, ±45°)
pub const ANGLE_RANGE: f64 = std::f64::consts::FRAC_PI_4;

/// Golden-section search stops once the bracket is this narrow (radians, 2°)
pub const ANGLE_PRECISION: f64 = 2.0 * std::f64::consts::PI / 180.0;

/// A registration candidate scoring above this against another routine is rejected
pub const SIMILARITY_THRESHOLD: f64 = 0.78;

/// A live stroke must score at least this to trigger a routine
pub const RECOGNITION_THRESHOLD: f64 = 0.80;

/// Distance that maps to a score of zero
pub fn half_diagonal() -> f64 {
    0.5 * (SQUARE_SIZE * SQUARE_SIZE * 2.0).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_similarity_below_recognition_threshold() {
        assert!(SIMILARITY_THRESHOLD < RECOGNITION_THRESHOLD);
        assert_eq!(SIMILARITY_THRESHOLD, 0.78);
        assert_eq!(RECOGNITION_THRESHOLD, 0.80);
    }

    #[test]
    fn test_published_constants() {
        assert_eq!(MIN_POINTS, 5);
        assert_eq!(NUM_POINTS, 64);
        assert_eq!(SQUARE_SIZE, 250.0);
        assert!((ANGLE_RANGE.to_degrees() - 45.0).abs() < 1e-9);
        assert!((ANGLE_PRECISION.to_degrees() - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_half_diagonal() {
        assert!((half_diagonal() - 176.776_695).abs() < 1e-4);
    }
}
