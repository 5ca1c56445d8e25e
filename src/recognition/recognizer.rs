//! $1 Unistroke Recognizer
//!
//! Scores a candidate stroke against named template groups. Every stroke is
//! normalized (see [`super::normalize`]), then compared with each template
//! sample using golden-section search over rotation in ±[`ANGLE_RANGE`] to
//! find the orientation with the lowest mean pointwise distance.
//!
//! The recognizer is pure: identical inputs always yield the identical best
//! match. When several samples tie on distance, the first one seen wins.

use std::sync::Arc;

use super::cache::{NormalizedSampleCache, SampleKey};
use super::normalize::{normalize, rotate_by};
use super::{half_diagonal, ANGLE_PRECISION, ANGLE_RANGE, MIN_POINTS};
use crate::geometry::{Point, Stroke};
use crate::routine::Routine;

/// Golden ratio conjugate, 0.618...
const PHI: f64 = 0.618_033_988_749_894_9;

/// A named group of reference strokes for one gesture
#[derive(Debug, Clone, PartialEq)]
pub struct Template {
    pub name: String,
    pub samples: Vec<Stroke>,
}

impl Template {
    pub fn new(name: impl Into<String>, samples: Vec<Stroke>) -> Self {
        Self {
            name: name.into(),
            samples,
        }
    }

    /// Template for a routine's registered gesture
    pub fn from_routine(routine: &Routine) -> Self {
        Self::new(routine.name.clone(), routine.samples.clone())
    }
}

/// Best match across all templates
#[derive(Debug, Clone, PartialEq)]
pub struct Match {
    /// Matched template name; empty when nothing was compared
    pub name: String,
    /// `1 - distance / half_diagonal`; not clamped, can be negative
    pub score: f64,
}

impl Match {
    /// Sentinel for rejected input or an empty template set
    pub fn none() -> Self {
        Self {
            name: String::new(),
            score: 0.0,
        }
    }

    pub fn is_none(&self) -> bool {
        self.name.is_empty()
    }
}

/// Stateless stroke matcher with an optional normalized-sample cache
#[derive(Debug, Clone, Default)]
pub struct Recognizer {
    cache: Option<Arc<NormalizedSampleCache>>,
}

impl Recognizer {
    /// Recognizer that normalizes every sample on each call
    pub fn new() -> Self {
        Self { cache: None }
    }

    /// Recognizer that reuses normalized samples from `cache`
    pub fn with_cache(cache: Arc<NormalizedSampleCache>) -> Self {
        Self { cache: Some(cache) }
    }

    /// Find the template sample closest to `candidate`.
    ///
    /// Candidates with fewer than [`MIN_POINTS`] points return
    /// [`Match::none`] without being normalized.
    pub fn recognize(&self, candidate: &Stroke, templates: &[Template]) -> Match {
        if candidate.len() < MIN_POINTS {
            return Match::none();
        }

        let normalized = normalize(candidate.points());
        let mut best_distance = f64::INFINITY;
        let mut best_name: Option<&str> = None;

        for template in templates {
            for (index, sample) in template.samples.iter().enumerate() {
                if sample.is_empty() {
                    continue;
                }
                let reference = self.normalized_sample(&template.name, index, sample);
                let distance = distance_at_best_angle(
                    &normalized,
                    &reference,
                    -ANGLE_RANGE,
                    ANGLE_RANGE,
                    ANGLE_PRECISION,
                );
                // Strict comparison keeps the first-seen minimum on ties
                if distance < best_distance {
                    best_distance = distance;
                    best_name = Some(&template.name);
                }
            }
        }

        match best_name {
            Some(name) => Match {
                name: name.to_string(),
                score: 1.0 - best_distance / half_diagonal(),
            },
            None => Match::none(),
        }
    }

    fn normalized_sample(&self, name: &str, index: usize, sample: &Stroke) -> Arc<Vec<Point>> {
        match &self.cache {
            Some(cache) => {
                let key = SampleKey::new(name, index, sample);
                cache.get_or_insert_with(key, || normalize(sample.points()))
            }
            None => Arc::new(normalize(sample.points())),
        }
    }
}

/// Mean Euclidean distance between corresponding points
pub fn path_distance(a: &[Point], b: &[Point]) -> f64 {
    let n = a.len().min(b.len());
    if n == 0 {
        return f64::INFINITY;
    }
    let total: f64 = a
        .iter()
        .zip(b.iter())
        .map(|(p, q)| p.distance_to(q))
        .sum();
    total / n as f64
}

/// Path distance after rotating `points` by `radians`
pub fn distance_at_angle(points: &[Point], reference: &[Point], radians: f64) -> f64 {
    path_distance(&rotate_by(points, radians), reference)
}

/// Golden-section search for the rotation in `[a, b]` minimizing path distance.
///
/// Returns the lower of the two final evaluations once the bracket is no
/// wider than `precision`.
pub fn distance_at_best_angle(
    points: &[Point],
    reference: &[Point],
    mut a: f64,
    mut b: f64,
    precision: f64,
) -> f64 {
    let mut x1 = PHI * a + (1.0 - PHI) * b;
    let mut f1 = distance_at_angle(points, reference, x1);
    let mut x2 = (1.0 - PHI) * a + PHI * b;
    let mut f2 = distance_at_angle(points, reference, x2);

    while (b - a).abs() > precision {
        if f1 < f2 {
            b = x2;
            x2 = x1;
            f2 = f1;
            x1 = PHI * a + (1.0 - PHI) * b;
            f1 = distance_at_angle(points, reference, x1);
        } else {
            a = x1;
            x1 = x2;
            f1 = f2;
            x2 = (1.0 - PHI) * a + PHI * b;
            f2 = distance_at_angle(points, reference, x2);
        }
    }

    f1.min(f2)
}
