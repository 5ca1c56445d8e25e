//! Registration-time Gesture Validation
//!
//! Rejects a candidate gesture that is too close to another routine's
//! registered gesture. The similarity threshold sits below the recognition
//! threshold, so two gestures that are almost confusable can never both be
//! registered.

use std::collections::BTreeMap;
use tracing::debug;

use super::recognizer::{Recognizer, Template};
use super::{MIN_POINTS, SIMILARITY_THRESHOLD};
use crate::geometry::Stroke;

/// Outcome of validating one candidate
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationResult {
    pub accepted: bool,
    /// Routine whose gesture the candidate collides with
    pub conflicting_name: Option<String>,
    pub score: f64,
}

impl ValidationResult {
    fn accepted(score: f64) -> Self {
        Self {
            accepted: true,
            conflicting_name: None,
            score,
        }
    }

    fn rejected(conflicting_name: Option<String>, score: f64) -> Self {
        Self {
            accepted: false,
            conflicting_name,
            score,
        }
    }
}

/// Validates candidate gestures against registered ones
#[derive(Debug, Clone, Default)]
pub struct GestureValidator {
    recognizer: Recognizer,
}

impl GestureValidator {
    pub fn new(recognizer: Recognizer) -> Self {
        Self { recognizer }
    }

    /// Check `candidate` against every gesture except `exclude_name`.
    ///
    /// `exclude_name` lets a routine being edited re-validate without
    /// conflicting with its own stored samples.
    pub fn validate(
        &self,
        candidate: &Stroke,
        existing: &BTreeMap<String, Vec<Stroke>>,
        exclude_name: Option<&str>,
    ) -> ValidationResult {
        if candidate.len() < MIN_POINTS {
            return ValidationResult::rejected(None, 0.0);
        }

        let templates: Vec<Template> = existing
            .iter()
            .filter(|(name, _)| Some(name.as_str()) != exclude_name)
            .map(|(name, samples)| Template::new(name.clone(), samples.clone()))
            .collect();

        if templates.is_empty() {
            return ValidationResult::accepted(0.0);
        }

        let best = self.recognizer.recognize(candidate, &templates);
        if best.score > SIMILARITY_THRESHOLD {
            debug!(conflict = %best.name, score = best.score, "Gesture too similar to existing routine");
            ValidationResult::rejected(Some(best.name), best.score)
        } else {
            ValidationResult::accepted(best.score)
        }
    }

    /// Lowest leave-one-out score among `samples`.
    ///
    /// Each sample is recognized against the others; a low minimum means the
    /// user drew noticeably different shapes. `None` with fewer than two
    /// usable samples.
    pub fn sample_consistency(&self, samples: &[Stroke]) -> Option<f64> {
        let usable: Vec<&Stroke> = samples.iter().filter(|s| s.len() >= MIN_POINTS).collect();
        if usable.len() < 2 {
            return None;
        }

        let mut lowest = f64::INFINITY;
        for (i, sample) in usable.iter().enumerate() {
            let others: Vec<Stroke> = usable
                .iter()
                .enumerate()
                .filter(|(j, _)| *j != i)
                .map(|(_, s)| (*s).clone())
                .collect();
            let score = self
                .recognizer
                .recognize(sample, &[Template::new("sample", others)])
                .score;
            lowest = lowest.min(score);
        }
        Some(lowest)
    }
}
