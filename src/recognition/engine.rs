//! Recognition Engine
//!
//! Applies the recognition threshold on top of the recognizer. Matching runs
//! on the blocking pool so a drawing surface's event loop stays responsive,
//! and only enabled routines take part.
//!
//! A miss still reports the closest routine and its score, so callers can
//! show "closest miss" feedback.

use std::sync::Arc;
use tracing::{debug, info, warn};

use super::cache::NormalizedSampleCache;
use super::recognizer::{Recognizer, Template};
use super::{MIN_POINTS, RECOGNITION_THRESHOLD};
use crate::executor::{ExecutionReport, RoutineExecutor};
use crate::geometry::Stroke;
use crate::routine::{Routine, RoutineStore};

/// Verdict for one drawn stroke
#[derive(Debug, Clone, PartialEq)]
pub struct RecognitionResult {
    /// Score reached [`RECOGNITION_THRESHOLD`]
    pub recognized: bool,
    /// Best routine, set for misses too
    pub matched_name: Option<String>,
    pub score: f64,
    /// Matched routine; only set when recognized
    pub routine: Option<Arc<Routine>>,
}

impl RecognitionResult {
    /// Nothing to compare against, or the stroke was unusable
    pub fn rejected() -> Self {
        Self {
            recognized: false,
            matched_name: None,
            score: 0.0,
            routine: None,
        }
    }
}

/// Recognition verdict plus the execution it triggered, if any
#[derive(Debug, Clone, PartialEq)]
pub struct RecognitionOutcome {
    pub recognition: RecognitionResult,
    pub execution: Option<ExecutionReport>,
}

/// Threshold decision over the routine store
pub struct RecognitionEngine {
    store: Arc<RoutineStore>,
    executor: Arc<RoutineExecutor>,
    recognizer: Recognizer,
}

impl RecognitionEngine {
    pub fn new(
        store: Arc<RoutineStore>,
        executor: Arc<RoutineExecutor>,
        cache: Arc<NormalizedSampleCache>,
    ) -> Self {
        Self {
            store,
            executor,
            recognizer: Recognizer::with_cache(cache),
        }
    }

    pub fn store(&self) -> &Arc<RoutineStore> {
        &self.store
    }

    pub fn executor(&self) -> &Arc<RoutineExecutor> {
        &self.executor
    }

    /// Match `candidate` against every enabled routine
    pub async fn recognize_async(&self, candidate: Stroke) -> RecognitionResult {
        if candidate.len() < MIN_POINTS {
            debug!(points = candidate.len(), "Stroke too short to recognize");
            return RecognitionResult::rejected();
        }

        let enabled = self.store.get_enabled();
        let templates: Vec<Template> = enabled
            .iter()
            .filter(|r| !r.samples.is_empty())
            .map(|r| Template::from_routine(r))
            .collect();
        if templates.is_empty() {
            debug!("No enabled routines with gestures");
            return RecognitionResult::rejected();
        }

        let recognizer = self.recognizer.clone();
        let best = match tokio::task::spawn_blocking(move || {
            recognizer.recognize(&candidate, &templates)
        })
        .await
        {
            Ok(best) => best,
            Err(e) => {
                warn!(error = %e, "Recognition task failed");
                return RecognitionResult::rejected();
            }
        };

        if best.is_none() {
            return RecognitionResult::rejected();
        }

        if best.score >= RECOGNITION_THRESHOLD {
            let routine = enabled.into_iter().find(|r| r.name == best.name);
            info!(routine = %best.name, score = best.score, "Gesture recognized");
            RecognitionResult {
                recognized: routine.is_some(),
                matched_name: Some(best.name),
                score: best.score,
                routine,
            }
        } else {
            info!(closest = %best.name, score = best.score, "Gesture not recognized");
            RecognitionResult {
                recognized: false,
                matched_name: Some(best.name),
                score: best.score,
                routine: None,
            }
        }
    }

    /// Run the routine behind a positive verdict
    pub async fn execute_recognized(&self, result: &RecognitionResult) -> Option<ExecutionReport> {
        match (&result.routine, result.recognized) {
            (Some(routine), true) => Some(self.executor.execute_routine(routine).await),
            _ => None,
        }
    }

    /// Recognize, then execute on a match.
    ///
    /// Execution failures show up in the report only; they never change the
    /// recognition verdict.
    pub async fn recognize_and_execute(&self, candidate: Stroke) -> RecognitionOutcome {
        let recognition = self.recognize_async(candidate).await;
        let execution = self.execute_recognized(&recognition).await;
        RecognitionOutcome {
            recognition,
            execution,
        }
    }
}
