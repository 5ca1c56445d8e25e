//! Drawing Session Guard
//!
//! A drawing surface submits each completed stroke through a
//! [`RecognitionSession`]. Only one submission may be in flight: a stroke
//! finished while another is still being handled is turned away with a
//! "processing" notice instead of being queued. Recognition is bounded by a
//! timeout; when it fires the session is free again and the user is invited
//! to retry. The abandoned computation is not cancelled, only ignored.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

use super::engine::{RecognitionEngine, RecognitionOutcome};
use super::MIN_POINTS;
use crate::executor::{Notice, Notifier};
use crate::geometry::Stroke;

/// Default recognition timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(5000);

/// Result of one submission
#[derive(Debug, Clone, PartialEq)]
pub enum SessionOutcome {
    Completed(RecognitionOutcome),
    /// Rejected because an earlier stroke is still being handled
    Busy,
    TimedOut,
}

/// Clears the in-flight flag however the submission ends
struct InFlightGuard<'a>(&'a AtomicBool);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Per-surface guard around a shared [`RecognitionEngine`]
pub struct RecognitionSession {
    engine: Arc<RecognitionEngine>,
    notifier: Arc<dyn Notifier>,
    in_flight: AtomicBool,
    timeout: Duration,
}

impl RecognitionSession {
    pub fn new(engine: Arc<RecognitionEngine>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            engine,
            notifier,
            in_flight: AtomicBool::new(false),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Recognize `stroke` and run the matched routine.
    ///
    /// The session stays busy until execution finishes; only recognition is
    /// subject to the timeout.
    pub async fn submit(&self, stroke: Stroke) -> SessionOutcome {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            self.notifier
                .notify(Notice::info("Still processing the previous gesture"));
            return SessionOutcome::Busy;
        }
        let _guard = InFlightGuard(&self.in_flight);

        let too_short = stroke.len() < MIN_POINTS;
        let recognition =
            match tokio::time::timeout(self.timeout, self.engine.recognize_async(stroke)).await {
                Ok(recognition) => recognition,
                Err(_) => {
                    warn!(timeout_ms = self.timeout.as_millis() as u64, "Recognition timed out");
                    self.notifier
                        .notify(Notice::warning("Recognition timed out, please try again"));
                    return SessionOutcome::TimedOut;
                }
            };

        if recognition.recognized {
            let name = recognition.matched_name.as_deref().unwrap_or_default();
            self.notifier.notify(Notice::info(format!(
                "Running {} ({:.0}% match)",
                name,
                recognition.score * 100.0
            )));
        } else if too_short {
            self.notifier
                .notify(Notice::warning("Gesture too short, draw a longer stroke"));
        } else if let Some(closest) = &recognition.matched_name {
            self.notifier.notify(Notice::warning(format!(
                "No routine matched (closest: {}, {:.0}%)",
                closest,
                recognition.score * 100.0
            )));
        } else {
            self.notifier.notify(Notice::warning("No routine matched"));
        }

        let execution = self.engine.execute_recognized(&recognition).await;
        SessionOutcome::Completed(RecognitionOutcome {
            recognition,
            execution,
        })
    }
}
