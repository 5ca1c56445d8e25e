//! # Gesture Routines
//!
//! Maps a freehand stroke to one of a set of user-defined routines and runs
//! the routine's actions in order.
//!
//! ## Overview
//!
//! A routine binds a drawn gesture (several recorded samples of the same
//! shape) to an ordered list of commands: host commands, shell command lines
//! and delays. When the user draws a new stroke, it is normalized and matched
//! against every enabled routine's samples with the $1 Unistroke method. A
//! confident match runs the routine; registration rejects gestures that are
//! too close to an existing one.
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use gesture_routines::executor::{RoutineExecutor, ProcessShell, CommandTableHost, TracingNotifier};
//! use gesture_routines::recognition::{NormalizedSampleCache, RecognitionEngine};
//! use gesture_routines::routine::{Command, MemoryPersistence, Routine, RoutineStore};
//! use gesture_routines::geometry::Stroke;
//!
//! # async fn demo(samples: Vec<Stroke>, drawn: Stroke) -> gesture_routines::Result<()> {
//! let cache = Arc::new(NormalizedSampleCache::new());
//! let store = Arc::new(RoutineStore::open(Box::new(MemoryPersistence::new()), cache.clone())?);
//! store.save_routine(Routine::new(
//!     "Focus",
//!     vec![Command::shell("notify-send focus")],
//!     samples,
//! ))?;
//!
//! let executor = Arc::new(RoutineExecutor::new(
//!     Arc::new(CommandTableHost::default()),
//!     Arc::new(ProcessShell::default()),
//!     Arc::new(TracingNotifier),
//! ));
//! let engine = RecognitionEngine::new(store, executor, cache);
//! let outcome = engine.recognize_and_execute(drawn).await;
//! println!("recognized: {}", outcome.recognition.recognized);
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - [`geometry`]: points, strokes, bounding boxes, centroid and path length
//! - [`recognition`]: stroke normalization, template matching, registration
//!   validation, the threshold decision and the drawing-session guard
//! - [`routine`]: routine and command types, persistence, the routine store
//! - [`executor`]: sequential, failure-tolerant routine execution and the
//!   host/shell/notification collaborators
//! - [`app`]: CLI and configuration management
//!
//! ## Pipeline
//!
//! ```text
//! ┌────────────┐    ┌────────────┐    ┌─────────────┐    ┌────────────┐
//! │   Stroke   │───▶│ Recognizer │───▶│ Recognition │───▶│  Executor  │
//! │  (points)  │    │  ($1 match)│    │   Engine    │    │ (commands) │
//! └────────────┘    └────────────┘    └─────────────┘    └────────────┘
//!                          │
//!                          ▼
//!                   ┌────────────┐    ┌─────────────┐
//!                   │ Validator  │───▶│ RoutineStore│
//!                   │ (register) │    │ (persisted) │
//!                   └────────────┘    └─────────────┘
//! ```

pub mod geometry;
pub mod recognition;
pub mod routine;
pub mod executor;
pub mod app;

// Re-export commonly used types
pub use geometry::{BoundingBox, Point, Stroke};
pub use recognition::{
    GestureValidator, Match, RecognitionEngine, RecognitionResult, Recognizer, Template,
    ValidationResult,
};
pub use routine::{Command, Routine, RoutineStore};
pub use executor::{ExecutionReport, RoutineExecutor};

/// Result type alias for gesture routines
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for gesture routines
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Execution error: {0}")]
    Execution(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
