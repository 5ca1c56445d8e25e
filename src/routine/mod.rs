//! Routines
//!
//! A routine binds recorded gesture samples to an ordered command sequence.
//! This module defines the routine model, its persistence backends and the
//! store that owns the routine table.

pub mod types;
pub mod persistence;
pub mod store;

pub use persistence::{JsonFilePersistence, MemoryPersistence, RoutinePersistence};
pub use store::RoutineStore;
pub use types::{sample_count_warning, Command, CommandKind, Routine, DEFAULT_SAMPLE_COUNT};
