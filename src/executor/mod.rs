//! Routine execution
//!
//! Runs recognized routines through pluggable collaborators:
//! - Host commands by identifier
//! - Shell command lines
//! - Timed delays between steps

pub mod collaborators;
pub mod runner;

pub use collaborators::{
    CommandTableHost, HostCommandInvoker, Notice, NoticeLevel, Notifier, ProcessShell,
    RecordingNotifier, ShellSubmitter, TracingNotifier,
};
pub use runner::{ExecutionReport, RoutineExecutor, StepFailure};
