//! Routine Execution
//!
//! Runs a routine's commands strictly in order. A step's failure is logged,
//! recorded in the report and never stops the remaining steps: a routine is
//! a best-effort batch, not a transaction.

use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::collaborators::{HostCommandInvoker, Notice, Notifier, ShellSubmitter};
use crate::routine::{Command, Routine};

/// One failed step
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepFailure {
    pub index: usize,
    pub label: String,
    pub error: String,
}

/// Aggregate outcome of one routine run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutionReport {
    pub success_count: usize,
    pub failed_count: usize,
    pub failures: Vec<StepFailure>,
}

impl ExecutionReport {
    pub fn total(&self) -> usize {
        self.success_count + self.failed_count
    }

    pub fn all_succeeded(&self) -> bool {
        self.failed_count == 0
    }
}

/// Sequential executor dispatching commands to collaborators
pub struct RoutineExecutor {
    host: Arc<dyn HostCommandInvoker>,
    shell: Arc<dyn ShellSubmitter>,
    notifier: Arc<dyn Notifier>,
}

impl RoutineExecutor {
    pub fn new(
        host: Arc<dyn HostCommandInvoker>,
        shell: Arc<dyn ShellSubmitter>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            host,
            shell,
            notifier,
        }
    }

    pub fn notifier(&self) -> &Arc<dyn Notifier> {
        &self.notifier
    }

    /// Run every command of `routine` and report how many succeeded.
    ///
    /// Before each step after the first, waits `routine.delay_ms` unless the
    /// step is itself a delay. Never returns an error.
    pub async fn execute_routine(&self, routine: &Routine) -> ExecutionReport {
        info!(routine = %routine.name, steps = routine.commands.len(), delay_ms = routine.delay_ms, "Executing routine");
        let mut report = ExecutionReport::default();

        for (index, command) in routine.commands.iter().enumerate() {
            if index > 0 && routine.delay_ms > 0 && !command.is_delay() {
                tokio::time::sleep(Duration::from_millis(routine.delay_ms)).await;
            }

            debug!(routine = %routine.name, step = index, kind = %command.kind(), label = %command.label(), "Running step");
            match self.run_step(command).await {
                Ok(()) => report.success_count += 1,
                Err(e) => {
                    warn!(routine = %routine.name, step = index, label = %command.label(), error = %e, "Step failed");
                    report.failed_count += 1;
                    report.failures.push(StepFailure {
                        index,
                        label: command.label().to_string(),
                        error: e.to_string(),
                    });
                }
            }
        }

        let mut message = format!(
            "Routine {}: {} succeeded, {} failed",
            routine.name, report.success_count, report.failed_count
        );
        if !report.all_succeeded() {
            let details: Vec<String> = report
                .failures
                .iter()
                .map(|f| format!("{} ({})", f.label, f.error))
                .collect();
            message = format!("{}: {}", message, details.join(", "));
        }
        self.notifier.notify(if report.all_succeeded() {
            Notice::success(message)
        } else {
            Notice::warning(message)
        });
        report
    }

    async fn run_step(&self, command: &Command) -> crate::Result<()> {
        match command {
            Command::HostCommand { id, .. } => self.host.invoke(id).await,
            Command::ShellCommand { line, .. } => self.shell.submit(line).await,
            Command::Delay { ms, .. } => {
                tokio::time::sleep(Duration::from_millis(*ms)).await;
                Ok(())
            }
        }
    }
}
