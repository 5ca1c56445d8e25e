//! External Collaborators
//!
//! The executor never runs anything itself. Host commands, shell lines and
//! user-facing notices go through these traits so the hosting application
//! (an editor, a desktop shell, a test) decides what "run this" means.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::process::Stdio;
use tracing::{debug, error, info, warn};

/// Invokes host commands by identifier
#[async_trait]
pub trait HostCommandInvoker: Send + Sync {
    /// Run `command_id`; an `Err` marks the step as failed
    async fn invoke(&self, command_id: &str) -> crate::Result<()>;
}

/// Hands command lines to a shell or terminal
#[async_trait]
pub trait ShellSubmitter: Send + Sync {
    /// Submit `command_line`; success means submitted, not exited cleanly
    async fn submit(&self, command_line: &str) -> crate::Result<()>;
}

/// Severity of a user-facing notice
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// Human-readable message for the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Warning,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

/// Receives notices; purely observational
pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);
}

/// Writes notices to the log
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notice: Notice) {
        match notice.level {
            NoticeLevel::Info | NoticeLevel::Success => info!("{}", notice.message),
            NoticeLevel::Warning => warn!("{}", notice.message),
            NoticeLevel::Error => error!("{}", notice.message),
        }
    }
}

/// Keeps every notice in memory
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    notices: Mutex<Vec<Notice>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notices(&self) -> Vec<Notice> {
        self.notices.lock().clone()
    }

    pub fn messages(&self) -> Vec<String> {
        self.notices.lock().iter().map(|n| n.message.clone()).collect()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notice: Notice) {
        self.notices.lock().push(notice);
    }
}

/// Spawns command lines through a shell without waiting for them
#[derive(Debug, Clone)]
pub struct ProcessShell {
    shell: String,
    shell_arg: String,
}

impl ProcessShell {
    pub fn new(shell: impl Into<String>, shell_arg: impl Into<String>) -> Self {
        Self {
            shell: shell.into(),
            shell_arg: shell_arg.into(),
        }
    }
}

impl Default for ProcessShell {
    fn default() -> Self {
        Self::new("/bin/sh", "-c")
    }
}

#[async_trait]
impl ShellSubmitter for ProcessShell {
    async fn submit(&self, command_line: &str) -> crate::Result<()> {
        let mut child = tokio::process::Command::new(&self.shell)
            .arg(&self.shell_arg)
            .arg(command_line)
            .stdin(Stdio::null())
            .spawn()
            .map_err(|e| crate::Error::Execution(format!("failed to spawn {}: {}", self.shell, e)))?;

        // Reap in the background so the step does not wait for the process
        let line = command_line.to_string();
        tokio::spawn(async move {
            match child.wait().await {
                Ok(status) if status.success() => debug!(command = %line, "Shell command finished"),
                Ok(status) => warn!(command = %line, code = ?status.code(), "Shell command exited with failure"),
                Err(e) => warn!(command = %line, error = %e, "Failed to wait for shell command"),
            }
        });
        Ok(())
    }
}

/// Resolves host command ids to command lines and runs them to completion.
///
/// Used when there is no richer host to talk to, e.g. from the CLI. Unknown
/// ids and non-zero exits are failures.
#[derive(Debug, Clone)]
pub struct CommandTableHost {
    commands: BTreeMap<String, String>,
    shell: String,
    shell_arg: String,
}

impl CommandTableHost {
    pub fn new(
        commands: BTreeMap<String, String>,
        shell: impl Into<String>,
        shell_arg: impl Into<String>,
    ) -> Self {
        Self {
            commands,
            shell: shell.into(),
            shell_arg: shell_arg.into(),
        }
    }

    pub fn contains(&self, command_id: &str) -> bool {
        self.commands.contains_key(command_id)
    }
}

impl Default for CommandTableHost {
    fn default() -> Self {
        Self::new(BTreeMap::new(), "/bin/sh", "-c")
    }
}

#[async_trait]
impl HostCommandInvoker for CommandTableHost {
    async fn invoke(&self, command_id: &str) -> crate::Result<()> {
        let line = self
            .commands
            .get(command_id)
            .ok_or_else(|| crate::Error::NotFound(format!("host command '{}'", command_id)))?;

        let status = tokio::process::Command::new(&self.shell)
            .arg(&self.shell_arg)
            .arg(line)
            .stdin(Stdio::null())
            .status()
            .await
            .map_err(|e| crate::Error::Execution(format!("failed to run '{}': {}", command_id, e)))?;

        if status.success() {
            Ok(())
        } else {
            Err(crate::Error::Execution(format!(
                "'{}' exited with {}",
                command_id,
                status
                    .code()
                    .map(|c| c.to_string())
                    .unwrap_or_else(|| "signal".to_string())
            )))
        }
    }
}
