//! Routine and Command Types
//!
//! Defines the persisted shape of routines. Commands are a tagged variant in
//! memory; on disk each command is a `{type, payload, label}` record. Older
//! records (a bare command-id string, or `{type: "vscode" | "terminal" |
//! "delay", command}`) are migrated into the variant once, at load time.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::geometry::Stroke;

/// Number of gesture samples the registration flow asks for
pub const DEFAULT_SAMPLE_COUNT: usize = 3;

/// Message for a registration that doesn't use [`DEFAULT_SAMPLE_COUNT`] draws
pub fn sample_count_warning(count: usize) -> Option<String> {
    match count {
        DEFAULT_SAMPLE_COUNT => None,
        n if n < DEFAULT_SAMPLE_COUNT => Some(format!(
            "Only {} sample(s) given; {} draws make recognition more reliable",
            n, DEFAULT_SAMPLE_COUNT
        )),
        n => Some(format!(
            "{} samples given; registration usually takes {} draws",
            n, DEFAULT_SAMPLE_COUNT
        )),
    }
}

/// One step of a routine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "CommandRecord", into = "CommandRecord")]
pub enum Command {
    /// Invoke a host command by identifier
    HostCommand { id: String, label: String },
    /// Submit a line to the shell
    ShellCommand { line: String, label: String },
    /// Wait before the next step
    Delay { ms: u64, label: String },
}

impl Command {
    pub fn host(id: impl Into<String>) -> Self {
        let id = id.into();
        Command::HostCommand {
            label: id.clone(),
            id,
        }
    }

    pub fn shell(line: impl Into<String>) -> Self {
        let line = line.into();
        Command::ShellCommand {
            label: line.clone(),
            line,
        }
    }

    pub fn delay(ms: u64) -> Self {
        Command::Delay {
            ms,
            label: format!("Wait {}ms", ms),
        }
    }

    /// Replace the display label
    pub fn with_label(mut self, new_label: impl Into<String>) -> Self {
        match &mut self {
            Command::HostCommand { label, .. }
            | Command::ShellCommand { label, .. }
            | Command::Delay { label, .. } => *label = new_label.into(),
        }
        self
    }

    pub fn label(&self) -> &str {
        match self {
            Command::HostCommand { label, .. }
            | Command::ShellCommand { label, .. }
            | Command::Delay { label, .. } => label,
        }
    }

    pub fn kind(&self) -> CommandKind {
        match self {
            Command::HostCommand { .. } => CommandKind::HostCommand,
            Command::ShellCommand { .. } => CommandKind::ShellCommand,
            Command::Delay { .. } => CommandKind::Delay,
        }
    }

    pub fn is_delay(&self) -> bool {
        matches!(self, Command::Delay { .. })
    }

    /// Payload as stored: command id, shell line, or millisecond count
    pub fn payload(&self) -> String {
        match self {
            Command::HostCommand { id, .. } => id.clone(),
            Command::ShellCommand { line, .. } => line.clone(),
            Command::Delay { ms, .. } => ms.to_string(),
        }
    }
}

/// Discriminant of [`Command`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CommandKind {
    HostCommand,
    ShellCommand,
    Delay,
}

impl CommandKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CommandKind::HostCommand => "hostCommand",
            CommandKind::ShellCommand => "shellCommand",
            CommandKind::Delay => "delay",
        }
    }

    /// Map a stored type tag, including legacy spellings
    fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "hostCommand" | "host" | "command" | "vscode" => Some(CommandKind::HostCommand),
            "shellCommand" | "shell" | "terminal" => Some(CommandKind::ShellCommand),
            "delay" => Some(CommandKind::Delay),
            _ => None,
        }
    }
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// On-disk command record
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum CommandRecord {
    Structured {
        #[serde(rename = "type")]
        kind: String,
        #[serde(alias = "command")]
        payload: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        label: Option<String>,
    },
    /// Legacy: a plain host command identifier
    Bare(String),
}

impl TryFrom<CommandRecord> for Command {
    type Error = String;

    fn try_from(record: CommandRecord) -> Result<Self, Self::Error> {
        let (kind, payload, label) = match record {
            CommandRecord::Bare(id) => (CommandKind::HostCommand, id, None),
            CommandRecord::Structured {
                kind,
                payload,
                label,
            } => {
                let kind = CommandKind::from_tag(&kind)
                    .ok_or_else(|| format!("unknown command type '{}'", kind))?;
                (kind, payload, label)
            }
        };

        let command = match kind {
            CommandKind::HostCommand => Command::host(payload),
            CommandKind::ShellCommand => Command::shell(payload),
            CommandKind::Delay => {
                let ms = payload
                    .trim()
                    .parse::<u64>()
                    .map_err(|_| format!("invalid delay '{}': expected milliseconds", payload))?;
                Command::delay(ms)
            }
        };
        Ok(match label {
            Some(label) if !label.trim().is_empty() => command.with_label(label),
            _ => command,
        })
    }
}

impl From<Command> for CommandRecord {
    fn from(command: Command) -> Self {
        CommandRecord::Structured {
            kind: command.kind().as_str().to_string(),
            payload: command.payload(),
            label: Some(command.label().to_string()),
        }
    }
}

/// Parses CLI command specs: `host:<id>`, `shell:<line>`, `delay:<ms>`,
/// each optionally followed by ` @<label>`
impl FromStr for Command {
    type Err = crate::Error;

    fn from_str(spec: &str) -> Result<Self, Self::Err> {
        let (body, label) = match spec.rsplit_once(" @") {
            Some((body, label)) if !label.trim().is_empty() => (body, Some(label.trim())),
            _ => (spec, None),
        };
        let (tag, payload) = body.split_once(':').ok_or_else(|| {
            crate::Error::Validation(format!(
                "command '{}' must look like host:<id>, shell:<line> or delay:<ms>",
                spec
            ))
        })?;
        let payload = payload.trim();
        if payload.is_empty() {
            return Err(crate::Error::Validation(format!("command '{}' has no payload", spec)));
        }
        let record = CommandRecord::Structured {
            kind: tag.trim().to_string(),
            payload: payload.to_string(),
            label: label.map(str::to_string),
        };
        Command::try_from(record).map_err(crate::Error::Validation)
    }
}

/// A named binding of gesture samples to an ordered command sequence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Routine {
    pub name: String,
    pub commands: Vec<Command>,
    #[serde(default)]
    pub samples: Vec<Stroke>,
    /// Unset is treated as enabled
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(default)]
    pub delay_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Routine {
    /// New, not yet saved routine
    pub fn new(name: impl Into<String>, commands: Vec<Command>, samples: Vec<Stroke>) -> Self {
        Self {
            name: name.into(),
            commands,
            samples,
            enabled: None,
            delay_ms: 0,
            created_at: None,
            updated_at: None,
        }
    }

    pub fn with_delay_ms(mut self, delay_ms: u64) -> Self {
        self.delay_ms = delay_ms;
        self
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = Some(enabled);
        self
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled != Some(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_constructors_default_labels() {
        assert_eq!(Command::host("workbench.save").label(), "workbench.save");
        assert_eq!(Command::shell("make test").label(), "make test");
        assert_eq!(Command::delay(250).label(), "Wait 250ms");
    }

    #[test]
    fn test_serialize_structured() {
        let value = serde_json::to_value(Command::delay(500)).unwrap();
        assert_eq!(value, json!({"type": "delay", "payload": "500", "label": "Wait 500ms"}));

        let value = serde_json::to_value(Command::shell("ls").with_label("List")).unwrap();
        assert_eq!(value, json!({"type": "shellCommand", "payload": "ls", "label": "List"}));
    }

    #[test]
    fn test_deserialize_bare_string_as_host_command() {
        let command: Command = serde_json::from_value(json!("editor.action.formatDocument")).unwrap();
        assert_eq!(command, Command::host("editor.action.formatDocument"));
    }

    #[test]
    fn test_deserialize_legacy_tags() {
        let command: Command =
            serde_json::from_value(json!({"type": "vscode", "command": "save", "label": "Save"}))
                .unwrap();
        assert_eq!(command, Command::host("save").with_label("Save"));

        let command: Command =
            serde_json::from_value(json!({"type": "terminal", "command": "npm test"})).unwrap();
        assert_eq!(command, Command::shell("npm test"));

        let command: Command =
            serde_json::from_value(json!({"type": "delay", "command": " 750 "})).unwrap();
        assert_eq!(command, Command::delay(750));
    }

    #[test]
    fn test_deserialize_rejects_unknown_type() {
        let result: Result<Command, _> =
            serde_json::from_value(json!({"type": "macro", "payload": "x"}));
        assert!(result.is_err());
    }

    #[test]
    fn test_deserialize_rejects_bad_delay() {
        let result: Result<Command, _> =
            serde_json::from_value(json!({"type": "delay", "payload": "-5"}));
        assert!(result.is_err());
    }

    #[test]
    fn test_empty_label_falls_back_to_default() {
        let command: Command =
            serde_json::from_value(json!({"type": "host", "payload": "x", "label": "  "})).unwrap();
        assert_eq!(command.label(), "x");
    }

    #[test]
    fn test_parse_cli_specs() {
        assert_eq!("host:files.saveAll".parse::<Command>().unwrap(), Command::host("files.saveAll"));
        assert_eq!(
            "shell:git commit -am 'wip: x'".parse::<Command>().unwrap(),
            Command::shell("git commit -am 'wip: x'")
        );
        assert_eq!("delay:100".parse::<Command>().unwrap(), Command::delay(100));
        assert_eq!(
            "host:workbench.action.zenMode @Zen".parse::<Command>().unwrap(),
            Command::host("workbench.action.zenMode").with_label("Zen")
        );
        assert_eq!(
            "shell:git clone git@example.com:repo".parse::<Command>().unwrap(),
            Command::shell("git clone git@example.com:repo")
        );
        assert!("bogus".parse::<Command>().is_err());
        assert!("shell:".parse::<Command>().is_err());
        assert!("delay:soon".parse::<Command>().is_err());
    }

    #[test]
    fn test_routine_defaults_from_minimal_record() {
        let routine: Routine = serde_json::from_value(json!({
            "name": "Focus",
            "commands": ["workbench.action.zenMode"]
        }))
        .unwrap();
        assert!(routine.is_enabled());
        assert_eq!(routine.delay_ms, 0);
        assert!(routine.samples.is_empty());
        assert!(routine.created_at.is_none());
    }

    #[test]
    fn test_routine_camel_case_fields() {
        let routine = Routine::new("R", vec![Command::host("a")], vec![])
            .with_delay_ms(20)
            .with_enabled(false);
        let value = serde_json::to_value(&routine).unwrap();
        assert_eq!(value["delayMs"], json!(20));
        assert_eq!(value["enabled"], json!(false));
        assert!(!routine.is_enabled());
    }

    #[test]
    fn test_sample_count_warning() {
        assert!(sample_count_warning(DEFAULT_SAMPLE_COUNT).is_none());
        assert!(sample_count_warning(1).unwrap().starts_with("Only 1 sample(s)"));
        assert!(sample_count_warning(5).unwrap().starts_with("5 samples"));
    }
}
