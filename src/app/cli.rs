//! Command-Line Interface

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::routine::Command;

/// Gesture Routines - Bind drawn gestures to command sequences
#[derive(Parser, Debug)]
#[command(name = "gesture-routines")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List routines
    List {
        /// Show commands and timestamps
        #[arg(short, long)]
        detailed: bool,
    },

    /// Register a routine from recorded gesture samples
    Add {
        /// Routine name
        name: String,

        /// JSON file holding one or more sample strokes
        #[arg(short, long)]
        samples: PathBuf,

        /// Command to run: host:<id>, shell:<line> or delay:<ms>, optionally " @<label>"
        #[arg(long = "command", required = true)]
        commands: Vec<Command>,

        /// Pause between commands (ms)
        #[arg(short, long, default_value = "0")]
        delay_ms: u64,

        /// Skip the sample consistency check
        #[arg(short, long)]
        force: bool,
    },

    /// Delete a routine
    Delete {
        /// Routine name
        name: String,
    },

    /// Enable or disable a routine
    Toggle {
        /// Routine name
        name: String,
    },

    /// Check whether a stroke could be registered
    Validate {
        /// Routine being edited; its own gesture is ignored
        name: Option<String>,

        /// JSON file holding the stroke
        #[arg(short, long)]
        stroke: PathBuf,
    },

    /// Recognize a drawn stroke
    Recognize {
        /// JSON file holding the stroke
        #[arg(short, long)]
        stroke: PathBuf,

        /// Run the matched routine
        #[arg(short, long)]
        execute: bool,
    },

    /// Run a routine by name
    Run {
        /// Routine name
        name: String,
    },

    /// Initialize configuration
    Init {
        /// Force overwrite existing config
        #[arg(short, long)]
        force: bool,
    },

    /// View configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_parse_list_command() {
        let cli = Cli::try_parse_from(["gesture-routines", "list", "--detailed"]).unwrap();
        match cli.command {
            Commands::List { detailed } => assert!(detailed),
            _ => panic!("Expected List command"),
        }
    }

    #[test]
    fn test_cli_parse_add_command() {
        let args = vec![
            "gesture-routines",
            "add",
            "Focus",
            "--samples", "/tmp/focus.json",
            "--command", "host:workbench.action.zenMode",
            "--command", "delay:200",
            "--command", "shell:notify-send focus @Notify",
            "--delay-ms", "50",
        ];
        let cli = Cli::try_parse_from(args).unwrap();

        match cli.command {
            Commands::Add { name, samples, commands, delay_ms, force } => {
                assert_eq!(name, "Focus");
                assert_eq!(samples, PathBuf::from("/tmp/focus.json"));
                assert_eq!(
                    commands,
                    vec![
                        Command::host("workbench.action.zenMode"),
                        Command::delay(200),
                        Command::shell("notify-send focus").with_label("Notify"),
                    ]
                );
                assert_eq!(delay_ms, 50);
                assert!(!force);
            }
            _ => panic!("Expected Add command"),
        }
    }

    #[test]
    fn test_cli_add_requires_command() {
        let result = Cli::try_parse_from(["gesture-routines", "add", "Focus", "-s", "x.json"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_add_rejects_bad_command_spec() {
        let result = Cli::try_parse_from([
            "gesture-routines", "add", "Focus", "-s", "x.json", "--command", "delay:soon",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_parse_delete_and_toggle() {
        let cli = Cli::try_parse_from(["gesture-routines", "delete", "Focus"]).unwrap();
        assert!(matches!(cli.command, Commands::Delete { name } if name == "Focus"));

        let cli = Cli::try_parse_from(["gesture-routines", "toggle", "Focus"]).unwrap();
        assert!(matches!(cli.command, Commands::Toggle { name } if name == "Focus"));
    }

    #[test]
    fn test_cli_parse_validate_command() {
        let cli = Cli::try_parse_from(["gesture-routines", "validate", "--stroke", "s.json"]).unwrap();
        match cli.command {
            Commands::Validate { name, stroke } => {
                assert!(name.is_none());
                assert_eq!(stroke, PathBuf::from("s.json"));
            }
            _ => panic!("Expected Validate command"),
        }

        let cli = Cli::try_parse_from(["gesture-routines", "validate", "Focus", "-s", "s.json"]).unwrap();
        match cli.command {
            Commands::Validate { name, .. } => assert_eq!(name.as_deref(), Some("Focus")),
            _ => panic!("Expected Validate command"),
        }
    }

    #[test]
    fn test_cli_parse_recognize_command() {
        let cli = Cli::try_parse_from([
            "gesture-routines", "recognize", "--stroke", "s.json", "--execute",
        ])
        .unwrap();
        match cli.command {
            Commands::Recognize { stroke, execute } => {
                assert_eq!(stroke, PathBuf::from("s.json"));
                assert!(execute);
            }
            _ => panic!("Expected Recognize command"),
        }
    }

    #[test]
    fn test_cli_parse_run_command() {
        let cli = Cli::try_parse_from(["gesture-routines", "run", "Focus"]).unwrap();
        assert!(matches!(cli.command, Commands::Run { name } if name == "Focus"));
    }

    #[test]
    fn test_cli_parse_init_command() {
        let cli = Cli::try_parse_from(["gesture-routines", "init", "--force"]).unwrap();
        assert!(matches!(cli.command, Commands::Init { force: true }));
    }

    #[test]
    fn test_cli_parse_config_show() {
        let cli = Cli::try_parse_from(["gesture-routines", "config", "show"]).unwrap();
        assert!(matches!(cli.command, Commands::Config { action: ConfigAction::Show }));
    }

    #[test]
    fn test_cli_global_flags() {
        let cli = Cli::try_parse_from([
            "gesture-routines", "-v", "--config", "/tmp/c.toml", "list",
        ])
        .unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/c.toml")));

        let cli = Cli::try_parse_from(["gesture-routines", "list", "--verbose"]).unwrap();
        assert!(cli.verbose);
        assert!(cli.config.is_none());
    }

    #[test]
    fn test_cli_missing_subcommand_fails() {
        assert!(Cli::try_parse_from(["gesture-routines"]).is_err());
    }

    #[test]
    fn test_cli_unknown_subcommand_fails() {
        assert!(Cli::try_parse_from(["gesture-routines", "record"]).is_err());
    }

    #[test]
    fn test_cli_debug_assert() {
        Cli::command().debug_assert();
    }
}
