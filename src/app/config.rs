//! Configuration Management

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use crate::executor::{CommandTableHost, ProcessShell};

/// Main configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Where routines live
    #[serde(default)]
    pub storage: StorageConfig,
    /// Drawing session settings
    #[serde(default)]
    pub recognition: RecognitionConfig,
    /// How shell lines are run
    #[serde(default)]
    pub executor: ExecutorConfig,
    /// Host command id -> command line
    #[serde(default)]
    pub host_commands: BTreeMap<String, String>,
}

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Routines JSON file
    pub routines_path: PathBuf,
}

/// Recognition configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecognitionConfig {
    /// Give up on a recognition request after this long (ms)
    pub timeout_ms: u64,
}

/// Executor configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutorConfig {
    /// Shell binary
    pub shell: String,
    /// Argument placed before the command line
    pub shell_arg: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            routines_path: Config::data_dir().join("routines.json"),
        }
    }
}

impl Default for RecognitionConfig {
    fn default() -> Self {
        Self { timeout_ms: 5000 }
    }
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            shell: "/bin/sh".to_string(),
            shell_arg: "-c".to_string(),
        }
    }
}

impl Config {
    /// Validate config values are within acceptable ranges.
    /// Returns Ok(()) if valid, or Err with a description of the first invalid field.
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.storage.routines_path.as_os_str().is_empty() {
            return Err(crate::Error::Config("routines_path must not be empty".to_string()));
        }
        if self.recognition.timeout_ms == 0 {
            return Err(crate::Error::Config("timeout_ms must be > 0".to_string()));
        }
        if self.executor.shell.trim().is_empty() {
            return Err(crate::Error::Config("shell must not be empty".to_string()));
        }
        for (id, line) in &self.host_commands {
            if id.trim().is_empty() {
                return Err(crate::Error::Config("host command ids must not be empty".to_string()));
            }
            if line.trim().is_empty() {
                return Err(crate::Error::Config(format!(
                    "host command '{}' has an empty command line", id
                )));
            }
        }
        Ok(())
    }

    /// Load config from file
    pub fn load(path: &PathBuf) -> Result<Self, crate::Error> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content).map_err(|e| crate::Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load config from default location
    pub fn load_default() -> Result<Self, crate::Error> {
        let path = Self::default_path();
        if path.exists() {
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Save config to file
    pub fn save(&self, path: &PathBuf) -> Result<(), crate::Error> {
        let content = self.to_toml()?;

        // Create parent directories
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, content)?;
        Ok(())
    }

    /// Save to default location
    pub fn save_default(&self) -> Result<(), crate::Error> {
        self.save(&Self::default_path())
    }

    /// Directory holding config and routines
    pub fn data_dir() -> PathBuf {
        dirs::home_dir()
            .map(|h| h.join(".gesture_routines"))
            .unwrap_or_else(|| PathBuf::from(".gesture_routines"))
    }

    /// Get default config path
    pub fn default_path() -> PathBuf {
        Self::data_dir().join("config.toml")
    }

    /// Generate TOML representation
    pub fn to_toml(&self) -> Result<String, crate::Error> {
        toml::to_string_pretty(self).map_err(|e| crate::Error::Config(e.to_string()))
    }

    pub fn recognition_timeout(&self) -> Duration {
        Duration::from_millis(self.recognition.timeout_ms)
    }

    /// Shell submitter for `shell` commands
    pub fn shell(&self) -> ProcessShell {
        ProcessShell::new(&self.executor.shell, &self.executor.shell_arg)
    }

    /// Host command table built from `[host_commands]`
    pub fn host(&self) -> CommandTableHost {
        CommandTableHost::new(
            self.host_commands.clone(),
            &self.executor.shell,
            &self.executor.shell_arg,
        )
    }
}
