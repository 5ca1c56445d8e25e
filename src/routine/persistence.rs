//! Routine Persistence
//!
//! The store delegates durability to a [`RoutinePersistence`] backend that
//! loads and saves the whole name → routine map. The JSON file backend
//! writes to a temporary sibling and renames it over the target, so a crash
//! mid-write never leaves a truncated routines file behind.

use chrono::Utc;
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use super::types::Routine;

/// Storage backend for the routine table
pub trait RoutinePersistence: Send + Sync {
    /// Load every stored routine, keyed by name
    fn load(&self) -> crate::Result<BTreeMap<String, Routine>>;

    /// Replace the stored table with `routines`
    fn save(&self, routines: &BTreeMap<String, Routine>) -> crate::Result<()>;
}

impl<T: RoutinePersistence + ?Sized> RoutinePersistence for std::sync::Arc<T> {
    fn load(&self) -> crate::Result<BTreeMap<String, Routine>> {
        (**self).load()
    }

    fn save(&self, routines: &BTreeMap<String, Routine>) -> crate::Result<()> {
        (**self).save(routines)
    }
}

/// Routines stored as one pretty-printed JSON object
#[derive(Debug, Clone)]
pub struct JsonFilePersistence {
    path: PathBuf,
}

impl JsonFilePersistence {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        self.path.with_extension("json.tmp")
    }
}

impl RoutinePersistence for JsonFilePersistence {
    fn load(&self) -> crate::Result<BTreeMap<String, Routine>> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "No routines file yet");
                return Ok(BTreeMap::new());
            }
            Err(e) => return Err(e.into()),
        };

        let stored: BTreeMap<String, Routine> = serde_json::from_str(&content).map_err(|e| {
            crate::Error::Persistence(format!("failed to parse {}: {}", self.path.display(), e))
        })?;

        let now = Utc::now();
        let mut routines = BTreeMap::new();
        for (key, mut routine) in stored {
            if routine.name.trim().is_empty() {
                warn!(key = %key, "Stored routine has no name; using its key");
                routine.name = key.clone();
            }
            if routine.created_at.is_none() {
                routine.created_at = Some(now);
            }
            if routine.updated_at.is_none() {
                routine.updated_at = routine.created_at;
            }
            if routines.contains_key(&routine.name) {
                return Err(crate::Error::Persistence(format!(
                    "{}: key '{}' duplicates routine name '{}'",
                    self.path.display(),
                    key,
                    routine.name
                )));
            }
            routines.insert(routine.name.clone(), routine);
        }
        Ok(routines)
    }

    fn save(&self, routines: &BTreeMap<String, Routine>) -> crate::Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string_pretty(routines)?;
        let tmp = self.temp_path();
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, &self.path)?;
        debug!(path = %self.path.display(), count = routines.len(), "Saved routines");
        Ok(())
    }
}

/// In-memory backend for tests and ephemeral sessions
#[derive(Debug, Default)]
pub struct MemoryPersistence {
    routines: Mutex<BTreeMap<String, Routine>>,
    fail_saves: Mutex<bool>,
    save_count: Mutex<usize>,
}

impl MemoryPersistence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Backend pre-populated with `routines`
    pub fn with_routines(routines: Vec<Routine>) -> Self {
        let persistence = Self::default();
        *persistence.routines.lock() = routines
            .into_iter()
            .map(|r| (r.name.clone(), r))
            .collect();
        persistence
    }

    /// Make subsequent saves fail, to exercise rollback paths
    pub fn set_fail_saves(&self, fail: bool) {
        *self.fail_saves.lock() = fail;
    }

    pub fn save_count(&self) -> usize {
        *self.save_count.lock()
    }

    pub fn snapshot(&self) -> BTreeMap<String, Routine> {
        self.routines.lock().clone()
    }
}

impl RoutinePersistence for MemoryPersistence {
    fn load(&self) -> crate::Result<BTreeMap<String, Routine>> {
        Ok(self.routines.lock().clone())
    }

    fn save(&self, routines: &BTreeMap<String, Routine>) -> crate::Result<()> {
        if *self.fail_saves.lock() {
            return Err(crate::Error::Persistence("simulated write failure".to_string()));
        }
        *self.routines.lock() = routines.clone();
        *self.save_count.lock() += 1;
        Ok(())
    }
}
