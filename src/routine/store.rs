//! Routine Store
//!
//! Owns the authoritative routine table. Every mutation replaces whole
//! records under the write lock, persists the table, and clears the
//! normalized sample cache before the lock is released, so readers only
//! ever observe the state before or after a mutation. A failed write rolls
//! the in-memory change back.

use chrono::Utc;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{info, warn};

use super::persistence::RoutinePersistence;
use super::types::Routine;
use crate::geometry::Stroke;
use crate::recognition::NormalizedSampleCache;

/// Routine table with persistence delegation
pub struct RoutineStore {
    routines: RwLock<BTreeMap<String, Arc<Routine>>>,
    persistence: Box<dyn RoutinePersistence>,
    cache: Arc<NormalizedSampleCache>,
}

impl RoutineStore {
    /// Open a store, loading existing routines from `persistence`
    pub fn open(
        persistence: Box<dyn RoutinePersistence>,
        cache: Arc<NormalizedSampleCache>,
    ) -> crate::Result<Self> {
        let loaded = persistence.load()?;
        info!(count = loaded.len(), "Loaded routines");
        let routines = loaded
            .into_iter()
            .map(|(name, routine)| (name, Arc::new(routine)))
            .collect();
        cache.clear();
        Ok(Self {
            routines: RwLock::new(routines),
            persistence,
            cache,
        })
    }

    /// Create or replace a routine.
    ///
    /// Rejects an empty name, an empty command list or missing samples with
    /// [`crate::Error::Validation`] without touching the store. Re-saving an
    /// existing name keeps its original `created_at`.
    pub fn save_routine(&self, mut routine: Routine) -> crate::Result<Arc<Routine>> {
        let name = routine.name.trim().to_string();
        if name.is_empty() {
            return Err(crate::Error::Validation("routine name must not be empty".to_string()));
        }
        if routine.commands.is_empty() {
            return Err(crate::Error::Validation(format!(
                "routine '{}' needs at least one command",
                name
            )));
        }
        if routine.samples.is_empty() {
            return Err(crate::Error::Validation(format!(
                "routine '{}' needs at least one gesture sample",
                name
            )));
        }

        let mut routines = self.routines.write();
        let now = Utc::now();
        routine.name = name.clone();
        routine.created_at = routines
            .get(&name)
            .and_then(|existing| existing.created_at)
            .or(Some(now));
        routine.updated_at = Some(now);
        routine.enabled = Some(routine.enabled.unwrap_or(true));

        let record = Arc::new(routine);
        let previous = routines.insert(name.clone(), Arc::clone(&record));
        if let Err(e) = self.persist(&routines) {
            match previous {
                Some(previous) => routines.insert(name, previous),
                None => routines.remove(&name),
            };
            return Err(e);
        }
        self.cache.clear();

        info!(routine = %record.name, commands = record.commands.len(), samples = record.samples.len(), "Saved routine");
        Ok(record)
    }

    /// Remove a routine; `false` if it did not exist
    pub fn delete(&self, name: &str) -> crate::Result<bool> {
        let mut routines = self.routines.write();
        let Some(removed) = routines.remove(name) else {
            return Ok(false);
        };
        if let Err(e) = self.persist(&routines) {
            routines.insert(name.to_string(), removed);
            return Err(e);
        }
        self.cache.clear();
        info!(routine = %name, "Deleted routine");
        Ok(true)
    }

    /// Flip a routine's enabled flag; `false` if it did not exist.
    ///
    /// An unset flag counts as enabled, so the first toggle disables.
    pub fn toggle(&self, name: &str) -> crate::Result<bool> {
        let mut routines = self.routines.write();
        let Some(current) = routines.get(name).cloned() else {
            return Ok(false);
        };

        let mut updated = (*current).clone();
        updated.enabled = Some(!current.is_enabled());
        routines.insert(name.to_string(), Arc::new(updated));
        if let Err(e) = self.persist(&routines) {
            routines.insert(name.to_string(), current);
            return Err(e);
        }
        self.cache.clear();
        info!(routine = %name, enabled = !current.is_enabled(), "Toggled routine");
        Ok(true)
    }

    pub fn get(&self, name: &str) -> Option<Arc<Routine>> {
        self.routines.read().get(name).cloned()
    }

    /// Every routine, ordered by name
    pub fn get_all(&self) -> Vec<Arc<Routine>> {
        self.routines.read().values().cloned().collect()
    }

    /// Routines whose enabled flag is not explicitly false, ordered by name
    pub fn get_enabled(&self) -> Vec<Arc<Routine>> {
        self.routines
            .read()
            .values()
            .filter(|r| r.is_enabled())
            .cloned()
            .collect()
    }

    /// `name -> samples` for every routine with at least one sample
    pub fn get_all_gestures(&self) -> BTreeMap<String, Vec<Stroke>> {
        self.routines
            .read()
            .values()
            .filter(|r| !r.samples.is_empty())
            .map(|r| (r.name.clone(), r.samples.clone()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.routines.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.routines.read().is_empty()
    }

    fn persist(&self, routines: &BTreeMap<String, Arc<Routine>>) -> crate::Result<()> {
        let snapshot: BTreeMap<String, Routine> = routines
            .iter()
            .map(|(name, routine)| (name.clone(), (**routine).clone()))
            .collect();
        self.persistence.save(&snapshot).map_err(|e| {
            warn!(error = %e, "Failed to persist routines; change rolled back");
            match e {
                crate::Error::Persistence(_) => e,
                other => crate::Error::Persistence(other.to_string()),
            }
        })
    }
}
