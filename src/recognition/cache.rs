//! Normalized Sample Cache
//!
//! Memoizes the normalized form of stored gesture samples so recognition
//! only normalizes the live candidate. Entries are keyed by routine name,
//! sample index and a hash of the sample's coordinates, and the whole cache
//! is cleared whenever the routine store changes. A cold cache always
//! produces the same scores as a warm one.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::debug;

use crate::geometry::{Point, Stroke};

/// Identity of one stored sample
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SampleKey {
    pub name: String,
    pub index: usize,
    pub content_hash: u64,
}

impl SampleKey {
    pub fn new(name: &str, index: usize, sample: &Stroke) -> Self {
        Self {
            name: name.to_string(),
            index,
            content_hash: sample.content_hash(),
        }
    }
}

/// Thread-safe memo of normalized samples
#[derive(Debug, Default)]
pub struct NormalizedSampleCache {
    entries: RwLock<HashMap<SampleKey, Arc<Vec<Point>>>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl NormalizedSampleCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached points for `key`, computing and storing them on a miss
    pub fn get_or_insert_with<F>(&self, key: SampleKey, compute: F) -> Arc<Vec<Point>>
    where
        F: FnOnce() -> Vec<Point>,
    {
        if let Some(points) = self.entries.read().get(&key) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return Arc::clone(points);
        }
        self.misses.fetch_add(1, Ordering::Relaxed);
        // Computed outside the write lock; a racing insert of the same key
        // produces identical points, so either copy is fine.
        let points = Arc::new(compute());
        self.entries
            .write()
            .entry(key)
            .or_insert_with(|| Arc::clone(&points))
            .clone()
    }

    /// Drop every entry
    pub fn clear(&self) {
        let mut entries = self.entries.write();
        if !entries.is_empty() {
            debug!(entries = entries.len(), "Clearing normalized sample cache");
        }
        entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }
}
