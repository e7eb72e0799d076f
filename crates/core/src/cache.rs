use ahash::{AHashMap, AHashSet};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::warn;

use crate::AggregateError;

/// Values that add up over a directory subtree.
pub(crate) trait Total: Copy + Send + Sync + 'static {
    fn plus(self, other: Self) -> Self;
}

impl Total for u64 {
    fn plus(self, other: Self) -> Self {
        self.saturating_add(other)
    }
}

impl Total for Duration {
    fn plus(self, other: Self) -> Self {
        self.saturating_add(other)
    }
}

/// A running aggregate and whether every branch below it could be read.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Aggregate<V> {
    pub value: V,
    pub complete: bool,
}

impl<V: Total> Aggregate<V> {
    pub const fn new(value: V) -> Self {
        Self { value, complete: true }
    }

    pub fn add(&mut self, value: V) {
        self.value = self.value.plus(value);
    }

    /// Folds in the aggregate of a direct subdirectory. A subdirectory that
    /// no longer exists counts as empty and leaves this aggregate incomplete.
    pub async fn add_child(
        &mut self,
        child: Result<Self, AggregateError>,
        cache: &AggregateCache<V>,
    ) -> Result<(), AggregateError> {
        match child {
            Ok(child) => {
                self.add(child.value);
                self.complete &= child.complete;
                Ok(())
            }
            Err(AggregateError::DirectoryNotFound { path }) => {
                warn!("Directory vanished during aggregation: {}", path.display());
                cache.mark_vanished(path).await;
                self.complete = false;
                Ok(())
            }
            Err(e) => Err(e),
        }
    }
}

/// Memoized per-directory aggregates for one traversal session.
///
/// Entries are never invalidated; a new root gets a new cache. Only totals
/// whose whole subtree could be read are stored. Directories that vanished
/// while being aggregated are remembered separately.
#[derive(Debug)]
pub struct AggregateCache<V> {
    entries: Mutex<AHashMap<PathBuf, V>>,
    vanished: Mutex<AHashSet<PathBuf>>,
    hits: AtomicUsize,
    misses: AtomicUsize,
}

impl<V: Copy> AggregateCache<V> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(AHashMap::new()),
            vanished: Mutex::new(AHashSet::new()),
            hits: AtomicUsize::new(0),
            misses: AtomicUsize::new(0),
        }
    }

    pub async fn get(&self, path: &Path) -> Option<V> {
        let value = self.entries.lock().await.get(path).copied();
        if value.is_some() {
            self.hits.fetch_add(1, Ordering::Relaxed);
        } else {
            self.misses.fetch_add(1, Ordering::Relaxed);
        }
        value
    }

    pub async fn insert(&self, path: PathBuf, value: V) {
        self.entries.lock().await.insert(path, value);
    }

    pub(crate) async fn store(&self, path: &Path, aggregate: Aggregate<V>) {
        if aggregate.complete {
            self.insert(path.to_path_buf(), aggregate.value).await;
        }
    }

    pub(crate) async fn mark_vanished(&self, path: PathBuf) {
        self.vanished.lock().await.insert(path);
    }

    /// Directories that disappeared while a total was being computed, sorted.
    pub async fn vanished(&self) -> Vec<PathBuf> {
        let mut paths: Vec<PathBuf> = self.vanished.lock().await.iter().cloned().collect();
        paths.sort();
        paths
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }

    pub async fn clear(&self) {
        self.entries.lock().await.clear();
        self.vanished.lock().await.clear();
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
    }

    #[must_use]
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn misses(&self) -> usize {
        self.misses.load(Ordering::Relaxed)
    }
}

impl<V: Copy> Default for AggregateCache<V> {
    fn default() -> Self {
        Self::new()
    }
}
