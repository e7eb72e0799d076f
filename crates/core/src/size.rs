use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::debug;

use crate::cache::Aggregate;
use crate::{AggregateCache, AggregateError, BoxFuture, CancelHandle, FileSystem};

/// Total byte size of directory subtrees, memoized by absolute path.
#[derive(Debug, Clone)]
pub struct SizeAggregator {
    fs: Arc<dyn FileSystem>,
    cache: Arc<AggregateCache<u64>>,
    cancel: CancelHandle,
    parallel: bool,
}

impl SizeAggregator {
    #[must_use]
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self {
            fs,
            cache: Arc::new(AggregateCache::new()),
            cancel: CancelHandle::new(),
            parallel: false,
        }
    }

    #[must_use]
    pub fn with_cancel(mut self, cancel: CancelHandle) -> Self {
        self.cancel = cancel;
        self
    }

    /// Aggregate sibling subdirectories concurrently.
    #[must_use]
    pub const fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    #[must_use]
    pub fn cache(&self) -> &AggregateCache<u64> {
        &self.cache
    }

    /// Total size in bytes of every file below `path`.
    ///
    /// Repeated calls for the same path are answered from the cache without
    /// touching the filesystem. A subdirectory that vanishes mid-walk counts
    /// as empty, is recorded in [`AggregateCache::vanished`], and keeps the
    /// totals above it out of the cache.
    ///
    /// # Errors
    ///
    /// Returns [`AggregateError::DirectoryNotFound`] if `path` itself is not
    /// an existing directory, and [`AggregateError::Cancelled`] once the walk
    /// is cancelled.
    pub async fn total_size(&self, path: &Path) -> Result<u64, AggregateError> {
        self.aggregate(path).await.map(|total| total.value)
    }

    fn aggregate<'a>(&'a self, path: &'a Path) -> BoxFuture<'a, Result<Aggregate<u64>, AggregateError>> {
        Box::pin(async move {
            self.cancel.check()?;

            if let Some(size) = self.cache.get(path).await {
                debug!("Size cache hit for: {}", path.display());
                return Ok(Aggregate::new(size));
            }

            let listing = self.fs.read_dir(path).await?;
            let mut total = Aggregate::new(listing.files_size());
            if self.parallel && listing.directories.len() > 1 {
                self.add_parallel(&mut total, listing.directories).await?;
            } else {
                for dir in &listing.directories {
                    total.add_child(self.aggregate(dir).await, &self.cache).await?;
                }
            }

            self.cache.store(path, total).await;
            debug!(
                "Size of {}: {} bytes{}",
                path.display(),
                total.value,
                if total.complete { "" } else { " (partial)" }
            );

            Ok(total)
        })
    }

    async fn add_parallel(&self, total: &mut Aggregate<u64>, directories: Vec<PathBuf>) -> Result<(), AggregateError> {
        let mut join_set = JoinSet::new();
        for dir in directories {
            let aggregator = self.clone();
            join_set.spawn(async move { aggregator.aggregate(&dir).await });
        }

        while let Some(result) = join_set.join_next().await {
            total.add_child(result?, &self.cache).await?;
        }
        Ok(())
    }
}
