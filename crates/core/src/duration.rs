use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;
use tracing::debug;
use videotree_utils::VideoExtensions;

use crate::cache::Aggregate;
use crate::{AggregateCache, AggregateError, BoxFuture, CancelHandle, FileSystem, ProbeRunner};

/// Total playable duration of directory subtrees, memoized by absolute path.
///
/// Every direct file is probed unless a prefilter is set, in which case only
/// recognized videos are. Non-media files probe as zero either way, so the
/// prefilter changes cost, not totals.
#[derive(Debug, Clone)]
pub struct DurationAggregator {
    fs: Arc<dyn FileSystem>,
    probe: ProbeRunner,
    cache: Arc<AggregateCache<Duration>>,
    prefilter: Option<Arc<VideoExtensions>>,
    cancel: CancelHandle,
    parallel: bool,
}

impl DurationAggregator {
    #[must_use]
    pub fn new(fs: Arc<dyn FileSystem>, probe: ProbeRunner) -> Self {
        Self {
            fs,
            probe,
            cache: Arc::new(AggregateCache::new()),
            prefilter: None,
            cancel: CancelHandle::new(),
            parallel: false,
        }
    }

    /// Only probe files whose extension is in `extensions`.
    #[must_use]
    pub fn with_prefilter(mut self, extensions: Arc<VideoExtensions>) -> Self {
        self.prefilter = Some(extensions);
        self
    }

    #[must_use]
    pub fn with_cancel(mut self, cancel: CancelHandle) -> Self {
        self.cancel = cancel;
        self
    }

    #[must_use]
    pub const fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    #[must_use]
    pub fn cache(&self) -> &AggregateCache<Duration> {
        &self.cache
    }

    /// Total playable duration of every file below `path`.
    ///
    /// # Errors
    ///
    /// Same failures as [`crate::SizeAggregator::total_size`]. Probe failures
    /// are not errors; they count as zero.
    pub async fn total_duration(&self, path: &Path) -> Result<Duration, AggregateError> {
        self.aggregate(path).await.map(|total| total.value)
    }

    fn aggregate<'a>(&'a self, path: &'a Path) -> BoxFuture<'a, Result<Aggregate<Duration>, AggregateError>> {
        Box::pin(async move {
            self.cancel.check()?;

            if let Some(duration) = self.cache.get(path).await {
                debug!("Duration cache hit for: {}", path.display());
                return Ok(Aggregate::new(duration));
            }

            let listing = self.fs.read_dir(path).await?;

            let mut total = Aggregate::new(Duration::ZERO);
            for file in &listing.files {
                if self.prefilter.as_ref().is_some_and(|ext| !ext.matches_name(&file.name)) {
                    continue;
                }
                self.cancel.check()?;
                total.add(self.probe.duration(&file.path).await);
            }

            if self.parallel && listing.directories.len() > 1 {
                self.add_parallel(&mut total, listing.directories).await?;
            } else {
                for dir in &listing.directories {
                    total.add_child(self.aggregate(dir).await, &self.cache).await?;
                }
            }

            self.cache.store(path, total).await;
            debug!(
                "Duration of {}: {:?}{}",
                path.display(),
                total.value,
                if total.complete { "" } else { " (partial)" }
            );

            Ok(total)
        })
    }

    async fn add_parallel(
        &self,
        total: &mut Aggregate<Duration>,
        directories: Vec<PathBuf>,
    ) -> Result<(), AggregateError> {
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
