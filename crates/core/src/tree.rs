use chrono::Local;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use uuid::Uuid;
use videotree_models::{BranchWarning, Node, Traversal, TraversalReport};
use videotree_utils::{Progress, VideoExtensions, display_name, format_label};

use crate::{
    AggregateError, BoxFuture, CancelHandle, DurationAggregator, FileEntry, FileSystem, ProbeRunner, SizeAggregator,
};

/// Walks a directory tree and produces labeled nodes for every subdirectory
/// and every recognized video file.
///
/// Children of a directory are its subdirectories in enumeration order
/// followed by its video files in enumeration order. A directory's summary
/// is computed before its children are expanded.
#[derive(Debug, Clone)]
pub struct TreeBuilder {
    session_id: Uuid,
    fs: Arc<dyn FileSystem>,
    sizes: SizeAggregator,
    durations: DurationAggregator,
    probe: ProbeRunner,
    videos: Arc<VideoExtensions>,
    cancel: CancelHandle,
    progress: Arc<RwLock<Progress>>,
}

#[derive(Debug, Default)]
struct WalkState {
    warnings: Vec<BranchWarning>,
    directories: usize,
    videos: usize,
}

impl WalkState {
    fn vanished(&mut self, branch: &Path, error: &AggregateError) {
        warn!("Branch {} vanished during the walk: {}", branch.display(), error);
        let path = match error {
            AggregateError::DirectoryNotFound { path } => path.clone(),
            _ => branch.to_path_buf(),
        };
        self.warn(path, error.to_string());
    }

    fn warn(&mut self, path: PathBuf, reason: String) {
        if !self.warnings.iter().any(|warning| warning.path == path) {
            self.warnings.push(BranchWarning { path, reason });
        }
    }
}

impl TreeBuilder {
    #[must_use]
    pub fn new(fs: Arc<dyn FileSystem>, probe: ProbeRunner, videos: Arc<VideoExtensions>) -> Self {
        Self {
            session_id: Uuid::new_v4(),
            sizes: SizeAggregator::new(fs.clone()),
            durations: DurationAggregator::new(fs.clone(), probe.clone()),
            fs,
            probe,
            videos,
            cancel: CancelHandle::new(),
            progress: Arc::new(RwLock::new(Progress::default())),
        }
    }

    #[must_use]
    pub fn with_session_id(mut self, session_id: Uuid) -> Self {
        self.session_id = session_id;
        self
    }

    /// Aggregate sibling subdirectories concurrently. The tree itself is
    /// always assembled in order.
    #[must_use]
    pub fn parallel(mut self, parallel: bool) -> Self {
        self.sizes = self.sizes.parallel(parallel);
        self.durations = self.durations.parallel(parallel);
        self
    }

    /// Only probe recognized videos while aggregating durations.
    #[must_use]
    pub fn prefilter_durations(mut self, prefilter: bool) -> Self {
        if prefilter {
            self.durations = self.durations.with_prefilter(self.videos.clone());
        }
        self
    }

    #[must_use]
    pub fn with_cancel(mut self, cancel: CancelHandle) -> Self {
        self.sizes = self.sizes.with_cancel(cancel.clone());
        self.durations = self.durations.with_cancel(cancel.clone());
        self.cancel = cancel;
        self
    }

    #[must_use]
    pub fn with_progress(mut self, progress: Arc<RwLock<Progress>>) -> Self {
        self.progress = progress;
        self
    }

    #[must_use]
    pub const fn sizes(&self) -> &SizeAggregator {
        &self.sizes
    }

    #[must_use]
    pub const fn durations(&self) -> &DurationAggregator {
        &self.durations
    }

    #[must_use]
    pub const fn probe(&self) -> &ProbeRunner {
        &self.probe
    }

    /// Builds the annotated tree rooted at `root`.
    ///
    /// # Errors
    ///
    /// Returns [`AggregateError::DirectoryNotFound`] if `root` is not an
    /// existing directory, [`AggregateError::Cancelled`] if the walk was
    /// cancelled, and I/O errors for directories that exist but cannot be
    /// read. Subdirectories that vanish mid-walk do not fail the walk; they
    /// are reported in [`Traversal::warnings`].
    pub async fn build_tree(&self, root: &Path) -> Result<Traversal, AggregateError> {
        let started = Instant::now();
        info!("Building tree for {} (session {})", root.display(), self.session_id);

        self.progress.write().await.reset();
        let (size, duration) = self.aggregate(root).await?;
        let directories = self.sizes.cache().len().await;
        self.progress.write().await.set_total(directories);

        let mut state = WalkState::default();
        let name = display_name(root);
        let label = format_label(&name, size, duration);
        let mut node = Node::directory(name, label, root.to_path_buf(), size, duration);
        node.children = self.expand(root, &mut state).await?;

        let mut vanished = self.sizes.cache().vanished().await;
        vanished.extend(self.durations.cache().vanished().await);
        for path in vanished {
            state.warn(path, "Directory vanished during aggregation".to_string());
        }

        self.progress.write().await.finish();

        let report = TraversalReport {
            session_id: self.session_id,
            directories_visited: state.directories,
            videos_found: state.videos,
            probe_failures: self.probe.failures().await,
            cached_sizes: self.sizes.cache().len().await,
            cached_durations: self.durations.cache().len().await,
            elapsed: started.elapsed(),
            finished_at: Local::now(),
        };

        info!(
            "Tree for {} built: {} directories, {} videos, {} warnings in {:?}",
            root.display(),
            report.directories_visited,
            report.videos_found,
            state.warnings.len(),
            report.elapsed
        );

        Ok(Traversal {
            root: node,
            warnings: state.warnings,
            report,
        })
    }

    async fn aggregate(&self, dir: &Path) -> Result<(u64, Duration), AggregateError> {
        tokio::try_join!(self.sizes.total_size(dir), self.durations.total_duration(dir))
    }

    fn expand<'a>(&'a self, dir: &'a Path, state: &'a mut WalkState) -> BoxFuture<'a, Result<Vec<Node>, AggregateError>> {
        Box::pin(async move {
            self.cancel.check()?;
            state.directories += 1;
            self.progress.write().await.enter(dir);

            let listing = match self.fs.read_dir(dir).await {
                Ok(listing) => listing,
                Err(e) if e.is_not_found() => {
                    state.vanished(dir, &e);
                    return Ok(Vec::new());
                }
                Err(e) => return Err(e),
            };

            let mut nodes = Vec::with_capacity(listing.directories.len());
            for subdir in &listing.directories {
                nodes.push(self.directory_node(subdir, state).await?);
            }

            for file in listing.files.iter().filter(|f| self.videos.matches_name(&f.name)) {
                self.cancel.check()?;
                nodes.push(self.video_node(file).await);
                state.videos += 1;
            }

            Ok(nodes)
        })
    }

    async fn directory_node(&self, dir: &Path, state: &mut WalkState) -> Result<Node, AggregateError> {
        let name = display_name(dir);

        match self.aggregate(dir).await {
            Ok((size, duration)) => {
                let label = format_label(&name, size, duration);
                let mut node = Node::directory(name, label, dir.to_path_buf(), size, duration);
                node.children = self.expand(dir, state).await?;
                Ok(node)
            }
            Err(e) if e.is_not_found() => {
                state.vanished(dir, &e);
                let label = format_label(&name, 0, Duration::ZERO);
                Ok(Node::directory(name, label, dir.to_path_buf(), 0, Duration::ZERO))
            }
            Err(e) => Err(e),
        }
    }

    async fn video_node(&self, file: &FileEntry) -> Node {
        let duration = self.probe.duration(&file.path).await;
        debug!("Video {}: {:?}, {} bytes", file.path.display(), duration, file.len);

        Node::video(
            file.name.clone(),
            format_label(&file.name, file.len, duration),
            file.path.clone(),
            file.len,
            duration,
        )
    }
}
