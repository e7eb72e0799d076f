use color_eyre::Result;
use color_eyre::eyre::WrapErr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{error, info};
use uuid::Uuid;
use videotree_config::Settings;
use videotree_models::Traversal;
use videotree_utils::{Progress, VideoExtensions};

use crate::{
    AggregateError, CancelHandle, DurationAggregator, FileSystem, LocalFileSystem, MediaProbe, ProbeRunner,
    SizeAggregator, TreeBuilder, probe_from_settings,
};

/// One root selection and the caches that belong to it.
///
/// Selecting a new root starts a fresh session: new id, empty caches, new
/// cancellation handle.
#[derive(Debug)]
pub struct TraversalSession {
    id: Uuid,
    root: PathBuf,
    settings: Settings,
    fs: Arc<dyn FileSystem>,
    probe: Arc<dyn MediaProbe>,
    videos: Arc<VideoExtensions>,
    cancel: CancelHandle,
    progress: Arc<RwLock<Progress>>,
    builder: TreeBuilder,
}

impl TraversalSession {
    /// Opens a session on the local filesystem with the probe selected in
    /// `settings`.
    ///
    /// # Errors
    ///
    /// Fails if the configured video extensions are invalid or `root` cannot
    /// be made absolute.
    pub fn open(root: impl AsRef<Path>, settings: &Settings) -> Result<Self> {
        let fs = Arc::new(LocalFileSystem::new().with_follow_links(settings.follow_links));
        Self::with_components(root, settings, fs, probe_from_settings(settings))
    }

    /// Opens a session with explicit filesystem and probe implementations.
    ///
    /// # Errors
    ///
    /// Same as [`TraversalSession::open`].
    pub fn with_components(
        root: impl AsRef<Path>,
        settings: &Settings,
        fs: Arc<dyn FileSystem>,
        probe: Arc<dyn MediaProbe>,
    ) -> Result<Self> {
        let root = absolute_root(root.as_ref())?;
        let videos = Arc::new(settings.video_extensions()?);
        let cancel = CancelHandle::new();
        let progress = Arc::new(RwLock::new(Progress::default()));
        let id = Uuid::new_v4();

        let builder = Self::assemble(id, settings, &fs, &probe, &videos, &cancel, &progress);
        info!(
            "Session {} opened for {} (probe: {}, extensions: {})",
            id,
            root.display(),
            probe.name(),
            videos
        );

        Ok(Self {
            id,
            root,
            settings: settings.clone(),
            fs,
            probe,
            videos,
            cancel,
            progress,
            builder,
        })
    }

    fn assemble(
        id: Uuid,
        settings: &Settings,
        fs: &Arc<dyn FileSystem>,
        probe: &Arc<dyn MediaProbe>,
        videos: &Arc<VideoExtensions>,
        cancel: &CancelHandle,
        progress: &Arc<RwLock<Progress>>,
    ) -> TreeBuilder {
        let runner = ProbeRunner::new(probe.clone(), settings.probe_concurrency());

        TreeBuilder::new(fs.clone(), runner, videos.clone())
            .with_session_id(id)
            .parallel(settings.parallel_aggregation)
            .prefilter_durations(settings.prefilter_durations)
            .with_cancel(cancel.clone())
            .with_progress(progress.clone())
    }

    /// Switches to a new root. Caches of the previous root are discarded.
    ///
    /// # Errors
    ///
    /// Fails if `root` cannot be made absolute.
    pub fn select_root(&mut self, root: impl AsRef<Path>) -> Result<()> {
        let root = absolute_root(root.as_ref())?;

        self.id = Uuid::new_v4();
        self.cancel = CancelHandle::new();
        self.builder = Self::assemble(
            self.id,
            &self.settings,
            &self.fs,
            &self.probe,
            &self.videos,
            &self.cancel,
            &self.progress,
        );
        self.root = root;

        info!("Session {} opened for {}", self.id, self.root.display());
        Ok(())
    }

    /// Walks the session root and returns the annotated tree.
    ///
    /// # Errors
    ///
    /// See [`TreeBuilder::build_tree`].
    pub async fn run(&self) -> Result<Traversal, AggregateError> {
        let result = self.builder.build_tree(&self.root).await;
        if let Err(e) = &result {
            error!("Session {} failed for {}: {}", self.id, self.root.display(), e);
        }
        result
    }

    /// Runs the walk on a background task so a front end's event loop stays
    /// responsive.
    #[must_use]
    pub fn spawn(&self) -> JoinHandle<Result<Traversal, AggregateError>> {
        let builder = self.builder.clone();
        let root = self.root.clone();
        tokio::spawn(async move { builder.build_tree(&root).await })
    }

    #[must_use]
    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    #[must_use]
    pub fn progress(&self) -> Arc<RwLock<Progress>> {
        self.progress.clone()
    }

    #[must_use]
    pub const fn id(&self) -> Uuid {
        self.id
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[must_use]
    pub const fn sizes(&self) -> &SizeAggregator {
        self.builder.sizes()
    }

    #[must_use]
    pub const fn durations(&self) -> &DurationAggregator {
        self.builder.durations()
    }
}

fn absolute_root(root: &Path) -> Result<PathBuf> {
    std::path::absolute(root).wrap_err_with(|| format!("Cannot resolve {}", root.display()))
}
