use ahash::AHashSet;
use async_trait::async_trait;
use std::fmt::Debug;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;
use tokio::process::Command;
use tokio::sync::{Mutex, Semaphore};
use tracing::{trace, warn};
use videotree_config::{ProbeBackend, Settings};
use videotree_utils::duration_from_millis;

use crate::ProbeError;

/// Reads the overall playable duration of a media file.
#[async_trait]
pub trait MediaProbe: Debug + Send + Sync {
    fn name(&self) -> &'static str;

    /// Duration in milliseconds, or `None` when the file has no duration field.
    async fn probe_millis(&self, path: &Path) -> Result<Option<f64>, ProbeError>;

    /// Best-effort duration: probe errors, missing fields and garbage readings
    /// all come back as zero so one bad file never aborts a walk.
    async fn duration(&self, path: &Path) -> Duration {
        resolve_duration(path, self.probe_millis(path).await)
    }
}

fn resolve_duration(path: &Path, result: Result<Option<f64>, ProbeError>) -> Duration {
    match result {
        Ok(Some(millis)) => {
            trace!("Probed {}: {} ms", path.display(), millis);
            duration_from_millis(millis)
        }
        Ok(None) => {
            trace!("No duration reported for {}", path.display());
            Duration::ZERO
        }
        Err(e) => {
            warn!("Probe failed for {}, counting zero: {}", path.display(), e);
            Duration::ZERO
        }
    }
}

/// Probe using the `mediainfo` CLI (`General;Duration`, milliseconds).
#[derive(Debug, Clone)]
pub struct MediaInfoProbe {
    program: PathBuf,
    timeout: Option<Duration>,
}

impl MediaInfoProbe {
    #[must_use]
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            timeout: None,
        }
    }

    #[must_use]
    pub const fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }
}

impl Default for MediaInfoProbe {
    fn default() -> Self {
        Self::new("mediainfo")
    }
}

#[async_trait]
impl MediaProbe for MediaInfoProbe {
    fn name(&self) -> &'static str {
        "mediainfo"
    }

    async fn probe_millis(&self, path: &Path) -> Result<Option<f64>, ProbeError> {
        let stdout = run_probe(&self.program, &["--Inform=General;%Duration%"], path, self.timeout).await?;
        parse_reading(&stdout)
    }
}

/// Probe using the `ffprobe` CLI (`format=duration`, seconds).
#[derive(Debug, Clone)]
pub struct FfprobeProbe {
    program: PathBuf,
    timeout: Option<Duration>,
}

impl FfprobeProbe {
    #[must_use]
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            timeout: None,
        }
    }

    #[must_use]
    pub const fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }
}

impl Default for FfprobeProbe {
    fn default() -> Self {
        Self::new("ffprobe")
    }
}

#[async_trait]
impl MediaProbe for FfprobeProbe {
    fn name(&self) -> &'static str {
        "ffprobe"
    }

    async fn probe_millis(&self, path: &Path) -> Result<Option<f64>, ProbeError> {
        let stdout = run_probe(
            &self.program,
            &[
                "-v",
                "error",
                "-show_entries",
                "format=duration",
                "-of",
                "default=noprint_wrappers=1:nokey=1",
            ],
            path,
            self.timeout,
        )
        .await?;
        Ok(parse_reading(&stdout)?.map(|seconds| seconds * 1000.0))
    }
}

/// Builds the probe selected in `settings`.
#[must_use]
pub fn probe_from_settings(settings: &Settings) -> Arc<dyn MediaProbe> {
    let timeout = settings.probe_timeout();
    match settings.probe_backend {
        ProbeBackend::MediaInfo => Arc::new(MediaInfoProbe::new(settings.probe_program()).with_timeout(timeout)),
        ProbeBackend::Ffprobe => Arc::new(FfprobeProbe::new(settings.probe_program()).with_timeout(timeout)),
    }
}

async fn run_probe(
    program: &Path,
    args: &[&str],
    path: &Path,
    timeout: Option<Duration>,
) -> Result<String, ProbeError> {
    let mut command = Command::new(program);
    command
        .args(args)
        .arg(path)
        .stdin(Stdio::null())
        // The child is killed if this future is dropped (timeout or cancellation)
        .kill_on_drop(true);

    let output = match timeout {
        Some(limit) => tokio::time::timeout(limit, command.output())
            .await
            .map_err(|_| ProbeError::Timeout(limit))?,
        None => command.output().await,
    }
    .map_err(|source| ProbeError::Spawn {
        program: program.display().to_string(),
        source,
    })?;

    if !output.status.success() {
        return Err(ProbeError::Failed {
            program: program.display().to_string(),
            status: output.status,
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Parses the first non-empty line of probe output as a number.
fn parse_reading(stdout: &str) -> Result<Option<f64>, ProbeError> {
    let Some(line) = stdout.lines().map(str::trim).find(|line| !line.is_empty()) else {
        return Ok(None);
    };

    if line.eq_ignore_ascii_case("n/a") {
        return Ok(None);
    }

    line.parse::<f64>()
        .map(Some)
        .map_err(|_| ProbeError::InvalidOutput(line.to_string()))
}

/// Shared probe front end used during a walk.
///
/// Bounds the number of concurrent probe processes and remembers which files
/// failed, for the traversal report. A file probed more than once counts once.
#[derive(Debug, Clone)]
pub struct ProbeRunner {
    probe: Arc<dyn MediaProbe>,
    permits: Arc<Semaphore>,
    failed: Arc<Mutex<AHashSet<PathBuf>>>,
}

impl ProbeRunner {
    #[must_use]
    pub fn new(probe: Arc<dyn MediaProbe>, concurrency: usize) -> Self {
        Self {
            probe,
            permits: Arc::new(Semaphore::new(concurrency.max(1))),
            failed: Arc::new(Mutex::new(AHashSet::new())),
        }
    }

    pub async fn duration(&self, path: &Path) -> Duration {
        // The semaphore is never closed, so acquisition only waits
        let _permit = self.permits.acquire().await.ok();
        let result = self.probe.probe_millis(path).await;
        if result.is_err() {
            self.failed.lock().await.insert(path.to_path_buf());
        }
        resolve_duration(path, result)
    }

    /// Number of distinct files whose probe failed.
    pub async fn failures(&self) -> usize {
        self.failed.lock().await.len()
    }

    #[must_use]
    pub fn probe_name(&self) -> &'static str {
        self.probe.name()
    }
}
