#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
use ahash::AHashMap;
use async_trait::async_trait;
use color_eyre::Result;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::fs;

use crate::{AggregateError, DirListing, FileSystem, LocalFileSystem, MediaProbe, ProbeError};

/// Create a zero-filled test file of `size` bytes, creating parent directories.
pub async fn create_test_file(path: &Path, size: usize) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await?;
    }

    fs::write(path, vec![0u8; size]).await?;
    Ok(())
}

/// Probe answering from a fixed file-name → milliseconds table.
#[derive(Debug, Default)]
pub struct FixedProbe {
    millis: AHashMap<String, f64>,
    failing: Vec<String>,
    calls: AtomicUsize,
}

impl FixedProbe {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: &str, seconds: f64) -> Self {
        self.millis.insert(name.to_string(), seconds * 1000.0);
        self
    }

    pub fn failing(mut self, name: &str) -> Self {
        self.failing.push(name.to_string());
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MediaProbe for FixedProbe {
    fn name(&self) -> &'static str {
        "fixed"
    }

    async fn probe_millis(&self, path: &Path) -> Result<Option<f64>, ProbeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let name = path.file_name().unwrap().to_string_lossy().into_owned();

        if self.failing.contains(&name) {
            return Err(ProbeError::InvalidOutput("corrupt".to_string()));
        }
        Ok(self.millis.get(&name).copied())
    }
}

/// Local filesystem that counts `read_dir` calls per path.
#[derive(Debug, Default)]
pub struct CountingFileSystem {
    inner: LocalFileSystem,
    calls: std::sync::Mutex<AHashMap<PathBuf, usize>>,
}

impl CountingFileSystem {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().values().sum()
    }

    pub fn calls_for(&self, path: &Path) -> usize {
        self.calls.lock().unwrap().get(path).copied().unwrap_or(0)
    }
}

#[async_trait]
impl FileSystem for CountingFileSystem {
    async fn read_dir(&self, path: &Path) -> Result<DirListing, AggregateError> {
        *self.calls.lock().unwrap().entry(path.to_path_buf()).or_insert(0) += 1;
        self.inner.read_dir(path).await
    }
}

/// Local filesystem on which the given directories disappear once they have
/// been listed `allowed` times each.
#[derive(Debug, Default)]
pub struct VanishingFileSystem {
    inner: LocalFileSystem,
    remaining: std::sync::Mutex<AHashMap<PathBuf, usize>>,
}

impl VanishingFileSystem {
    pub fn new(paths: impl IntoIterator<Item = PathBuf>, allowed: usize) -> Arc<Self> {
        let remaining = paths.into_iter().map(|path| (path, allowed)).collect();
        Arc::new(Self {
            inner: LocalFileSystem::new(),
            remaining: std::sync::Mutex::new(remaining),
        })
    }
}

#[async_trait]
impl FileSystem for VanishingFileSystem {
    async fn read_dir(&self, path: &Path) -> Result<DirListing, AggregateError> {
        {
            let mut remaining = self.remaining.lock().unwrap();
            if let Some(left) = remaining.get_mut(path) {
                if *left == 0 {
                    return Err(AggregateError::not_found(path));
                }
                *left -= 1;
            }
        }
        self.inner.read_dir(path).await
    }
}
