use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// Progress of one directory walk, shared with front ends behind a lock.
#[derive(Debug, Clone)]
pub struct Progress {
    pub directories_done: usize,
    pub directories_total: usize,
    pub current: Option<PathBuf>,
    pub message: String,
    pub started_at: Instant,
    pub is_complete: bool,
}

impl Default for Progress {
    fn default() -> Self {
        Self {
            directories_done: 0,
            directories_total: 0,
            current: None,
            message: String::new(),
            started_at: Instant::now(),
            is_complete: false,
        }
    }
}

impl Progress {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn set_total(&mut self, total: usize) {
        self.directories_total = total;
    }

    /// Records that the walk entered `dir`.
    pub fn enter(&mut self, dir: &Path) {
        self.directories_done += 1;
        self.message = format!("Scanning: {}", crate::display_name(dir));
        self.current = Some(dir.to_path_buf());
    }

    pub fn finish(&mut self) {
        self.is_complete = true;
        self.current = None;
        self.message = format!("Scanned {} directories", self.directories_done);
    }

    #[allow(clippy::cast_precision_loss)]
    #[must_use]
    pub fn percentage(&self) -> f64 {
        if self.directories_total == 0 {
            0.0
        } else {
            (self.directories_done as f64 / self.directories_total as f64 * 100.0).min(100.0)
        }
    }

    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.started_at.elapsed()
    }

    #[allow(clippy::cast_precision_loss)]
    #[must_use]
    pub fn eta(&self) -> Option<Duration> {
        if self.directories_done == 0 || self.directories_total == 0 {
            return None;
        }

        if self.directories_done >= self.directories_total {
            return Some(Duration::ZERO);
        }

        let elapsed = self.elapsed().as_secs_f64();
        let rate = self.directories_done as f64 / elapsed;

        if rate == 0.0 || !rate.is_finite() {
            return None;
        }

        let remaining = (self.directories_total - self.directories_done) as f64 / rate;
        Duration::try_from_secs_f64(remaining).ok()
    }
}
