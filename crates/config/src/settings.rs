use color_eyre::eyre::Result;
use serde::{Deserialize, Serialize};
use std::{fmt, path::Path, path::PathBuf, str::FromStr, time::Duration};
use tracing::info;
use videotree_utils::VideoExtensions;
use videotree_utils::media_types::DEFAULT_VIDEO_EXTENSIONS;

const APP_DIR: &str = "videotree";
const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Settings {
    #[serde(default)]
    pub probe_backend: ProbeBackend,
    #[serde(default = "default_mediainfo_path")]
    pub mediainfo_path: PathBuf,
    #[serde(default = "default_ffprobe_path")]
    pub ffprobe_path: PathBuf,
    /// Zero disables the timeout.
    #[serde(default = "default_probe_timeout_secs")]
    pub probe_timeout_secs: u64,
    #[serde(default = "default_video_extensions")]
    pub video_extensions: Vec<String>,
    #[serde(default = "default_parallel_aggregation")]
    pub parallel_aggregation: bool,
    #[serde(default = "default_worker_threads")]
    pub worker_threads: usize,
    #[serde(default = "default_prefilter_durations")]
    pub prefilter_durations: bool,
    #[serde(default)]
    pub follow_links: bool,
}

// Default value functions for serde
fn default_mediainfo_path() -> PathBuf {
    PathBuf::from("mediainfo")
}
fn default_ffprobe_path() -> PathBuf {
    PathBuf::from("ffprobe")
}
fn default_probe_timeout_secs() -> u64 {
    30
}
fn default_video_extensions() -> Vec<String> {
    DEFAULT_VIDEO_EXTENSIONS.iter().map(ToString::to_string).collect()
}
fn default_parallel_aggregation() -> bool {
    true
}
fn default_worker_threads() -> usize {
    num_cpus::get()
}
fn default_prefilter_durations() -> bool {
    true
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            probe_backend: ProbeBackend::default(),
            mediainfo_path: default_mediainfo_path(),
            ffprobe_path: default_ffprobe_path(),
            probe_timeout_secs: default_probe_timeout_secs(),
            video_extensions: default_video_extensions(),
            parallel_aggregation: default_parallel_aggregation(),
            worker_threads: default_worker_threads(),
            prefilter_durations: default_prefilter_durations(),
            follow_links: false,
        }
    }
}

impl Settings {
    /// Loads settings from the user's config directory, falling back to
    /// defaults when no config file exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the config directory cannot be determined or the
    /// file exists but cannot be read or parsed.
    pub async fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            Self::load_from(&config_path).await
        } else {
            Ok(Self::default())
        }
    }

    /// Loads settings from an explicit TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid TOML.
    pub async fn load_from(path: &Path) -> Result<Self> {
        let content = tokio::fs::read_to_string(path).await?;
        let settings: Settings = toml::from_str(&content)?;
        info!("Settings loaded from {:?}", path);
        Ok(settings)
    }

    /// Saves settings to the user's config directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the config directory cannot be determined or written.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    /// Saves settings as pretty TOML to `path`, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let toml_string = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_string)?;

        info!("Settings saved to {:?}", path);
        Ok(())
    }

    /// # Errors
    ///
    /// Returns an error if the platform has no config directory.
    pub fn config_path() -> Result<PathBuf> {
        let config_dir =
            dirs::config_dir().ok_or_else(|| color_eyre::eyre::eyre!("Could not find config directory"))?;
        Ok(config_dir.join(APP_DIR).join(CONFIG_FILE))
    }

    #[must_use]
    pub const fn probe_timeout(&self) -> Option<Duration> {
        if self.probe_timeout_secs == 0 {
            None
        } else {
            Some(Duration::from_secs(self.probe_timeout_secs))
        }
    }

    /// Compiles the configured extension list.
    ///
    /// # Errors
    ///
    /// Returns an error if the extension pattern cannot be compiled.
    pub fn video_extensions(&self) -> Result<VideoExtensions> {
        Ok(VideoExtensions::new(&self.video_extensions)?)
    }

    /// Worker count used to bound concurrent probes; never zero.
    #[must_use]
    pub fn probe_concurrency(&self) -> usize {
        self.worker_threads.max(1)
    }

    #[must_use]
    pub fn probe_program(&self) -> &Path {
        match self.probe_backend {
            ProbeBackend::MediaInfo => &self.mediainfo_path,
            ProbeBackend::Ffprobe => &self.ffprobe_path,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ProbeBackend {
    #[default]
    MediaInfo,
    Ffprobe,
}

impl FromStr for ProbeBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mediainfo" => Ok(Self::MediaInfo),
            "ffprobe" => Ok(Self::Ffprobe),
            _ => Err(format!("Unknown probe backend: {s}")),
        }
    }
}

impl fmt::Display for ProbeBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MediaInfo => write!(f, "mediainfo"),
            Self::Ffprobe => write!(f, "ffprobe"),
        }
    }
}
