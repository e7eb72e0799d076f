use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

/// Extensions treated as video when nothing else is configured.
pub const DEFAULT_VIDEO_EXTENSIONS: &[&str] = &["mp4", "avi", "mkv", "m4v"];

#[allow(clippy::expect_used)]
pub static DEFAULT_VIDEOS: LazyLock<VideoExtensions> = LazyLock::new(|| {
    VideoExtensions::new(DEFAULT_VIDEO_EXTENSIONS).expect("Failed to compile default video extension pattern")
});

/// Case-insensitive set of file extensions that count as video.
///
/// Files outside the set are left out of the tree entirely.
#[derive(Debug, Clone)]
pub struct VideoExtensions {
    extensions: Vec<String>,
    pattern: Option<Regex>,
}

impl VideoExtensions {
    /// Builds the set from bare extensions (`"mp4"`) or dotted ones (`".mp4"`).
    ///
    /// # Errors
    ///
    /// Returns an error if the combined matching pattern cannot be compiled.
    pub fn new<I, S>(extensions: I) -> Result<Self, regex::Error>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut normalized: Vec<String> = Vec::new();
        for ext in extensions {
            let ext = ext.as_ref().trim().trim_start_matches('.').to_lowercase();
            if !ext.is_empty() && !normalized.contains(&ext) {
                normalized.push(ext);
            }
        }

        let pattern = if normalized.is_empty() {
            None
        } else {
            let alternation = normalized
                .iter()
                .map(|ext| regex::escape(ext))
                .collect::<Vec<_>>()
                .join("|");
            Some(Regex::new(&format!(r"(?i)\.({alternation})$"))?)
        };

        Ok(Self {
            extensions: normalized,
            pattern,
        })
    }

    /// True when `file_name` ends in one of the recognized extensions.
    #[must_use]
    pub fn matches_name(&self, file_name: &str) -> bool {
        self.pattern.as_ref().is_some_and(|p| p.is_match(file_name))
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.extensions.iter().map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.extensions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.extensions.is_empty()
    }
}

impl Default for VideoExtensions {
    fn default() -> Self {
        DEFAULT_VIDEOS.clone()
    }
}

impl fmt::Display for VideoExtensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.extensions.join(", "))
    }
}
