use clap::Parser;
use std::path::PathBuf;
use videotree_config::{ProbeBackend, Settings};

/// Show a directory tree annotated with total size and playable video duration.
#[derive(Debug, Parser)]
#[command(name = "videotree", version, about)]
pub struct Cli {
    /// Root directory to walk
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Print the tree as JSON instead of indented text
    #[arg(long)]
    pub json: bool,

    /// Duration probe backend (mediainfo or ffprobe)
    #[arg(long, value_name = "BACKEND")]
    pub probe: Option<ProbeBackend>,

    /// Per-file probe timeout in seconds, 0 disables it
    #[arg(long, value_name = "SECS")]
    pub probe_timeout: Option<u64>,

    /// Aggregate sibling directories one at a time
    #[arg(long)]
    pub sequential: bool,

    /// Settings file to use instead of the default location
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Also write log output to stderr
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Applies command-line overrides on top of loaded settings.
    pub fn apply(&self, settings: &mut Settings) {
        if let Some(backend) = self.probe {
            settings.probe_backend = backend;
        }
        if let Some(secs) = self.probe_timeout {
            settings.probe_timeout_secs = secs;
        }
        if self.sequential {
            settings.parallel_aggregation = false;
        }
    }
}
