use std::path::PathBuf;
use std::time::Duration;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::Node;

/// A branch that disappeared between enumeration and aggregation.
///
/// The branch is still present in the tree, with zero aggregates and no
/// children.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BranchWarning {
    pub path: PathBuf,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TraversalReport {
    pub session_id: Uuid,
    pub directories_visited: usize,
    pub videos_found: usize,
    pub probe_failures: usize,
    pub cached_sizes: usize,
    pub cached_durations: usize,
    pub elapsed: Duration,
    pub finished_at: DateTime<Local>,
}

/// The finished result of walking one root.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Traversal {
    pub root: Node,
    pub warnings: Vec<BranchWarning>,
    pub report: TraversalReport,
}

impl Traversal {
    #[must_use]
    pub fn is_partial(&self) -> bool {
        !self.warnings.is_empty()
    }
}
