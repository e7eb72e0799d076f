use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Eq, Hash, PartialEq)]
pub enum NodeKind {
    Directory,
    Video,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeKind::Directory => write!(f, "Directory"),
            NodeKind::Video => write!(f, "Video"),
        }
    }
}

/// One entry of the presented tree: a directory summary or a recognized video.
///
/// `size` and `duration` are aggregates for directories and per-file values
/// for videos. `label` is the rendered `"<name> | <hh:mm:ss> | <size>"` text
/// and `path` is what a front end hands to the OS when the entry is activated.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Node {
    pub name: String,
    pub label: String,
    pub path: PathBuf,
    pub kind: NodeKind,
    pub size: u64,
    #[serde(with = "duration_secs")]
    pub duration: Duration,
    pub children: Vec<Node>,
}

impl Node {
    #[must_use]
    pub fn directory(name: String, label: String, path: PathBuf, size: u64, duration: Duration) -> Self {
        Self {
            name,
            label,
            path,
            kind: NodeKind::Directory,
            size,
            duration,
            children: Vec::new(),
        }
    }

    #[must_use]
    pub fn video(name: String, label: String, path: PathBuf, size: u64, duration: Duration) -> Self {
        Self {
            name,
            label,
            path,
            kind: NodeKind::Video,
            size,
            duration,
            children: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_children(mut self, children: Vec<Node>) -> Self {
        self.children = children;
        self
    }

    #[must_use]
    pub const fn is_directory(&self) -> bool {
        matches!(self.kind, NodeKind::Directory)
    }

    #[must_use]
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Pre-order iterator over this node and all of its descendants.
    #[must_use]
    pub fn iter(&self) -> NodeIter<'_> {
        NodeIter { stack: vec![self] }
    }

    #[must_use]
    pub fn video_count(&self) -> usize {
        self.iter().filter(|node| node.kind == NodeKind::Video).count()
    }

    #[must_use]
    pub fn child(&self, name: &str) -> Option<&Node> {
        self.children.iter().find(|node| node.name == name)
    }
}

pub struct NodeIter<'a> {
    stack: Vec<&'a Node>,
}

impl<'a> Iterator for NodeIter<'a> {
    type Item = &'a Node;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        // Reverse so the first child is visited next.
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}

mod duration_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(duration.as_secs_f64())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs).map_err(serde::de::Error::custom)
    }
}
