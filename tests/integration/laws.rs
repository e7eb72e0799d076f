use proptest::prelude::*;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::runtime::Runtime;
use videotree_config::Settings;
use videotree_models::Node;

use crate::common::{TableProbe, open_session};

/// A generated directory: file sizes and nested directories.
#[derive(Debug, Clone)]
struct Dir {
    files: Vec<usize>,
    dirs: Vec<Dir>,
}

fn dir_strategy() -> impl Strategy<Value = Dir> {
    let leaf = prop::collection::vec(0usize..4096, 0..4).prop_map(|files| Dir { files, dirs: Vec::new() });

    leaf.prop_recursive(3, 24, 3, |inner| {
        (prop::collection::vec(0usize..4096, 0..4), prop::collection::vec(inner, 0..3))
            .prop_map(|(files, dirs)| Dir { files, dirs })
    })
}

/// Writes the tree to disk. File `n` of every directory is named `clip{n}.mp4`
/// and the probe table gives it `n + 1` seconds.
fn materialize(dir: &Dir, path: &Path) {
    std::fs::create_dir_all(path).unwrap();
    for (i, size) in dir.files.iter().enumerate() {
        std::fs::write(path.join(format!("clip{i}.mp4")), vec![0u8; *size]).unwrap();
    }
    for (i, child) in dir.dirs.iter().enumerate() {
        materialize(child, &path.join(format!("d{i}")));
    }
}

fn expected_size(dir: &Dir) -> u64 {
    dir.files.iter().map(|&s| s as u64).sum::<u64>() + dir.dirs.iter().map(expected_size).sum::<u64>()
}

fn expected_duration(dir: &Dir) -> Duration {
    let own: u64 = (1..=dir.files.len() as u64).sum();
    Duration::from_secs(own) + dir.dirs.iter().map(expected_duration).sum::<Duration>()
}

/// Every directory node equals its files plus its subdirectory nodes.
fn assert_aggregation_law(node: &Node) {
    if !node.is_directory() {
        return;
    }
    let size: u64 = node.children.iter().map(|c| c.size).sum();
    let duration: Duration = node.children.iter().map(|c| c.duration).sum();
    assert_eq!(node.size, size, "size law broken at {}", node.path.display());
    assert_eq!(node.duration, duration, "duration law broken at {}", node.path.display());

    for child in &node.children {
        assert_aggregation_law(child);
    }
}

fn probe() -> TableProbe {
    (0..4).fold(TableProbe::new(), |probe, i| probe.with(&format!("clip{i}.mp4"), f64::from(i + 1)))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn prop_aggregates_equal_sum_of_parts(tree in dir_strategy(), parallel in any::<bool>()) {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("root");
        materialize(&tree, &root);

        let rt = Runtime::new().unwrap();
        let settings = Settings { parallel_aggregation: parallel, ..Default::default() };
        let traversal = rt.block_on(open_session(&root, Arc::new(probe()), &settings).run()).unwrap();

        prop_assert_eq!(traversal.root.size, expected_size(&tree));
        prop_assert_eq!(traversal.root.duration, expected_duration(&tree));
        assert_aggregation_law(&traversal.root);
    }
}
