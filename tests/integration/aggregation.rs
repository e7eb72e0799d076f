use color_eyre::Result;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use videotree_config::Settings;

use crate::common::{MB, TableProbe, create_test_file, open_session};

async fn setup_library(root: &Path) -> Result<()> {
    create_test_file(&root.join("series/s01/e01.mkv"), 3 * MB).await?;
    create_test_file(&root.join("series/s01/e02.mkv"), 3 * MB).await?;
    create_test_file(&root.join("series/s02/e01.mp4"), 2 * MB).await?;
    create_test_file(&root.join("series/notes.txt"), MB).await?;
    create_test_file(&root.join("films/feature.avi"), 7 * MB).await?;
    tokio::fs::create_dir_all(root.join("empty")).await?;
    Ok(())
}

fn library_probe() -> TableProbe {
    TableProbe::new()
        .with("e01.mkv", 1200.0)
        .with("e02.mkv", 1300.0)
        .with("e01.mp4", 600.0)
        .with("feature.avi", 5400.0)
}

#[tokio::test]
async fn test_totals_cover_whole_subtree() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let root = temp_dir.path();
    setup_library(root).await?;

    let session = open_session(root, Arc::new(library_probe()), &Settings::default());

    let size = session.sizes().total_size(root).await?;
    let duration = session.durations().total_duration(root).await?;

    assert_eq!(size, 16 * MB as u64);
    assert_eq!(duration, Duration::from_secs(1200 + 1300 + 600 + 5400));
    Ok(())
}

#[tokio::test]
async fn test_repeated_calls_are_memoized() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let root = temp_dir.path();
    setup_library(root).await?;

    let probe = Arc::new(library_probe());
    let session = open_session(root, probe.clone(), &Settings::default());
    let series = root.join("series");

    let first = session.durations().total_duration(&series).await?;
    let probed = probe.calls();
    let second = session.durations().total_duration(&series).await?;

    assert_eq!(first, second);
    assert_eq!(probe.calls(), probed);
    assert!(session.durations().cache().hits() >= 1);
    Ok(())
}

#[tokio::test]
async fn test_empty_directory_is_zero() -> Result<()> {
    let temp_dir = TempDir::new()?;

    let session = open_session(temp_dir.path(), Arc::new(TableProbe::new()), &Settings::default());

    assert_eq!(session.sizes().total_size(temp_dir.path()).await?, 0);
    assert_eq!(session.durations().total_duration(temp_dir.path()).await?, Duration::ZERO);
    Ok(())
}

#[tokio::test]
async fn test_missing_directory_is_not_found() {
    let session = open_session(Path::new("/"), Arc::new(TableProbe::new()), &Settings::default());

    let size = session.sizes().total_size(Path::new("/does/not/exist")).await;
    let duration = session.durations().total_duration(Path::new("/does/not/exist")).await;

    assert!(size.unwrap_err().is_not_found());
    assert!(duration.unwrap_err().is_not_found());
}

#[tokio::test]
async fn test_sequential_and_parallel_agree() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let root = temp_dir.path();
    setup_library(root).await?;

    let parallel = open_session(root, Arc::new(library_probe()), &Settings::default());
    let sequential = open_session(
        root,
        Arc::new(library_probe()),
        &Settings {
            parallel_aggregation: false,
            ..Default::default()
        },
    );

    assert_eq!(parallel.run().await?.root, sequential.run().await?.root);
    Ok(())
}
