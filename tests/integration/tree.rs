use color_eyre::Result;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use videotree_config::Settings;
use videotree_core::AggregateError;
use videotree_models::NodeKind;

use crate::common::{MB, TableProbe, create_test_file, open_session};

#[tokio::test]
async fn test_only_videos_are_listed() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let root = temp_dir.path();
    create_test_file(&root.join("notes.txt"), 10).await?;
    create_test_file(&root.join("talk.mp4"), 10).await?;

    let probe = TableProbe::new().with("talk.mp4", 90.0);
    let traversal = open_session(root, Arc::new(probe), &Settings::default()).run().await?;

    assert_eq!(traversal.root.children.len(), 1);
    let leaf = &traversal.root.children[0];
    assert_eq!(leaf.name, "talk.mp4");
    assert!(leaf.label.contains("00:01:30"));
    Ok(())
}

#[tokio::test]
async fn test_tree_end_to_end() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let root = temp_dir.path();
    create_test_file(&root.join("A/video.mp4"), 10 * MB).await?;
    create_test_file(&root.join("B.mkv"), 5 * MB).await?;

    let probe = TableProbe::new().with("video.mp4", 60.0).with("B.mkv", 30.0);
    let session = open_session(root, Arc::new(probe), &Settings::default());
    let traversal = session.run().await?;

    let labels: Vec<&str> = traversal.root.children.iter().map(|n| n.label.as_str()).collect();
    assert_eq!(labels, vec!["A | 00:01:00 | 10.00 MB", "B.mkv | 00:00:30 | 5.00 MB"]);

    let a = &traversal.root.children[0];
    assert_eq!(a.kind, NodeKind::Directory);
    assert_eq!(a.children.len(), 1);
    assert_eq!(a.children[0].path, session.root().join("A/video.mp4"));

    assert_eq!(traversal.root.duration, Duration::from_secs(90));
    assert_eq!(traversal.report.videos_found, 2);
    assert_eq!(traversal.root.video_count(), 2);
    Ok(())
}

#[tokio::test]
async fn test_extension_matching_ignores_case() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let root = temp_dir.path();
    create_test_file(&root.join("LOUD.MP4"), 10).await?;
    create_test_file(&root.join("Mixed.Mkv"), 10).await?;
    create_test_file(&root.join("clip.mov"), 10).await?;

    let traversal = open_session(root, Arc::new(TableProbe::new()), &Settings::default()).run().await?;

    assert_eq!(traversal.root.children.len(), 2);
    assert!(traversal.root.child("clip.mov").is_none());
    Ok(())
}

#[tokio::test]
async fn test_configured_extensions_replace_defaults() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let root = temp_dir.path();
    create_test_file(&root.join("clip.mov"), 10).await?;
    create_test_file(&root.join("clip.mp4"), 10).await?;

    let settings = Settings {
        video_extensions: vec!["mov".to_string()],
        ..Default::default()
    };
    let traversal = open_session(root, Arc::new(TableProbe::new()), &settings).run().await?;

    assert_eq!(traversal.root.children.len(), 1);
    assert_eq!(traversal.root.children[0].name, "clip.mov");
    Ok(())
}

#[tokio::test]
async fn test_missing_root_fails() {
    let session = open_session(Path::new("/does/not/exist"), Arc::new(TableProbe::new()), &Settings::default());

    let result = session.run().await;

    assert!(matches!(result, Err(AggregateError::DirectoryNotFound { .. })));
}

#[tokio::test]
async fn test_cancelled_session_returns_cancelled() -> Result<()> {
    let temp_dir = TempDir::new()?;
    create_test_file(&temp_dir.path().join("a/b/c.mp4"), 10).await?;

    let session = open_session(temp_dir.path(), Arc::new(TableProbe::new()), &Settings::default());
    session.cancel_handle().cancel();

    assert!(matches!(session.run().await, Err(AggregateError::Cancelled)));
    Ok(())
}
