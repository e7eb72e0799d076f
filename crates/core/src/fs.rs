use async_trait::async_trait;
use std::fmt::Debug;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{trace, warn};
use walkdir::WalkDir;

use crate::AggregateError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    pub path: PathBuf,
    pub name: String,
    /// Lowercased, without the leading dot; empty when the file has none.
    pub extension: String,
    pub len: u64,
}

/// Direct children of one directory, in filesystem enumeration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirListing {
    pub directories: Vec<PathBuf>,
    pub files: Vec<FileEntry>,
}

impl DirListing {
    #[must_use]
    pub fn files_size(&self) -> u64 {
        self.files.iter().fold(0, |total, file| total.saturating_add(file.len))
    }
}

/// The filesystem operations the aggregators and the tree builder depend on.
#[async_trait]
pub trait FileSystem: Debug + Send + Sync {
    /// Lists the direct subdirectories and files of `path`.
    ///
    /// Fails with [`AggregateError::DirectoryNotFound`] when `path` is not an
    /// existing directory at the time of the call.
    async fn read_dir(&self, path: &Path) -> Result<DirListing, AggregateError>;
}

/// [`FileSystem`] backed by the local disk. Listing runs on the blocking pool.
#[derive(Debug, Clone, Default)]
pub struct LocalFileSystem {
    follow_links: bool,
}

impl LocalFileSystem {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn with_follow_links(mut self, follow_links: bool) -> Self {
        self.follow_links = follow_links;
        self
    }
}

#[async_trait]
impl FileSystem for LocalFileSystem {
    async fn read_dir(&self, path: &Path) -> Result<DirListing, AggregateError> {
        let path = path.to_path_buf();
        let follow_links = self.follow_links;
        tokio::task::spawn_blocking(move || list_directory(&path, follow_links)).await?
    }
}

fn list_directory(path: &Path, follow_links: bool) -> Result<DirListing, AggregateError> {
    if !path.is_dir() {
        return Err(AggregateError::not_found(path));
    }

    let mut listing = DirListing::default();

    for entry in WalkDir::new(path)
        .min_depth(1)
        .max_depth(1)
        .follow_links(follow_links)
    {
        let entry = match entry {
            Ok(entry) => entry,
            // Depth 0 means the directory itself could not be opened
            Err(e) if e.depth() == 0 => {
                let source = e
                    .into_io_error()
                    .unwrap_or_else(|| std::io::Error::other("directory loop"));
                if source.kind() == ErrorKind::NotFound {
                    return Err(AggregateError::not_found(path));
                }
                return Err(AggregateError::Io {
                    path: path.to_path_buf(),
                    source,
                });
            }
            Err(e) => {
                warn!("Skipping unreadable entry in {}: {}", path.display(), e);
                continue;
            }
        };

        let file_type = entry.file_type();
        if file_type.is_dir() {
            listing.directories.push(entry.into_path());
        } else if file_type.is_file() {
            let len = match entry.metadata() {
                Ok(metadata) => metadata.len(),
                Err(e) => {
                    warn!("Skipping file without metadata {}: {}", entry.path().display(), e);
                    continue;
                }
            };
            let name = entry.file_name().to_string_lossy().into_owned();
            let extension = entry
                .path()
                .extension()
                .map(|ext| ext.to_string_lossy().to_lowercase())
                .unwrap_or_default();

            listing.files.push(FileEntry {
                path: entry.into_path(),
                name,
                extension,
                len,
            });
        }
    }

    trace!(
        "Listed {}: {} directories, {} files",
        path.display(),
        listing.directories.len(),
        listing.files.len()
    );

    Ok(listing)
}
