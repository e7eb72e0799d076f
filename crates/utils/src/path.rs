use std::path::Path;

/// Name shown for a path in the tree. Filesystem roots have no file name, so
/// the whole path is used for them.
#[must_use]
pub fn display_name(path: &Path) -> String {
    path.file_name().map_or_else(
        || path.display().to_string(),
        |name| name.to_string_lossy().into_owned(),
    )
}
