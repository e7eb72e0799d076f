use std::time::Duration;

use crate::{format_duration, format_size};

/// Builds the `"<name> | <hh:mm:ss> | <size>"` label shown for every tree entry.
#[must_use]
pub fn format_label(name: &str, size: u64, duration: Duration) -> String {
    format!("{name} | {} | {}", format_duration(duration), format_size(size))
}
