const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Formats a byte count the way the tree labels show it: megabytes with two
/// decimals below 1024 MB, gigabytes with two decimals from 1024 MB upwards.
#[allow(clippy::cast_precision_loss)]
#[must_use]
pub fn format_size(bytes: u64) -> String {
    let megabytes = bytes as f64 / BYTES_PER_MB;

    // The displayed value decides the unit
    if (megabytes * 100.0).round() / 100.0 < 1024.0 {
        format!("{megabytes:.2} MB")
    } else {
        format!("{:.2} GB", megabytes / 1024.0)
    }
}
