use std::time::Duration;

/// Formats a duration as `hh:mm:ss`.
///
/// Hours are not wrapped at 24, so a 26 hour collection shows `26:00:00`.
/// Fractional seconds are truncated.
#[must_use]
pub fn format_duration(duration: Duration) -> String {
    let total = duration.as_secs();
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;

    format!("{hours:02}:{minutes:02}:{seconds:02}")
}

/// Converts a probe's millisecond reading into a `Duration`.
///
/// Negative, non-finite and out-of-range readings become zero.
#[must_use]
pub fn duration_from_millis(millis: f64) -> Duration {
    if !millis.is_finite() || millis <= 0.0 {
        return Duration::ZERO;
    }

    Duration::try_from_secs_f64(millis / 1000.0).unwrap_or(Duration::ZERO)
}
