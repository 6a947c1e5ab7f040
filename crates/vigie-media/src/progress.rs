//! yt-dlp progress parsing.
//!
//! With `--newline`, yt-dlp emits one progress line per update:
//! `[download]  42.3% of 12.34MiB at 1.23MiB/s ETA 00:05`. The fetcher
//! folds these into a watch channel, so the consumer always sees the
//! latest fraction regardless of how fast the tool emits.

use std::sync::OnceLock;

use regex::Regex;
use tokio::sync::watch;

/// Sender half of the download progress channel (fraction 0.0-1.0).
pub type ProgressSender = watch::Sender<f32>;

static PERCENT_PATTERN: OnceLock<Regex> = OnceLock::new();

fn percent_pattern() -> &'static Regex {
    PERCENT_PATTERN.get_or_init(|| {
        Regex::new(r"^\[download\]\s+(\d{1,3}(?:\.\d+)?)%").expect("valid regex")
    })
}

/// Parse a yt-dlp progress line into a completion fraction.
///
/// Returns `None` for lines that are not download progress.
pub fn parse_download_percent(line: &str) -> Option<f32> {
    let caps = percent_pattern().captures(line.trim())?;
    let percent: f32 = caps[1].parse().ok()?;
    Some((percent / 100.0).clamp(0.0, 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_progress_lines() {
        assert_eq!(
            parse_download_percent("[download]  42.3% of 12.34MiB at 1.23MiB/s ETA 00:05"),
            Some(0.423)
        );
        assert_eq!(parse_download_percent("[download] 100% of 12.34MiB"), Some(1.0));
        assert_eq!(parse_download_percent("[download]   0.0% of ~3.50MiB"), Some(0.0));
    }

    #[test]
    fn test_ignores_non_progress_lines() {
        assert_eq!(parse_download_percent("[info] abc123: Downloading webpage"), None);
        assert_eq!(parse_download_percent("[download] Destination: source.mp4"), None);
        assert_eq!(parse_download_percent(""), None);
    }

    #[test]
    fn test_clamps_overshoot() {
        assert_eq!(parse_download_percent("[download] 105.2% of 1.00MiB"), Some(1.0));
    }
}
