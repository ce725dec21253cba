// src/progress.rs
// Scrapes yt-dlp progress lines for percentage, transfer rate and ETA

use once_cell::sync::Lazy;
use regex::Regex;

static PERCENT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d+(?:\.\d+)?)%").unwrap());
static RATE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"at\s+([0-9.]+[KMG]?iB/s)").unwrap());
static ETA_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"ETA\s+([0-9:]+)").unwrap());

/// One parsed progress line. Rate and ETA are not present on every line.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressSample {
    pub percent: f64,
    pub rate: Option<String>,
    pub eta: Option<String>,
}

/// Scan a raw output line for progress tokens. Only `[download]` lines with a
/// percentage yield a sample; everything else is ignored. Parse failures are
/// swallowed so they can never interrupt the progress stream.
pub fn parse_progress_line(line: &str) -> Option<ProgressSample> {
    if !line.contains("[download]") || !line.contains('%') {
        return None;
    }

    let percent = PERCENT_RE
        .captures(line)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse::<f64>().ok())?;

    let rate = RATE_RE
        .captures(line)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string());

    let eta = ETA_RE
        .captures(line)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string());

    Some(ProgressSample { percent, rate, eta })
}
