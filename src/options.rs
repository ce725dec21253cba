// src/options.rs
// Immutable option snapshot for one download attempt, plus structural validation

use crate::config;
use crate::cookies::CookieSource;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Human quality labels, mapped to numeric format ids by the format resolver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Quality {
    #[serde(rename = "best")]
    Best,
    #[serde(rename = "8K")]
    Q8K,
    #[serde(rename = "4K")]
    Q4K,
    #[serde(rename = "1440p")]
    Q1440,
    #[serde(rename = "1080p")]
    Q1080,
    #[serde(rename = "720p")]
    Q720,
    #[serde(rename = "480p")]
    Q480,
    #[serde(rename = "360p")]
    Q360,
    #[serde(rename = "240p")]
    Q240,
    #[serde(rename = "custom")]
    Custom,
}

impl Quality {
    pub fn label(&self) -> &'static str {
        match self {
            Quality::Best => "best",
            Quality::Q8K => "8K",
            Quality::Q4K => "4K",
            Quality::Q1440 => "1440p",
            Quality::Q1080 => "1080p",
            Quality::Q720 => "720p",
            Quality::Q480 => "480p",
            Quality::Q360 => "360p",
            Quality::Q240 => "240p",
            Quality::Custom => "custom",
        }
    }

    pub fn all() -> &'static [Quality] {
        &[
            Quality::Best,
            Quality::Q8K,
            Quality::Q4K,
            Quality::Q1440,
            Quality::Q1080,
            Quality::Q720,
            Quality::Q480,
            Quality::Q360,
            Quality::Q240,
            Quality::Custom,
        ]
    }
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Quality {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Quality::all()
            .iter()
            .find(|q| q.label().eq_ignore_ascii_case(s))
            .copied()
            .ok_or_else(|| format!("unknown quality: {}", s))
    }
}

/// Container/codec preference for the video stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Container {
    #[serde(rename = "auto")]
    Auto,
    #[serde(rename = "mp4-h264")]
    Mp4H264,
    #[serde(rename = "webm-vp9")]
    WebmVp9,
    #[serde(rename = "mp4-av1")]
    Mp4Av1,
    #[serde(rename = "audio-only")]
    AudioOnly,
}

impl Container {
    pub fn label(&self) -> &'static str {
        match self {
            Container::Auto => "auto",
            Container::Mp4H264 => "mp4-h264",
            Container::WebmVp9 => "webm-vp9",
            Container::Mp4Av1 => "mp4-av1",
            Container::AudioOnly => "audio-only",
        }
    }
}

impl FromStr for Container {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        [
            Container::Auto,
            Container::Mp4H264,
            Container::WebmVp9,
            Container::Mp4Av1,
            Container::AudioOnly,
        ]
        .iter()
        .find(|c| c.label().eq_ignore_ascii_case(s))
        .copied()
        .ok_or_else(|| format!("unknown container preference: {}", s))
    }
}

/// Audio codec preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AudioCodec {
    #[serde(rename = "best")]
    Best,
    #[serde(rename = "opus")]
    Opus,
    #[serde(rename = "aac")]
    Aac,
}

impl AudioCodec {
    pub fn label(&self) -> &'static str {
        match self {
            AudioCodec::Best => "best",
            AudioCodec::Opus => "opus",
            AudioCodec::Aac => "aac",
        }
    }
}

impl FromStr for AudioCodec {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        [AudioCodec::Best, AudioCodec::Opus, AudioCodec::Aac]
            .iter()
            .find(|c| c.label().eq_ignore_ascii_case(s))
            .copied()
            .ok_or_else(|| format!("unknown audio codec: {}", s))
    }
}

/// Value object describing one download attempt. Built by the caller (GUI,
/// CLI or settings file), validated once, then handed to the orchestrator as
/// an immutable snapshot.
#[derive(Debug, Clone)]
pub struct DownloadOptions {
    pub quality: Quality,
    pub container: Container,
    pub audio_codec: AudioCodec,
    /// Required iff quality == Custom
    pub custom_format: Option<String>,
    pub download_dir: PathBuf,
    pub output_template: Option<String>,
    /// Skip-if-already-downloaded list handed to --download-archive
    pub download_archive: Option<PathBuf>,
    /// 0-based start index for range mode
    pub start_index: Option<usize>,
    /// Number of playlist items for range mode
    pub count: Option<usize>,
    /// Lower bound for date mode; must be fixed-width YYYYMMDD so a lexical
    /// compare is a date compare
    pub date_after: Option<String>,
    pub cookies: CookieSource,
    /// yt-dlp executable (name or path)
    pub tool: String,
    pub retry_count: u32,
    pub socket_timeout: u32,
    pub delay_between_downloads: u64,
}

impl Default for DownloadOptions {
    fn default() -> Self {
        Self {
            quality: Quality::Q1080,
            container: Container::Auto,
            audio_codec: AudioCodec::Best,
            custom_format: None,
            download_dir: config::default_download_dir(),
            output_template: None,
            download_archive: None,
            start_index: None,
            count: None,
            date_after: None,
            cookies: CookieSource::default(),
            tool: config::DEFAULT_TOOL.to_string(),
            retry_count: config::RETRY_COUNT,
            socket_timeout: config::SOCKET_TIMEOUT_SECS,
            delay_between_downloads: config::DELAY_BETWEEN_DOWNLOADS_SECS,
        }
    }
}

static FORMAT_SPEC_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        Regex::new(r"^\d+$").unwrap(),
        Regex::new(r"^\d+\+\d+$").unwrap(),
        Regex::new(r"^best").unwrap(),
        Regex::new(r"^worst").unwrap(),
        Regex::new(r"^\w+\[").unwrap(),
    ]
});

static DATE_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{8}$").unwrap());

/// Check a custom format selector for one of the accepted shapes: a numeric
/// id, an `id+id` pair, or an expression starting with best/worst/word+bracket.
pub fn is_valid_format_spec(spec: &str) -> bool {
    !spec.is_empty() && FORMAT_SPEC_PATTERNS.iter().any(|p| p.is_match(spec))
}

/// Validate an option set before a run starts. Returns human-readable
/// messages; an empty list means the options are usable. Never panics.
pub fn validate(options: &DownloadOptions) -> Vec<String> {
    let mut errors = Vec::new();

    if options.download_dir.as_os_str().is_empty() {
        errors.push("download directory must not be empty".to_string());
    } else if let Some(parent) = options.download_dir.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            errors.push(format!(
                "parent of the download directory does not exist: {}",
                parent.display()
            ));
        }
    }

    if options.quality == Quality::Custom {
        match options.custom_format.as_deref().map(str::trim) {
            None | Some("") => errors.push("custom format must not be empty".to_string()),
            Some(spec) => {
                if !is_valid_format_spec(spec) {
                    errors.push(format!("custom format is not a valid selector: {}", spec));
                }
            }
        }
    }

    if let Some(archive) = &options.download_archive {
        if let Some(parent) = archive.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                errors.push(format!(
                    "directory of the archive file does not exist: {}",
                    parent.display()
                ));
            }
        }
    }

    if let Some(date) = &options.date_after {
        if !DATE_PATTERN.is_match(date) {
            errors.push(format!("date bound must be YYYYMMDD, got: {}", date));
        }
    }

    if let CookieSource::File(path) = &options.cookies {
        if path.as_os_str().is_empty() {
            errors.push("no cookie file selected".to_string());
        } else if !path.exists() {
            errors.push(format!("cookie file does not exist: {}", path.display()));
        }
    }

    errors
}
