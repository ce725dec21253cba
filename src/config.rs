// src/config.rs
// Fixed constants shared across the downloader core

use std::env;
use std::path::PathBuf;

/// Default yt-dlp executable name; overridable through settings for testing
/// against a stub binary.
pub const DEFAULT_TOOL: &str = "yt-dlp";

/// Value handed to --extractor-retries
pub const RETRY_COUNT: u32 = 3;

/// Value handed to --socket-timeout, in seconds
pub const SOCKET_TIMEOUT_SECS: u32 = 30;

/// Pause between successive playlist downloads, to reduce rate-limiting risk
pub const DELAY_BETWEEN_DOWNLOADS_SECS: u64 = 5;

pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Fallback format selector when a custom format is requested but missing,
/// or a quality key has no table entry (1080p VP9 + Opus).
pub const DEFAULT_FORMAT_SPEC: &str = "248+251";

/// Cookie names that indicate a fully logged-in YouTube session.
pub const IMPORTANT_COOKIES: &[&str] = &[
    "__Secure-3PSID",
    "SAPISID",
    "HSID",
    "SSID",
    "APISID",
    "LOGIN_INFO",
    "SID",
    "__Secure-3PAPISID",
];

/// Accepted first lines of a Netscape cookie file.
pub const COOKIE_FILE_HEADERS: &[&str] = &["# Netscape HTTP Cookie File", "# HTTP Cookie File"];

/// Default download directory: `download/` under the working directory.
pub fn default_download_dir() -> PathBuf {
    env::current_dir()
        .unwrap_or_else(|_| PathBuf::from("."))
        .join("download")
}
