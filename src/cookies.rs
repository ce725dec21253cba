// src/cookies.rs
// Cookie-based authentication: browser profile lookup, cookie file
// validation and the argv fragments both turn into

use crate::config::{COOKIE_FILE_HEADERS, IMPORTANT_COOKIES};
use crate::error::AppError;
use chrono::Utc;
use dirs_next as dirs;
use log::debug;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Browsers yt-dlp can pull cookies from directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Browser {
    Firefox,
    Chrome,
    Edge,
}

impl Browser {
    /// Internal key handed to --cookies-from-browser.
    pub fn key(&self) -> &'static str {
        match self {
            Browser::Firefox => "firefox",
            Browser::Chrome => "chrome",
            Browser::Edge => "edge",
        }
    }

    /// Human-readable name, used in error messages.
    pub fn display_name(&self) -> &'static str {
        match self {
            Browser::Firefox => "Firefox",
            Browser::Chrome => "Chrome",
            Browser::Edge => "Microsoft Edge",
        }
    }

    /// Match either the display name or the internal key, case-insensitively.
    pub fn from_name(name: &str) -> Option<Browser> {
        [Browser::Firefox, Browser::Chrome, Browser::Edge]
            .into_iter()
            .find(|b| {
                b.key().eq_ignore_ascii_case(name) || b.display_name().eq_ignore_ascii_case(name)
            })
    }

    /// Profile directory under the per-user local application-data root.
    pub fn profile_dir(&self, local_data: &Path) -> PathBuf {
        match self {
            Browser::Firefox => local_data.join("Mozilla").join("Firefox").join("Profiles"),
            Browser::Chrome => local_data.join("Google").join("Chrome").join("User Data"),
            Browser::Edge => local_data.join("Microsoft").join("Edge").join("User Data"),
        }
    }
}

/// Where authentication cookies come from: a browser's stored profile or an
/// exported Netscape cookie file.
#[derive(Debug, Clone, PartialEq)]
pub enum CookieSource {
    Browser(Browser),
    File(PathBuf),
}

impl Default for CookieSource {
    fn default() -> Self {
        CookieSource::Browser(Browser::Firefox)
    }
}

impl CookieSource {
    /// Resolve to the argv fragment for yt-dlp, verifying that the source is
    /// reachable. Error messages name the human-readable browser, not the
    /// internal key.
    pub fn resolve_args(&self) -> Result<Vec<String>, AppError> {
        match self {
            CookieSource::Browser(browser) => {
                let local_data = dirs::data_local_dir().ok_or_else(|| {
                    AppError::Configuration(
                        "could not determine the local application data directory".to_string(),
                    )
                })?;

                let profile_dir = browser.profile_dir(&local_data);
                if !profile_dir.exists() {
                    return Err(AppError::Configuration(format!(
                        "cannot find the {} profile directory: {}",
                        browser.display_name(),
                        profile_dir.display()
                    )));
                }

                debug!("using {} cookies from {:?}", browser.key(), profile_dir);
                Ok(vec![
                    "--cookies-from-browser".to_string(),
                    browser.key().to_string(),
                ])
            }
            CookieSource::File(path) => {
                if path.as_os_str().is_empty() {
                    return Err(AppError::Configuration(
                        "no cookie file has been set".to_string(),
                    ));
                }
                if !path.exists() {
                    return Err(AppError::Configuration(format!(
                        "cookie file does not exist: {}",
                        path.display()
                    )));
                }
                Ok(vec![
                    "--cookies".to_string(),
                    path.to_string_lossy().into_owned(),
                ])
            }
        }
    }
}

/// Aggregates derived from scanning a cookie file.
#[derive(Debug, Clone, Default)]
pub struct CookieReport {
    pub is_valid: bool,
    pub issues: Vec<String>,
    pub total_cookies: usize,
    pub youtube_cookies: usize,
    pub important_cookies: Vec<String>,
    pub expired_cookies: usize,
}

/// Validate a Netscape cookie file: header line, then tab-separated
/// `domain flag path secure expiry name value` rows. Malformed rows are
/// skipped, not fatal. A file counts as valid when it holds at least one
/// cookie scoped to youtube.com.
pub fn validate_cookie_file(path: &Path) -> CookieReport {
    let mut report = CookieReport::default();

    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) => {
            report.issues.push(format!("failed to read file: {}", e));
            return report;
        }
    };

    if contents.trim().is_empty() {
        report.issues.push("file is empty".to_string());
        return report;
    }

    let first_line = contents.lines().next().unwrap_or("").trim();
    if !COOKIE_FILE_HEADERS.iter().any(|h| first_line.starts_with(h)) {
        report
            .issues
            .push("file does not start with a Netscape cookie header".to_string());
    }

    let now = Utc::now().timestamp();

    for line in contents.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let parts: Vec<&str> = line.split('\t').collect();
        if parts.len() < 7 {
            continue;
        }

        report.total_cookies += 1;
        let (domain, expiry, name) = (parts[0], parts[4], parts[5]);

        if domain.contains("youtube.com") {
            report.youtube_cookies += 1;
        }

        if IMPORTANT_COOKIES.contains(&name) {
            report.important_cookies.push(name.to_string());
        }

        // Expiry of 0 means a session cookie, never counted as expired
        if let Ok(expiry_time) = expiry.parse::<i64>() {
            if expiry_time != 0 && expiry_time < now {
                report.expired_cookies += 1;
            }
        }
    }

    report.is_valid = report.total_cookies > 0 && report.youtube_cookies > 0;
    report.important_cookies.sort();
    report.important_cookies.dedup();

    report
}

/// Derive remediation hints from the report aggregates.
pub fn suggest_fixes(report: &CookieReport) -> Vec<String> {
    let mut suggestions = Vec::new();

    if report.total_cookies == 0 {
        suggestions.push("no valid cookies found in the file".to_string());
        suggestions.push("make sure you exported an actual cookies.txt file".to_string());
    }

    if report.youtube_cookies == 0 {
        suggestions.push("no YouTube cookies found in the file".to_string());
        suggestions.push("select the youtube.com domain when exporting".to_string());
    }

    if report.important_cookies.is_empty() {
        suggestions.push("authentication cookies are missing".to_string());
        suggestions.push("log in to YouTube fully before exporting".to_string());
    }

    if report.total_cookies > 0 && report.expired_cookies * 2 > report.total_cookies {
        suggestions.push("most cookies have expired".to_string());
        suggestions.push("log in to YouTube again and export a fresh cookie file".to_string());
    }

    suggestions
}
