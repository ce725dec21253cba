// src/settings.rs
// Persisted user settings: JSON on disk, merged over defaults on load so a
// file from an older release still loads cleanly

use crate::config;
use crate::cookies::{Browser, CookieSource};
use crate::error::AppError;
use crate::options::{AudioCodec, Container, DownloadOptions, Quality};
use log::warn;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DownloadSettings {
    pub directory: PathBuf,
    pub output_template: Option<String>,
    pub use_archive: bool,
    pub archive_file: Option<PathBuf>,
    pub quality: Quality,
    pub format_type: Container,
    pub audio_codec: AudioCodec,
    pub custom_format: Option<String>,
}

impl Default for DownloadSettings {
    fn default() -> Self {
        Self {
            directory: config::default_download_dir(),
            output_template: None,
            use_archive: false,
            archive_file: None,
            quality: Quality::Q1080,
            format_type: Container::Auto,
            audio_codec: AudioCodec::Best,
            custom_format: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CookieSettings {
    pub use_browser: bool,
    pub browser: String,
    pub cookie_file: Option<PathBuf>,
}

impl Default for CookieSettings {
    fn default() -> Self {
        Self {
            use_browser: true,
            browser: "Firefox".to_string(),
            cookie_file: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AdvancedSettings {
    pub retry_count: u32,
    pub socket_timeout: u32,
    pub delay_between_downloads: u64,
    pub tool_path: String,
}

impl Default for AdvancedSettings {
    fn default() -> Self {
        Self {
            retry_count: config::RETRY_COUNT,
            socket_timeout: config::SOCKET_TIMEOUT_SECS,
            delay_between_downloads: config::DELAY_BETWEEN_DOWNLOADS_SECS,
            tool_path: config::DEFAULT_TOOL.to_string(),
        }
    }
}

/// Top-level settings document. Every section and field carries a default,
/// so unknown keys are ignored and missing keys fall back rather than fail.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub download: DownloadSettings,
    pub cookie: CookieSettings,
    pub advanced: AdvancedSettings,
}

impl Settings {
    /// Load from a JSON file. A missing or unreadable file yields defaults
    /// with a warning; it never aborts startup.
    pub fn load(path: &Path) -> Settings {
        match fs::read_to_string(path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(settings) => settings,
                Err(e) => {
                    warn!("settings file {} is malformed, using defaults: {}", path.display(), e);
                    Settings::default()
                }
            },
            Err(e) => {
                warn!("could not read settings file {}: {}", path.display(), e);
                Settings::default()
            }
        }
    }

    /// Write back as pretty-printed JSON.
    pub fn save(&self, path: &Path) -> Result<(), AppError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }
        let contents = serde_json::to_string_pretty(self)?;
        fs::write(path, contents)?;
        Ok(())
    }

    fn cookie_source(&self) -> CookieSource {
        if self.cookie.use_browser {
            let browser = Browser::from_name(&self.cookie.browser).unwrap_or(Browser::Firefox);
            CookieSource::Browser(browser)
        } else {
            CookieSource::File(self.cookie.cookie_file.clone().unwrap_or_default())
        }
    }

    /// Flatten the sections into the option snapshot the orchestrator takes.
    pub fn to_options(&self) -> DownloadOptions {
        DownloadOptions {
            quality: self.download.quality,
            container: self.download.format_type,
            audio_codec: self.download.audio_codec,
            custom_format: self.download.custom_format.clone(),
            download_dir: self.download.directory.clone(),
            output_template: self.download.output_template.clone(),
            download_archive: if self.download.use_archive {
                self.download.archive_file.clone()
            } else {
                None
            },
            start_index: None,
            count: None,
            date_after: None,
            cookies: self.cookie_source(),
            tool: self.advanced.tool_path.clone(),
            retry_count: self.advanced.retry_count,
            socket_timeout: self.advanced.socket_timeout,
            delay_between_downloads: self.advanced.delay_between_downloads,
        }
    }
}
