// src/command.rs
// Assembles yt-dlp argument lists from ordered fragments

use crate::config;
use crate::cookies::CookieSource;
use crate::error::AppError;
use crate::format;
use crate::options::DownloadOptions;
use std::fs;
use std::path::Path;

/// Builder accumulating argv fragments in a fixed order: tool name, format
/// flags, misc flags, cookie flags, output flags, then the URL last. The
/// builder is resettable so it can be reused across sequential commands;
/// `build` itself only reads the accumulated state.
#[derive(Debug, Clone)]
pub struct CommandBuilder {
    tool: String,
    format_args: Vec<String>,
    misc_args: Vec<String>,
    cookie_args: Vec<String>,
    output_args: Vec<String>,
    url: Option<String>,
}

impl Default for CommandBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandBuilder {
    pub fn new() -> Self {
        Self::with_tool(config::DEFAULT_TOOL)
    }

    /// Use a different executable, e.g. an absolute path or a test stub.
    pub fn with_tool(tool: &str) -> Self {
        Self {
            tool: tool.to_string(),
            format_args: Vec::new(),
            misc_args: Vec::new(),
            cookie_args: Vec::new(),
            output_args: Vec::new(),
            url: None,
        }
    }

    /// Drop all fragments but keep the tool token.
    pub fn reset(&mut self) -> &mut Self {
        let tool = std::mem::take(&mut self.tool);
        *self = Self::with_tool(&tool);
        self
    }

    pub fn cookies(&mut self, source: &CookieSource) -> Result<&mut Self, AppError> {
        self.cookie_args = source.resolve_args()?;
        Ok(self)
    }

    pub fn format(&mut self, format_spec: &str) -> &mut Self {
        self.format_args = vec!["-f".to_string(), format_spec.to_string()];
        self
    }

    /// Retry/timeout/user-agent flags shared by every download command.
    pub fn basic_options(&mut self, retries: u32, socket_timeout: u32) -> &mut Self {
        self.misc_args.extend([
            "--no-check-certificates".to_string(),
            "--no-playlist".to_string(),
            "--extractor-retries".to_string(),
            retries.to_string(),
            "--socket-timeout".to_string(),
            socket_timeout.to_string(),
            "--user-agent".to_string(),
            config::USER_AGENT.to_string(),
        ]);
        self
    }

    /// Flat playlist listing mode: JSON on stdout, no per-entry detail.
    pub fn info_only(&mut self) -> &mut Self {
        self.misc_args
            .extend(["-J".to_string(), "--flat-playlist".to_string()]);
        self
    }

    /// Format listing mode: tabular text on stdout.
    pub fn format_list(&mut self) -> &mut Self {
        self.misc_args.extend([
            "-F".to_string(),
            "--verbose".to_string(),
            "--no-warnings".to_string(),
            "--no-playlist".to_string(),
        ]);
        self
    }

    /// Output template and optional archive file. Creates the destination
    /// directory if it does not exist yet.
    pub fn output(
        &mut self,
        download_dir: &Path,
        output_template: Option<&str>,
        download_archive: Option<&Path>,
    ) -> Result<&mut Self, AppError> {
        if !download_dir.exists() {
            fs::create_dir_all(download_dir)?;
        }

        let template = match output_template {
            Some(template) => download_dir.join(template),
            None => download_dir.join("%(title)s.%(ext)s"),
        };

        self.output_args = vec!["-o".to_string(), template.to_string_lossy().into_owned()];

        if let Some(archive) = download_archive {
            self.output_args.extend([
                "--download-archive".to_string(),
                archive.to_string_lossy().into_owned(),
            ]);
        }

        Ok(self)
    }

    /// Playlist window flags. `start_index` is 0-based and emitted 1-based;
    /// `end_index` is the exclusive end already converted by the caller to
    /// the tool's 1-based inclusive convention.
    pub fn playlist_range(
        &mut self,
        start_index: Option<usize>,
        end_index: Option<usize>,
        date_after: Option<&str>,
    ) -> &mut Self {
        if let Some(start) = start_index {
            self.misc_args
                .extend(["--playlist-start".to_string(), (start + 1).to_string()]);
        }
        if let Some(end) = end_index {
            self.misc_args
                .extend(["--playlist-end".to_string(), end.to_string()]);
        }
        if let Some(date) = date_after {
            self.misc_args
                .extend(["--dateafter".to_string(), date.to_string()]);
        }
        self
    }

    pub fn url(&mut self, url: &str) -> &mut Self {
        self.url = Some(url.to_string());
        self
    }

    /// Compose the final argument list. The URL is always the last token.
    pub fn build(&self) -> Result<Vec<String>, AppError> {
        let url = self.url.as_ref().ok_or(AppError::MissingUrl)?;

        let mut command = vec![self.tool.clone()];
        command.extend(self.format_args.iter().cloned());
        command.extend(self.misc_args.iter().cloned());
        command.extend(self.cookie_args.iter().cloned());
        command.extend(self.output_args.iter().cloned());
        command.push(url.clone());

        Ok(command)
    }
}

/// Flat playlist listing command (`-J --flat-playlist`).
pub fn info_command(
    tool: &str,
    url: &str,
    cookies: &CookieSource,
) -> Result<Vec<String>, AppError> {
    let mut builder = CommandBuilder::with_tool(tool);
    builder.cookies(cookies)?.info_only().url(url);
    builder.build()
}

/// Per-video format listing command (`-F --verbose ...`).
pub fn format_list_command(
    tool: &str,
    url: &str,
    cookies: &CookieSource,
) -> Result<Vec<String>, AppError> {
    let mut builder = CommandBuilder::with_tool(tool);
    builder.cookies(cookies)?.format_list().url(url);
    builder.build()
}

/// Probe command used to check whether the cookie source grants access.
pub fn cookie_test_command(tool: &str, cookies: &CookieSource) -> Result<Vec<String>, AppError> {
    let mut builder = CommandBuilder::with_tool(tool);
    builder.cookies(cookies)?;
    builder.misc_args.extend([
        "-J".to_string(),
        "--no-warnings".to_string(),
        "--no-playlist".to_string(),
    ]);
    builder.url("https://www.youtube.com/watch?v=dQw4w9WgXcQ");
    builder.build()
}

/// Full download command for one URL, assembled from the option snapshot.
/// Playlist window flags are only added when range or date options are set;
/// on single-video URLs the `--no-playlist` base flag makes them inert, so
/// the same snapshot works for both playlist and per-item invocations.
pub fn download_command(url: &str, options: &DownloadOptions) -> Result<Vec<String>, AppError> {
    let mut builder = CommandBuilder::with_tool(&options.tool);
    builder
        .cookies(&options.cookies)?
        .basic_options(options.retry_count, options.socket_timeout);

    let format_spec = format::resolve(
        options.quality,
        options.container,
        options.audio_codec,
        options.custom_format.as_deref(),
    );
    builder.format(&format_spec);

    builder.output(
        &options.download_dir,
        options.output_template.as_deref(),
        options.download_archive.as_deref(),
    )?;

    if options.start_index.is_some() || options.date_after.is_some() {
        let end_index = match (options.start_index, options.count) {
            (Some(start), Some(count)) => Some(start + count),
            _ => None,
        };
        builder.playlist_range(options.start_index, end_index, options.date_after.as_deref());
    }

    builder.url(url);
    builder.build()
}
