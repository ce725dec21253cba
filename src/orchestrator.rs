// src/orchestrator.rs
// State machine driving single, date-filtered and index-range download runs
// on a dedicated worker thread

use crate::command;
use crate::error::AppError;
use crate::options::DownloadOptions;
use crate::process::{self, RunControl, StreamOutcome};
use crate::progress;
use crate::urls;
use log::{info, warn};
use serde::Deserialize;
use std::ops::Range;
use std::sync::mpsc::Sender;
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tokio::runtime::Runtime;

/// Which flow a run follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadMode {
    Single,
    ByDate,
    ByRange,
}

/// Events emitted to the presentation layer, in the exact order the
/// underlying output stream produced them.
#[derive(Debug, Clone, PartialEq)]
pub enum DownloadEvent {
    /// Human-readable progress text, one line at a time
    Log(String),
    /// Download percentage, 0-100
    Percent(f64),
    /// Transfer rate as reported by the tool, e.g. "1.50MiB/s"
    Rate(String),
    /// Estimated time remaining, e.g. "00:07"
    Eta(String),
    /// Terminal: the run finished (or was cancelled by request)
    Completed,
    /// Terminal: the run failed outright
    Failed(String),
}

/// One member of a flat playlist listing.
#[derive(Debug, Clone, Deserialize)]
pub struct PlaylistEntry {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub upload_date: Option<String>,
}

impl PlaylistEntry {
    fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.id)
    }
}

#[derive(Debug, Deserialize)]
struct PlaylistInfo {
    #[serde(default)]
    entries: Vec<PlaylistEntry>,
}

/// Per-video details scraped from the `-F` format listing output.
#[derive(Debug, Clone)]
pub struct VideoInfo {
    pub title: String,
    pub format_ids: Vec<String>,
}

/// Compute the slice of playlist entries covered by a range request,
/// clamping the count to the playlist size. A start index at or past the end
/// is fatal to the run.
pub fn slice_range(total: usize, start: usize, count: usize) -> Result<Range<usize>, AppError> {
    if start >= total {
        return Err(AppError::Validation(format!(
            "start index {} (position {}) exceeds the playlist size ({} videos)",
            start,
            start + 1,
            total
        )));
    }
    Ok(start..total.min(start + count))
}

/// Date-mode filter. Upload dates are fixed-width YYYYMMDD, which is what
/// makes the lexical compare a date compare; entries without a date are
/// skipped rather than downloaded.
pub fn passes_date_filter(upload_date: Option<&str>, date_after: &str) -> bool {
    matches!(upload_date, Some(date) if !date.is_empty() && date >= date_after)
}

/// Scrape title and format ids from the unstructured `-F` output. The title
/// comes from an `[info] ` line; format rows are non-header lines with at
/// least three whitespace-separated tokens. Falls back to `video_{id}` or
/// `unknown_video` when no title can be found.
pub fn scrape_video_info(output: &str, url: &str) -> VideoInfo {
    let mut title: Option<String> = None;
    let mut format_ids = Vec::new();

    for line in output.lines() {
        if line.contains("[info] ") && line.contains(": ") {
            if let Some((_, rest)) = line.split_once(": ") {
                title = Some(rest.trim().to_string());
                continue;
            }
        }

        let trimmed = line.trim();
        if !trimmed.is_empty()
            && !trimmed.starts_with('[')
            && !line.contains("ID")
            && !line.contains("---")
        {
            let parts: Vec<&str> = trimmed.split_whitespace().collect();
            if parts.len() >= 3 {
                format_ids.push(parts[0].to_string());
            }
        }
    }

    let title = title.unwrap_or_else(|| match urls::extract_video_id(url) {
        Some(id) => format!("video_{}", id),
        None => "unknown_video".to_string(),
    });

    VideoInfo { title, format_ids }
}

/// A running or about-to-run download. Owns the option snapshot, the event
/// sender and the shared control record; the surrounding application creates
/// one task per requested run and never two at once.
pub struct DownloadTask {
    url: String,
    mode: DownloadMode,
    options: DownloadOptions,
    control: Arc<RunControl>,
    events: Sender<DownloadEvent>,
}

/// Handle held by the controller thread while a run is active.
pub struct RunHandle {
    control: Arc<RunControl>,
    thread: Option<thread::JoinHandle<()>>,
}

impl RunHandle {
    /// Ask the worker to stop. The in-flight subprocess is terminated and no
    /// further playlist entries are started.
    pub fn request_stop(&self) {
        self.control.request_stop();
    }

    pub fn control(&self) -> Arc<RunControl> {
        Arc::clone(&self.control)
    }

    /// Wait for the worker thread to exit.
    pub fn join(mut self) {
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

impl DownloadTask {
    pub fn new(
        url: &str,
        mode: DownloadMode,
        options: DownloadOptions,
        events: Sender<DownloadEvent>,
    ) -> Self {
        Self {
            url: urls::normalize_url(url),
            mode,
            options,
            control: Arc::new(RunControl::new()),
            events,
        }
    }

    pub fn control(&self) -> Arc<RunControl> {
        Arc::clone(&self.control)
    }

    /// Start the run on a dedicated worker thread. The thread owns its own
    /// runtime and exits when the run reaches a terminal state.
    pub fn spawn(self) -> Result<RunHandle, AppError> {
        let control = Arc::clone(&self.control);
        let thread = thread::Builder::new()
            .name("download-worker".to_string())
            .spawn(move || match Runtime::new() {
                Ok(runtime) => runtime.block_on(self.run()),
                Err(e) => {
                    let _ = self
                        .events
                        .send(DownloadEvent::Failed(format!("failed to start worker: {}", e)));
                }
            })?;
        Ok(RunHandle {
            control,
            thread: Some(thread),
        })
    }

    /// Drive the run to a terminal state, emitting exactly one terminal
    /// event. Cancellation is not an error: it surfaces as a log line
    /// followed by Completed, and suppresses error reporting for whatever
    /// operation it interrupted.
    pub async fn run(&self) {
        info!("starting {:?} run for {}", self.mode, self.url);

        let result = match self.mode {
            DownloadMode::Single => self.run_single().await,
            DownloadMode::ByDate => self.run_by_date().await,
            DownloadMode::ByRange => self.run_by_range().await,
        };

        match result {
            Ok(()) => self.emit(DownloadEvent::Completed),
            Err(e) if e.is_cancelled() => {
                self.emit_log("⏹ download cancelled");
                self.emit(DownloadEvent::Completed);
            }
            Err(e) => {
                warn!("run failed: {}", e);
                self.emit(DownloadEvent::Failed(e.to_string()));
            }
        }
    }

    fn emit(&self, event: DownloadEvent) {
        let _ = self.events.send(event);
    }

    fn emit_log<S: Into<String>>(&self, message: S) {
        self.emit(DownloadEvent::Log(message.into()));
    }

    fn check_cancelled(&self) -> Result<(), AppError> {
        if self.control.is_stop_requested() {
            Err(AppError::Cancelled)
        } else {
            Ok(())
        }
    }

    async fn run_single(&self) -> Result<(), AppError> {
        self.check_cancelled()?;

        let info = match self.fetch_video_info(&self.url).await {
            Ok(info) => info,
            Err(e) if e.is_cancelled() => return Err(e),
            Err(e) => {
                self.emit_log(e.to_string());
                return Err(AppError::Parse(
                    "unable to retrieve video information".to_string(),
                ));
            }
        };

        let title = urls::clean_filename(&info.title);
        self.check_cancelled()?;
        self.download_one(&self.url, &title).await
    }

    async fn run_by_date(&self) -> Result<(), AppError> {
        let date_after = self
            .options
            .date_after
            .clone()
            .ok_or_else(|| AppError::Validation("date mode requires a date bound".to_string()))?;

        let entries = self.fetch_playlist_or_fail().await?;
        let total = entries.len();
        self.emit_log(format!("playlist retrieved, {} videos listed", total));

        let mut downloaded = 0usize;
        for (index, entry) in entries.iter().enumerate() {
            self.check_cancelled()?;
            if entry.id.is_empty() {
                continue;
            }

            if !passes_date_filter(entry.upload_date.as_deref(), &date_after) {
                self.emit_log(format!(
                    "skipping {}: outside the requested date range",
                    entry.display_title()
                ));
                continue;
            }

            let video_url = urls::watch_url(&entry.id);
            match self.process_entry(&video_url).await {
                Ok(()) => {
                    downloaded += 1;
                    if index + 1 < total {
                        self.pause_between_items().await;
                    }
                }
                Err(e) if e.is_cancelled() => return Err(e),
                Err(e) => {
                    self.emit_log(format!("error while downloading {}: {}", video_url, e));
                    continue;
                }
            }
        }

        self.emit_log(format!("date mode finished, {} videos downloaded", downloaded));
        Ok(())
    }

    async fn run_by_range(&self) -> Result<(), AppError> {
        let entries = self.fetch_playlist_or_fail().await?;
        let total = entries.len();
        self.emit_log(format!("playlist retrieved, {} videos listed", total));

        let start = self.options.start_index.unwrap_or(0);
        let count = self.options.count.unwrap_or(1);
        let range = slice_range(total, start, count)?;

        self.emit_log(format!(
            "downloading videos {} through {} of {}",
            range.start + 1,
            range.end,
            total
        ));

        let selected = &entries[range];
        for (position, entry) in selected.iter().enumerate() {
            self.check_cancelled()?;
            if entry.id.is_empty() {
                continue;
            }

            let video_url = urls::watch_url(&entry.id);
            self.emit_log(format!(
                "downloading video {}/{}: {}",
                position + 1,
                selected.len(),
                entry.display_title()
            ));

            match self.process_entry(&video_url).await {
                Ok(()) => {
                    if position + 1 < selected.len() {
                        self.pause_between_items().await;
                    }
                }
                Err(e) if e.is_cancelled() => return Err(e),
                Err(e) => {
                    self.emit_log(format!("error while downloading {}: {}", video_url, e));
                    continue;
                }
            }
        }

        self.emit_log(format!("range mode finished, {} videos processed", selected.len()));
        Ok(())
    }

    /// Fetch the flat playlist listing; any failure or an empty listing is
    /// fatal to the whole run.
    async fn fetch_playlist_or_fail(&self) -> Result<Vec<PlaylistEntry>, AppError> {
        self.emit_log("fetching playlist information...");

        let argv =
            command::info_command(&self.options.tool, &self.url, &self.options.cookies)?;
        self.emit_log(format!("running: {}", argv.join(" ")));

        let entries = match process::run_to_completion(&argv, true).await {
            Ok(output) => match serde_json::from_str::<PlaylistInfo>(&output.stdout) {
                Ok(info) => info.entries,
                Err(e) => {
                    self.emit_log(format!("could not decode playlist JSON: {}", e));
                    Vec::new()
                }
            },
            Err(e) => {
                self.emit_log(e.to_string());
                Vec::new()
            }
        };

        if entries.is_empty() {
            return Err(AppError::Parse("cannot retrieve playlist".to_string()));
        }
        Ok(entries)
    }

    /// Fetch info for one entry and download it. Callers in playlist modes
    /// treat any error here as a skip, not a run failure.
    async fn process_entry(&self, url: &str) -> Result<(), AppError> {
        let info = self.fetch_video_info(url).await?;
        let title = urls::clean_filename(&info.title);
        self.check_cancelled()?;
        self.download_one(url, &title).await
    }

    async fn fetch_video_info(&self, url: &str) -> Result<VideoInfo, AppError> {
        let argv =
            command::format_list_command(&self.options.tool, url, &self.options.cookies)?;
        self.emit_log(format!("running: {}", argv.join(" ")));
        let output = process::run_to_completion(&argv, true).await?;
        Ok(scrape_video_info(&output.stdout, url))
    }

    async fn download_one(&self, url: &str, title: &str) -> Result<(), AppError> {
        let url = urls::normalize_url(url);
        let argv = command::download_command(&url, &self.options)?;

        self.emit_log(format!("starting download: {}", title));
        self.emit_log(format!("running: {}", argv.join(" ")));

        let outcome = process::run_streaming(&argv, &self.control, |line| {
            if let Some(sample) = progress::parse_progress_line(line) {
                self.emit(DownloadEvent::Percent(sample.percent));
                if let Some(rate) = sample.rate {
                    self.emit(DownloadEvent::Rate(rate));
                }
                if let Some(eta) = sample.eta {
                    self.emit(DownloadEvent::Eta(eta));
                }
            }
            self.emit_log(line);
        })
        .await?;

        match outcome {
            StreamOutcome::Cancelled => Err(AppError::Cancelled),
            StreamOutcome::Completed(0) => {
                self.emit_log("✅ video downloaded");
                Ok(())
            }
            StreamOutcome::Completed(code) => Err(AppError::General(format!(
                "download failed with exit code {}",
                code
            ))),
        }
    }

    /// Fixed pause between successive downloads, skipped once a stop has
    /// been requested.
    async fn pause_between_items(&self) {
        let delay = self.options.delay_between_downloads;
        if delay == 0 {
            return;
        }
        self.emit_log(format!("waiting {} seconds before the next download...", delay));

        let deadline = tokio::time::Instant::now() + Duration::from_secs(delay);
        while tokio::time::Instant::now() < deadline {
            if self.control.is_stop_requested() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(200)).await;
        }
    }
}
