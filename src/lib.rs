// src/lib.rs
// Expose the downloader core as a library for front-ends

mod version;
pub use version::VERSION;

pub mod cli;
pub mod command;
pub mod config;
pub mod cookies;
pub mod error;
pub mod format;
pub mod options;
pub mod orchestrator;
pub mod process;
pub mod progress;
pub mod settings;
pub mod urls;

pub use error::AppError;
pub use options::DownloadOptions;
pub use orchestrator::{DownloadEvent, DownloadMode, DownloadTask, RunHandle};

use std::sync::mpsc::Sender;

/// Validate an option set and start a download run on a worker thread.
/// Events arrive on `events` until a terminal Completed or Failed; the
/// returned handle stops the run and joins the worker.
pub fn start_download(
    url: &str,
    mode: DownloadMode,
    options: DownloadOptions,
    events: Sender<DownloadEvent>,
) -> Result<RunHandle, AppError> {
    let errors = options::validate(&options);
    if !errors.is_empty() {
        return Err(AppError::Validation(errors.join("; ")));
    }

    DownloadTask::new(url, mode, options, events).spawn()
}
