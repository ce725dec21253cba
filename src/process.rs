// src/process.rs
// Spawns yt-dlp subprocesses: blocking wait-for-completion and cancellable
// line streaming with stderr merged into the stdout stream

use crate::error::AppError;
use log::{debug, warn};
use std::process::Stdio;
use std::sync::Mutex;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::{Child, Command};
use tokio::sync::mpsc;

#[cfg(windows)]
const CREATE_NO_WINDOW: u32 = 0x0800_0000;

/// Captured result of a completed subprocess.
#[derive(Debug, Clone)]
pub struct ProcessOutput {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

/// How a streamed subprocess ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamOutcome {
    Completed(i32),
    Cancelled,
}

struct ControlState {
    stop_requested: bool,
    child: Option<Child>,
}

/// Shared control record for one orchestrator run: the cancellation flag and
/// the handle of the in-flight subprocess, mutated under one lock from both
/// the worker thread and the controller thread. A stop request sets the flag
/// and terminates the live child in the same lock acquisition.
pub struct RunControl {
    inner: Mutex<ControlState>,
}

impl Default for RunControl {
    fn default() -> Self {
        Self::new()
    }
}

impl RunControl {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(ControlState {
                stop_requested: false,
                child: None,
            }),
        }
    }

    /// Request a stop. Safe to call from any thread at any time.
    pub fn request_stop(&self) {
        let mut state = self.inner.lock().unwrap();
        state.stop_requested = true;
        if let Some(child) = state.child.as_mut() {
            if let Err(e) = child.start_kill() {
                warn!("failed to terminate subprocess: {}", e);
            }
        }
    }

    pub fn is_stop_requested(&self) -> bool {
        self.inner.lock().unwrap().stop_requested
    }

    /// Register a freshly spawned child as the in-flight process. If a stop
    /// was already requested the child is killed immediately.
    fn attach(&self, mut child: Child) {
        let mut state = self.inner.lock().unwrap();
        if state.stop_requested {
            let _ = child.start_kill();
        }
        state.child = Some(child);
    }

    /// Take the in-flight child back out so it can be awaited.
    fn detach(&self) -> Option<Child> {
        self.inner.lock().unwrap().child.take()
    }
}

fn build_command(argv: &[String]) -> Result<Command, AppError> {
    let (tool, args) = argv
        .split_first()
        .ok_or_else(|| AppError::General("empty command line".to_string()))?;

    let mut command = Command::new(tool);
    command.args(args).stdin(Stdio::null());

    // Suppress the console window flash on Windows
    #[cfg(windows)]
    command.creation_flags(CREATE_NO_WINDOW);

    Ok(command)
}

/// Run to completion, capturing stdout and stderr. With `strict` set, a
/// non-zero exit code becomes a ToolFailure carrying the captured output.
pub async fn run_to_completion(argv: &[String], strict: bool) -> Result<ProcessOutput, AppError> {
    debug!("running: {}", argv.join(" "));

    let mut command = build_command(argv)?;
    let output = command
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await?;

    let result = ProcessOutput {
        exit_code: output.status.code().unwrap_or(-1),
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    };

    if strict && !output.status.success() {
        return Err(AppError::ToolFailure {
            exit_code: result.exit_code,
            stdout: result.stdout,
            stderr: result.stderr,
        });
    }

    Ok(result)
}

fn spawn_line_reader<R>(stream: R, tx: mpsc::UnboundedSender<String>)
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut lines = BufReader::new(stream).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            if tx.send(line).is_err() {
                break;
            }
        }
    });
}

/// Stream a subprocess line by line. Stderr is funneled into the same
/// ordered channel as stdout so diagnostics and progress share one stream.
/// The stop flag is observed on every line and on a short idle poll; a stop
/// request kills the child, and the already-read lines are still delivered
/// before the call returns Cancelled.
pub async fn run_streaming<F>(
    argv: &[String],
    control: &RunControl,
    mut on_line: F,
) -> Result<StreamOutcome, AppError>
where
    F: FnMut(&str),
{
    debug!("streaming: {}", argv.join(" "));

    let mut command = build_command(argv)?;
    let mut child = command
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()?;

    let (tx, mut rx) = mpsc::unbounded_channel::<String>();
    if let Some(stdout) = child.stdout.take() {
        spawn_line_reader(stdout, tx.clone());
    }
    if let Some(stderr) = child.stderr.take() {
        spawn_line_reader(stderr, tx.clone());
    }
    drop(tx);

    control.attach(child);

    loop {
        if control.is_stop_requested() {
            break;
        }
        match tokio::time::timeout(Duration::from_millis(200), rx.recv()).await {
            Ok(Some(line)) => on_line(&line),
            Ok(None) => break,
            // Idle poll so a stop request is noticed while the child is quiet
            Err(_) => continue,
        }
    }

    let cancelled = control.is_stop_requested();
    let exit_code = match control.detach() {
        Some(mut child) => {
            if cancelled {
                let _ = child.start_kill();
            }
            let status = child.wait().await?;
            status.code().unwrap_or(-1)
        }
        None => -1,
    };

    if cancelled {
        Ok(StreamOutcome::Cancelled)
    } else {
        Ok(StreamOutcome::Completed(exit_code))
    }
}
