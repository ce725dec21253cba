// tests/orchestrator_test.rs
use ytloader::orchestrator::{passes_date_filter, scrape_video_info, slice_range};

#[test]
fn test_slice_range_clamps_to_the_playlist() {
    assert_eq!(slice_range(5, 0, 2).unwrap(), 0..2);
    assert_eq!(slice_range(5, 2, 10).unwrap(), 2..5);
    assert_eq!(slice_range(5, 4, 1).unwrap(), 4..5);
}

#[test]
fn test_slice_range_rejects_out_of_bounds_starts() {
    let error = slice_range(5, 10, 1).unwrap_err();
    let message = error.to_string();
    assert!(message.contains("10"), "message was: {}", message);
    assert!(message.contains("5"), "message was: {}", message);

    assert!(slice_range(0, 0, 1).is_err());
    assert!(slice_range(5, 5, 1).is_err());
}

#[test]
fn test_date_filter_is_inclusive() {
    assert!(passes_date_filter(Some("20240101"), "20240101"));
    assert!(passes_date_filter(Some("20240315"), "20240101"));
    assert!(!passes_date_filter(Some("20231231"), "20240101"));
    // Entries without a date are skipped, never downloaded
    assert!(!passes_date_filter(None, "20240101"));
    assert!(!passes_date_filter(Some(""), "20240101"));
}

#[test]
fn test_scrape_title_and_format_rows() {
    let output = "\
[youtube] dQw4w9WgXcQ: Downloading webpage
[info] Testing: Example Video Title
ID  EXT   RESOLUTION
--------------------
137 mp4   1920x1080
251 webm  audio only
";
    let info = scrape_video_info(output, "https://www.youtube.com/watch?v=dQw4w9WgXcQ");
    assert_eq!(info.title, "Example Video Title");
    assert_eq!(info.format_ids, vec!["137".to_string(), "251".to_string()]);
}

#[test]
fn test_scrape_falls_back_to_the_video_id() {
    let info = scrape_video_info("", "https://www.youtube.com/watch?v=dQw4w9WgXcQ");
    assert_eq!(info.title, "video_dQw4w9WgXcQ");

    let info = scrape_video_info("", "not a url");
    assert_eq!(info.title, "unknown_video");
}

#[cfg(unix)]
mod live {
    use std::fs;
    use std::os::unix::fs::PermissionsExt;
    use std::path::{Path, PathBuf};
    use std::sync::mpsc;
    use std::time::{Duration, Instant};
    use tempfile::tempdir;
    use ytloader::cookies::CookieSource;
    use ytloader::options::DownloadOptions;
    use ytloader::orchestrator::{DownloadEvent, DownloadMode, DownloadTask};

    const STUB_TEMPLATE: &str = r#"#!/bin/sh
log="__LOG__"
mode=download
for arg in "$@"; do
  case "$arg" in
    -J) mode=info ;;
    -F) mode=formats ;;
  esac
  last=$arg
done
case "$mode" in
  info)
    __INFO__
    ;;
  formats)
    echo "[info] Testing: Example Video Title"
    echo "ID  EXT   RESOLUTION"
    echo "--------------------"
    echo "137 mp4   1920x1080"
    echo "251 webm  audio only"
    ;;
  download)
    echo "$last" >> "$log"
    __DOWNLOAD__
    ;;
esac
"#;

    const PLAYLIST_JSON: &str = r#"cat <<'EOF'
{"entries": [
  {"id": "aaaaaaaaaa1", "title": "First", "upload_date": "20231201"},
  {"id": "aaaaaaaaaa2", "title": "Second", "upload_date": "20240315"},
  {"id": "aaaaaaaaaa3", "title": "Third"}
]}
EOF"#;

    const PROGRESS_LINES: &str = r#"echo "[download]  42.5% of 10.00MiB at 1.50MiB/s ETA 00:07"
    echo "[download] 100% of 10.00MiB in 00:05""#;

    struct Stub {
        tool: PathBuf,
        log: PathBuf,
    }

    fn write_stub(dir: &Path, info: &str, download: &str) -> Stub {
        let log = dir.join("downloads.log");
        let tool = dir.join("yt-dlp-stub");
        let body = STUB_TEMPLATE
            .replace("__LOG__", &log.to_string_lossy())
            .replace("__INFO__", info)
            .replace("__DOWNLOAD__", download);
        fs::write(&tool, body).unwrap();
        let mut perms = fs::metadata(&tool).unwrap().permissions();
        perms.set_mode(0o755);
        fs::set_permissions(&tool, perms).unwrap();
        Stub { tool, log }
    }

    fn stub_options(dir: &Path, stub: &Stub) -> DownloadOptions {
        let cookie_file = dir.join("cookies.txt");
        fs::write(&cookie_file, "# Netscape HTTP Cookie File\n").unwrap();
        DownloadOptions {
            download_dir: dir.join("out"),
            cookies: CookieSource::File(cookie_file),
            tool: stub.tool.to_string_lossy().into_owned(),
            delay_between_downloads: 0,
            ..DownloadOptions::default()
        }
    }

    fn run_and_collect(
        url: &str,
        mode: DownloadMode,
        options: DownloadOptions,
    ) -> Vec<DownloadEvent> {
        let (tx, rx) = mpsc::channel();
        let handle = DownloadTask::new(url, mode, options, tx).spawn().unwrap();
        let events: Vec<DownloadEvent> = rx.iter().collect();
        handle.join();
        events
    }

    fn downloaded_urls(stub: &Stub) -> Vec<String> {
        match fs::read_to_string(&stub.log) {
            Ok(contents) => contents.lines().map(str::to_string).collect(),
            Err(_) => Vec::new(),
        }
    }

    fn is_terminal(event: &DownloadEvent) -> bool {
        matches!(event, DownloadEvent::Completed | DownloadEvent::Failed(_))
    }

    #[test]
    fn test_single_download_emits_progress_and_completes() {
        let dir = tempdir().unwrap();
        let stub = write_stub(dir.path(), PLAYLIST_JSON, PROGRESS_LINES);
        let options = stub_options(dir.path(), &stub);

        let events = run_and_collect(
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ",
            DownloadMode::Single,
            options,
        );

        assert!(events.contains(&DownloadEvent::Percent(42.5)));
        assert!(events.contains(&DownloadEvent::Rate("1.50MiB/s".to_string())));
        assert!(events.contains(&DownloadEvent::Eta("00:07".to_string())));
        assert_eq!(events.last(), Some(&DownloadEvent::Completed));
        assert_eq!(events.iter().filter(|e| is_terminal(e)).count(), 1);
        assert_eq!(
            downloaded_urls(&stub),
            vec!["https://www.youtube.com/watch?v=dQw4w9WgXcQ".to_string()]
        );
    }

    #[test]
    fn test_bare_video_ids_are_normalized() {
        let dir = tempdir().unwrap();
        let stub = write_stub(dir.path(), PLAYLIST_JSON, PROGRESS_LINES);
        let options = stub_options(dir.path(), &stub);

        let events = run_and_collect("dQw4w9WgXcQ", DownloadMode::Single, options);

        assert_eq!(events.last(), Some(&DownloadEvent::Completed));
        assert_eq!(
            downloaded_urls(&stub),
            vec!["https://www.youtube.com/watch?v=dQw4w9WgXcQ".to_string()]
        );
    }

    #[test]
    fn test_range_mode_downloads_the_requested_window() {
        let dir = tempdir().unwrap();
        let stub = write_stub(dir.path(), PLAYLIST_JSON, PROGRESS_LINES);
        let mut options = stub_options(dir.path(), &stub);
        options.start_index = Some(1);
        options.count = Some(2);

        let events = run_and_collect(
            "https://www.youtube.com/playlist?list=PL123",
            DownloadMode::ByRange,
            options,
        );

        assert_eq!(events.last(), Some(&DownloadEvent::Completed));
        assert_eq!(
            downloaded_urls(&stub),
            vec![
                "https://www.youtube.com/watch?v=aaaaaaaaaa2".to_string(),
                "https://www.youtube.com/watch?v=aaaaaaaaaa3".to_string(),
            ]
        );
    }

    #[test]
    fn test_range_mode_fails_when_the_start_is_out_of_bounds() {
        let dir = tempdir().unwrap();
        let stub = write_stub(dir.path(), PLAYLIST_JSON, PROGRESS_LINES);
        let mut options = stub_options(dir.path(), &stub);
        options.start_index = Some(5);
        options.count = Some(1);

        let events = run_and_collect(
            "https://www.youtube.com/playlist?list=PL123",
            DownloadMode::ByRange,
            options,
        );

        match events.last() {
            Some(DownloadEvent::Failed(message)) => {
                assert!(message.contains("5"), "message was: {}", message);
                assert!(message.contains("3"), "message was: {}", message);
            }
            other => panic!("expected Failed, got {:?}", other),
        }
        assert!(downloaded_urls(&stub).is_empty());
    }

    #[test]
    fn test_date_mode_skips_old_and_undated_entries() {
        let dir = tempdir().unwrap();
        let stub = write_stub(dir.path(), PLAYLIST_JSON, PROGRESS_LINES);
        let mut options = stub_options(dir.path(), &stub);
        options.date_after = Some("20240101".to_string());

        let events = run_and_collect(
            "https://www.youtube.com/playlist?list=PL123",
            DownloadMode::ByDate,
            options,
        );

        assert_eq!(events.last(), Some(&DownloadEvent::Completed));
        // Only the 20240315 entry passes; the older one and the undated one
        // are skipped with a log line
        assert_eq!(
            downloaded_urls(&stub),
            vec!["https://www.youtube.com/watch?v=aaaaaaaaaa2".to_string()]
        );
        assert!(events.iter().any(|e| matches!(
            e,
            DownloadEvent::Log(line) if line.contains("skipping")
        )));
    }

    #[test]
    fn test_playlist_fetch_failure_is_fatal() {
        let dir = tempdir().unwrap();
        let stub = write_stub(dir.path(), "exit 1", PROGRESS_LINES);
        let mut options = stub_options(dir.path(), &stub);
        options.start_index = Some(0);
        options.count = Some(1);

        let events = run_and_collect(
            "https://www.youtube.com/playlist?list=PL123",
            DownloadMode::ByRange,
            options,
        );

        match events.last() {
            Some(DownloadEvent::Failed(message)) => {
                assert!(message.contains("cannot retrieve playlist"));
            }
            other => panic!("expected Failed, got {:?}", other),
        }
    }

    #[test]
    fn test_failed_download_exit_code_surfaces() {
        let dir = tempdir().unwrap();
        let stub = write_stub(dir.path(), PLAYLIST_JSON, "exit 9");
        let options = stub_options(dir.path(), &stub);

        let events = run_and_collect(
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ",
            DownloadMode::Single,
            options,
        );

        match events.last() {
            Some(DownloadEvent::Failed(message)) => {
                assert!(message.contains("9"), "message was: {}", message);
            }
            other => panic!("expected Failed, got {:?}", other),
        }
    }

    #[test]
    fn test_stop_request_mid_batch_skips_the_remaining_entries() {
        let dir = tempdir().unwrap();
        let stub = write_stub(
            dir.path(),
            PLAYLIST_JSON,
            r#"echo "[download]   1.0% of 10.00MiB at 1.00MiB/s ETA 01:00"
    sleep 30"#,
        );
        let mut options = stub_options(dir.path(), &stub);
        options.start_index = Some(0);
        options.count = Some(3);

        let (tx, rx) = mpsc::channel();
        let task = DownloadTask::new(
            "https://www.youtube.com/playlist?list=PL123",
            DownloadMode::ByRange,
            options,
            tx,
        );
        let handle = task.spawn().unwrap();

        let started = Instant::now();
        let mut events = Vec::new();
        for event in rx.iter() {
            let stop_now = matches!(event, DownloadEvent::Percent(_));
            events.push(event);
            if stop_now {
                handle.request_stop();
            }
        }
        handle.join();

        assert!(
            started.elapsed() < Duration::from_secs(15),
            "stop took {:?}",
            started.elapsed()
        );
        // Only the first entry ever reached the tool; the rest of the window
        // never started
        assert_eq!(
            downloaded_urls(&stub),
            vec!["https://www.youtube.com/watch?v=aaaaaaaaaa1".to_string()]
        );
        assert_eq!(events.last(), Some(&DownloadEvent::Completed));
        assert!(events.iter().any(|e| matches!(
            e,
            DownloadEvent::Log(line) if line.contains("cancelled")
        )));
        assert!(!events.iter().any(|e| matches!(e, DownloadEvent::Failed(_))));
    }

    #[test]
    fn test_stop_request_ends_the_run_as_completed() {
        let dir = tempdir().unwrap();
        let stub = write_stub(
            dir.path(),
            PLAYLIST_JSON,
            r#"echo "[download]   1.0% of 10.00MiB at 1.00MiB/s ETA 01:00"
    sleep 30"#,
        );
        let options = stub_options(dir.path(), &stub);

        let (tx, rx) = mpsc::channel();
        let task = DownloadTask::new(
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ",
            DownloadMode::Single,
            options,
            tx,
        );
        let handle = task.spawn().unwrap();

        let started = Instant::now();
        let mut events = Vec::new();
        for event in rx.iter() {
            let stop_now = matches!(event, DownloadEvent::Percent(_));
            events.push(event);
            if stop_now {
                handle.request_stop();
            }
        }
        handle.join();

        assert!(
            started.elapsed() < Duration::from_secs(15),
            "stop took {:?}",
            started.elapsed()
        );
        // Cancellation is reported as a log line plus normal completion
        assert_eq!(events.last(), Some(&DownloadEvent::Completed));
        assert!(events.iter().any(|e| matches!(
            e,
            DownloadEvent::Log(line) if line.contains("cancelled")
        )));
        assert!(!events.iter().any(|e| matches!(e, DownloadEvent::Failed(_))));
    }
}
