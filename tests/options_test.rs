// tests/options_test.rs
use std::path::PathBuf;
use tempfile::tempdir;
use ytloader::cookies::CookieSource;
use ytloader::options::{
    is_valid_format_spec, validate, AudioCodec, Container, DownloadOptions, Quality,
};

fn usable_options(dir: &std::path::Path) -> DownloadOptions {
    let cookie_file = dir.join("cookies.txt");
    std::fs::write(&cookie_file, "# Netscape HTTP Cookie File\n").unwrap();
    DownloadOptions {
        download_dir: dir.join("out"),
        cookies: CookieSource::File(cookie_file),
        ..DownloadOptions::default()
    }
}

#[test]
fn test_defaults_validate_cleanly() {
    let dir = tempdir().unwrap();
    let options = usable_options(dir.path());
    assert!(validate(&options).is_empty());
}

#[test]
fn test_empty_download_dir_is_rejected() {
    let dir = tempdir().unwrap();
    let options = DownloadOptions {
        download_dir: PathBuf::new(),
        ..usable_options(dir.path())
    };
    let errors = validate(&options);
    assert!(errors.iter().any(|e| e.contains("download directory")));
}

#[test]
fn test_download_dir_with_missing_parent_is_rejected() {
    let dir = tempdir().unwrap();
    let options = DownloadOptions {
        download_dir: PathBuf::from("/no/such/parent/out"),
        ..usable_options(dir.path())
    };
    let errors = validate(&options);
    assert!(errors.iter().any(|e| e.contains("parent")));
}

#[test]
fn test_custom_quality_requires_a_selector() {
    let dir = tempdir().unwrap();
    let options = DownloadOptions {
        quality: Quality::Custom,
        custom_format: None,
        ..usable_options(dir.path())
    };
    let errors = validate(&options);
    assert!(errors.iter().any(|e| e.contains("custom format")));

    let options = DownloadOptions {
        quality: Quality::Custom,
        custom_format: Some("   ".to_string()),
        ..usable_options(dir.path())
    };
    assert!(!validate(&options).is_empty());
}

#[test]
fn test_custom_selector_shapes() {
    assert!(is_valid_format_spec("137"));
    assert!(is_valid_format_spec("137+140"));
    assert!(is_valid_format_spec("best"));
    assert!(is_valid_format_spec("bestvideo+bestaudio"));
    assert!(is_valid_format_spec("worstaudio"));
    assert!(is_valid_format_spec("bv[height<=720]"));

    assert!(!is_valid_format_spec(""));
    assert!(!is_valid_format_spec("+140"));
    assert!(!is_valid_format_spec("[height<=720]"));
}

#[test]
fn test_bad_custom_selector_is_rejected() {
    let dir = tempdir().unwrap();
    let options = DownloadOptions {
        quality: Quality::Custom,
        custom_format: Some("+140".to_string()),
        ..usable_options(dir.path())
    };
    let errors = validate(&options);
    assert!(errors.iter().any(|e| e.contains("not a valid selector")));
}

#[test]
fn test_date_must_be_eight_digits() {
    let dir = tempdir().unwrap();
    for bad in ["2024-01-01", "2024011", "yesterday", "202401011"] {
        let options = DownloadOptions {
            date_after: Some(bad.to_string()),
            ..usable_options(dir.path())
        };
        let errors = validate(&options);
        assert!(
            errors.iter().any(|e| e.contains("YYYYMMDD")),
            "{} should be rejected",
            bad
        );
    }

    let options = DownloadOptions {
        date_after: Some("20240101".to_string()),
        ..usable_options(dir.path())
    };
    assert!(validate(&options).is_empty());
}

#[test]
fn test_archive_parent_must_exist() {
    let dir = tempdir().unwrap();
    let options = DownloadOptions {
        download_archive: Some(PathBuf::from("/no/such/dir/archive.txt")),
        ..usable_options(dir.path())
    };
    let errors = validate(&options);
    assert!(errors.iter().any(|e| e.contains("archive")));
}

#[test]
fn test_missing_cookie_file_is_reported() {
    let dir = tempdir().unwrap();
    let options = DownloadOptions {
        cookies: CookieSource::File(dir.path().join("gone.txt")),
        ..usable_options(dir.path())
    };
    let errors = validate(&options);
    assert!(errors.iter().any(|e| e.contains("cookie file")));

    let options = DownloadOptions {
        cookies: CookieSource::File(PathBuf::new()),
        ..usable_options(dir.path())
    };
    let errors = validate(&options);
    assert!(errors.iter().any(|e| e.contains("no cookie file")));
}

#[test]
fn test_validation_collects_every_problem() {
    let options = DownloadOptions {
        quality: Quality::Custom,
        container: Container::Auto,
        audio_codec: AudioCodec::Best,
        custom_format: None,
        download_dir: PathBuf::new(),
        date_after: Some("bad".to_string()),
        cookies: CookieSource::File(PathBuf::new()),
        ..DownloadOptions::default()
    };
    let errors = validate(&options);
    assert!(errors.len() >= 4, "got: {:?}", errors);
}

#[test]
fn test_quality_labels_round_trip() {
    for quality in Quality::all() {
        assert_eq!(quality.label().parse::<Quality>().unwrap(), *quality);
    }
    assert!("1081p".parse::<Quality>().is_err());
}
