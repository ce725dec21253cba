// src/urls.rs
// URL normalization and filename helpers

use once_cell::sync::Lazy;
use regex::Regex;

static VIDEO_ID_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        Regex::new(r"(?:v=|/)([0-9A-Za-z_-]{11})").unwrap(),
        Regex::new(r"(?:embed/)([0-9A-Za-z_-]{11})").unwrap(),
        Regex::new(r"(?:watch\?v=)([0-9A-Za-z_-]{11})").unwrap(),
    ]
});

static ILLEGAL_FILENAME_CHARS: Lazy<Regex> = Lazy::new(|| Regex::new(r#"[<>:"/\\|?*]"#).unwrap());

/// Turn a bare video id into a full watch URL. Ids starting with `-` would
/// otherwise be mistaken for a flag by yt-dlp.
pub fn normalize_url(url: &str) -> String {
    if !url.starts_with("http://") && !url.starts_with("https://") {
        format!("https://www.youtube.com/watch?v={}", url)
    } else {
        url.to_string()
    }
}

/// Build a watch URL from a playlist entry id.
pub fn watch_url(video_id: &str) -> String {
    format!("https://www.youtube.com/watch?v={}", video_id)
}

/// Extract the 11-character video id from a watch/short/embed URL.
pub fn extract_video_id(url: &str) -> Option<String> {
    for pattern in VIDEO_ID_PATTERNS.iter() {
        if let Some(captures) = pattern.captures(url) {
            if let Some(id) = captures.get(1) {
                return Some(id.as_str().to_string());
            }
        }
    }
    None
}

/// Replace characters that are illegal in filenames with underscores.
pub fn clean_filename(filename: &str) -> String {
    ILLEGAL_FILENAME_CHARS.replace_all(filename, "_").into_owned()
}
