// tests/urls_test.rs
use ytloader::urls::{clean_filename, extract_video_id, normalize_url, watch_url};

#[test]
fn test_full_urls_pass_through_unchanged() {
    assert_eq!(
        normalize_url("https://www.youtube.com/watch?v=dQw4w9WgXcQ"),
        "https://www.youtube.com/watch?v=dQw4w9WgXcQ"
    );
    assert_eq!(
        normalize_url("http://youtu.be/dQw4w9WgXcQ"),
        "http://youtu.be/dQw4w9WgXcQ"
    );
}

#[test]
fn test_bare_ids_become_watch_urls() {
    assert_eq!(
        normalize_url("dQw4w9WgXcQ"),
        "https://www.youtube.com/watch?v=dQw4w9WgXcQ"
    );
}

#[test]
fn test_leading_dash_ids_keep_the_dash() {
    // Ids really can start with a dash; wrapping them in a watch URL is what
    // keeps yt-dlp from reading them as a flag
    assert_eq!(
        normalize_url("-Abc123XyZ_w"),
        "https://www.youtube.com/watch?v=-Abc123XyZ_w"
    );
}

#[test]
fn test_watch_url_from_id() {
    assert_eq!(
        watch_url("dQw4w9WgXcQ"),
        "https://www.youtube.com/watch?v=dQw4w9WgXcQ"
    );
}

#[test]
fn test_extract_video_id_from_common_shapes() {
    for url in [
        "https://www.youtube.com/watch?v=dQw4w9WgXcQ",
        "https://youtu.be/dQw4w9WgXcQ",
        "https://www.youtube.com/embed/dQw4w9WgXcQ",
        "https://www.youtube.com/watch?v=dQw4w9WgXcQ&t=42s",
    ] {
        assert_eq!(
            extract_video_id(url).as_deref(),
            Some("dQw4w9WgXcQ"),
            "failed for {}",
            url
        );
    }
    assert_eq!(extract_video_id("not a url"), None);
}

#[test]
fn test_clean_filename_replaces_illegal_characters() {
    assert_eq!(clean_filename("a/b\\c:d*e?f\"g<h>i|j"), "a_b_c_d_e_f_g_h_i_j");
    assert_eq!(clean_filename("already fine - (1080p)"), "already fine - (1080p)");
}
