// src/format.rs
// Pure lookup tables mapping quality/container/codec choices to yt-dlp
// format-selector strings

use crate::config::DEFAULT_FORMAT_SPEC;
use crate::options::{AudioCodec, Container, Quality};

/// Audio codec to selector. Opus ids are a ranked fallback chain.
pub fn audio_selector(codec: AudioCodec) -> &'static str {
    match codec {
        AudioCodec::Best => "bestaudio",
        AudioCodec::Opus => "251/250/249",
        AudioCodec::Aac => "140",
    }
}

/// Known-good numeric format ids per quality: [H.264, VP9, AV1].
/// An empty string means the codec is not offered at that quality.
fn quality_ids(quality: Quality) -> Option<[&'static str; 3]> {
    match quality {
        Quality::Q8K | Quality::Q4K => Some(["", "313", "401"]),
        Quality::Q1440 => Some(["", "271", "400"]),
        Quality::Q1080 => Some(["137", "248", "399"]),
        Quality::Q720 => Some(["136", "247", "398"]),
        Quality::Q480 => Some(["135", "244", "397"]),
        Quality::Q360 => Some(["134", "243", "396"]),
        Quality::Q240 => Some(["133", "242", "395"]),
        Quality::Best | Quality::Custom => None,
    }
}

/// Bracket-filtered fallback expression when a quality has no fixed id for
/// the requested container.
fn container_fallback(container: Container, audio: &str) -> Option<String> {
    match container {
        Container::Mp4H264 => Some(format!("bestvideo[ext=mp4]+{}/best[ext=mp4]", audio)),
        Container::WebmVp9 => Some(format!("bestvideo[ext=webm]+{}/best[ext=webm]", audio)),
        Container::Mp4Av1 => Some(format!("bestvideo[vcodec^=av01]+{}", audio)),
        Container::Auto | Container::AudioOnly => None,
    }
}

/// Resolve a format selector from the fixed tables.
///
/// Audio-only wins over everything else; a custom quality returns the caller
/// supplied selector verbatim, or "248+251" when it is absent;
/// "best" composes bracket expressions; any other quality picks a numeric id
/// column by container, auto preferring VP9, then AV1, then H.264.
pub fn resolve(
    quality: Quality,
    container: Container,
    codec: AudioCodec,
    custom_format: Option<&str>,
) -> String {
    let audio = audio_selector(codec);

    if container == Container::AudioOnly {
        return audio.to_string();
    }

    if quality == Quality::Custom {
        return match custom_format {
            Some(spec) if !spec.trim().is_empty() => spec.trim().to_string(),
            _ => DEFAULT_FORMAT_SPEC.to_string(),
        };
    }

    if quality == Quality::Best {
        return match container {
            Container::Auto => "bestvideo+bestaudio/best".to_string(),
            other => container_fallback(other, audio)
                .unwrap_or_else(|| "bestvideo+bestaudio/best".to_string()),
        };
    }

    let ids = match quality_ids(quality) {
        Some(ids) => ids,
        None => return DEFAULT_FORMAT_SPEC.to_string(),
    };

    match container {
        Container::Auto => {
            // Preference order: VP9, AV1, H.264
            for &column in &[1, 2, 0] {
                if !ids[column].is_empty() {
                    return format!("{}+{}", ids[column], audio);
                }
            }
            format!("{}+{}", ids[1], audio)
        }
        Container::Mp4H264 | Container::WebmVp9 | Container::Mp4Av1 => {
            let column = match container {
                Container::Mp4H264 => 0,
                Container::WebmVp9 => 1,
                _ => 2,
            };
            if ids[column].is_empty() {
                container_fallback(container, audio)
                    .unwrap_or_else(|| DEFAULT_FORMAT_SPEC.to_string())
            } else {
                format!("{}+{}", ids[column], audio)
            }
        }
        Container::AudioOnly => audio.to_string(),
    }
}
