//! Video link normalisation.
//!
//! Experts paste whatever link their browser shows; the player only accepts
//! the embed form. Authoring previews and published playback both go through
//! [`normalize_video_url`], so a link that previews is a link that plays.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

pub const VIDEO_ID_LEN: usize = 11;
pub const EMBED_BASE: &str = "https://www.youtube.com/embed/";

/// Greedy prefix picks the last marker in the string; the id runs until the
/// next query/fragment separator.
#[allow(clippy::expect_used)]
static VIDEO_LINK_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^.*(youtu\.be/|v/|u/\w/|embed/|watch\?\s*v=|&v=)([^#&?]*).*")
        .expect("video link regex is valid")
});

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmbeddableVideo {
    pub video_id: String,
    pub embed_url: String,
}

/// Extracts the 11-character platform id, or `None` when the text is not a
/// recognised video link.
pub fn extract_video_id(input: &str) -> Option<&str> {
    let caps = VIDEO_LINK_PATTERN.captures(input.trim())?;
    let id = caps.get(2)?.as_str();
    (id.chars().count() == VIDEO_ID_LEN).then_some(id)
}

pub fn normalize_video_url(input: &str) -> Option<EmbeddableVideo> {
    let id = extract_video_id(input)?;
    Some(EmbeddableVideo {
        video_id: id.to_string(),
        embed_url: format!("{}{}", EMBED_BASE, id),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const ID: &str = "dQw4w9WgXcQ";

    #[test]
    fn watch_short_and_embed_forms_agree() {
        let forms = [
            format!("https://www.youtube.com/watch?v={}", ID),
            format!("https://youtu.be/{}", ID),
            format!("https://www.youtube.com/embed/{}", ID),
        ];
        let normalized: Vec<_> = forms.iter().map(|f| normalize_video_url(f)).collect();
        let expected = Some(EmbeddableVideo {
            video_id: ID.to_string(),
            embed_url: format!("https://www.youtube.com/embed/{}", ID),
        });
        for n in normalized {
            assert_eq!(n, expected);
        }
    }

    #[test]
    fn handles_query_noise_and_legacy_forms() {
        let cases = [
            format!("https://www.youtube.com/watch?v={}&feature=share", ID),
            format!("https://www.youtube.com/watch?feature=player&v={}", ID),
            format!("https://youtu.be/{}?t=42", ID),
            format!("https://www.youtube.com/v/{}?version=3", ID),
            format!("https://www.youtube.com/user/GPSCPrep#p/u/1/{}", ID),
            format!("  https://m.youtube.com/watch?v={}#t=10  ", ID),
            format!("https://www.youtube.com/watch? v={}", ID),
            format!("https://www.youtube.com/watch?\tv={}&list=PL1", ID),
        ];
        for case in &cases {
            assert_eq!(extract_video_id(case), Some(ID), "case: {}", case);
        }
    }

    #[test]
    fn rejects_non_video_text() {
        assert_eq!(normalize_video_url("hello world"), None);
        assert_eq!(normalize_video_url(""), None);
        assert_eq!(normalize_video_url("https://example.com/lecture.mp4"), None);
    }

    #[test]
    fn rejects_ids_of_wrong_length() {
        assert_eq!(extract_video_id("https://youtu.be/short"), None);
        assert_eq!(
            extract_video_id("https://www.youtube.com/watch?v=dQw4w9WgXcQX"),
            None
        );
        assert_eq!(extract_video_id("https://www.youtube.com/embed/"), None);
    }
}
