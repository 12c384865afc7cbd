/// Video URL handling: id extraction, submission validation and watch links
use crate::error::UrlError;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;

/// Length of a YouTube video id
pub const VIDEO_ID_LEN: usize = 11;

static VIDEO_ID_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^.*((youtu\.be/)|(v/)|(/u/[A-Za-z0-9_]+/)|(embed/)|(watch\?))\??v?=?([^#&?]*).*")
        .expect("video id pattern is valid")
});

static SUBMISSION_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(https?://)?(www\.)?(youtube\.com/(watch\?v=|embed/|v/)|youtu\.be/)[A-Za-z0-9_-]+")
        .expect("submission pattern is valid")
});

/// An 11-character video identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VideoId(String);

impl VideoId {
    /// Extract the id from any supported URL form
    pub fn from_url(url: &str) -> Option<Self> {
        extract_video_id(url).map(Self)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Watch link that starts playback at `start_seconds`
    pub fn watch_url(&self, start_seconds: u32) -> Url {
        let mut url = Url::parse("https://www.youtube.com/watch").expect("base watch URL is valid");
        url.query_pairs_mut()
            .append_pair("v", &self.0)
            .append_pair("t", &format!("{}s", start_seconds));
        url
    }
}

impl fmt::Display for VideoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Extract the trailing video token from a URL
///
/// Recognizes `youtu.be/`, `/v/`, `/u/<user>/`, `/embed/` and `watch?v=`.
/// The token is returned only when it is exactly 11 characters of the id
/// alphabet (ASCII letters, digits, `-` and `_`).
pub fn extract_video_id(url: &str) -> Option<String> {
    let captures = VIDEO_ID_PATTERN.captures(url)?;
    let token = captures.get(7)?.as_str();
    if token.len() == VIDEO_ID_LEN && token.bytes().all(is_id_byte) {
        Some(token.to_string())
    } else {
        None
    }
}

fn is_id_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'-' || b == b'_'
}

/// Validate a URL submitted for analysis
pub fn validate_submission(url: &str) -> Result<(), UrlError> {
    let trimmed = url.trim();
    if trimmed.is_empty() {
        return Err(UrlError::EmptyUrl);
    }

    if !SUBMISSION_PATTERN.is_match(trimmed) {
        return Err(UrlError::UnsupportedUrl);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_short_link() {
        assert_eq!(extract_video_id("https://youtu.be/dQw4w9WgXcQ").as_deref(), Some("dQw4w9WgXcQ"));
    }

    #[test]
    fn test_extract_watch_link_with_extra_params() {
        assert_eq!(
            extract_video_id("https://youtube.com/watch?v=dQw4w9WgXcQ&t=5").as_deref(),
            Some("dQw4w9WgXcQ")
        );
        assert_eq!(
            extract_video_id("https://www.youtube.com/watch?v=dQw4w9WgXcQ#comments").as_deref(),
            Some("dQw4w9WgXcQ")
        );
    }

    #[test]
    fn test_extract_embed_and_v_forms() {
        assert_eq!(
            extract_video_id("https://www.youtube.com/embed/dQw4w9WgXcQ?start=3").as_deref(),
            Some("dQw4w9WgXcQ")
        );
        assert_eq!(extract_video_id("https://www.youtube.com/v/dQw4w9WgXcQ").as_deref(), Some("dQw4w9WgXcQ"));
        assert_eq!(
            extract_video_id("https://www.youtube.com/u/coach/dQw4w9WgXcQ").as_deref(),
            Some("dQw4w9WgXcQ")
        );
    }

    #[test]
    fn test_extract_rejects_wrong_length_and_garbage() {
        assert_eq!(extract_video_id("not a url"), None);
        assert_eq!(extract_video_id("https://youtu.be/short"), None);
        assert_eq!(extract_video_id("https://youtu.be/dQw4w9WgXcQxyz"), None);
        assert_eq!(extract_video_id(""), None);
    }

    #[test]
    fn test_extract_rejects_non_ascii_tokens() {
        // 11 chars but not 11 bytes
        assert_eq!(extract_video_id("https://youtu.be/dQw4w9WgXcé"), None);
        assert_eq!(extract_video_id("https://youtu.be/ééééééééééé"), None);
        assert_eq!(extract_video_id("https://www.youtube.com/u/coäch/dQw4w9WgXcQ"), None);
        assert_eq!(extract_video_id("https://youtu.be/dQw4w9WgX.Q"), None);
        assert_eq!(extract_video_id("https://youtu.be/dQw4w9-gX_Q").as_deref(), Some("dQw4w9-gX_Q"));
    }

    #[test]
    fn test_watch_url() {
        let id = VideoId::from_url("https://youtu.be/dQw4w9WgXcQ").unwrap();
        assert_eq!(id.watch_url(65).as_str(), "https://www.youtube.com/watch?v=dQw4w9WgXcQ&t=65s");
    }

    #[test]
    fn test_validate_submission() {
        assert_eq!(validate_submission("   "), Err(UrlError::EmptyUrl));
        assert_eq!(validate_submission("https://vimeo.com/12345"), Err(UrlError::UnsupportedUrl));
        assert!(validate_submission("youtu.be/dQw4w9WgXcQ").is_ok());
        assert!(validate_submission("https://www.youtube.com/watch?v=dQw4w9WgXcQ").is_ok());
    }
}
