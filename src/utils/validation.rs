//! URL and input validation utilities

use regex::Regex;
use std::sync::OnceLock;
use url::Url;

/// Check if URL is a valid http(s) URL
pub fn is_valid_video_url(url: &str) -> bool {
    if let Ok(parsed) = Url::parse(url) {
        let scheme = parsed.scheme();
        scheme == "http" || scheme == "https"
    } else {
        false
    }
}

pub fn is_youtube_url(url: &str) -> bool {
    match Url::parse(url) {
        Ok(parsed) => parsed.host_str().is_some_and(|host| {
            host == "youtu.be" || host == "youtube.com" || host.ends_with(".youtube.com")
        }),
        Err(_) => false,
    }
}

/// Language codes as accepted by `--sub-langs` ("en", "vi", "pt-BR", "zh-Hans")
pub fn is_valid_language_code(code: &str) -> bool {
    static LANGUAGE_CODE: OnceLock<Regex> = OnceLock::new();
    LANGUAGE_CODE
        .get_or_init(|| {
            Regex::new(r"^[A-Za-z]{2,3}(-[A-Za-z0-9]{2,8})*$").expect("language code regex")
        })
        .is_match(code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_valid_video_url() {
        assert!(is_valid_video_url("https://www.youtube.com/playlist?list=PL123"));
        assert!(!is_valid_video_url("ftp://example.com/file"));
        assert!(!is_valid_video_url("not a url"));
    }

    #[test]
    fn test_is_youtube_url() {
        assert!(is_youtube_url("https://www.youtube.com/watch?v=dQw4w9WgXcQ"));
        assert!(is_youtube_url("https://youtu.be/dQw4w9WgXcQ"));
        assert!(is_youtube_url("https://m.youtube.com/@channel/videos"));
        assert!(!is_youtube_url("https://notyoutube.com/watch?v=x"));
        assert!(!is_youtube_url("vid1"));
    }

    #[test]
    fn test_language_codes() {
        for code in ["en", "vi", "pt-BR", "zh-Hans", "fil"] {
            assert!(is_valid_language_code(code), "{code}");
        }
        for code in ["", "e", "english", "en_US", "en,vi"] {
            assert!(!is_valid_language_code(code), "{code}");
        }
    }
}
