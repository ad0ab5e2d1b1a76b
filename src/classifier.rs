//! Content-type inference for typed text and selected files.
//!
//! Classification is purely syntactic: suffixes and URL shape for text, MIME
//! prefix for files. Nothing is fetched, so a `.jpg` URL serving HTML is still
//! tagged as an image.

use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

use crate::protocol::ContentType;

static IMAGE_SUFFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\.(jpg|jpeg|png|gif)$").expect("image suffix pattern is valid"));
static VIDEO_SUFFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\.(mp4|webm|ogg)$").expect("video suffix pattern is valid"));

/// Classify a selected file from its declared MIME type.
pub fn classify_file(mime: &str) -> ContentType {
    if mime.starts_with("image/") {
        ContentType::Image
    } else if mime.starts_with("video/") {
        ContentType::Video
    } else {
        ContentType::File
    }
}

/// Classify typed text.
///
/// Media suffixes win over the generic URL check so that `https://x/pic.png`
/// is an image rather than a link.
pub fn classify_text(text: &str) -> ContentType {
    if is_image_url(text) {
        ContentType::Image
    } else if is_video_url(text) {
        ContentType::Video
    } else if is_valid_url(text) {
        ContentType::Link
    } else {
        ContentType::Text
    }
}

fn is_image_url(text: &str) -> bool {
    IMAGE_SUFFIX.is_match(text)
}

fn is_video_url(text: &str) -> bool {
    VIDEO_SUFFIX.is_match(text)
}

fn is_valid_url(text: &str) -> bool {
    Url::parse(text).is_ok()
}
