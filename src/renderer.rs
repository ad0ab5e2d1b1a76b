//! Mapping records to display content.
//!
//! Rendering is pure: the same record always yields the same [`DisplayUnit`],
//! and nothing here touches the record or the history.

use std::fmt;

use crate::protocol::{ContentType, MessageRecord};

const IMAGE_ALT: &str = "Image";
/// Source type hint for video players; the content is assumed browser-playable.
const VIDEO_SOURCE_TYPE: &str = "video/mp4";
/// Download label used when an inbound file record carries no filename.
const FALLBACK_FILENAME: &str = "attachment";

/// What the UI should show for one message body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayUnit {
    Image {
        src: String,
        alt: &'static str,
    },
    Video {
        src: String,
        source_type: &'static str,
    },
    Download {
        href: String,
        filename: String,
    },
    /// `new_context` asks the UI to open the target outside the chat view.
    Hyperlink {
        href: String,
        label: String,
        new_context: bool,
    },
    Text(String),
}

/// Whether an entry was written by the local participant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    Own,
    Other,
}

/// A fully rendered history row: body plus the metadata line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedEntry {
    pub body: DisplayUnit,
    pub author: String,
    pub time: String,
    pub origin: Origin,
}

pub fn render(record: &MessageRecord) -> DisplayUnit {
    let content = record.content().to_string();
    match record.content_type() {
        ContentType::Image => DisplayUnit::Image {
            src: content,
            alt: IMAGE_ALT,
        },
        ContentType::Video => DisplayUnit::Video {
            src: content,
            source_type: VIDEO_SOURCE_TYPE,
        },
        ContentType::File => DisplayUnit::Download {
            href: content,
            filename: record
                .filename()
                .unwrap_or(FALLBACK_FILENAME)
                .to_string(),
        },
        ContentType::Link => DisplayUnit::Hyperlink {
            href: content.clone(),
            label: content,
            new_context: true,
        },
        ContentType::Text | ContentType::Other(_) => DisplayUnit::Text(content),
    }
}

/// Render `record` as seen by `local_author`.
pub fn render_entry(record: &MessageRecord, local_author: &str) -> RenderedEntry {
    let origin = if record.author() == local_author {
        Origin::Own
    } else {
        Origin::Other
    };
    RenderedEntry {
        body: render(record),
        author: record.author().to_string(),
        time: record.timestamp().to_string(),
        origin,
    }
}

/// Shorten inline `data:` URIs to their media type and payload size.
fn summarize_source(src: &str) -> String {
    match src.strip_prefix("data:").and_then(|rest| rest.split_once(',')) {
        Some((header, payload)) => format!("<{} inline, {} chars>", header, payload.len()),
        None => src.to_string(),
    }
}

impl fmt::Display for DisplayUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DisplayUnit::Image { src, .. } => write!(f, "[image] {}", summarize_source(src)),
            DisplayUnit::Video { src, .. } => write!(f, "[video] {}", summarize_source(src)),
            DisplayUnit::Download { href, filename } => {
                write!(f, "[file] {} {}", filename, summarize_source(href))
            }
            DisplayUnit::Hyperlink { href, label, .. } if href == label => {
                write!(f, "[link] {}", href)
            }
            DisplayUnit::Hyperlink { href, label, .. } => write!(f, "[link] {} ({})", label, href),
            DisplayUnit::Text(text) => f.write_str(text),
        }
    }
}

impl fmt::Display for RenderedEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let marker = match self.origin {
            Origin::Own => " (you)",
            Origin::Other => "",
        };
        write!(f, "[{}] <{}{}> {}", self.time, self.author, marker, self.body)
    }
}
