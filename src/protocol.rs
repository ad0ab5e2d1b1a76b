//! Wire shapes shared by the session, the bridge and the transports.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Event emitted by a client to hand a record to the room broadcast service.
pub const SEND_MESSAGE: &str = "send_message";
/// Event pushed by the room broadcast service for every record from another participant.
pub const RECEIVE_MESSAGE: &str = "receive_message";

/// Classification tag carried by every message.
///
/// Serialized as a lowercase string. Tags this client does not know are kept
/// verbatim in [`ContentType::Other`] and render as plain text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ContentType {
    #[default]
    Text,
    Link,
    Image,
    Video,
    File,
    Other(String),
}

impl ContentType {
    pub fn as_str(&self) -> &str {
        match self {
            ContentType::Text => "text",
            ContentType::Link => "link",
            ContentType::Image => "image",
            ContentType::Video => "video",
            ContentType::File => "file",
            ContentType::Other(tag) => tag,
        }
    }
}

impl From<String> for ContentType {
    fn from(tag: String) -> Self {
        match tag.as_str() {
            "text" => ContentType::Text,
            "link" => ContentType::Link,
            "image" => ContentType::Image,
            "video" => ContentType::Video,
            "file" => ContentType::File,
            _ => ContentType::Other(tag),
        }
    }
}

impl From<ContentType> for String {
    fn from(content_type: ContentType) -> Self {
        match content_type {
            ContentType::Other(tag) => tag,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single chat message, as composed locally or received from the room.
///
/// Records are immutable: fields are private and only readable through
/// accessors, so nothing downstream of composition can re-tag or edit one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageRecord {
    room: String,
    author: String,
    #[serde(rename = "message")]
    content: String,
    #[serde(rename = "type", default)]
    content_type: ContentType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    filename: Option<String>,
    #[serde(rename = "time", default)]
    timestamp: String,
}

impl MessageRecord {
    pub(crate) fn new(
        room: String,
        author: String,
        content: String,
        content_type: ContentType,
        filename: Option<String>,
        timestamp: String,
    ) -> Self {
        Self {
            room,
            author,
            content,
            content_type,
            filename,
            timestamp,
        }
    }

    pub fn room(&self) -> &str {
        &self.room
    }

    pub fn author(&self) -> &str {
        &self.author
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn content_type(&self) -> &ContentType {
        &self.content_type
    }

    pub fn filename(&self) -> Option<&str> {
        self.filename.as_deref()
    }

    pub fn timestamp(&self) -> &str {
        &self.timestamp
    }
}

/// Outbound frame on a line-oriented transport: `{"event": .., "data": ..}`.
#[derive(Debug, Serialize)]
pub struct OutgoingFrame<'a> {
    pub event: &'a str,
    pub data: &'a MessageRecord,
}

/// Inbound frame on a line-oriented transport.
#[derive(Debug, Deserialize)]
pub struct IncomingFrame {
    pub event: String,
    pub data: MessageRecord,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(content_type: ContentType, filename: Option<&str>) -> MessageRecord {
        MessageRecord::new(
            "lobby".into(),
            "alice".into(),
            "hi".into(),
            content_type,
            filename.map(str::to_string),
            "9:5".into(),
        )
    }

    #[test]
    fn test_record_uses_flat_wire_field_names() {
        let value = serde_json::to_value(sample(ContentType::Text, None)).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "room": "lobby",
                "author": "alice",
                "message": "hi",
                "type": "text",
                "time": "9:5",
            })
        );
    }

    #[test]
    fn test_filename_only_serialized_when_present() {
        let value = serde_json::to_value(sample(ContentType::File, Some("report.pdf"))).unwrap();
        assert_eq!(value["filename"], "report.pdf");
        assert_eq!(value["type"], "file");
    }

    #[test]
    fn test_unknown_tag_is_preserved() {
        let json = r#"{"room":"r","author":"bob","message":"x","type":"sticker","time":"1:2"}"#;
        let record: MessageRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.content_type(), &ContentType::Other("sticker".into()));
        let back = serde_json::to_value(&record).unwrap();
        assert_eq!(back["type"], "sticker");
    }

    #[test]
    fn test_missing_type_defaults_to_text() {
        let json = r#"{"room":"r","author":"bob","message":"plain"}"#;
        let record: MessageRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.content_type(), &ContentType::Text);
        assert_eq!(record.timestamp(), "");
        assert!(record.filename().is_none());
    }

    #[test]
    fn test_frames() {
        let record = sample(ContentType::Link, None);
        let line = serde_json::to_string(&OutgoingFrame {
            event: SEND_MESSAGE,
            data: &record,
        })
        .unwrap();
        let parsed: IncomingFrame = serde_json::from_str(&line).unwrap();
        assert_eq!(parsed.event, SEND_MESSAGE);
        assert_eq!(parsed.data, record);
    }
}
