//! Building message records from user input.

use chrono::{Local, Timelike};

use crate::classifier::{classify_file, classify_text};
use crate::encoder::{FileEncoder, SelectedFile};
use crate::error::EncodingError;
use crate::protocol::MessageRecord;

/// Composes [`MessageRecord`]s, tagging each one exactly once.
#[derive(Debug, Clone, Default)]
pub struct MessageComposer {
    encoder: FileEncoder,
}

impl MessageComposer {
    pub fn new(encoder: FileEncoder) -> Self {
        Self { encoder }
    }

    pub fn compose_from_text(&self, text: &str, room: &str, author: &str) -> MessageRecord {
        MessageRecord::new(
            room.to_string(),
            author.to_string(),
            text.to_string(),
            classify_text(text),
            None,
            current_time(),
        )
    }

    /// Encode `file` and wrap it in a record. The tag comes from the declared
    /// MIME, never from the encoded bytes.
    pub async fn compose_from_file(
        &self,
        file: &SelectedFile,
        room: &str,
        author: &str,
    ) -> Result<MessageRecord, EncodingError> {
        let content_type = classify_file(file.mime());
        let timestamp = current_time();
        let content = self.encoder.encode(file).await?;
        Ok(MessageRecord::new(
            room.to_string(),
            author.to_string(),
            content,
            content_type,
            Some(file.name().to_string()),
            timestamp,
        ))
    }
}

fn current_time() -> String {
    format_time(&Local::now())
}

/// `H:M` without zero padding, e.g. 09:05 becomes `9:5`.
pub fn format_time<T: Timelike>(time: &T) -> String {
    format!("{}:{}", time.hour(), time.minute())
}
