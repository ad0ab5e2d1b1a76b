//! Append-only message history for one chat session.

use crate::protocol::MessageRecord;

/// Append-only, arrival-ordered message log for one session.
///
/// There is no capacity bound and no way to edit or remove an entry.
#[derive(Debug, Default, Clone)]
pub struct MessageHistory {
    records: Vec<MessageRecord>,
}

impl MessageHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, record: MessageRecord) {
        self.records.push(record);
    }

    /// Iterate the records in arrival order. Each call starts over from the
    /// first record and sees everything appended so far.
    pub fn as_sequence(&self) -> impl Iterator<Item = &MessageRecord> + '_ {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&MessageRecord> {
        self.records.get(index)
    }

    pub fn last(&self) -> Option<&MessageRecord> {
        self.records.last()
    }
}
