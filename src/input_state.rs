//! Pending input for message composition.
//!
//! Holds what the user has typed and which file, if any, is waiting to be
//! sent. The session decides what a submit turns into; this module only
//! tracks the two input affordances.

use tracing::debug;

use crate::encoder::SelectedFile;

/// What a submit would send right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingSend {
    /// A file is selected; it wins over any typed text.
    File,
    Text,
    Nothing,
}

#[derive(Debug, Default, Clone)]
pub struct InputState {
    /// Current message being composed
    message_input: String,

    /// File chosen for sending, replaced by each new selection
    selected_file: Option<SelectedFile>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&self) -> &str {
        &self.message_input
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.message_input = text.into();
    }

    pub fn clear_text(&mut self) {
        self.message_input.clear();
    }

    pub fn selected_file(&self) -> Option<&SelectedFile> {
        self.selected_file.as_ref()
    }

    /// Select `file`, discarding any earlier unsent selection.
    pub fn select_file(&mut self, file: SelectedFile) {
        debug!(name = file.name(), mime = file.mime(), "selected file");
        self.selected_file = Some(file);
    }

    pub fn clear_file(&mut self) {
        self.selected_file = None;
    }

    pub fn pending(&self) -> PendingSend {
        if self.selected_file.is_some() {
            PendingSend::File
        } else if !self.message_input.trim().is_empty() {
            PendingSend::Text
        } else {
            PendingSend::Nothing
        }
    }
}
