//! One mounted chat view: history, pending input and the channel bridge.
//!
//! `ChatSession` is the only owner of its [`MessageHistory`]. The history is
//! appended to from exactly two places: [`ChatSession::submit`] for local
//! sends and [`ChatSession::process_inbound`] for records pushed by the
//! transport. `submit` drains the inbound queue first, so a local echo never
//! overtakes a record that arrived before it.

use std::sync::Arc;

use crossbeam_channel::{unbounded, Receiver};
use tracing::{debug, info};

use crate::bridge::ChannelBridge;
use crate::composer::MessageComposer;
use crate::encoder::SelectedFile;
use crate::error::ChatError;
use crate::history::MessageHistory;
use crate::input_state::{InputState, PendingSend};
use crate::protocol::MessageRecord;
use crate::renderer::{render_entry, RenderedEntry};
use crate::transport::Transport;

pub struct ChatSession {
    room: String,
    author: String,
    input: InputState,
    history: MessageHistory,
    composer: MessageComposer,
    bridge: ChannelBridge,
    /// Inbound records queued by the transport callback, drained in delivery order.
    inbound_rx: Receiver<MessageRecord>,
}

impl ChatSession {
    pub fn start(
        transport: Arc<dyn Transport>,
        room: impl Into<String>,
        author: impl Into<String>,
    ) -> Self {
        Self::with_composer(transport, room, author, MessageComposer::default())
    }

    pub fn with_composer(
        transport: Arc<dyn Transport>,
        room: impl Into<String>,
        author: impl Into<String>,
        composer: MessageComposer,
    ) -> Self {
        let room = room.into();
        let author = author.into();
        let (inbound_tx, inbound_rx) = unbounded::<MessageRecord>();

        let mut bridge = ChannelBridge::new(transport);
        bridge.on_receive(move |record| {
            // The receiver only goes away with the session, which deregisters first.
            let _ = inbound_tx.send(record);
        });

        info!(room = %room, author = %author, "chat session started");
        Self {
            room,
            author,
            input: InputState::new(),
            history: MessageHistory::new(),
            composer,
            bridge,
            inbound_rx,
        }
    }

    pub fn room(&self) -> &str {
        &self.room
    }

    pub fn author(&self) -> &str {
        &self.author
    }

    pub fn input(&self) -> &InputState {
        &self.input
    }

    pub fn history(&self) -> &MessageHistory {
        &self.history
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.input.set_text(text);
    }

    pub fn select_file(&mut self, file: SelectedFile) {
        self.input.select_file(file);
    }

    pub fn clear_file(&mut self) {
        self.input.clear_file();
    }

    /// Send whatever is pending and echo it into the history.
    ///
    /// A selected file wins over typed text; sending it keeps the text. With
    /// nothing to send this returns `Ok(None)`. An encoding failure leaves
    /// the history and the selection untouched.
    ///
    /// Inbound records already queued are appended before the local echo, so
    /// the history keeps arrival order even between ticks.
    ///
    /// Dropping the future before the emit starts leaves nothing behind.
    /// Dropping it while [`Transport::emit`](crate::transport::Transport::emit)
    /// is pending may leave the frame on the wire without the local echo.
    pub async fn submit(&mut self) -> Result<Option<&MessageRecord>, ChatError> {
        let pending = self.input.pending();
        let record = match (pending, self.input.selected_file()) {
            (PendingSend::File, Some(file)) => {
                self.composer
                    .compose_from_file(file, &self.room, &self.author)
                    .await?
            }
            (PendingSend::Text, _) => {
                self.composer
                    .compose_from_text(self.input.text(), &self.room, &self.author)
            }
            _ => return Ok(None),
        };

        self.bridge.send(&record).await;
        self.process_inbound();
        self.history.append(record);

        match pending {
            PendingSend::File => self.input.clear_file(),
            _ => self.input.clear_text(),
        }
        Ok(self.history.last())
    }

    /// Append every inbound record received since the last call. Returns how
    /// many were appended.
    pub fn process_inbound(&mut self) -> usize {
        let mut appended = 0;
        while let Ok(record) = self.inbound_rx.try_recv() {
            self.history.append(record);
            appended += 1;
        }
        if appended > 0 {
            debug!(appended, total = self.history.len(), "inbound messages appended");
        }
        appended
    }

    /// Rendered view of the whole history, from this participant's point of view.
    pub fn rendered(&self) -> impl Iterator<Item = RenderedEntry> + '_ {
        self.history
            .as_sequence()
            .map(move |record| render_entry(record, &self.author))
    }

    /// End the session and deregister the inbound callback.
    pub fn end(mut self) {
        self.bridge.close();
        info!(room = %self.room, "chat session ended");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TransportError;
    use crate::protocol::ContentType;
    use crate::transport::{Listener, ListenerId, ListenerRegistry, RoomHub};
    use async_trait::async_trait;
    use std::time::Duration;

    /// Accepts registrations but never finishes an emit.
    #[derive(Default)]
    struct StalledTransport {
        listeners: ListenerRegistry,
    }

    #[async_trait]
    impl Transport for StalledTransport {
        async fn emit(&self, _event: &str, _payload: &MessageRecord) -> Result<(), TransportError> {
            std::future::pending().await
        }

        fn on(&self, event: &str, listener: Listener) -> ListenerId {
            self.listeners.add(event, listener)
        }

        fn off(&self, id: ListenerId) {
            self.listeners.remove(id);
        }
    }

    #[tokio::test]
    async fn test_empty_submit_is_noop() {
        let hub = RoomHub::new();
        let mut session = ChatSession::start(Arc::new(hub.connect()), "lobby", "alice");
        assert!(session.submit().await.unwrap().is_none());

        session.set_text("   ");
        assert!(session.submit().await.unwrap().is_none());
        assert!(session.history().is_empty());
    }

    #[tokio::test]
    async fn test_text_submit_appends_and_clears_text() {
        let hub = RoomHub::new();
        let mut session = ChatSession::start(Arc::new(hub.connect()), "lobby", "alice");
        session.set_text("hello world");

        let record = session.submit().await.unwrap().cloned().unwrap();
        assert_eq!(record.content_type(), &ContentType::Text);
        assert_eq!(record.author(), "alice");
        assert_eq!(record.room(), "lobby");
        assert_eq!(session.history().len(), 1);
        assert!(session.input().text().is_empty());
    }

    #[tokio::test]
    async fn test_failed_encode_leaves_history_and_selection() {
        let hub = RoomHub::new();
        let mut session = ChatSession::start(Arc::new(hub.connect()), "lobby", "alice");
        session.set_text("caption");
        session.select_file(SelectedFile::new("/missing/file.pdf", "file.pdf", "application/pdf"));

        let err = session.submit().await.unwrap_err();
        assert!(matches!(err, ChatError::Encoding(_)));
        assert!(session.history().is_empty());
        assert!(session.input().selected_file().is_some());
        assert_eq!(session.input().text(), "caption");
    }

    #[tokio::test]
    async fn test_offline_transport_still_echoes_locally() {
        let hub = RoomHub::new();
        let transport = Arc::new(hub.connect());
        transport.set_offline(true);
        let mut session = ChatSession::start(transport, "lobby", "alice");
        session.set_text("anyone?");
        assert!(session.submit().await.unwrap().is_some());
        assert_eq!(session.history().len(), 1);
    }

    #[tokio::test]
    async fn test_dropped_submit_during_emit_skips_echo() {
        let mut session =
            ChatSession::start(Arc::new(StalledTransport::default()), "lobby", "alice");
        session.set_text("stuck");

        let sent = tokio::time::timeout(Duration::from_millis(50), session.submit()).await;
        assert!(sent.is_err());
        assert!(session.history().is_empty());
        assert_eq!(session.input().text(), "stuck");
    }

    #[test]
    fn test_end_deregisters_callback() {
        let hub = RoomHub::new();
        let transport = Arc::new(hub.connect());
        let session = ChatSession::start(transport.clone(), "lobby", "alice");
        assert_eq!(transport.listener_count(), 1);
        session.end();
        assert_eq!(transport.listener_count(), 0);
    }
}
