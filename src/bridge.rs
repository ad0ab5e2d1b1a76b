//! Glue between the session and a [`Transport`].

use std::sync::Arc;

use tracing::{debug, warn};

use crate::protocol::{MessageRecord, RECEIVE_MESSAGE, SEND_MESSAGE};
use crate::transport::{ListenerId, Transport};

/// Sends composed records and owns the single inbound registration.
///
/// The registration is removed when the bridge is closed or dropped, so a
/// callback never outlives the session that installed it.
pub struct ChannelBridge {
    transport: Arc<dyn Transport>,
    registration: Option<ListenerId>,
}

impl ChannelBridge {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            registration: None,
        }
    }

    /// Fire-and-forget: a transport failure is logged, never returned.
    pub async fn send(&self, record: &MessageRecord) {
        debug!(
            room = record.room(),
            content_type = %record.content_type(),
            "sending message"
        );
        if let Err(e) = self.transport.emit(SEND_MESSAGE, record).await {
            warn!(room = record.room(), "send failed: {}", e);
        }
    }

    /// Install `callback` for inbound records, replacing any earlier one.
    pub fn on_receive<F>(&mut self, callback: F)
    where
        F: Fn(MessageRecord) + Send + Sync + 'static,
    {
        self.close();
        let id = self.transport.on(
            RECEIVE_MESSAGE,
            Box::new(move |record| {
                debug!(
                    room = record.room(),
                    author = record.author(),
                    "received message"
                );
                callback(record);
            }),
        );
        self.registration = Some(id);
    }

    pub fn is_registered(&self) -> bool {
        self.registration.is_some()
    }

    /// Remove the inbound registration, if any.
    pub fn close(&mut self) {
        if let Some(id) = self.registration.take() {
            self.transport.off(id);
        }
    }
}

impl Drop for ChannelBridge {
    fn drop(&mut self) {
        self.close();
    }
}
