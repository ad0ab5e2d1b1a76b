//! In-process room broadcast service.
//!
//! Every `send_message` emitted by one client is delivered as
//! `receive_message` to all other clients that joined the record's room.
//! The sender is skipped; it already echoed the record locally.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tracing::trace;

use super::{Listener, ListenerId, ListenerRegistry, Transport};
use crate::error::TransportError;
use crate::protocol::{MessageRecord, RECEIVE_MESSAGE, SEND_MESSAGE};

struct Client {
    id: u64,
    rooms: Mutex<HashSet<String>>,
    listeners: ListenerRegistry,
}

impl Client {
    fn in_room(&self, room: &str) -> bool {
        self.rooms
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .contains(room)
    }
}

#[derive(Default)]
struct HubInner {
    next_id: AtomicU64,
    clients: Mutex<Vec<Arc<Client>>>,
}

/// Shared hub that [`LoopbackTransport`]s connect to.
#[derive(Clone, Default)]
pub struct RoomHub {
    inner: Arc<HubInner>,
}

impl RoomHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn connect(&self) -> LoopbackTransport {
        let client = Arc::new(Client {
            id: self.inner.next_id.fetch_add(1, Ordering::Relaxed),
            rooms: Mutex::new(HashSet::new()),
            listeners: ListenerRegistry::new(),
        });
        self.inner
            .clients
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(Arc::clone(&client));
        LoopbackTransport {
            hub: Arc::clone(&self.inner),
            client,
            offline: AtomicBool::new(false),
        }
    }

    /// Number of connected clients.
    pub fn client_count(&self) -> usize {
        self.inner
            .clients
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .len()
    }

    fn broadcast(hub: &HubInner, sender: u64, record: &MessageRecord) -> usize {
        let recipients: Vec<Arc<Client>> = hub
            .clients
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .filter(|c| c.id != sender && c.in_room(record.room()))
            .cloned()
            .collect();
        for client in &recipients {
            client.listeners.dispatch(RECEIVE_MESSAGE, record);
        }
        recipients.len()
    }
}

/// One participant's connection to a [`RoomHub`].
pub struct LoopbackTransport {
    hub: Arc<HubInner>,
    client: Arc<Client>,
    offline: AtomicBool,
}

impl LoopbackTransport {
    pub fn join(&self, room: &str) {
        self.client
            .rooms
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(room.to_string());
    }

    pub fn leave(&self, room: &str) {
        self.client
            .rooms
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(room);
    }

    /// Simulate a dropped link: while offline every `emit` fails.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::Relaxed);
    }

    /// Number of listeners currently registered on this connection.
    pub fn listener_count(&self) -> usize {
        self.client.listeners.len()
    }
}

#[async_trait]
impl Transport for LoopbackTransport {
    async fn emit(&self, event: &str, payload: &MessageRecord) -> Result<(), TransportError> {
        if self.offline.load(Ordering::Relaxed) {
            return Err(TransportError::NotConnected);
        }
        if event == SEND_MESSAGE {
            let delivered = RoomHub::broadcast(&self.hub, self.client.id, payload);
            trace!(room = payload.room(), delivered, "loopback broadcast");
        }
        Ok(())
    }

    fn on(&self, event: &str, listener: Listener) -> ListenerId {
        self.client.listeners.add(event, listener)
    }

    fn off(&self, id: ListenerId) {
        self.client.listeners.remove(id);
    }
}

impl Drop for LoopbackTransport {
    fn drop(&mut self) {
        let id = self.client.id;
        self.hub
            .clients
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .retain(|c| c.id != id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::ContentType;
    use crossbeam_channel::unbounded;

    fn record(room: &str, author: &str) -> MessageRecord {
        MessageRecord::new(
            room.into(),
            author.into(),
            "hey".into(),
            ContentType::Text,
            None,
            "10:0".into(),
        )
    }

    #[tokio::test]
    async fn test_broadcast_reaches_room_members_but_not_sender() {
        let hub = RoomHub::new();
        let alice = hub.connect();
        let bob = hub.connect();
        let carol = hub.connect();
        alice.join("lobby");
        bob.join("lobby");
        carol.join("elsewhere");

        let (tx, rx) = unbounded();
        for (name, client) in [("alice", &alice), ("bob", &bob), ("carol", &carol)] {
            let tx = tx.clone();
            client.on(RECEIVE_MESSAGE, Box::new(move |r| tx.send((name, r)).unwrap()));
        }

        alice.emit(SEND_MESSAGE, &record("lobby", "alice")).await.unwrap();

        let (who, got) = rx.try_recv().unwrap();
        assert_eq!(who, "bob");
        assert_eq!(got.author(), "alice");
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_offline_emit_fails() {
        let hub = RoomHub::new();
        let alice = hub.connect();
        alice.set_offline(true);
        let err = alice.emit(SEND_MESSAGE, &record("lobby", "alice")).await;
        assert!(matches!(err, Err(TransportError::NotConnected)));
    }

    #[test]
    fn test_drop_disconnects_from_hub() {
        let hub = RoomHub::new();
        let alice = hub.connect();
        let _bob = hub.connect();
        assert_eq!(hub.client_count(), 2);
        drop(alice);
        assert_eq!(hub.client_count(), 1);
    }
}
