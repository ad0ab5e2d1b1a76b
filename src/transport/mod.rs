//! The event-channel boundary the pipeline talks to.
//!
//! - `socket`: newline-delimited JSON frames over TCP or TLS
//! - `loopback`: in-process room hub, used by tests and local demos

pub mod loopback;
pub mod socket;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::error::TransportError;
use crate::protocol::MessageRecord;

pub use loopback::{LoopbackTransport, RoomHub};
pub use socket::{Endpoint, SocketTransport};

/// Callback invoked once per inbound record for a registered event.
pub type Listener = Box<dyn Fn(MessageRecord) + Send + Sync>;

/// Handle returned by [`Transport::on`], used to deregister.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// A bidirectional, event-named message channel.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Hand `payload` to the other side under `event`.
    async fn emit(&self, event: &str, payload: &MessageRecord) -> Result<(), TransportError>;

    /// Register `listener` for `event`. Registrations survive reconnects.
    fn on(&self, event: &str, listener: Listener) -> ListenerId;

    /// Remove a registration. Unknown ids are ignored.
    fn off(&self, id: ListenerId);
}

struct Registration {
    id: ListenerId,
    event: String,
    listener: Arc<Listener>,
}

/// Event listener table shared by the transport implementations.
#[derive(Default)]
pub struct ListenerRegistry {
    next_id: AtomicU64,
    entries: Mutex<Vec<Registration>>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, event: &str, listener: Listener) -> ListenerId {
        let id = ListenerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.push(Registration {
            id,
            event: event.to_string(),
            listener: Arc::new(listener),
        });
        id
    }

    pub fn remove(&self, id: ListenerId) {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.retain(|r| r.id != id);
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Call every listener registered for `event`, in registration order.
    /// Returns how many were called.
    pub fn dispatch(&self, event: &str, record: &MessageRecord) -> usize {
        // Snapshot first so a listener may register or deregister without deadlocking.
        let targets: Vec<Arc<Listener>> = {
            let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
            entries
                .iter()
                .filter(|r| r.event == event)
                .map(|r| Arc::clone(&r.listener))
                .collect()
        };
        for listener in &targets {
            listener(record.clone());
        }
        targets.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{ContentType, RECEIVE_MESSAGE};
    use crossbeam_channel::unbounded;

    fn record(text: &str) -> MessageRecord {
        MessageRecord::new(
            "lobby".into(),
            "bob".into(),
            text.into(),
            ContentType::Text,
            None,
            "1:2".into(),
        )
    }

    #[test]
    fn test_dispatch_only_matching_event() {
        let registry = ListenerRegistry::new();
        let (tx, rx) = unbounded();
        let tx2 = tx.clone();
        registry.add(RECEIVE_MESSAGE, Box::new(move |r| tx.send(("recv", r)).unwrap()));
        registry.add("other", Box::new(move |r| tx2.send(("other", r)).unwrap()));

        assert_eq!(registry.dispatch(RECEIVE_MESSAGE, &record("hi")), 1);
        let (tag, got) = rx.try_recv().unwrap();
        assert_eq!(tag, "recv");
        assert_eq!(got.content(), "hi");
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_remove_stops_delivery() {
        let registry = ListenerRegistry::new();
        let (tx, rx) = unbounded();
        let id = registry.add(RECEIVE_MESSAGE, Box::new(move |r| tx.send(r).unwrap()));
        assert_eq!(registry.len(), 1);

        registry.remove(id);
        assert!(registry.is_empty());
        assert_eq!(registry.dispatch(RECEIVE_MESSAGE, &record("late")), 0);
        assert!(rx.try_recv().is_err());

        // Removing twice is harmless
        registry.remove(id);
    }
}
