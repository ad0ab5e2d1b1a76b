//! Line-framed JSON transport over TCP or TLS.
//!
//! Each frame is one line: `{"event":"send_message","data":{...}}`. Lines are
//! not length-capped since attachments travel inline as data URIs.
//!
//! This is a plain line protocol, not socket.io. No room-join frame is sent;
//! the service scopes delivery by the `room` field of each record.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use rustls::RootCertStore;
use tokio::io::{AsyncRead, AsyncWrite, ReadHalf, WriteHalf};
use tokio::net::TcpStream;
use tokio::task::JoinHandle;
use tokio_rustls::TlsConnector;
use tokio_util::codec::{FramedRead, FramedWrite, LinesCodec};
use tracing::{debug, info, warn};

use super::{Listener, ListenerId, ListenerRegistry, Transport};
use crate::error::TransportError;
use crate::protocol::{IncomingFrame, MessageRecord, OutgoingFrame};

trait Stream: AsyncRead + AsyncWrite + Unpin + Send {}
impl<T: AsyncRead + AsyncWrite + Unpin + Send> Stream for T {}

type BoxedStream = Box<dyn Stream>;
type FrameWriter = FramedWrite<WriteHalf<BoxedStream>, LinesCodec>;
type FrameReader = FramedRead<ReadHalf<BoxedStream>, LinesCodec>;

/// Where to connect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub host: String,
    pub port: u16,
    pub use_tls: bool,
}

impl Endpoint {
    pub fn new(host: impl Into<String>, port: u16, use_tls: bool) -> Self {
        Self {
            host: host.into(),
            port,
            use_tls,
        }
    }
}

/// Create a TLS connector with webpki root certificates
pub(crate) fn create_tls_connector() -> TlsConnector {
    let mut root_store = RootCertStore::empty();
    root_store.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());

    let config = rustls::ClientConfig::builder()
        .with_root_certificates(root_store)
        .with_no_client_auth();

    TlsConnector::from(Arc::new(config))
}

async fn establish_connection(endpoint: &Endpoint) -> Result<BoxedStream, TransportError> {
    let addr = format!("{}:{}", endpoint.host, endpoint.port);
    let stream = TcpStream::connect(&addr).await?;

    if !endpoint.use_tls {
        return Ok(Box::new(stream));
    }

    let connector = create_tls_connector();
    let server_name = rustls::pki_types::ServerName::try_from(endpoint.host.clone())
        .map_err(|e| TransportError::Tls(format!("invalid server name: {}", e)))?;
    let tls_stream = connector
        .connect(server_name, stream)
        .await
        .map_err(|e| TransportError::Tls(format!("handshake failed: {}", e)))?;
    Ok(Box::new(tls_stream))
}

/// A connection to a room broadcast service speaking line-framed JSON.
///
/// Listeners live in a registry owned by the transport rather than by the
/// current connection, so [`SocketTransport::reconnect`] keeps them.
pub struct SocketTransport {
    endpoint: Endpoint,
    listeners: Arc<ListenerRegistry>,
    writer: tokio::sync::Mutex<Option<FrameWriter>>,
    reader_task: Mutex<Option<JoinHandle<()>>>,
}

impl SocketTransport {
    pub async fn connect(endpoint: Endpoint) -> Result<Self, TransportError> {
        let transport = Self {
            endpoint,
            listeners: Arc::new(ListenerRegistry::new()),
            writer: tokio::sync::Mutex::new(None),
            reader_task: Mutex::new(None),
        };
        transport.reconnect().await?;
        Ok(transport)
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// Drop the current connection (if any) and open a fresh one.
    pub async fn reconnect(&self) -> Result<(), TransportError> {
        let stream = establish_connection(&self.endpoint).await?;
        let (read_half, write_half) = tokio::io::split(stream);

        let mut writer = self.writer.lock().await;
        *writer = Some(FramedWrite::new(write_half, LinesCodec::new()));

        let reader = FramedRead::new(read_half, LinesCodec::new());
        let task = tokio::spawn(read_loop(reader, Arc::clone(&self.listeners)));
        if let Some(old) = self
            .reader_task
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .replace(task)
        {
            old.abort();
        }

        info!(
            host = %self.endpoint.host,
            port = self.endpoint.port,
            tls = self.endpoint.use_tls,
            "connected"
        );
        Ok(())
    }

    /// Close the connection. Listeners stay registered.
    pub async fn disconnect(&self) {
        if let Some(mut writer) = self.writer.lock().await.take() {
            let _ = SinkExt::<String>::close(&mut writer).await;
        }
        if let Some(task) = self
            .reader_task
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take()
        {
            task.abort();
        }
    }
}

async fn read_loop(mut reader: FrameReader, listeners: Arc<ListenerRegistry>) {
    while let Some(line) = reader.next().await {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                warn!("read failed: {}", e);
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<IncomingFrame>(&line) {
            Ok(frame) => {
                listeners.dispatch(&frame.event, &frame.data);
            }
            Err(e) => warn!("skipping malformed frame: {}", e),
        }
    }
    debug!("connection closed by peer");
}

#[async_trait]
impl Transport for SocketTransport {
    async fn emit(&self, event: &str, payload: &MessageRecord) -> Result<(), TransportError> {
        let line = serde_json::to_string(&OutgoingFrame {
            event,
            data: payload,
        })?;
        let mut guard = self.writer.lock().await;
        let writer = guard.as_mut().ok_or(TransportError::NotConnected)?;
        writer.send(line).await?;
        Ok(())
    }

    fn on(&self, event: &str, listener: Listener) -> ListenerId {
        self.listeners.add(event, listener)
    }

    fn off(&self, id: ListenerId) {
        self.listeners.remove(id);
    }
}

impl Drop for SocketTransport {
    fn drop(&mut self) {
        if let Some(task) = self
            .reader_task
            .get_mut()
            .unwrap_or_else(|e| e.into_inner())
            .take()
        {
            task.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{ContentType, RECEIVE_MESSAGE, SEND_MESSAGE};
    use std::time::Duration;
    use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
    use tokio::net::TcpListener;
    use tokio::sync::mpsc;
    use tokio::time::timeout;

    fn record(author: &str, content: &str) -> MessageRecord {
        MessageRecord::new(
            "lobby".into(),
            author.into(),
            content.into(),
            ContentType::Text,
            None,
            "12:0".into(),
        )
    }

    fn frame_line(event: &str, record: &MessageRecord) -> String {
        let mut line = serde_json::to_string(&OutgoingFrame {
            event,
            data: record,
        })
        .unwrap();
        line.push('\n');
        line
    }

    async fn local_listener() -> (TcpListener, Endpoint) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        (listener, Endpoint::new("127.0.0.1", port, false))
    }

    #[tokio::test]
    async fn test_emit_writes_one_json_line() {
        let (listener, endpoint) = local_listener().await;
        let transport = SocketTransport::connect(endpoint).await.unwrap();
        let (server, _) = listener.accept().await.unwrap();

        let sent = record("alice", "hello");
        transport.emit(SEND_MESSAGE, &sent).await.unwrap();

        let mut lines = BufReader::new(server).lines();
        let line = timeout(Duration::from_secs(2), lines.next_line())
            .await
            .unwrap()
            .unwrap()
            .unwrap();
        let frame: IncomingFrame = serde_json::from_str(&line).unwrap();
        assert_eq!(frame.event, SEND_MESSAGE);
        assert_eq!(frame.data, sent);
    }

    #[tokio::test]
    async fn test_inbound_frames_reach_listener_and_survive_reconnect() {
        let (listener, endpoint) = local_listener().await;
        let transport = SocketTransport::connect(endpoint).await.unwrap();
        let (mut first, _) = listener.accept().await.unwrap();

        let (tx, mut rx) = mpsc::unbounded_channel();
        transport.on(
            RECEIVE_MESSAGE,
            Box::new(move |r| {
                let _ = tx.send(r);
            }),
        );

        first
            .write_all(b"this is not json\n")
            .await
            .unwrap();
        first
            .write_all(frame_line(RECEIVE_MESSAGE, &record("bob", "one")).as_bytes())
            .await
            .unwrap();
        let got = timeout(Duration::from_secs(2), rx.recv()).await.unwrap().unwrap();
        assert_eq!(got.content(), "one");

        transport.reconnect().await.unwrap();
        let (mut second, _) = listener.accept().await.unwrap();
        second
            .write_all(frame_line(RECEIVE_MESSAGE, &record("bob", "two")).as_bytes())
            .await
            .unwrap();
        let got = timeout(Duration::from_secs(2), rx.recv()).await.unwrap().unwrap();
        assert_eq!(got.content(), "two");
    }

    #[tokio::test]
    async fn test_emit_after_disconnect_is_not_connected() {
        let (listener, endpoint) = local_listener().await;
        let transport = SocketTransport::connect(endpoint).await.unwrap();
        let _server = listener.accept().await.unwrap();

        transport.disconnect().await;
        let err = transport.emit(SEND_MESSAGE, &record("alice", "x")).await;
        assert!(matches!(err, Err(TransportError::NotConnected)));
    }

    #[test]
    fn test_tls_connector_builds() {
        let _ = create_tls_connector();
    }
}
