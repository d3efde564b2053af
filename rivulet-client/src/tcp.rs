use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use bytes::Bytes;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{self, tcp};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use rivulet_core::error::{Error, Result};
use rivulet_core::transport::{ConnectionEvents, ConnectionHandle, Connector};

/// Commands drained by the write pump.
enum WriteCmd {
    Data(Bytes),
    Shutdown,
}

/// Handle to a live TCP connection.
///
/// Clones share the same underlying connection. Sends are handed off
/// to the write pump through an unbounded queue and never block.
#[derive(Clone, Debug)]
pub struct TcpHandle {
    tx: mpsc::UnboundedSender<WriteCmd>,
    peer: String,
    closed: Arc<AtomicBool>,
}

impl ConnectionHandle for TcpHandle {
    fn peer(&self) -> String {
        self.peer.clone()
    }

    fn send(&self, data: Bytes) -> Result<()> {
        if self.closed.load(Ordering::Acquire) {
            return Err(Error::connection("send on a closed connection"));
        }
        self.tx
            .send(WriteCmd::Data(data))
            .map_err(|_| Error::connection("connection task has shut down"))
    }

    fn close(&self) -> Result<()> {
        if self.closed.swap(true, Ordering::AcqRel) {
            return Ok(());
        }
        // The pump may already be gone if the peer closed first.
        let _ = self.tx.send(WriteCmd::Shutdown);
        Ok(())
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }
}

/// Connector that establishes [`TcpHandle`]s over [`tokio::net::TcpStream`].
pub struct TcpConnector;

impl Connector for TcpConnector {
    type Handle = TcpHandle;

    fn connect<'a, E>(
        &'a self,
        host: &'a str,
        port: u16,
        mut events: E,
    ) -> impl Future<Output = Result<Self::Handle>> + Send + 'a
    where
        E: ConnectionEvents,
    {
        async move {
            let stream = net::TcpStream::connect((host, port))
                .await
                .map_err(|e| {
                    Error::connection(format!("failed to connect to {host}:{port}: {e}"))
                })?;
            let peer = stream
                .peer_addr()
                .map_err(|e| Error::connection(format!("failed to retrieve peer address: {e}")))?
                .to_string();
            debug!(peer = %peer, "TCP connection established");

            events.on_connected(&peer)?;

            let (read_half, write_half) = stream.into_split();
            let (tx, rx) = mpsc::unbounded_channel();
            let closed = Arc::new(AtomicBool::new(false));

            tokio::spawn(write_pump(write_half, rx, peer.clone()));
            tokio::spawn(read_pump(read_half, events, Arc::clone(&closed), peer.clone()));

            Ok(TcpHandle { tx, peer, closed })
        }
    }
}

/// Drains queued writes into the socket. Ends on `Shutdown`, on queue
/// closure, or on the first write error.
async fn write_pump(
    mut half: tcp::OwnedWriteHalf,
    mut rx: mpsc::UnboundedReceiver<WriteCmd>,
    peer: String,
) {
    while let Some(cmd) = rx.recv().await {
        match cmd {
            WriteCmd::Data(data) => {
                if let Err(e) = half.write_all(&data).await {
                    warn!(peer = %peer, error = %e, "Write failed, stopping write pump");
                    break;
                }
            }
            WriteCmd::Shutdown => {
                if let Err(e) = half.shutdown().await {
                    debug!(peer = %peer, error = %e, "Shutdown after close failed");
                }
                break;
            }
        }
    }
    debug!(peer = %peer, "Write pump stopped");
}

/// Reads from the socket and delivers events into the bound handler.
/// A rejected event is a fatal contract breach for this connection:
/// the pump reports closure and stops.
async fn read_pump<E: ConnectionEvents>(
    mut half: tcp::OwnedReadHalf,
    mut events: E,
    closed: Arc<AtomicBool>,
    peer: String,
) {
    let mut buf = [0u8; 2048];
    loop {
        match half.read(&mut buf).await {
            Ok(0) => {
                debug!(peer = %peer, "Remote end closed the stream");
                if let Err(e) = events.on_eof() {
                    warn!(peer = %peer, error = %e, "Event handler rejected end-of-stream");
                }
                if let Err(e) = events.on_closed(None) {
                    warn!(peer = %peer, error = %e, "Event handler rejected close");
                }
                break;
            }
            Ok(n) => {
                if let Err(e) = events.on_data(Bytes::copy_from_slice(&buf[..n])) {
                    warn!(peer = %peer, error = %e, "Event handler rejected data, closing");
                    let _ = events.on_closed(Some("event handler error"));
                    break;
                }
            }
            Err(e) => {
                warn!(peer = %peer, error = %e, "Read failed");
                let reason = e.to_string();
                if let Err(err) = events.on_closed(Some(&reason)) {
                    warn!(peer = %peer, error = %err, "Event handler rejected close");
                }
                break;
            }
        }
    }
    closed.store(true, Ordering::Release);
    debug!(peer = %peer, "Read pump stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use rivulet_core::reader::Reader;

    use crate::adapter::ClientAdapter;

    async fn bind_listener() -> (net::TcpListener, u16) {
        let listener = net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        (listener, port)
    }

    fn connecting_adapter(reader: &Reader) -> ClientAdapter {
        let mut adapter = ClientAdapter::new(reader.clone());
        adapter.start_connect().unwrap();
        adapter
    }

    /// Given a server that writes bytes and closes, when connected, then the reader drains exactly those bytes.
    #[tokio::test]
    async fn when_server_writes_and_closes_expect_reader_drains_bytes() {
        let (listener, port) = bind_listener().await;
        tokio::spawn(async move {
            let (mut sock, _) = listener.accept().await.unwrap();
            sock.write_all(b"stream contents").await.unwrap();
            // Dropping the socket delivers EOF to the client.
        });

        let reader = Reader::new();
        let connector = TcpConnector;
        let handle = connector
            .connect("127.0.0.1", port, connecting_adapter(&reader))
            .await
            .unwrap();

        let data = reader.read().await.unwrap();
        assert_eq!(&data[..], b"stream contents");
        assert_eq!(handle.peer(), format!("127.0.0.1:{port}"));
    }

    /// Given nothing listening on the port, when connecting, then a connection error is returned.
    #[tokio::test]
    async fn when_connection_refused_expect_connection_error() {
        let (listener, port) = bind_listener().await;
        drop(listener);

        let connector = TcpConnector;
        let err = connector
            .connect("127.0.0.1", port, connecting_adapter(&Reader::new()))
            .await
            .unwrap_err();
        assert!(err.is_connection());
    }

    /// Given an established connection, when bytes are sent through the handle, then the server receives them.
    #[tokio::test]
    async fn when_sending_through_handle_expect_server_receives_bytes() {
        let (listener, port) = bind_listener().await;
        let server = tokio::spawn(async move {
            let (mut sock, _) = listener.accept().await.unwrap();
            let mut received = Vec::new();
            let mut buf = [0u8; 256];
            loop {
                let n = sock.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                received.extend_from_slice(&buf[..n]);
            }
            received
        });

        let reader = Reader::new();
        let connector = TcpConnector;
        let handle = connector
            .connect("127.0.0.1", port, connecting_adapter(&reader))
            .await
            .unwrap();

        handle.send(Bytes::from_static(b"ping")).unwrap();
        handle.close().unwrap();

        assert_eq!(server.await.unwrap(), b"ping");
    }

    /// Given a closed handle, when sending, then a connection error is returned.
    #[tokio::test]
    async fn when_sending_after_close_expect_connection_error() {
        let (listener, port) = bind_listener().await;
        tokio::spawn(async move {
            let _ = listener.accept().await;
        });

        let reader = Reader::new();
        let connector = TcpConnector;
        let handle = connector
            .connect("127.0.0.1", port, connecting_adapter(&reader))
            .await
            .unwrap();

        handle.close().unwrap();
        assert!(handle.is_closed());
        let err = handle.send(Bytes::from_static(b"x")).unwrap_err();
        assert!(err.is_connection());

        // Closing again is a no-op.
        handle.close().unwrap();
    }
}
