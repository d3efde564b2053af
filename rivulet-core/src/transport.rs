use std::future::Future;

use bytes::Bytes;

use crate::error::Result;

/// Events a transport delivers for one established connection.
///
/// Exactly one implementor instance is bound per connection for the
/// connection's entire lifetime. Delivery happens as direct callbacks
/// from the transport's event pump, so implementations must never
/// block — all they may do is mutate reader state and resume at most
/// one suspended task.
pub trait ConnectionEvents: Send + 'static {
    /// The connection has been established; `peer` identifies the
    /// remote end (e.g. `"127.0.0.1:54321"`).
    fn on_connected(&mut self, peer: &str) -> Result<()>;

    /// A chunk of bytes arrived. Chunks are delivered in arrival order.
    fn on_data(&mut self, data: Bytes) -> Result<()>;

    /// The remote end will send no further bytes.
    fn on_eof(&mut self) -> Result<()>;

    /// The connection is gone. Terminal: no further events follow.
    /// `reason` is present for abnormal closure.
    fn on_closed(&mut self, reason: Option<&str>) -> Result<()>;
}

/// Handle to an established connection.
///
/// The handle is shared — the event side and the writing side each
/// hold a clone, and the connection is released only on explicit
/// [`close`](ConnectionHandle::close) or when the transport reports
/// closure.
pub trait ConnectionHandle: Clone + Send + Sync + 'static {
    /// Returns a human-readable identifier for the remote end.
    fn peer(&self) -> String;

    /// Hands `data` to the transport, fire-and-forget. There is no
    /// buffering limit and no backpressure; callers are responsible
    /// for not overwhelming the transport.
    ///
    /// # Errors
    ///
    /// Returns a connection error if the handle has been closed or the
    /// transport has shut down.
    fn send(&self, data: Bytes) -> Result<()>;

    /// Releases the connection. Idempotent.
    ///
    /// # Errors
    ///
    /// Returns a connection error if the transport rejected the close.
    fn close(&self) -> Result<()>;

    /// Returns true once the connection has been closed, locally or by
    /// the transport.
    fn is_closed(&self) -> bool;
}

/// Factory for outbound connections.
///
/// This is the capability the client consumes from the underlying
/// scheduler: establish a connection and bind an event handler to it.
/// Pass a TCP implementation in production and an in-memory fake in
/// tests.
pub trait Connector: Send + Sync + 'static {
    /// The concrete handle type produced by [`connect`](Connector::connect).
    type Handle: ConnectionHandle;

    /// Opens a connection to `host:port` and binds `events` to it for
    /// the connection's lifetime. Suspends the calling task until the
    /// connection is established or fails.
    ///
    /// # Errors
    ///
    /// Returns a connection error if the connection cannot be
    /// established.
    fn connect<'a, E>(
        &'a self,
        host: &'a str,
        port: u16,
        events: E,
    ) -> impl Future<Output = Result<Self::Handle>> + Send + 'a
    where
        E: ConnectionEvents;
}
