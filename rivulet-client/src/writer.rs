use bytes::Bytes;

use rivulet_core::error::{Error, Result};
use rivulet_core::transport::ConnectionHandle;

/// Thin send wrapper around an established connection handle.
///
/// Writes are forwarded immediately with no buffering, batching, or
/// backpressure. After [`close`](Writer::close), further writes fail
/// with a connection error.
#[derive(Debug)]
pub struct Writer<H: ConnectionHandle> {
    handle: H,
    closed: bool,
}

impl<H: ConnectionHandle> Writer<H> {
    /// Wraps `handle`.
    #[must_use]
    pub fn new(handle: H) -> Self {
        Self {
            handle,
            closed: false,
        }
    }

    /// Forwards `data` to the connection.
    ///
    /// # Errors
    ///
    /// Returns a connection error if the writer or the underlying
    /// handle has been closed.
    pub fn write(&mut self, data: &[u8]) -> Result<()> {
        if self.closed {
            return Err(Error::connection("write on a closed connection"));
        }
        self.handle.send(Bytes::copy_from_slice(data))
    }

    /// Releases the connection handle. Idempotent.
    ///
    /// # Errors
    ///
    /// Returns a connection error if the transport rejected the close.
    pub fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.handle.close()
    }

    /// The wrapped handle.
    #[must_use]
    pub fn handle(&self) -> &H {
        &self.handle
    }
}
