use bytes::Bytes;
use tracing::{debug, warn};

use rivulet_core::error::{Error, Result};
use rivulet_core::reader::Reader;
use rivulet_core::transport::ConnectionEvents;

/// Connection lifecycle as seen by the adapter.
///
/// End-of-stream is not a state of its own — it is an orthogonal flag
/// that may only be set while `Connected`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdapterState {
    /// Fresh adapter; no connect requested yet.
    Idle,
    /// Connect requested, establishment pending.
    Connecting,
    /// Established; data and end-of-stream events are legal.
    Connected,
    /// Terminal. No further events are expected.
    Closed,
}

/// Translates raw transport events into [`Reader`] state changes.
///
/// One adapter is bound per connection for its whole lifetime. Every
/// callback only mutates reader state and resumes at most one
/// suspended task — nothing here blocks the event pump.
pub struct ClientAdapter {
    state: AdapterState,
    eof_seen: bool,
    reader: Reader,
}

impl ClientAdapter {
    /// Creates an idle adapter feeding `reader`.
    #[must_use]
    pub fn new(reader: Reader) -> Self {
        Self {
            state: AdapterState::Idle,
            eof_seen: false,
            reader,
        }
    }

    /// Marks the connect request (`Idle → Connecting`). Called by the
    /// session before the adapter is handed to the connector.
    ///
    /// # Errors
    ///
    /// Returns a protocol violation if the adapter has already left
    /// the idle state.
    pub fn start_connect(&mut self) -> Result<()> {
        if self.state != AdapterState::Idle {
            return Err(Error::violation(format!(
                "connect requested in {:?} state",
                self.state
            )));
        }
        self.state = AdapterState::Connecting;
        Ok(())
    }

    /// The current lifecycle state.
    #[must_use]
    pub fn state(&self) -> AdapterState {
        self.state
    }
}

impl ConnectionEvents for ClientAdapter {
    fn on_connected(&mut self, peer: &str) -> Result<()> {
        if self.state != AdapterState::Connecting {
            return Err(Error::violation(format!(
                "connection-established in {:?} state",
                self.state
            )));
        }
        debug!(peer = %peer, "Connection established");
        self.state = AdapterState::Connected;
        Ok(())
    }

    fn on_data(&mut self, data: Bytes) -> Result<()> {
        if self.state != AdapterState::Connected {
            return Err(Error::violation(format!(
                "data-arrived in {:?} state",
                self.state
            )));
        }
        self.reader.feed(&data)
    }

    fn on_eof(&mut self) -> Result<()> {
        if self.state != AdapterState::Connected {
            return Err(Error::violation(format!(
                "end-of-stream in {:?} state",
                self.state
            )));
        }
        debug!("End of stream");
        self.eof_seen = true;
        self.reader.feed_eof()
    }

    fn on_closed(&mut self, reason: Option<&str>) -> Result<()> {
        if self.state == AdapterState::Closed {
            return Err(Error::violation("connection-closed delivered twice"));
        }
        if !self.eof_seen {
            // A pending read cannot tell this apart from a clean
            // end-of-stream; at least make the truncation visible.
            warn!(reason = ?reason, "Connection closed before end-of-stream");
        }
        debug!(reason = ?reason, "Connection closed");
        self.state = AdapterState::Closed;
        // Unblock a read that is still waiting for bytes.
        self.reader.feed_eof()
    }
}
