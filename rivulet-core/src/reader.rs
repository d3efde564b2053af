use std::sync::{Arc, Mutex};

use bytes::{Bytes, BytesMut};

use crate::error::{Error, Result};
use crate::waiter::Waiter;

/// Shared state between the feeding side (adapter callbacks) and the
/// draining side (`read`).
#[derive(Debug)]
struct ReaderState {
    /// Received bytes in arrival order, not yet drained.
    buffer: BytesMut,
    /// Monotonic: once set it never reverts.
    eof: bool,
    /// The waiter of the currently suspended read, if any.
    waiter: Option<Waiter<()>>,
}

/// An unbounded append-only byte buffer with blocking, EOF-aware drain
/// semantics.
///
/// The adapter pushes bytes in with [`feed`](Reader::feed) and marks
/// the end of the stream with [`feed_eof`](Reader::feed_eof); the
/// session drains everything with [`read`](Reader::read). The reader
/// is cheaply cloneable — clones share the same buffer — so the
/// feeding and draining sides can live on different tasks.
///
/// Only one `read` may be outstanding at a time. A second concurrent
/// `read` fails with a protocol violation rather than being queued.
#[derive(Clone, Debug)]
pub struct Reader {
    state: Arc<Mutex<ReaderState>>,
}

impl Reader {
    /// Creates an empty reader with no end-of-stream mark.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(ReaderState {
                buffer: BytesMut::new(),
                eof: false,
                waiter: None,
            })),
        }
    }

    /// Appends `data` to the buffer and resumes a suspended read, if any.
    ///
    /// Never blocks — safe to call from an event callback.
    ///
    /// # Errors
    ///
    /// Returns a protocol violation if the pending waiter was already
    /// resolved, which indicates the single-waiter invariant was broken.
    pub fn feed(&self, data: &[u8]) -> Result<()> {
        let mut state = self.state.lock().expect("reader lock poisoned");
        state.buffer.extend_from_slice(data);
        Self::wake(&mut state)
    }

    /// Marks the end of the stream and resumes a suspended read, if any.
    ///
    /// Idempotent: feeding EOF twice is allowed and changes nothing.
    ///
    /// # Errors
    ///
    /// Same contract as [`feed`](Reader::feed).
    pub fn feed_eof(&self) -> Result<()> {
        let mut state = self.state.lock().expect("reader lock poisoned");
        state.eof = true;
        Self::wake(&mut state)
    }

    /// Returns true once the end-of-stream mark has been fed.
    #[must_use]
    pub fn is_eof(&self) -> bool {
        self.state.lock().expect("reader lock poisoned").eof
    }

    fn wake(state: &mut ReaderState) -> Result<()> {
        if let Some(waiter) = state.waiter.take() {
            waiter.resolve(())?;
        }
        Ok(())
    }

    /// Drains the entire remaining stream, suspending as needed, and
    /// returns it as one contiguous byte sequence.
    ///
    /// Blocks (cooperatively) until the feeding side has delivered all
    /// bytes and the end-of-stream mark. Not restartable: once EOF has
    /// been drained, further calls return an empty result immediately.
    ///
    /// # Errors
    ///
    /// Returns a protocol violation if another `read` is already
    /// suspended on this reader.
    pub async fn read(&self) -> Result<Bytes> {
        let mut blocks = BytesMut::new();
        loop {
            let block = self.read_block().await?;
            if block.is_empty() {
                break;
            }
            blocks.extend_from_slice(&block);
        }
        Ok(blocks.freeze())
    }

    /// Drains whatever is buffered right now, suspending first if the
    /// buffer is empty and EOF has not been reached. An empty result
    /// means the stream is finished.
    async fn read_block(&self) -> Result<Bytes> {
        let wait = {
            let mut state = self.state.lock().expect("reader lock poisoned");
            if state.buffer.is_empty() && !state.eof {
                if state.waiter.is_some() {
                    return Err(Error::violation(
                        "another read is already waiting on this reader",
                    ));
                }
                let waiter = Waiter::new();
                // Register and obtain the wait future under the same
                // lock, so a feed cannot slip in between and resolve a
                // waiter nobody is waiting on.
                let wait = waiter.wait()?;
                state.waiter = Some(waiter);
                Some(wait)
            } else {
                None
            }
        };

        if let Some(wait) = wait {
            wait.await;
        }

        let mut state = self.state.lock().expect("reader lock poisoned");
        Ok(state.buffer.split().freeze())
    }
}

impl Default for Reader {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    /// Given chunks fed before any read, when read, then the exact concatenation is returned.
    #[tokio::test]
    async fn given_buffered_chunks_when_read_then_returns_concatenation() {
        let reader = Reader::new();
        reader.feed(b"hel").unwrap();
        reader.feed(b"lo ").unwrap();
        reader.feed(b"world").unwrap();
        reader.feed_eof().unwrap();

        let data = reader.read().await.unwrap();
        assert_eq!(&data[..], b"hello world");
    }

    /// Given an immediate EOF with no data, when read, then an empty sequence is returned.
    #[tokio::test]
    async fn given_immediate_eof_when_read_then_returns_empty() {
        let reader = Reader::new();
        reader.feed_eof().unwrap();
        let data = reader.read().await.unwrap();
        assert!(data.is_empty());
    }

    /// Given a drained reader, when read again, then it returns empty immediately.
    #[tokio::test]
    async fn given_terminal_state_when_read_again_then_returns_empty_immediately() {
        let reader = Reader::new();
        reader.feed(b"x").unwrap();
        reader.feed_eof().unwrap();

        let first = reader.read().await.unwrap();
        assert_eq!(&first[..], b"x");

        let second = reader.read().await.unwrap();
        assert!(second.is_empty());
    }

    /// Given a read issued before any data, when bytes and EOF arrive later, then the read resumes and completes.
    #[tokio::test]
    async fn given_early_read_when_fed_later_then_read_resumes() {
        let reader = Reader::new();
        let drain = reader.clone();
        let task = tokio::spawn(async move { drain.read().await });

        // Wait until the read has actually suspended.
        while reader.state.lock().unwrap().waiter.is_none() {
            tokio::time::sleep(Duration::from_millis(1)).await;
        }

        reader.feed(b"x").unwrap();

        // The read drains "x" and suspends again until EOF.
        while reader.state.lock().unwrap().waiter.is_none() {
            tokio::time::sleep(Duration::from_millis(1)).await;
        }

        reader.feed_eof().unwrap();
        let data = task.await.unwrap().unwrap();
        assert_eq!(&data[..], b"x");
    }

    /// Given a suspended read, when a second read is issued, then it fails with a protocol violation.
    #[tokio::test]
    async fn given_outstanding_read_when_second_read_then_violation() {
        let reader = Reader::new();
        let drain = reader.clone();
        let task = tokio::spawn(async move { drain.read().await });

        while reader.state.lock().unwrap().waiter.is_none() {
            tokio::time::sleep(Duration::from_millis(1)).await;
        }

        let err = reader.read().await.unwrap_err();
        assert!(err.is_violation());

        reader.feed_eof().unwrap();
        assert!(task.await.unwrap().unwrap().is_empty());
    }

    /// Given EOF fed twice, when read, then the second feed is a no-op.
    #[tokio::test]
    async fn given_double_eof_when_read_then_idempotent() {
        let reader = Reader::new();
        reader.feed(b"ab").unwrap();
        reader.feed_eof().unwrap();
        reader.feed_eof().unwrap();
        assert!(reader.is_eof());

        let data = reader.read().await.unwrap();
        assert_eq!(&data[..], b"ab");
    }
}
