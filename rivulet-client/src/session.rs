use bytes::Bytes;
use tracing::{debug, info};

use rivulet_core::error::Result;
use rivulet_core::reader::Reader;
use rivulet_core::request::Request;
use rivulet_core::transport::Connector;

use crate::adapter::ClientAdapter;
use crate::writer::Writer;

/// Connects to `host:port` and returns the stream pair for the new
/// connection: a [`Reader`] fed by the connection's adapter and a
/// [`Writer`] over its handle.
///
/// # Errors
///
/// Returns a connection error if establishment fails; no stream pair
/// is handed out in that case.
pub async fn open_connection<C: Connector>(
    connector: &C,
    host: &str,
    port: u16,
) -> Result<(Reader, Writer<C::Handle>)> {
    let reader = Reader::new();
    let mut adapter = ClientAdapter::new(reader.clone());
    adapter.start_connect()?;
    let handle = connector.connect(host, port, adapter).await?;
    Ok((reader, Writer::new(handle)))
}

/// Orchestrates one connect → send-request → drain-response exchange.
///
/// The session performs no retries, follows no redirects, and parses
/// nothing: the caller receives the raw response byte sequence once
/// the remote end signals end-of-stream. The reader and writer live
/// exactly as long as one exchange and are not reused.
pub struct ClientSession<C: Connector> {
    connector: C,
}

impl<C: Connector> ClientSession<C> {
    /// Creates a session over `connector`.
    #[must_use]
    pub fn new(connector: C) -> Self {
        Self { connector }
    }

    /// Sends a GET request for `target` to `host:port` and returns the
    /// full raw response.
    ///
    /// # Errors
    ///
    /// Returns a connection error if the connection cannot be
    /// established or the request cannot be written.
    pub async fn request(&self, target: &str, host: &str, port: u16) -> Result<Bytes> {
        info!(host = %host, port = port, target = %target, "Starting request");

        let (reader, mut writer) = open_connection(&self.connector, host, port).await?;

        let request = Request::get(target, host);
        writer.write(&request.encode())?;

        let data = reader.read().await?;
        debug!(bytes = data.len(), "Response complete");

        writer.close()?;
        Ok(data)
    }
}
