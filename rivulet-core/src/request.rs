use bytes::{BufMut, Bytes, BytesMut};

const CRLF: &[u8] = b"\r\n";

/// A minimal HTTP/1.1 request: request line plus a single `Host`
/// header.
///
/// This is a request-line formatter, not a protocol implementation.
/// The target and host are inserted verbatim — no percent-encoding,
/// no validation — and no body or additional headers are emitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    method: String,
    target: String,
    host: String,
}

impl Request {
    /// Builds a request. The method is normalized to upper case; the
    /// target and host are kept as given.
    #[must_use]
    pub fn new(method: &str, target: &str, host: &str) -> Self {
        Self {
            method: method.to_ascii_uppercase(),
            target: target.to_string(),
            host: host.to_string(),
        }
    }

    /// Shorthand for a GET request.
    #[must_use]
    pub fn get(target: &str, host: &str) -> Self {
        Self::new("GET", target, host)
    }

    /// The upper-cased method.
    #[must_use]
    pub fn method(&self) -> &str {
        &self.method
    }

    /// The request target, as given.
    #[must_use]
    pub fn target(&self) -> &str {
        &self.target
    }

    /// The `Host` header value, as given.
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Renders the wire bytes:
    ///
    /// ```text
    /// <METHOD> <target> HTTP/1.1\r\n
    /// Host: <host>\r\n
    /// \r\n
    /// ```
    #[must_use]
    pub fn encode(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(
            self.method.len() + self.target.len() + self.host.len() + 32,
        );
        buf.put_slice(self.method.as_bytes());
        buf.put_u8(b' ');
        buf.put_slice(self.target.as_bytes());
        buf.put_slice(b" HTTP/1.1");
        buf.put_slice(CRLF);
        buf.put_slice(b"Host: ");
        buf.put_slice(self.host.as_bytes());
        buf.put_slice(CRLF);
        buf.put_slice(CRLF);
        buf.freeze()
    }
}
