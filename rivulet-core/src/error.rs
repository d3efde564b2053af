/// Errors produced by the rivulet client stack.
///
/// The taxonomy is deliberately small. `Connection` covers everything
/// the remote end or the transport can do to us; `ProtocolViolation`
/// covers everything we can do to ourselves. The latter is a
/// programming-contract breach and is not recoverable — callers should
/// abort the offending operation rather than retry it.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Connecting failed, or a send/close was attempted on a handle
    /// that is already closed.
    #[error("connection error: {0}")]
    Connection(String),

    /// A waiter was double-resolved or double-waited, a second read was
    /// started while one was outstanding, or an adapter received an
    /// event outside its legal state.
    #[error("protocol violation: {0}")]
    ProtocolViolation(String),
}

impl Error {
    /// Builds a [`Error::Connection`] from any message.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection(message.into())
    }

    /// Builds a [`Error::ProtocolViolation`] from any message.
    pub fn violation(message: impl Into<String>) -> Self {
        Self::ProtocolViolation(message.into())
    }

    /// Returns true for [`Error::Connection`].
    #[must_use]
    pub fn is_connection(&self) -> bool {
        matches!(self, Self::Connection(_))
    }

    /// Returns true for [`Error::ProtocolViolation`].
    #[must_use]
    pub fn is_violation(&self) -> bool {
        matches!(self, Self::ProtocolViolation(_))
    }
}

/// Result alias used throughout the workspace.
pub type Result<T, E = Error> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    /// Given a connection error, when formatted, then the message carries the prefix and detail.
    #[test]
    fn given_connection_error_when_displayed_then_message_matches() {
        let err = Error::connection("refused");
        assert_eq!(err.to_string(), "connection error: refused");
        assert!(err.is_connection());
        assert!(!err.is_violation());
    }

    /// Given a protocol violation, when formatted, then the message carries the prefix and detail.
    #[test]
    fn given_violation_when_displayed_then_message_matches() {
        let err = Error::violation("waiter resolved twice");
        assert_eq!(err.to_string(), "protocol violation: waiter resolved twice");
        assert!(err.is_violation());
        assert!(!err.is_connection());
    }
}
