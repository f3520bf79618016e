use crate::types::Transport;
use std::io;
use std::time::Duration;
use thiserror::Error;

/// A simple type alias so as to DRY.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// The name could not be turned into a QNAME. Raised before any I/O.
    #[error("invalid name: {0}")]
    Encoding(String),

    #[error("timed out after {0:?}")]
    Timeout(Duration),

    #[error("connection refused: {0}")]
    ConnectionRefused(String),

    #[error("connection reset: {0}")]
    ConnectionReset(String),

    #[error("tls failure: {0}")]
    Tls(String),

    #[error("http failure: {0}")]
    Http(String),

    /// The DoH server answered with a non-2xx status. The body is kept as
    /// some servers explain the failure in it.
    #[error("received unexpected HTTP status code: {status}")]
    HttpStatus { status: u16, body: Vec<u8> },

    #[error("malformed message: {0}")]
    Malformed(String),

    #[error(transparent)]
    Io(io::Error),

    /// Every transport in the fallback chain failed.
    #[error("resolution failed, last tried {transport}: {cause}")]
    ResolutionFailed {
        transport: Transport,
        #[source]
        cause: Box<Error>,
    },
}

impl Error {
    /// Returns true if this error came from the network round trip, and
    /// thus another transport may still succeed.
    pub fn is_transport_failure(&self) -> bool {
        match self {
            Error::Timeout(_)
            | Error::ConnectionRefused(_)
            | Error::ConnectionReset(_)
            | Error::Tls(_)
            | Error::Http(_)
            | Error::HttpStatus { .. }
            | Error::Io(_) => true,

            Error::Encoding(_) | Error::Malformed(_) | Error::ResolutionFailed { .. } => false,
        }
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        match e.kind() {
            // Reading past the end of a buffer, or a stream closed early.
            io::ErrorKind::UnexpectedEof => {
                Error::Malformed("unexpected end of message".to_string())
            }

            io::ErrorKind::ConnectionRefused => Error::ConnectionRefused(e.to_string()),
            io::ErrorKind::ConnectionReset
            | io::ErrorKind::ConnectionAborted
            | io::ErrorKind::BrokenPipe => Error::ConnectionReset(e.to_string()),

            // Only std sockets with a read timeout produce these.
            io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => Error::Timeout(Duration::ZERO),

            _ => Error::Io(e),
        }
    }
}

/// Returns early with the given [`Error`] variant and a formatted message.
#[macro_export]
macro_rules! bail {
    ($kind:ident, $($arg:tt)*) => {{
        return Err($crate::Error::$kind(format!($($arg)*)))
    }}
}
