//! Error types for the broadcast engine.

use std::fmt;

/// Result type alias for broadcast operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while handling or dispatching messages.
#[derive(Debug)]
pub enum Error {
    /// Failed to decode an inbound request body.
    Decode(String),

    /// Failed to encode a reply body.
    Encode(String),

    /// Internal channel error.
    Channel(String),

    /// The engine has been shut down.
    Shutdown,

    /// Generic IO error.
    Io(std::io::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Decode(msg) => {
                write!(f, "failed to decode request body: {}", msg)
            }
            Error::Encode(msg) => {
                write!(f, "failed to encode reply body: {}", msg)
            }
            Error::Channel(msg) => {
                write!(f, "channel error: {}", msg)
            }
            Error::Shutdown => {
                write!(f, "gossip engine has been shut down")
            }
            Error::Io(err) => {
                write!(f, "IO error: {}", err)
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}

impl<T> From<async_channel::SendError<T>> for Error {
    fn from(err: async_channel::SendError<T>) -> Self {
        Error::Channel(err.to_string())
    }
}

impl From<async_channel::RecvError> for Error {
    fn from(err: async_channel::RecvError) -> Self {
        Error::Channel(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::Decode("missing field `message`".to_owned());
        assert!(err.to_string().contains("missing field"));
        assert!(Error::Shutdown.to_string().contains("shut down"));
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::Other, "test error");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }
}
