//! Protocol error surface.
//!
//! Decode failures are split by the part of the message that failed, so the
//! session can tell "answer 400" apart from "give up on the connection".

use thiserror::Error;

/// Decode-time failure of the wire codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ProtocolError {
    /// The request line was not `<VERB> <url> HTTP/1.x`.
    #[error("malformed request")]
    MalformedRequest,

    /// The status line was not `HTTP/1.x <3 digits>...`.
    #[error("malformed response")]
    MalformedResponse,

    /// A header line had no `": "` separator.
    #[error("malformed field")]
    MalformedField,
}

/// Failure while reading or writing a message header.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Whether the failure should be answered with `400 Bad Request`.
    ///
    /// Only inbound request failures qualify; a malformed response or a
    /// transport error is fatal to the caller.
    pub fn is_bad_request(&self) -> bool {
        matches!(
            self,
            Error::Protocol(ProtocolError::MalformedRequest | ProtocolError::MalformedField)
        )
    }

    pub fn protocol(&self) -> Option<ProtocolError> {
        match self {
            Error::Protocol(e) => Some(*e),
            Error::Io(_) => None,
        }
    }
}
