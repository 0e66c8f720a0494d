//! ## Signaling wire format
//!
//! Every frame exchanged with a browser peer is a single JSON object. The
//! client drives the exchange: it asks to be paired with `next`, and then
//! hands the server negotiation payloads (`offer`, `answer`,
//! `iceCandidate`) or chat text addressed to another peer with `to`.
//!
//! The server only ever looks at the few keys it needs to route a frame.
//! Everything else inside a relayed frame is opaque and travels to the
//! destination untouched, with the sender identified by an added `from`.

pub mod message;

pub use self::message::{Envelope, MediaType, Notification, PayloadKind, Request};

#[derive(Debug)]
pub enum Error {
    /// The frame is not a JSON object.
    Json(serde_json::Error),
    /// The frame is a JSON object, but matches none of the known requests.
    UnknownMessage,
}

impl std::error::Error for Error {}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Json(e) => write!(f, "invalid json: {}", e),
            Self::UnknownMessage => write!(f, "unknown message"),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}
