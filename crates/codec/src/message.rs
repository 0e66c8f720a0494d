use crate::Error;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The kind of media a peer asks to be paired for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Video,
    Audio,
}

impl MediaType {
    /// # Test
    ///
    /// ```
    /// use peer_signaling_codec::MediaType;
    ///
    /// assert_eq!(MediaType::Video.as_str(), "video");
    /// assert_eq!(MediaType::Audio.as_str(), "audio");
    /// ```
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Video => "video",
            Self::Audio => "audio",
        }
    }
}

impl TryFrom<&str> for MediaType {
    type Error = Error;

    /// Only the exact lowercase names are accepted.
    ///
    /// # Test
    ///
    /// ```
    /// use peer_signaling_codec::MediaType;
    ///
    /// assert_eq!(MediaType::try_from("video").ok(), Some(MediaType::Video));
    /// assert_eq!(MediaType::try_from("audio").ok(), Some(MediaType::Audio));
    /// assert!(MediaType::try_from("Video").is_err());
    /// assert!(MediaType::try_from("").is_err());
    /// ```
    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Ok(match value {
            "video" => Self::Video,
            "audio" => Self::Audio,
            _ => return Err(Error::UnknownMessage),
        })
    }
}

impl std::fmt::Display for MediaType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a relayed frame carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PayloadKind {
    Offer,
    Answer,
    IceCandidate,
    Text,
}

impl PayloadKind {
    /// Negotiation payloads, in the order they are looked up in a frame.
    const NEGOTIATION: [Self; 3] = [Self::Offer, Self::Answer, Self::IceCandidate];

    /// The key holding the payload in the frame.
    pub const fn key(&self) -> &'static str {
        match self {
            Self::Offer => "offer",
            Self::Answer => "answer",
            Self::IceCandidate => "iceCandidate",
            Self::Text => "message",
        }
    }
}

impl std::fmt::Display for PayloadKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// A frame that is forwarded to another peer.
///
/// The original object is kept as-is, the server never interprets the
/// payload itself.
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope {
    kind: PayloadKind,
    to: Option<String>,
    fields: Map<String, Value>,
}

impl Envelope {
    pub fn kind(&self) -> PayloadKind {
        self.kind
    }

    /// Destination peer id, absent when the frame has no string `to`.
    pub fn to(&self) -> Option<&str> {
        self.to.as_deref()
    }

    /// The payload under the kind's key.
    pub fn payload(&self) -> Option<&Value> {
        self.fields.get(self.kind.key())
    }

    /// Encode the frame as delivered to the destination.
    ///
    /// All fields are kept verbatim and `from` is set to the sender, replacing
    /// whatever `from` the sender may have put there itself.
    ///
    /// # Test
    ///
    /// ```
    /// use peer_signaling_codec::*;
    ///
    /// let Request::Relay(envelope) =
    ///     Request::decode(r#"{"offer":"sdp1","to":"peer_b","from":"peer_x"}"#).unwrap()
    /// else {
    ///     panic!("expected relay");
    /// };
    ///
    /// let value: serde_json::Value =
    ///     serde_json::from_str(&envelope.encode_from("peer_a").unwrap()).unwrap();
    ///
    /// assert_eq!(value["offer"], "sdp1");
    /// assert_eq!(value["to"], "peer_b");
    /// assert_eq!(value["from"], "peer_a");
    /// ```
    pub fn encode_from(&self, from: &str) -> Result<String, Error> {
        let mut fields = self.fields.clone();
        fields.insert("from".to_string(), Value::String(from.to_string()));
        Ok(serde_json::to_string(&fields)?)
    }
}

/// A request from a peer.
#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    /// Ask to be introduced to another peer.
    Next(MediaType),
    /// Forward a negotiation payload or chat text to another peer.
    Relay(Envelope),
}

impl Request {
    /// Decode a frame received from a peer.
    ///
    /// `next` is only honored when it names a media type, otherwise the frame
    /// is checked for `offer`, `answer` and `iceCandidate` in that order, then
    /// for chat text (`message` with `type` set to `text`). A payload only
    /// counts when it holds a truthy value, so `{"offer": null}` is not an
    /// offer.
    ///
    /// # Test
    ///
    /// ```
    /// use peer_signaling_codec::*;
    ///
    /// assert_eq!(
    ///     Request::decode(r#"{"next":"audio"}"#).unwrap(),
    ///     Request::Next(MediaType::Audio)
    /// );
    ///
    /// let Request::Relay(envelope) =
    ///     Request::decode(r#"{"iceCandidate":{"candidate":"c"},"to":"peer_b"}"#).unwrap()
    /// else {
    ///     panic!("expected relay");
    /// };
    ///
    /// assert_eq!(envelope.kind(), PayloadKind::IceCandidate);
    /// assert_eq!(envelope.to(), Some("peer_b"));
    ///
    /// assert!(matches!(Request::decode(r#"{"next":""}"#), Err(Error::UnknownMessage)));
    /// assert!(matches!(Request::decode("{next"), Err(Error::Json(_))));
    /// ```
    pub fn decode(text: &str) -> Result<Self, Error> {
        let fields = serde_json::from_str::<Map<String, Value>>(text)?;

        if let Some(media) = fields
            .get("next")
            .and_then(Value::as_str)
            .and_then(|it| MediaType::try_from(it).ok())
        {
            return Ok(Self::Next(media));
        }

        let kind = PayloadKind::NEGOTIATION
            .into_iter()
            .find(|kind| fields.get(kind.key()).is_some_and(is_truthy))
            .or_else(|| is_chat(&fields).then_some(PayloadKind::Text))
            .ok_or(Error::UnknownMessage)?;

        Ok(Self::Relay(Envelope {
            to: fields.get("to").and_then(Value::as_str).map(str::to_string),
            fields,
            kind,
        }))
    }
}

/// A notification generated by the server itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum Notification<'a> {
    /// Introduces the receiver to `peer_id`.
    Connect {
        #[serde(rename = "peerId")]
        peer_id: &'a str,
        #[serde(rename = "type")]
        media: MediaType,
    },
}

impl Notification<'_> {
    /// # Test
    ///
    /// ```
    /// use peer_signaling_codec::*;
    ///
    /// let text = Notification::Connect {
    ///     peer_id: "peer_abc",
    ///     media: MediaType::Video,
    /// }
    /// .encode()
    /// .unwrap();
    ///
    /// assert_eq!(text, r#"{"action":"connect","peerId":"peer_abc","type":"video"}"#);
    /// ```
    pub fn encode(&self) -> Result<String, Error> {
        Ok(serde_json::to_string(self)?)
    }
}

fn is_chat(fields: &Map<String, Value>) -> bool {
    let has_text = fields
        .get(PayloadKind::Text.key())
        .and_then(Value::as_str)
        .is_some_and(|it| !it.is_empty());

    has_text && fields.get("type").and_then(Value::as_str) == Some("text")
}

// Browsers build these frames in javascript, where presence checks are
// truthiness checks.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(it) => *it,
        Value::Number(it) => it.as_f64().is_some_and(|it| it != 0.0),
        Value::String(it) => !it.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
