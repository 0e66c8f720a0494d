use anyhow::Result;
use peer_signaling_codec::*;
use serde_json::{Value, json};

fn decode_relay(text: &str) -> Result<Envelope> {
    match Request::decode(text)? {
        Request::Relay(envelope) => Ok(envelope),
        Request::Next(_) => Err(anyhow::anyhow!("Expected Relay")),
    }
}

#[test]
fn test_decode_next() -> Result<()> {
    assert_eq!(
        Request::decode(r#"{"next":"video"}"#)?,
        Request::Next(MediaType::Video)
    );

    assert_eq!(
        Request::decode(r#"{"next":"audio","offer":"sdp"}"#)?,
        Request::Next(MediaType::Audio)
    );

    // A client without local media asks with an empty type.
    assert!(matches!(
        Request::decode(r#"{"next":""}"#),
        Err(Error::UnknownMessage)
    ));

    assert!(matches!(
        Request::decode(r#"{"next":"screen"}"#),
        Err(Error::UnknownMessage)
    ));

    // An unusable `next` does not hide a payload in the same frame.
    let envelope = decode_relay(r#"{"next":"","answer":"sdp","to":"peer_b"}"#)?;
    assert_eq!(envelope.kind(), PayloadKind::Answer);

    Ok(())
}

#[test]
fn test_decode_negotiation() -> Result<()> {
    let envelope = decode_relay(r#"{"offer":{"type":"offer","sdp":"v=0"},"to":"peer_b"}"#)?;
    assert_eq!(envelope.kind(), PayloadKind::Offer);
    assert_eq!(envelope.to(), Some("peer_b"));
    assert_eq!(envelope.payload(), Some(&json!({"type":"offer","sdp":"v=0"})));

    let envelope = decode_relay(r#"{"answer":"sdp","to":"peer_a"}"#)?;
    assert_eq!(envelope.kind(), PayloadKind::Answer);

    let envelope = decode_relay(r#"{"iceCandidate":{"candidate":"c"},"to":"peer_a"}"#)?;
    assert_eq!(envelope.kind(), PayloadKind::IceCandidate);

    // Lookup order is offer, answer, iceCandidate.
    let envelope = decode_relay(r#"{"iceCandidate":"c","answer":"sdp","to":"peer_a"}"#)?;
    assert_eq!(envelope.kind(), PayloadKind::Answer);

    Ok(())
}

#[test]
fn test_decode_falsy_payloads() -> Result<()> {
    for text in [
        r#"{"offer":null,"to":"peer_b"}"#,
        r#"{"offer":"","to":"peer_b"}"#,
        r#"{"offer":false,"to":"peer_b"}"#,
        r#"{"offer":0,"to":"peer_b"}"#,
    ] {
        assert!(matches!(Request::decode(text), Err(Error::UnknownMessage)));
    }

    let envelope = decode_relay(r#"{"offer":null,"iceCandidate":[],"to":"peer_b"}"#)?;
    assert_eq!(envelope.kind(), PayloadKind::IceCandidate);

    Ok(())
}

#[test]
fn test_decode_chat() -> Result<()> {
    let envelope = decode_relay(r#"{"message":"hello","type":"text","to":"peer_b"}"#)?;
    assert_eq!(envelope.kind(), PayloadKind::Text);
    assert_eq!(envelope.to(), Some("peer_b"));

    // Without an explicit destination the frame still decodes, routing
    // decides what to do with it.
    let envelope = decode_relay(r#"{"message":"hello","type":"text"}"#)?;
    assert_eq!(envelope.to(), None);

    assert!(matches!(
        Request::decode(r#"{"message":"hello"}"#),
        Err(Error::UnknownMessage)
    ));

    assert!(matches!(
        Request::decode(r#"{"message":"","type":"text","to":"peer_b"}"#),
        Err(Error::UnknownMessage)
    ));

    Ok(())
}

#[test]
fn test_decode_malformed() {
    assert!(matches!(Request::decode(""), Err(Error::Json(_))));
    assert!(matches!(Request::decode("not json"), Err(Error::Json(_))));
    assert!(matches!(Request::decode("[1,2,3]"), Err(Error::Json(_))));
    assert!(matches!(Request::decode(r#""offer""#), Err(Error::Json(_))));
    assert!(matches!(Request::decode("{}"), Err(Error::UnknownMessage)));
}

#[test]
fn test_destination_must_be_string() -> Result<()> {
    let envelope = decode_relay(r#"{"offer":"sdp","to":42}"#)?;
    assert_eq!(envelope.to(), None);

    Ok(())
}

#[test]
fn test_encode_from() -> Result<()> {
    let envelope = decode_relay(r#"{"answer":{"sdp":"v=0"},"to":"peer_a","extra":[1,2]}"#)?;
    let value = serde_json::from_str::<Value>(&envelope.encode_from("peer_b")?)?;

    assert_eq!(
        value,
        json!({
            "answer": {"sdp": "v=0"},
            "to": "peer_a",
            "extra": [1, 2],
            "from": "peer_b",
        })
    );

    Ok(())
}

#[test]
fn test_encode_connect() -> Result<()> {
    let value = serde_json::from_str::<Value>(
        &Notification::Connect {
            peer_id: "peer_0123abcde",
            media: MediaType::Audio,
        }
        .encode()?,
    )?;

    assert_eq!(
        value,
        json!({
            "action": "connect",
            "peerId": "peer_0123abcde",
            "type": "audio",
        })
    );

    Ok(())
}
