//! Custom messages exchanged with the browser frontend.
//!
//! Each message is a small JSON object tagged by `type`, plus zero or more
//! binary buffers carried alongside it by the comm layer.
//!
//! | type    | direction  | buffers            |
//! |---------|------------|--------------------|
//! | `RECV`  | frontend   | serial bytes read  |
//! | `text`  | frontend   | none               |
//! | `binary`| frontend   | raw bytes          |
//! | `SEND`  | backend    | bytes to write     |
//! | `SEND2` | backend    | none (text field)  |

use crate::error::{Error, Result};
use bytes::Bytes;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum MessageBody {
    /// Bytes read from the serial port
    #[serde(rename = "RECV")]
    Recv,

    /// Bytes to write to the serial port
    #[serde(rename = "SEND")]
    Send,

    /// Text to encode and write to the serial port
    #[serde(rename = "SEND2")]
    SendText { text: String },

    /// Text to append to the widget value
    #[serde(rename = "text")]
    Text { text: String },

    /// Bytes to append (hex encoded) to the widget value
    #[serde(rename = "binary")]
    Binary,
}

impl MessageBody {
    pub fn kind(&self) -> &'static str {
        match self {
            MessageBody::Recv => "RECV",
            MessageBody::Send => "SEND",
            MessageBody::SendText { .. } => "SEND2",
            MessageBody::Text { .. } => "text",
            MessageBody::Binary => "binary",
        }
    }
}

const KNOWN_TYPES: [&str; 5] = ["RECV", "SEND", "SEND2", "text", "binary"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HubMessage {
    pub body: MessageBody,
    pub buffers: Vec<Bytes>,
}

impl HubMessage {
    pub fn new(body: MessageBody, buffers: Vec<Bytes>) -> Self {
        Self { body, buffers }
    }

    pub fn send(data: Bytes) -> Self {
        Self::new(MessageBody::Send, vec![data])
    }

    pub fn send_text(text: impl Into<String>) -> Self {
        Self::new(MessageBody::SendText { text: text.into() }, Vec::new())
    }

    pub fn recv(buffers: Vec<Bytes>) -> Self {
        Self::new(MessageBody::Recv, buffers)
    }

    pub fn kind(&self) -> &'static str {
        self.body.kind()
    }

    /// Split into the JSON content and the binary buffers.
    pub fn encode(&self) -> Result<(String, Vec<Bytes>)> {
        let json = serde_json::to_string(&self.body)?;
        Ok((json, self.buffers.clone()))
    }

    /// Rebuild a message from JSON content and its buffers.
    pub fn decode(json: &str, buffers: Vec<Bytes>) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        let kind = value
            .get("type")
            .and_then(|t| t.as_str())
            .ok_or_else(|| Error::Message("missing message type".into()))?;
        if !KNOWN_TYPES.contains(&kind) {
            return Err(Error::Message(format!("unknown message type {:?}", kind)));
        }
        let body: MessageBody = serde_json::from_value(value)?;
        Ok(Self { body, buffers })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_send() {
        let msg = HubMessage::send(Bytes::from_static(b"\x01\x02"));
        let (json, buffers) = msg.encode().unwrap();
        assert_eq!(json, r#"{"type":"SEND"}"#);
        assert_eq!(buffers, vec![Bytes::from_static(b"\x01\x02")]);
    }

    #[test]
    fn test_encode_send_text() {
        let (json, buffers) = HubMessage::send_text("6").encode().unwrap();
        assert_eq!(json, r#"{"type":"SEND2","text":"6"}"#);
        assert!(buffers.is_empty());
    }

    #[test]
    fn test_decode_recv() {
        let msg = HubMessage::decode(r#"{"type":"RECV"}"#, vec![Bytes::from_static(b"abc")]).unwrap();
        assert_eq!(msg.body, MessageBody::Recv);
        assert_eq!(msg.kind(), "RECV");
        assert_eq!(msg.buffers.len(), 1);
    }

    #[test]
    fn test_decode_text() {
        let msg = HubMessage::decode(r#"{"type":"text","text":"VALUE-6\n"}"#, Vec::new()).unwrap();
        assert_eq!(
            msg.body,
            MessageBody::Text {
                text: "VALUE-6\n".into()
            }
        );
    }

    #[test]
    fn test_decode_errors() {
        assert!(matches!(
            HubMessage::decode(r#"{"type":"BOGUS"}"#, Vec::new()),
            Err(Error::Message(_))
        ));
        assert!(matches!(
            HubMessage::decode(r#"{"text":"no type"}"#, Vec::new()),
            Err(Error::Message(_))
        ));
        assert!(matches!(
            HubMessage::decode("not json", Vec::new()),
            Err(Error::Json(_))
        ));
        assert!(matches!(
            HubMessage::decode(r#"{"type":"text"}"#, Vec::new()),
            Err(Error::Json(_))
        ));
    }
}
