//! JSON text codec for push channel messages

use crate::types::{ClientMessage, ServerMessage};

/// Message codec for serialization/deserialization
pub struct MessageCodec;

impl MessageCodec {
    /// Encode server message as a JSON text frame
    pub fn encode(msg: &ServerMessage) -> Result<String, serde_json::Error> {
        serde_json::to_string(msg)
    }

    /// Decode client text frame
    ///
    /// Returns `None` for anything that is not a recognized message shape;
    /// callers ignore those.
    pub fn decode(text: &str) -> Option<ClientMessage> {
        match serde_json::from_str(text) {
            Ok(msg) => Some(msg),
            Err(e) => {
                tracing::trace!("Ignoring unrecognized push message: {}", e);
                None
            }
        }
    }

    /// Decode a client frame and build the reply in one step
    pub fn reply_to(text: &str) -> Option<ServerMessage> {
        Self::decode(text)?.reply()
    }
}
