//! Push channel messages
//!
//! JSON text frames, tagged by `type`:
//!
//! | Direction | Message |
//! |-----------|---------|
//! | client → server | `{"type":"subscribe","channel":"board"}` |
//! | server → client | `{"type":"subscribed","channel":"board"}` |
//! | server → client | `{"type":"paint","channel":"board","x":0,"y":0,"color":5}` |

use serde::{Deserialize, Serialize};

use super::ChangeEvent;
use crate::palette::ColorIndex;
use crate::BOARD_CHANNEL;

/// Message sent by a push subscriber
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Subscribe to a named channel
    Subscribe { channel: String },
}

/// Message sent to push subscribers
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Subscription acknowledgement
    Subscribed { channel: String },

    /// Committed pixel change
    Paint {
        channel: String,
        x: usize,
        y: usize,
        color: ColorIndex,
    },
}

impl ClientMessage {
    /// Create subscribe message for the board channel
    pub fn subscribe_board() -> Self {
        Self::Subscribe {
            channel: BOARD_CHANNEL.to_string(),
        }
    }

    /// Server reply, if any
    ///
    /// Only a subscribe naming the board channel is answered.
    pub fn reply(&self) -> Option<ServerMessage> {
        match self {
            Self::Subscribe { channel } if channel == BOARD_CHANNEL => {
                Some(ServerMessage::Subscribed {
                    channel: channel.clone(),
                })
            }
            Self::Subscribe { .. } => None,
        }
    }
}

impl From<ChangeEvent> for ServerMessage {
    fn from(event: ChangeEvent) -> Self {
        Self::Paint {
            channel: BOARD_CHANNEL.to_string(),
            x: event.x,
            y: event.y,
            color: event.color,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subscribe_board_acknowledged() {
        let reply = ClientMessage::subscribe_board().reply();
        assert_eq!(
            reply,
            Some(ServerMessage::Subscribed {
                channel: "board".to_string()
            })
        );
    }

    #[test]
    fn test_subscribe_other_channel_ignored() {
        let msg = ClientMessage::Subscribe {
            channel: "chat".to_string(),
        };
        assert_eq!(msg.reply(), None);
    }

    #[test]
    fn test_paint_message_json() {
        let event = ChangeEvent::new(0, 0, ColorIndex::new(5).unwrap());
        let json = serde_json::to_value(ServerMessage::from(event)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"type": "paint", "channel": "board", "x": 0, "y": 0, "color": 5})
        );
    }

    #[test]
    fn test_subscribe_json() {
        let msg: ClientMessage =
            serde_json::from_str(r#"{"type":"subscribe","channel":"board"}"#).unwrap();
        assert_eq!(msg, ClientMessage::subscribe_board());
    }
}
