//! Pixelboard Core - Shared logic for the pixel board simulator
//!
//! This crate provides:
//! - Color palette and board store
//! - Per-token cooldown enforcement (governor)
//! - Serialized paint pipeline with broadcast fan-out
//! - Snapshot encoding and push-channel messages
//! - Identity token generation

/// Name of the push channel carrying board change notifications
pub const BOARD_CHANNEL: &str = "board";

pub mod board;
pub mod broadcast;
pub mod error;
pub mod palette;
pub mod pipeline;
pub mod protocol;
pub mod ratelimit;
pub mod snapshot;
pub mod token;
pub mod types;

// Re-export common types
pub use board::Board;
pub use broadcast::{Broadcaster, SubscriberId, Subscription, SUBSCRIBER_QUEUE_CAPACITY};
pub use error::{BoardError, PaintError, Result};
pub use palette::{ColorIndex, Rgb, PALETTE, PALETTE_SIZE};
pub use pipeline::PaintPipeline;
pub use protocol::MessageCodec;
pub use ratelimit::{RateDecision, RateLimiterStore};
pub use token::IdentityToken;
pub use types::{ChangeEvent, ClientMessage, PaintRequest, ServerMessage};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_board_channel_name() {
        assert_eq!(BOARD_CHANNEL, "board");
    }
}
