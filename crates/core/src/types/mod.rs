//! Domain types for the paint pipeline and push channel

mod event;
mod message;
mod request;

pub use event::ChangeEvent;
pub use message::{ClientMessage, ServerMessage};
pub use request::PaintRequest;
