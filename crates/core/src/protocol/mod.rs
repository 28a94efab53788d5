//! Push channel wire format

mod codec;

pub use codec::MessageCodec;
