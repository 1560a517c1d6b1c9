//! Protocol module containing the inbound event types, the outbound command
//! set and the JSON envelope codec.

pub mod codec;
pub mod commands;
pub mod events;

pub use codec::{decode_envelope, encode_envelope, CodecError};
pub use commands::*;
pub use events::*;
