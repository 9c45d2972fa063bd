//! Protocol module containing message types, the frame codec, and typed events.

pub mod codec;
pub mod events;
pub mod messages;

pub use codec::{decode_message, encode_json, encode_message, parse_payload, ProtocolError};
pub use events::{decode_event, CompositorEvent, EventKind};
pub use messages::*;
