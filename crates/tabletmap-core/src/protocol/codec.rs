//! Frame codec for the i3/sway IPC protocol.
//!
//! Wire format:
//! ```text
//! ["i3-ipc":6][payload_len:4][msg_type:4][payload:N]
//! ```
//! Total header size: 14 bytes.  Both integers use the host's native byte
//! order, since the socket never leaves the machine.

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

use crate::protocol::messages::{
    EventType, IpcMessage, MessageType, PayloadKind, EVENT_FLAG, HEADER_SIZE, MAGIC, MAX_PAYLOAD,
};

/// Errors that can occur during frame encoding or decoding.
#[derive(Debug, Error, PartialEq)]
pub enum ProtocolError {
    /// The byte slice is shorter than the frame it starts.
    #[error("insufficient data: need at least {needed} bytes, got {available}")]
    InsufficientData { needed: usize, available: usize },

    /// The frame does not start with `i3-ipc`.
    #[error("bad magic: frame does not start with \"i3-ipc\"")]
    BadMagic,

    /// The type code in the header is not a recognized reply or event.
    #[error("unknown message type: 0x{0:08X}")]
    UnknownMessageType(u32),

    /// The declared payload length exceeds [`MAX_PAYLOAD`].
    #[error("payload too large: header declares {declared} bytes, limit is {limit}")]
    PayloadTooLarge { declared: usize, limit: usize },

    /// The payload could not be parsed (bad JSON, missing field, etc.).
    #[error("malformed payload: {0}")]
    MalformedPayload(String),
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Encodes a request frame of `msg_type` carrying `payload`.
///
/// # Examples
///
/// ```rust
/// use tabletmap_core::protocol::{encode_message, decode_message, MessageType, PayloadKind};
///
/// let bytes = encode_message(MessageType::GetTree, b"");
/// let (decoded, consumed) = decode_message(&bytes).unwrap();
/// assert_eq!(decoded.kind, PayloadKind::Reply(MessageType::GetTree));
/// assert_eq!(consumed, bytes.len());
/// ```
pub fn encode_message(msg_type: MessageType, payload: &[u8]) -> Vec<u8> {
    let mut buf = Vec::with_capacity(HEADER_SIZE + payload.len());
    buf.extend_from_slice(MAGIC);
    buf.extend_from_slice(&(payload.len() as u32).to_ne_bytes());
    buf.extend_from_slice(&(msg_type as u32).to_ne_bytes());
    buf.extend_from_slice(payload);
    buf
}

/// Encodes a request frame whose payload is `body` serialized as JSON.
///
/// # Errors
///
/// Returns [`ProtocolError::MalformedPayload`] if serialization fails.
pub fn encode_json<T: Serialize + ?Sized>(
    msg_type: MessageType,
    body: &T,
) -> Result<Vec<u8>, ProtocolError> {
    let payload =
        serde_json::to_vec(body).map_err(|e| ProtocolError::MalformedPayload(e.to_string()))?;
    Ok(encode_message(msg_type, &payload))
}

/// Encodes an event frame.  Compositors send these; tabletmap only encodes
/// them for its in-memory test doubles.
pub fn encode_event(event_type: EventType, payload: &[u8]) -> Vec<u8> {
    let mut buf = Vec::with_capacity(HEADER_SIZE + payload.len());
    buf.extend_from_slice(MAGIC);
    buf.extend_from_slice(&(payload.len() as u32).to_ne_bytes());
    buf.extend_from_slice(&(event_type as u32).to_ne_bytes());
    buf.extend_from_slice(payload);
    buf
}

/// Decodes one frame from the beginning of `bytes`.
///
/// Returns the decoded frame and the total number of bytes consumed
/// (header + payload), so the caller can advance their read cursor.
///
/// # Errors
///
/// Returns [`ProtocolError::InsufficientData`] while the frame is still
/// incomplete (the caller should read more bytes and retry), and other
/// [`ProtocolError`] variants if the bytes are malformed.
pub fn decode_message(bytes: &[u8]) -> Result<(IpcMessage, usize), ProtocolError> {
    if bytes.len() < HEADER_SIZE {
        return Err(ProtocolError::InsufficientData {
            needed: HEADER_SIZE,
            available: bytes.len(),
        });
    }

    if &bytes[..MAGIC.len()] != MAGIC {
        return Err(ProtocolError::BadMagic);
    }

    let payload_len = u32::from_ne_bytes([bytes[6], bytes[7], bytes[8], bytes[9]]) as usize;
    if payload_len > MAX_PAYLOAD {
        return Err(ProtocolError::PayloadTooLarge {
            declared: payload_len,
            limit: MAX_PAYLOAD,
        });
    }

    let type_code = u32::from_ne_bytes([bytes[10], bytes[11], bytes[12], bytes[13]]);
    let kind = decode_kind(type_code)?;

    let total_needed = HEADER_SIZE + payload_len;
    if bytes.len() < total_needed {
        return Err(ProtocolError::InsufficientData {
            needed: total_needed,
            available: bytes.len(),
        });
    }

    let payload = bytes[HEADER_SIZE..total_needed].to_vec();
    Ok((IpcMessage { kind, payload }, total_needed))
}

/// Parses a frame payload as JSON into `T`.
///
/// # Errors
///
/// Returns [`ProtocolError::MalformedPayload`] if the payload is not valid
/// JSON for `T`.
pub fn parse_payload<T: DeserializeOwned>(payload: &[u8]) -> Result<T, ProtocolError> {
    serde_json::from_slice(payload).map_err(|e| ProtocolError::MalformedPayload(e.to_string()))
}

fn decode_kind(type_code: u32) -> Result<PayloadKind, ProtocolError> {
    if type_code & EVENT_FLAG != 0 {
        EventType::try_from(type_code)
            .map(PayloadKind::Event)
            .map_err(|_| ProtocolError::UnknownMessageType(type_code))
    } else {
        MessageType::try_from(type_code)
            .map(PayloadKind::Reply)
            .map_err(|_| ProtocolError::UnknownMessageType(type_code))
    }
}
