//! Schema registry wire format.
//!
//! Every value produced to a registry-managed topic is framed as:
//!
//! ```text
//! [0]      magic byte, always 0x00
//! [1..5]   schema id, unsigned 32-bit big-endian
//! [5..]    serialized record body
//! ```
//!
//! There is no length prefix; consumers rely on the message boundary.

use crate::error::WireFormatError;
use bytes::{Buf, BufMut, Bytes, BytesMut};

/// Leading byte marking a registry-framed payload.
pub const MAGIC_BYTE: u8 = 0x00;

/// Size of the marker plus schema id.
pub const HEADER_LEN: usize = 5;

/// Frame a serialized body with its schema id.
pub fn encode(schema_id: u32, payload: &[u8]) -> Bytes {
    let mut buf = BytesMut::with_capacity(HEADER_LEN + payload.len());
    buf.put_u8(MAGIC_BYTE);
    buf.put_u32(schema_id);
    buf.put_slice(payload);
    buf.freeze()
}

/// Split a framed payload into its schema id and body.
pub fn decode(data: &[u8]) -> Result<(u32, &[u8]), WireFormatError> {
    if data.len() < HEADER_LEN {
        return Err(WireFormatError::TooShort(data.len()));
    }
    if data[0] != MAGIC_BYTE {
        return Err(WireFormatError::UnknownMagicByte(data[0]));
    }

    let mut id_bytes = &data[1..HEADER_LEN];
    let schema_id = id_bytes.get_u32();

    Ok((schema_id, &data[HEADER_LEN..]))
}
