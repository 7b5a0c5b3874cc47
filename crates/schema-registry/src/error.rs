//! Error types for the schema-registry crate.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while talking to the schema registry or resolving a schema.
#[derive(Error, Debug)]
pub enum SchemaRegistryError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Schema registry returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Failed to read schema definition from {path:?}: {message}")]
    Definition { path: PathBuf, message: String },

    #[error("Schema id {0} cannot be used for wire framing")]
    InvalidSchemaId(i32),

    #[error("Invalid registry credentials: {0}")]
    Credentials(String),
}

/// Errors raised while decoding a framed payload.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum WireFormatError {
    #[error("Framed payload is {0} bytes, shorter than the 5 byte header")]
    TooShort(usize),

    #[error("Unknown magic byte: expected 0x00, got 0x{0:02x}")]
    UnknownMagicByte(u8),
}

/// Result type alias for schema-registry operations.
pub type Result<T> = std::result::Result<T, SchemaRegistryError>;
