//! Schema registry support for sensor-publisher.
//!
//! This crate provides:
//! - A client for a Confluent-compatible schema registry ([`HttpSchemaRegistry`])
//! - Topic schema resolution with register-if-missing ([`SchemaResolver`])
//! - The registry wire format: magic byte, big-endian schema id, body ([`wire`])
//!
//! # Example
//!
//! ```rust,no_run
//! use schema_registry::{wire, HttpSchemaRegistry, SchemaResolver, SchemaSource, SchemaType};
//!
//! # async fn example() -> schema_registry::Result<()> {
//! let registry = HttpSchemaRegistry::new("http://localhost:8081", None)?;
//! let resolver = SchemaResolver::new(
//!     registry,
//!     SchemaSource::new("schemas/SensorReading.proto", SchemaType::Protobuf),
//! );
//!
//! let schema = resolver.resolve("sensor-readings").await?;
//! let framed = wire::encode(schema.wire_id()?, b"serialized body");
//! assert_eq!(framed[0], wire::MAGIC_BYTE);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod error;
pub mod resolver;
pub mod wire;

pub use client::{BasicAuth, HttpSchemaRegistry, SchemaDescriptor, SchemaRegistry, SchemaType};
pub use error::{Result, SchemaRegistryError, WireFormatError};
pub use resolver::{SchemaResolver, SchemaSource};
