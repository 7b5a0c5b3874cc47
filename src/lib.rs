//! Sensor Publisher Library
//!
//! Publishes synthetic sensor readings to a Kafka topic. Every value is a
//! protobuf `SensorReading` framed with the schema registry wire format
//! (magic byte, 4-byte schema id, body), so consumers can fetch the schema
//! from the registry instead of bundling it.
//!
//! # Crates
//!
//! - `schema_registry` - registry client, schema resolution, wire framing
//! - `sensor_producer` - devices, readings, Kafka sink, publish loop, delivery observer
//!
//! # CLI Usage
//!
//! ```bash
//! # Confluent Cloud style client properties
//! sensor-publisher --config client.properties --topic sensor-readings
//!
//! # Local broker and registry, 50 readings from a random device each time
//! sensor-publisher \
//!   --bootstrap-servers localhost:9092 \
//!   --schema-registry-url http://localhost:8081 \
//!   --selection random --max-messages 50 --create-topic --replication-factor 1
//! ```

pub mod args;
pub mod config;

mod app;

pub use app::run_publisher;
pub use args::Args;
pub use config::PublisherSettings;
