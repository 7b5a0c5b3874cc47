//! Synthetic sensor reading producer.
//!
//! This crate provides:
//! - A fixed pool of simulated devices and device selection strategies
//! - Protobuf encoding of `SensorReading` messages
//! - A Kafka sink whose delivery reports are forwarded into a channel
//! - The publish loop and the delivery report observer
//!
//! # Architecture
//!
//! ```text
//! DeviceRegistry ──► Publisher ──► encode_reading ──► wire::encode ──► KafkaSink::send
//!                                                                          │
//!                     spawn_delivery_observer ◄── DeliveryReport channel ◄─┘
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use sensor_producer::{
//!     spawn_delivery_observer, DeviceRegistry, KafkaSettings, KafkaSink, MessageSink,
//!     Publisher, PublisherConfig,
//! };
//! use std::time::Duration;
//!
//! # async fn example() -> sensor_producer::Result<()> {
//! let mut settings = KafkaSettings::new();
//! settings.set("bootstrap.servers", "localhost:9092");
//!
//! let (sink, reports) = KafkaSink::connect(&settings)?;
//! let observer = spawn_delivery_observer(reports);
//!
//! let publisher = Publisher::new(sink, DeviceRegistry::create(5)?, PublisherConfig::new("sensor-readings", 1));
//! let (_shutdown_tx, shutdown_rx) = tokio::sync::broadcast::channel(1);
//! publisher.run(shutdown_rx).await?;
//!
//! let sink = publisher.into_sink();
//! sink.flush(Duration::from_secs(10)).await?;
//! drop(sink);
//! let _stats = observer.await;
//! # Ok(())
//! # }
//! ```

pub mod delivery;
pub mod device;
pub mod error;
pub mod publisher;
pub mod reading;
pub mod settings;
pub mod sink;
pub mod topic;

pub use delivery::{
    observe_deliveries, spawn_delivery_observer, DeliveredAt, DeliveryReport, DeliveryStats,
};
pub use device::{Device, DeviceRegistry, DeviceSelection, DeviceSelector};
pub use error::{ProducerError, Result};
pub use publisher::{PublishSummary, Publisher, PublisherConfig, DEFAULT_INTERVAL};
pub use reading::{encode_reading, Reading};
pub use settings::KafkaSettings;
pub use sink::{FramedMessage, KafkaSink, MessageSink};
pub use topic::{create_topic_if_not_exists, TopicSpec};
