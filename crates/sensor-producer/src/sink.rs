//! Message sinks the publish loop submits framed readings to.

use crate::delivery::DeliveryReport;
use crate::error::{ProducerError, Result};
use crate::settings::KafkaSettings;
use async_trait::async_trait;
use bytes::Bytes;
use rdkafka::error::{KafkaError, RDKafkaErrorCode};
use rdkafka::producer::{BaseRecord, DeliveryResult, Producer, ProducerContext, ThreadedProducer};
use rdkafka::ClientContext;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Wait between retries while the client's local queue is full.
const QUEUE_FULL_BACKOFF: Duration = Duration::from_millis(100);

/// A registry-framed message ready to be produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FramedMessage {
    /// Device id bytes.
    pub key: Vec<u8>,
    /// Magic byte, schema id, serialized reading.
    pub value: Bytes,
}

impl FramedMessage {
    pub fn new(key: &[u8], value: Bytes) -> Self {
        Self {
            key: key.to_vec(),
            value,
        }
    }
}

/// Destination for framed messages.
///
/// `send` only enqueues; the outcome of each message arrives later on the
/// delivery report stream. An error from `send` means the sink can no longer
/// be used; a single rejected message is reported on the stream instead.
#[async_trait]
pub trait MessageSink: Send + Sync {
    async fn send(&self, topic: &str, message: &FramedMessage) -> Result<()>;

    /// Wait up to `timeout` for in-flight messages to be delivered.
    async fn flush(&self, timeout: Duration) -> Result<()>;
}

/// Producer context forwarding delivery callbacks into a channel.
struct DeliveryForwarder {
    reports: mpsc::UnboundedSender<DeliveryReport>,
}

impl ClientContext for DeliveryForwarder {}

impl ProducerContext for DeliveryForwarder {
    type DeliveryOpaque = ();

    fn delivery(&self, delivery_result: &DeliveryResult<'_>, _: Self::DeliveryOpaque) {
        // Send only fails once the observer is gone, at which point nobody
        // is interested in the report.
        let _ = self.reports.send(DeliveryReport::from_result(delivery_result));
    }
}

/// Kafka sink backed by a librdkafka producer with a background poll thread.
pub struct KafkaSink {
    producer: Arc<ThreadedProducer<DeliveryForwarder>>,
    reports: mpsc::UnboundedSender<DeliveryReport>,
}

impl KafkaSink {
    /// Create the producer. Returns the sink and the delivery report stream,
    /// which closes when the sink is dropped.
    pub fn connect(
        settings: &KafkaSettings,
    ) -> Result<(Self, mpsc::UnboundedReceiver<DeliveryReport>)> {
        let (tx, rx) = mpsc::unbounded_channel();
        let producer: ThreadedProducer<DeliveryForwarder> = settings
            .client_config()
            .create_with_context(DeliveryForwarder {
                reports: tx.clone(),
            })?;

        Ok((
            Self {
                producer: Arc::new(producer),
                reports: tx,
            },
            rx,
        ))
    }

    fn reject(&self, message: &FramedMessage, err: &ProducerError) {
        warn!(
            "Reading for device '{}' rejected: {}",
            String::from_utf8_lossy(&message.key),
            err
        );
        let _ = self.reports.send(DeliveryReport::failed(
            Some(message.key.clone()),
            err.to_string(),
        ));
    }
}

#[async_trait]
impl MessageSink for KafkaSink {
    async fn send(&self, topic: &str, message: &FramedMessage) -> Result<()> {
        loop {
            // No partition: the broker client's partitioner picks one from the key.
            let record: BaseRecord<'_, [u8], [u8]> = BaseRecord::to(topic)
                .key(&message.key[..])
                .payload(&message.value[..]);

            match self.producer.send(record) {
                Ok(()) => return Ok(()),
                Err((KafkaError::MessageProduction(RDKafkaErrorCode::QueueFull), _)) => {}
                Err((err, _)) => {
                    let err = ProducerError::from(err);
                    if err.is_fatal() {
                        return Err(err);
                    }
                    self.reject(message, &err);
                    return Ok(());
                }
            }

            debug!("Producer queue full, waiting {:?}", QUEUE_FULL_BACKOFF);
            tokio::time::sleep(QUEUE_FULL_BACKOFF).await;
        }
    }

    async fn flush(&self, timeout: Duration) -> Result<()> {
        let producer = Arc::clone(&self.producer);
        tokio::task::spawn_blocking(move || producer.flush(timeout)).await??;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    /// Settings for a producer whose broker never answers, so every message
    /// stays queued until it times out.
    fn unreachable_broker() -> KafkaSettings {
        let mut settings = KafkaSettings::new();
        settings
            .set("bootstrap.servers", "127.0.0.1:1")
            .set("queue.buffering.max.messages", "1")
            .set("message.timeout.ms", "200");
        settings
    }

    fn message(key: &str, len: usize) -> FramedMessage {
        FramedMessage::new(key.as_bytes(), Bytes::from(vec![0u8; len]))
    }

    #[tokio::test]
    async fn test_full_queue_waits_for_space() {
        let (sink, mut reports) = KafkaSink::connect(&unreachable_broker()).unwrap();

        sink.send("sensor-readings", &message("device-1", 16))
            .await
            .unwrap();

        let started = Instant::now();
        tokio::time::timeout(
            Duration::from_secs(10),
            sink.send("sensor-readings", &message("device-2", 16)),
        )
        .await
        .unwrap()
        .unwrap();
        assert!(started.elapsed() >= QUEUE_FULL_BACKOFF);

        let report = tokio::time::timeout(Duration::from_secs(10), reports.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(report.key, Some(b"device-1".to_vec()));
        assert!(report.outcome.is_err());
    }

    #[tokio::test]
    async fn test_rejected_message_is_reported_not_returned() {
        let mut settings = unreachable_broker();
        settings
            .set("message.max.bytes", "1000")
            .set("batch.size", "1000");
        let (sink, mut reports) = KafkaSink::connect(&settings).unwrap();

        sink.send("sensor-readings", &message("device-1", 4096))
            .await
            .unwrap();

        let report = reports.recv().await.unwrap();
        assert_eq!(report.key, Some(b"device-1".to_vec()));
        assert!(report.outcome.is_err());
    }

    #[tokio::test]
    async fn test_flush_times_out_with_undelivered_messages() {
        let (sink, _reports) = KafkaSink::connect(&unreachable_broker()).unwrap();
        sink.flush(Duration::from_millis(50)).await.unwrap();

        sink.send("sensor-readings", &message("device-1", 16))
            .await
            .unwrap();
        assert!(sink.flush(Duration::from_millis(50)).await.is_err());
    }
}
