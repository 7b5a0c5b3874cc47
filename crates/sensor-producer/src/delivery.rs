//! Delivery report observer.
//!
//! The broker client reports the outcome of every produced message
//! asynchronously. Reports are forwarded into a channel and drained here,
//! independently of the publish loop.

use rdkafka::message::Message;
use rdkafka::producer::DeliveryResult;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// Where a message landed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeliveredAt {
    pub partition: i32,
    pub offset: i64,
}

/// Outcome of a single produced message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryReport {
    pub key: Option<Vec<u8>>,
    pub outcome: Result<DeliveredAt, String>,
}

impl DeliveryReport {
    pub fn delivered(key: Option<Vec<u8>>, partition: i32, offset: i64) -> Self {
        Self {
            key,
            outcome: Ok(DeliveredAt { partition, offset }),
        }
    }

    pub fn failed(key: Option<Vec<u8>>, error: impl Into<String>) -> Self {
        Self {
            key,
            outcome: Err(error.into()),
        }
    }

    pub(crate) fn from_result(result: &DeliveryResult<'_>) -> Self {
        match result {
            Ok(message) => Self::delivered(
                message.key().map(<[u8]>::to_vec),
                message.partition(),
                message.offset(),
            ),
            Err((err, message)) => Self::failed(message.key().map(<[u8]>::to_vec), err.to_string()),
        }
    }

    fn key_str(&self) -> String {
        self.key
            .as_deref()
            .map(|key| String::from_utf8_lossy(key).into_owned())
            .unwrap_or_default()
    }
}

/// Totals collected by the observer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeliveryStats {
    pub delivered: u64,
    pub failed: u64,
}

/// Spawn the observer on the runtime. The task finishes, returning its
/// totals, once every sender of `reports` is dropped.
pub fn spawn_delivery_observer(
    reports: mpsc::UnboundedReceiver<DeliveryReport>,
) -> JoinHandle<DeliveryStats> {
    tokio::spawn(observe_deliveries(reports))
}

/// Drain delivery reports until the stream closes, logging each one.
pub async fn observe_deliveries(
    mut reports: mpsc::UnboundedReceiver<DeliveryReport>,
) -> DeliveryStats {
    let mut stats = DeliveryStats::default();

    while let Some(report) = reports.recv().await {
        match &report.outcome {
            Ok(at) => {
                stats.delivered += 1;
                info!(
                    "Reading sent to partition {} with offset {}",
                    at.partition, at.offset
                );
            }
            Err(err) => {
                stats.failed += 1;
                warn!("Error delivering reading '{}': {}", report.key_str(), err);
            }
        }
    }

    info!(
        "Delivery report stream closed ({} delivered, {} failed)",
        stats.delivered, stats.failed
    );
    stats
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_observer_counts_outcomes_until_closed() {
        let (tx, rx) = mpsc::unbounded_channel();
        let observer = spawn_delivery_observer(rx);

        tx.send(DeliveryReport::delivered(Some(b"a".to_vec()), 0, 10))
            .unwrap();
        tx.send(DeliveryReport::failed(Some(b"b".to_vec()), "Message timed out"))
            .unwrap();
        tx.send(DeliveryReport::delivered(Some(b"c".to_vec()), 2, 3))
            .unwrap();
        drop(tx);

        let stats = observer.await.unwrap();
        assert_eq!(
            stats,
            DeliveryStats {
                delivered: 2,
                failed: 1
            }
        );
    }

    #[tokio::test]
    async fn test_observer_ends_on_empty_stream() {
        let (tx, rx) = mpsc::unbounded_channel::<DeliveryReport>();
        drop(tx);
        assert_eq!(observe_deliveries(rx).await, DeliveryStats::default());
    }

    #[test]
    fn test_key_str_handles_missing_and_binary_keys() {
        assert_eq!(DeliveryReport::failed(None, "x").key_str(), "");
        assert_eq!(
            DeliveryReport::failed(Some(b"device-1".to_vec()), "x").key_str(),
            "device-1"
        );
        assert_eq!(
            DeliveryReport::failed(Some(vec![0xff]), "x").key_str(),
            "\u{fffd}"
        );
    }
}
