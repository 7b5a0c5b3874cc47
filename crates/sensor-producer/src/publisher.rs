//! The publish loop.
//!
//! Each iteration picks a device, captures a reading, encodes it as
//! protobuf, frames it with the topic's schema id and hands it to the sink
//! keyed by the device id. Iterations are spaced by a fixed interval.

use crate::device::{Device, DeviceRegistry, DeviceSelection, DeviceSelector};
use crate::error::Result;
use crate::reading::{encode_reading, Reading};
use crate::sink::{FramedMessage, MessageSink};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use schema_registry::wire;
use std::time::{Duration, Instant};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

/// Default pause between readings.
pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(100);

/// Publish loop parameters.
#[derive(Debug, Clone)]
pub struct PublisherConfig {
    pub topic: String,
    /// Schema id written into every framed message.
    pub schema_id: u32,
    pub interval: Duration,
    pub selection: DeviceSelection,
    /// Stop after this many messages. Runs until shutdown when unset.
    pub max_messages: Option<u64>,
    /// Seed for reading values and random device selection.
    pub seed: Option<u64>,
}

impl PublisherConfig {
    pub fn new(topic: impl Into<String>, schema_id: u32) -> Self {
        Self {
            topic: topic.into(),
            schema_id,
            interval: DEFAULT_INTERVAL,
            selection: DeviceSelection::default(),
            max_messages: None,
            seed: None,
        }
    }
}

/// What a finished run accomplished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PublishSummary {
    /// Readings handed to the sink, including any it rejected.
    pub messages_submitted: u64,
    pub elapsed: Duration,
}

pub struct Publisher<S> {
    sink: S,
    devices: DeviceRegistry,
    config: PublisherConfig,
}

impl<S: MessageSink> Publisher<S> {
    pub fn new(sink: S, devices: DeviceRegistry, config: PublisherConfig) -> Self {
        Self {
            sink,
            devices,
            config,
        }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn devices(&self) -> &DeviceRegistry {
        &self.devices
    }

    /// Give back the sink so the caller can flush and close it.
    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Publish until `max_messages` is reached or a shutdown signal arrives.
    ///
    /// The signal is checked before every iteration and raced against the
    /// pause between iterations. A closed channel counts as a signal.
    /// Only an error that leaves the sink unusable ends the run. A rejected
    /// message is logged and the loop moves on; delivery failures are left
    /// to the delivery report stream.
    pub async fn run(&self, mut shutdown: broadcast::Receiver<()>) -> Result<PublishSummary> {
        let mut rng = match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let mut selector = DeviceSelector::new(self.config.selection);
        let started = Instant::now();
        let mut submitted = 0u64;

        info!(
            "Publishing to '{}' with schema {} from {} devices ({:?}, every {:?})",
            self.config.topic,
            self.config.schema_id,
            self.devices.len(),
            self.config.selection,
            self.config.interval
        );

        loop {
            if shutdown_requested(&mut shutdown) {
                info!("Received shutdown signal");
                break;
            }

            let device = selector.select(self.devices.devices(), &mut rng);
            let message = self.frame(device, &mut rng)?;
            submitted += 1;
            match self.sink.send(&self.config.topic, &message).await {
                Ok(()) => debug!("Submitted reading {} for device {}", submitted, device.id()),
                Err(err) if err.is_fatal() => return Err(err),
                Err(err) => warn!("Reading for device {} not sent: {}", device.id(), err),
            }

            if self.config.max_messages.is_some_and(|max| submitted >= max) {
                info!("Reached {} messages", submitted);
                break;
            }

            tokio::select! {
                _ = shutdown.recv() => {
                    info!("Received shutdown signal");
                    break;
                }
                _ = tokio::time::sleep(self.config.interval) => {}
            }
        }

        Ok(PublishSummary {
            messages_submitted: submitted,
            elapsed: started.elapsed(),
        })
    }

    fn frame<R: Rng>(&self, device: &Device, rng: &mut R) -> Result<FramedMessage> {
        let reading = Reading::capture(device, rng)?;
        let body = encode_reading(&reading)?;
        Ok(FramedMessage::new(
            device.key(),
            wire::encode(self.config.schema_id, &body),
        ))
    }
}

fn shutdown_requested(shutdown: &mut broadcast::Receiver<()>) -> bool {
    !matches!(
        shutdown.try_recv(),
        Err(broadcast::error::TryRecvError::Empty)
    )
}
