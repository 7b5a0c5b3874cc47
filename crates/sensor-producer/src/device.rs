//! Simulated device pool and per-iteration device selection.

use crate::error::{ProducerError, Result};
use clap::ValueEnum;
use rand::Rng;
use uuid::Uuid;

/// A simulated sensor device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Device {
    id: String,
    enabled: bool,
}

impl Device {
    /// Create an enabled device with a fresh random UUID.
    pub fn generate() -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            enabled: true,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Kafka message key for readings from this device.
    pub fn key(&self) -> &[u8] {
        self.id.as_bytes()
    }
}

/// Fixed, ordered pool of devices created once at startup.
#[derive(Debug, Clone)]
pub struct DeviceRegistry {
    devices: Vec<Device>,
}

impl DeviceRegistry {
    /// Create `count` devices. An empty pool is rejected.
    pub fn create(count: usize) -> Result<Self> {
        if count == 0 {
            return Err(ProducerError::NoDevices);
        }
        let devices = (0..count).map(|_| Device::generate()).collect();
        Ok(Self { devices })
    }

    pub fn devices(&self) -> &[Device] {
        &self.devices
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }
}

/// How the publish loop picks the device for each reading.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum DeviceSelection {
    /// Cycle through the pool in order.
    #[default]
    RoundRobin,
    /// Always pick the last device in the pool.
    Last,
    /// Pick uniformly at random.
    Random,
}

/// Stateful cursor implementing a [`DeviceSelection`].
#[derive(Debug, Clone)]
pub struct DeviceSelector {
    selection: DeviceSelection,
    next: usize,
}

impl DeviceSelector {
    pub fn new(selection: DeviceSelection) -> Self {
        Self { selection, next: 0 }
    }

    /// Pick the next device. `devices` must not be empty.
    pub fn select<'a, R: Rng>(&mut self, devices: &'a [Device], rng: &mut R) -> &'a Device {
        let index = match self.selection {
            DeviceSelection::RoundRobin => {
                let index = self.next % devices.len();
                self.next = (index + 1) % devices.len();
                index
            }
            DeviceSelection::Last => devices.len() - 1,
            DeviceSelection::Random => rng.random_range(0..devices.len()),
        };
        &devices[index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    #[test]
    fn test_create_devices() {
        let registry = DeviceRegistry::create(5).unwrap();
        assert_eq!(registry.len(), 5);

        let ids: HashSet<&str> = registry.devices().iter().map(Device::id).collect();
        assert_eq!(ids.len(), 5);
        assert!(registry.devices().iter().all(Device::enabled));
        for id in ids {
            assert!(Uuid::parse_str(id).is_ok());
        }
    }

    #[test]
    fn test_empty_pool_rejected() {
        assert!(matches!(
            DeviceRegistry::create(0),
            Err(ProducerError::NoDevices)
        ));
    }

    #[test]
    fn test_key_is_device_id() {
        let device = Device::generate();
        assert_eq!(device.key(), device.id().as_bytes());
    }

    #[test]
    fn test_round_robin_cycles_in_order() {
        let registry = DeviceRegistry::create(3).unwrap();
        let devices = registry.devices();
        let mut rng = StdRng::seed_from_u64(1);
        let mut selector = DeviceSelector::new(DeviceSelection::RoundRobin);

        let picked: Vec<&str> = (0..7)
            .map(|_| selector.select(devices, &mut rng).id())
            .collect();

        let expected: Vec<&str> = [0, 1, 2, 0, 1, 2, 0]
            .iter()
            .map(|&i| devices[i].id())
            .collect();
        assert_eq!(picked, expected);
    }

    #[test]
    fn test_last_always_picks_final_device() {
        let registry = DeviceRegistry::create(5).unwrap();
        let devices = registry.devices();
        let mut rng = StdRng::seed_from_u64(1);
        let mut selector = DeviceSelector::new(DeviceSelection::Last);

        for _ in 0..10 {
            assert_eq!(selector.select(devices, &mut rng), &devices[4]);
        }
    }

    #[test]
    fn test_random_is_deterministic_for_a_seed() {
        let registry = DeviceRegistry::create(5).unwrap();
        let devices = registry.devices();

        let run = |seed| {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut selector = DeviceSelector::new(DeviceSelection::Random);
            (0..20)
                .map(|_| selector.select(devices, &mut rng).id().to_string())
                .collect::<Vec<_>>()
        };

        assert_eq!(run(42), run(42));
        assert!(run(42)
            .iter()
            .all(|id| devices.iter().any(|d| d.id() == id)));
    }
}
