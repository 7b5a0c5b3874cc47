//! Sensor readings and their protobuf encoding.
//!
//! The encoding matches `schemas/SensorReading.proto`:
//!
//! ```text
//! message SensorReading {
//!   message Device { string deviceID = 1; bool enabled = 2; }
//!   Device device = 1;
//!   int64 dateTime = 2;
//!   double reading = 3;
//! }
//! ```
//!
//! Proto3 default values are left off the wire, as generated code does.

use crate::device::Device;
use crate::error::{ProducerError, Result};
use chrono::Utc;
use protobuf::CodedOutputStream;
use rand::Rng;

const DEVICE_FIELD: u32 = 1;
const DATE_TIME_FIELD: u32 = 2;
const READING_FIELD: u32 = 3;

const DEVICE_ID_FIELD: u32 = 1;
const DEVICE_ENABLED_FIELD: u32 = 2;

/// A single measurement taken from a device.
#[derive(Debug, Clone, PartialEq)]
pub struct Reading<'a> {
    pub device: &'a Device,
    /// Nanoseconds since the Unix epoch.
    pub timestamp: i64,
    /// Measurement in `[0, 1)`.
    pub value: f64,
}

impl<'a> Reading<'a> {
    /// Take a reading now, with a value drawn from `rng`.
    pub fn capture<R: Rng>(device: &'a Device, rng: &mut R) -> Result<Self> {
        let timestamp = Utc::now()
            .timestamp_nanos_opt()
            .ok_or(ProducerError::ClockOutOfRange)?;

        Ok(Self {
            device,
            timestamp,
            value: rng.random::<f64>(),
        })
    }
}

/// Encode a reading as a `SensorReading` protobuf message.
pub fn encode_reading(reading: &Reading<'_>) -> Result<Vec<u8>> {
    let device = encode_device(reading.device)?;

    let mut buffer = Vec::new();
    {
        let mut stream = CodedOutputStream::vec(&mut buffer);

        // Singular message fields are written whenever set, even when empty.
        stream.write_bytes(DEVICE_FIELD, &device)?;
        if reading.timestamp != 0 {
            stream.write_int64(DATE_TIME_FIELD, reading.timestamp)?;
        }
        if reading.value != 0.0 {
            stream.write_double(READING_FIELD, reading.value)?;
        }

        stream.flush()?;
    }

    Ok(buffer)
}

fn encode_device(device: &Device) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    {
        let mut stream = CodedOutputStream::vec(&mut buffer);
        if !device.id().is_empty() {
            stream.write_string(DEVICE_ID_FIELD, device.id())?;
        }
        if device.enabled() {
            stream.write_bool(DEVICE_ENABLED_FIELD, true)?;
        }
        stream.flush()?;
    }
    Ok(buffer)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use protobuf::CodedInputStream;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    /// Decoded `SensorReading` fields.
    #[derive(Debug, Default, PartialEq)]
    pub(crate) struct DecodedReading {
        pub device_id: String,
        pub enabled: bool,
        pub timestamp: i64,
        pub value: f64,
    }

    pub(crate) fn decode_reading(bytes: &[u8]) -> DecodedReading {
        let mut decoded = DecodedReading::default();
        let mut stream = CodedInputStream::from_bytes(bytes);
        while !stream.eof().unwrap() {
            let tag = stream.read_raw_varint32().unwrap();
            match tag >> 3 {
                1 => {
                    let device = stream.read_bytes().unwrap();
                    let mut inner = CodedInputStream::from_bytes(&device);
                    while !inner.eof().unwrap() {
                        let tag = inner.read_raw_varint32().unwrap();
                        match tag >> 3 {
                            1 => decoded.device_id = inner.read_string().unwrap(),
                            2 => decoded.enabled = inner.read_bool().unwrap(),
                            other => panic!("unexpected device field {other}"),
                        }
                    }
                }
                2 => decoded.timestamp = stream.read_int64().unwrap(),
                3 => decoded.value = stream.read_double().unwrap(),
                other => panic!("unexpected reading field {other}"),
            }
        }
        decoded
    }

    #[test]
    fn test_encode_reading_fields() {
        let device = Device::generate();
        let reading = Reading {
            device: &device,
            timestamp: 1_700_000_000_123_456_789,
            value: 0.42,
        };

        let encoded = encode_reading(&reading).unwrap();

        assert_eq!(
            decode_reading(&encoded),
            DecodedReading {
                device_id: device.id().to_string(),
                enabled: true,
                timestamp: 1_700_000_000_123_456_789,
                value: 0.42,
            }
        );
    }

    #[test]
    fn test_encode_reading_wire_layout() {
        let device = Device::generate();
        let reading = Reading {
            device: &device,
            timestamp: 1,
            value: 0.5,
        };

        let encoded = encode_reading(&reading).unwrap();

        // device: field 1, length-delimited
        assert_eq!(encoded[0], (1 << 3) | 2);
        // 36-char UUID string (2 + 36) plus enabled flag (2)
        assert_eq!(encoded[1], 40);
        // dateTime: field 2, varint
        assert_eq!(encoded[2 + 40], 2 << 3);
        assert_eq!(encoded[2 + 40 + 1], 1);
        // reading: field 3, fixed64
        assert_eq!(encoded[2 + 40 + 2], (3 << 3) | 1);
        assert_eq!(&encoded[2 + 40 + 3..], &0.5f64.to_le_bytes());
    }

    #[test]
    fn test_zero_value_is_omitted() {
        let device = Device::generate();
        let reading = Reading {
            device: &device,
            timestamp: 0,
            value: 0.0,
        };

        let encoded = encode_reading(&reading).unwrap();
        let decoded = decode_reading(&encoded);

        assert_eq!(decoded.timestamp, 0);
        assert_eq!(decoded.value, 0.0);
        assert_eq!(encoded.len(), 2 + 40);
    }

    #[test]
    fn test_capture_reading() {
        let device = Device::generate();
        let mut rng = StdRng::seed_from_u64(7);
        let before = Utc::now().timestamp_nanos_opt().unwrap();

        let reading = Reading::capture(&device, &mut rng).unwrap();

        let after = Utc::now().timestamp_nanos_opt().unwrap();
        assert!(reading.timestamp >= before && reading.timestamp <= after);
        assert!((0.0..1.0).contains(&reading.value));
        assert_eq!(reading.device, &device);
    }
}
