//! Error types for the sensor producer.

use thiserror::Error;

/// Errors that can occur while producing sensor readings.
#[derive(Error, Debug)]
pub enum ProducerError {
    #[error("Kafka error: {0}")]
    Kafka(#[from] rdkafka::error::KafkaError),

    #[error("Proto encoding error: {0}")]
    ProtoEncoding(String),

    #[error("Device pool must contain at least one device")]
    NoDevices,

    #[error("System clock is outside the nanosecond timestamp range")]
    ClockOutOfRange,

    #[error("Topic creation error: {0}")]
    TopicCreation(String),

    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl ProducerError {
    /// Whether the producer is unusable after this error. Anything else
    /// only affected the message being sent.
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            ProducerError::Kafka(rdkafka::error::KafkaError::MessageProduction(code))
                if *code != rdkafka::error::RDKafkaErrorCode::Fatal
        )
    }
}

impl From<protobuf::Error> for ProducerError {
    fn from(err: protobuf::Error) -> Self {
        ProducerError::ProtoEncoding(err.to_string())
    }
}

/// Result type alias for producer operations.
pub type Result<T> = std::result::Result<T, ProducerError>;
