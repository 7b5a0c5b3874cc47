//! CLI argument definitions.

use clap::Parser;
use sensor_producer::DeviceSelection;
use std::path::PathBuf;

#[derive(Parser, Clone, Debug)]
#[command(name = "sensor-publisher")]
#[command(about = "Publish synthetic sensor readings to Kafka using schema registry framing")]
#[command(long_about = None)]
pub struct Args {
    /// Client properties file. `schema.registry.*` keys configure the schema
    /// registry, every other key is passed to the Kafka client.
    #[arg(long, env = "SENSOR_PUBLISHER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Kafka brokers (comma-separated), overrides `bootstrap.servers`
    #[arg(long, env = "KAFKA_BROKERS")]
    pub bootstrap_servers: Option<String>,

    /// Schema registry URL, overrides `schema.registry.url`
    #[arg(long, env = "SCHEMA_REGISTRY_URL")]
    pub schema_registry_url: Option<String>,

    /// Schema registry `user:password`, overrides `schema.registry.basic.auth.user.info`
    #[arg(long, env = "SCHEMA_REGISTRY_USER_INFO")]
    pub schema_registry_user_info: Option<String>,

    /// Topic to publish to; also the schema registry subject
    #[arg(long, default_value = "sensor-readings")]
    pub topic: String,

    /// Schema definition registered when the subject has none
    #[arg(long, default_value = "schemas/SensorReading.proto")]
    pub schema_file: PathBuf,

    /// Number of simulated devices
    #[arg(long, default_value_t = 5)]
    pub devices: usize,

    /// Pause between readings (e.g. "100ms", "1s")
    #[arg(long, default_value = "100ms")]
    pub interval: String,

    /// Device picked for each reading
    #[arg(long, value_enum, default_value_t = DeviceSelection::RoundRobin)]
    pub selection: DeviceSelection,

    /// Stop after publishing this many readings (default: run until Ctrl+C)
    #[arg(long)]
    pub max_messages: Option<u64>,

    /// Random seed for reading values and random device selection
    #[arg(long)]
    pub seed: Option<u64>,

    /// How long to wait for in-flight messages on shutdown
    #[arg(long, default_value = "10s")]
    pub flush_timeout: String,

    /// Create the topic before publishing if it does not exist
    #[arg(long)]
    pub create_topic: bool,

    /// Partitions for a topic created with --create-topic
    #[arg(long, default_value_t = 6)]
    pub partitions: i32,

    /// Replication factor for a topic created with --create-topic
    #[arg(long, default_value_t = 3)]
    pub replication_factor: i32,
}
