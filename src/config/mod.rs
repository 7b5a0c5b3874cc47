//! Publisher configuration.
//!
//! Settings come from an optional client properties file, overridden by
//! command-line flags and their environment variables.

pub mod duration;
pub mod properties;

use crate::args::Args;
use anyhow::Context;
use schema_registry::BasicAuth;
use sensor_producer::{DeviceSelection, KafkaSettings, TopicSpec};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;
use tracing::debug;

pub use duration::parse_duration;
pub use properties::{load_properties, parse_properties};

const REGISTRY_PREFIX: &str = "schema.registry.";
const REGISTRY_URL: &str = "schema.registry.url";
const REGISTRY_USER_INFO: &str = "schema.registry.basic.auth.user.info";

/// Fully resolved settings for a publisher run.
#[derive(Debug, Clone)]
pub struct PublisherSettings {
    pub kafka: KafkaSettings,
    pub schema_registry_url: String,
    pub schema_registry_auth: Option<BasicAuth>,
    pub topic: String,
    pub schema_file: PathBuf,
    pub devices: usize,
    pub interval: Duration,
    pub selection: DeviceSelection,
    pub max_messages: Option<u64>,
    pub seed: Option<u64>,
    pub flush_timeout: Duration,
    /// Set when the topic should be created on startup.
    pub topic_spec: Option<TopicSpec>,
}

impl PublisherSettings {
    pub fn from_args(args: &Args) -> anyhow::Result<Self> {
        let properties = match &args.config {
            Some(path) => load_properties(path)?,
            None => BTreeMap::new(),
        };
        Self::from_parts(args, properties)
    }

    /// Merge properties with flags; flags win.
    pub fn from_parts(args: &Args, properties: BTreeMap<String, String>) -> anyhow::Result<Self> {
        let mut kafka = KafkaSettings::new();
        let mut registry_url = None;
        let mut user_info = None;

        for (key, value) in properties {
            match key.as_str() {
                REGISTRY_URL => registry_url = Some(value),
                REGISTRY_USER_INFO => user_info = Some(value),
                other if other.starts_with(REGISTRY_PREFIX) => {
                    debug!("Ignoring schema registry property '{other}'");
                }
                _ => {
                    kafka.set(key, value);
                }
            }
        }

        if let Some(servers) = &args.bootstrap_servers {
            kafka.set("bootstrap.servers", servers.as_str());
        }
        if let Some(url) = &args.schema_registry_url {
            registry_url = Some(url.clone());
        }
        if let Some(info) = &args.schema_registry_user_info {
            user_info = Some(info.clone());
        }

        if kafka.bootstrap_servers().is_none() {
            anyhow::bail!(
                "bootstrap.servers is not configured (use --bootstrap-servers or a properties file)"
            );
        }
        kafka.apply_sasl_defaults();

        let schema_registry_url = registry_url.context(
            "schema.registry.url is not configured (use --schema-registry-url or a properties file)",
        )?;
        let schema_registry_auth = user_info
            .as_deref()
            .map(BasicAuth::parse)
            .transpose()
            .with_context(|| format!("Invalid {REGISTRY_USER_INFO}"))?;

        let interval = parse_duration(&args.interval).context("Invalid --interval")?;
        let flush_timeout =
            parse_duration(&args.flush_timeout).context("Invalid --flush-timeout")?;

        let topic_spec = args.create_topic.then_some(TopicSpec {
            partitions: args.partitions,
            replication_factor: args.replication_factor,
        });

        Ok(Self {
            kafka,
            schema_registry_url,
            schema_registry_auth,
            topic: args.topic.clone(),
            schema_file: args.schema_file.clone(),
            devices: args.devices,
            interval,
            selection: args.selection,
            max_messages: args.max_messages,
            seed: args.seed,
            flush_timeout,
            topic_spec,
        })
    }
}
