//! Topic administration.

use crate::error::{ProducerError, Result};
use crate::settings::KafkaSettings;
use rdkafka::admin::{AdminClient, AdminOptions, NewTopic, TopicReplication};
use rdkafka::client::DefaultClientContext;
use std::time::Duration;
use tracing::info;

/// Partition and replica counts for a topic created on startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TopicSpec {
    pub partitions: i32,
    pub replication_factor: i32,
}

/// Create `topic` unless it already exists.
pub async fn create_topic_if_not_exists(
    settings: &KafkaSettings,
    topic: &str,
    spec: TopicSpec,
) -> Result<()> {
    let admin_client: AdminClient<DefaultClientContext> =
        settings.client_config().create().map_err(ProducerError::Kafka)?;

    let new_topic = NewTopic::new(
        topic,
        spec.partitions,
        TopicReplication::Fixed(spec.replication_factor),
    );
    let opts = AdminOptions::new().operation_timeout(Some(Duration::from_secs(10)));

    let results = admin_client
        .create_topics(&[new_topic], &opts)
        .await
        .map_err(|e| ProducerError::TopicCreation(format!("Failed to create topic: {e}")))?;

    for result in results {
        match result {
            Ok(topic_name) => {
                info!("Topic '{}' created successfully", topic_name);
            }
            Err((topic_name, err)) => {
                let err_str = err.to_string();
                if err_str.contains("already exists") || err_str.contains("TopicExistsException")
                {
                    info!("Topic '{}' already exists", topic_name);
                } else {
                    return Err(ProducerError::TopicCreation(format!(
                        "Failed to create topic {topic_name}: {err}"
                    )));
                }
            }
        }
    }

    Ok(())
}
