//! Wiring for a publisher run.

use crate::config::PublisherSettings;
use anyhow::Context;
use schema_registry::{HttpSchemaRegistry, SchemaResolver, SchemaSource, SchemaType};
use sensor_producer::{
    create_topic_if_not_exists, spawn_delivery_observer, DeviceRegistry, KafkaSink, MessageSink,
    Publisher, PublisherConfig,
};
use tokio::sync::broadcast;
use tracing::{error, info, warn};

/// Run the publisher until Ctrl+C or `max_messages`.
///
/// Setup failures (topic, schema, producer) are returned before anything is
/// published. On the way out pending messages are flushed and the delivery
/// observer is drained.
pub async fn run_publisher(settings: PublisherSettings) -> anyhow::Result<()> {
    if let Some(spec) = settings.topic_spec {
        info!("Creating topic '{}' if it doesn't exist...", settings.topic);
        create_topic_if_not_exists(&settings.kafka, &settings.topic, spec)
            .await
            .with_context(|| format!("Failed to create topic '{}'", settings.topic))?;
    }

    let registry = HttpSchemaRegistry::new(
        &settings.schema_registry_url,
        settings.schema_registry_auth.clone(),
    )
    .context("Failed to create schema registry client")?;
    let resolver = SchemaResolver::new(
        registry,
        SchemaSource::new(&settings.schema_file, SchemaType::Protobuf),
    );
    let schema = resolver
        .resolve(&settings.topic)
        .await
        .with_context(|| format!("Failed to resolve schema for topic '{}'", settings.topic))?;
    let schema_id = schema.wire_id()?;

    let devices = DeviceRegistry::create(settings.devices).context("Failed to create devices")?;
    for device in devices.devices() {
        info!("Simulating device {}", device.id());
    }

    let (sink, reports) =
        KafkaSink::connect(&settings.kafka).context("Failed to create Kafka producer")?;
    let observer = spawn_delivery_observer(reports);

    let publisher = Publisher::new(
        sink,
        devices,
        PublisherConfig {
            topic: settings.topic.clone(),
            schema_id,
            interval: settings.interval,
            selection: settings.selection,
            max_messages: settings.max_messages,
            seed: settings.seed,
        },
    );

    let shutdown = setup_shutdown_handler();
    let outcome = publisher.run(shutdown).await;

    info!("Flushing pending messages...");
    let sink = publisher.into_sink();
    if let Err(e) = sink.flush(settings.flush_timeout).await {
        warn!("Failed to flush pending messages: {}", e);
    }
    // Dropping the producer closes the delivery report stream.
    drop(sink);
    let stats = observer.await.context("Delivery observer task failed")?;

    let summary = outcome.context("Publish loop failed")?;
    info!(
        "Submitted {} readings in {:?} ({} delivered, {} failed)",
        summary.messages_submitted, summary.elapsed, stats.delivered, stats.failed
    );

    Ok(())
}

/// Sets up a shutdown signal handler
fn setup_shutdown_handler() -> broadcast::Receiver<()> {
    let (shutdown_tx, shutdown_rx) = broadcast::channel(1);

    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            // Keep the sender alive: a closed channel would stop the loop.
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }

        info!("Received interrupt signal (Ctrl+C)");
        let _ = shutdown_tx.send(());
    });

    shutdown_rx
}
