use aws_sdk_identitystore::config::Region;
use lambda_runtime::{service_fn, Error, LambdaEvent};
use tokio::sync::Mutex;
use tracing_subscriber::EnvFilter;

use identity_store::{IdentityResolver, IdentityStoreClient};

use firehose_transformation::models::{FirehoseEvent, FirehoseResponse};
use firehose_transformation::{BatchProcessor, Config};


#[tokio::main]
async fn main() -> Result<(), Error> {

    tracing_subscriber::fmt()
        .with_level(true)
        .with_ansi(false)
        .without_time() // CloudWatch adds its own timestamps
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();


    let config = Config::from_env().inspect_err(|err| {
        tracing::error!("Invalid configuration: {}", err);
    })?;

    let resolver = if config.enrichment_enabled() {
        tracing::info!(
            "Identity enrichment enabled for {} groups ({} policy)",
            config.group_ids.len(),
            config.group_match_policy
        );
        let client = identity_store_client(config.region.as_deref()).await;
        Some(IdentityResolver::new(
            IdentityStoreClient::new(client),
            config.group_ids.clone(),
            config.group_match_policy,
        ))
    } else {
        tracing::info!("No group ids configured, identity enrichment disabled");
        None
    };

    // invocations arrive one at a time per instance, the lock is never contended
    let processor = Mutex::new(BatchProcessor::new(resolver));
    let processor = &processor;

    lambda_runtime::run(service_fn(move |event: LambdaEvent<FirehoseEvent>| async move {
        handle_batch(processor, event).await
    })).await
}


async fn handle_batch(
    processor: &Mutex<BatchProcessor<IdentityStoreClient>>,
    event: LambdaEvent<FirehoseEvent>,
) -> Result<FirehoseResponse, Error> {
    let (batch, context) = event.into_parts();
    tracing::info!("Received batch {} with {} records", context.request_id, batch.records.len());

    let response = processor.lock().await
        .process(batch)
        .await
        .inspect_err(|err| {
            tracing::error!("Aborting batch {}: {}", context.request_id, err);
        })?;

    Ok(response)
}

async fn identity_store_client(region: Option<&str>) -> aws_sdk_identitystore::Client {
    let sdk_config = aws_config::load_from_env().await;
    let mut builder = aws_sdk_identitystore::config::Builder::from(&sdk_config);

    if let Some(region) = region {
        tracing::info!("Using identity store region override {}", region);
        builder = builder.region(Region::new(region.to_string()));
    }

    aws_sdk_identitystore::Client::from_conf(builder.build())
}
