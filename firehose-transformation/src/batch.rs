use identity_store::{DirectoryService, IdentityResolver};

use crate::codec;
use crate::error::{EngineError, MalformedRecordError};
use crate::filter::{self, Classification};
use crate::models::{EnrichedEvent, FirehoseEvent, FirehoseRecord, FirehoseResponse, RecordResult, TransformedRecord};
use crate::reshape;


/// Transforms Firehose batches, holding the identity resolver (and its cache)
/// for as long as the process lives.
pub struct BatchProcessor<D> {
    // None when no group ids are configured, which turns enrichment off
    resolver: Option<IdentityResolver<D>>,
}

impl<D: DirectoryService> BatchProcessor<D> {
    pub fn new(resolver: Option<IdentityResolver<D>>) -> Self {
        BatchProcessor { resolver }
    }

    pub fn without_enrichment() -> Self {
        BatchProcessor { resolver: None }
    }

    pub fn resolver(&self) -> Option<&IdentityResolver<D>> {
        self.resolver.as_ref()
    }

    /// Processes every record in order. The first error aborts the batch and
    /// nothing is returned, so Firehose retries the batch as a whole.
    pub async fn process(&mut self, event: FirehoseEvent) -> Result<FirehoseResponse, EngineError> {
        let mut records = Vec::with_capacity(event.records.len());
        let mut dropped = 0usize;

        for record in event.records {
            let transformed = self.process_record(record).await?;
            if transformed.result == RecordResult::Dropped {
                dropped += 1;
            }
            records.push(transformed);
        }

        tracing::info!(
            "Processed {} records: {} ok, {} dropped",
            records.len(),
            records.len() - dropped,
            dropped
        );
        if let Some(resolver) = &self.resolver {
            tracing::debug!(
                "Identity cache holds {} users and {} groups",
                resolver.cache().cached_users(),
                resolver.cache().cached_groups()
            );
        }

        Ok(FirehoseResponse { records })
    }

    async fn process_record(&mut self, record: FirehoseRecord) -> Result<TransformedRecord, EngineError> {
        let event = codec::decode(&record)?;

        let event_type = match filter::classify(&event) {
            Classification::Qualifies(event_type) => event_type,
            Classification::Excluded => {
                tracing::debug!("Dropping record {} ({})", record.record_id, event.event_name);
                return Ok(TransformedRecord {
                    record_id: record.record_id,
                    result: RecordResult::Dropped,
                    data: record.data,
                });
            }
        };

        let mut enriched = reshape::reshape(&record.record_id, &event, event_type)?;
        self.enrich(&record.record_id, &mut enriched).await?;

        let data = codec::encode(&enriched)
            .map_err(|source| EngineError::Encode {
                record_id: record.record_id.clone(),
                source,
            })?;

        Ok(TransformedRecord {
            record_id: record.record_id,
            result: RecordResult::Ok,
            data,
        })
    }

    async fn enrich(&mut self, record_id: &str, event: &mut EnrichedEvent) -> Result<(), EngineError> {
        let Some(resolver) = self.resolver.as_mut() else {
            return Ok(());
        };

        let identity_store_id = identity_store::identity_store_id(&event.identity_store_arn)
            .ok_or_else(|| MalformedRecordError::IdentityStoreArn {
                record_id: record_id.to_string(),
                arn: event.identity_store_arn.clone(),
            })?;

        let identity = resolver
            .resolve(identity_store_id, &event.user_id)
            .await
            .map_err(|source| EngineError::IdentityLookup {
                record_id: record_id.to_string(),
                source,
            })?;

        event.apply_identity(identity);
        Ok(())
    }
}
