use crate::error::MalformedRecordError;
use crate::models::{AuditEvent, EnrichedEvent, EventType};


/// Projects a qualifying event onto the analytics schema. Nothing beyond the
/// listed fields is carried over.
pub fn reshape(record_id: &str, event: &AuditEvent, event_type: EventType) -> Result<EnrichedEvent, MalformedRecordError> {
    let missing = |field: &'static str| MalformedRecordError::MissingField {
        record_id: record_id.to_string(),
        field,
    };

    let on_behalf_of = event.user_identity.on_behalf_of
        .as_ref()
        .ok_or_else(|| missing("userIdentity.onBehalfOf"))?;
    let event_time = event.event_time.clone().ok_or_else(|| missing("eventTime"))?;
    let account_id = event.user_identity.account_id.clone().ok_or_else(|| missing("userIdentity.accountId"))?;

    let programming_language = event.request_parameters
        .as_ref()
        .and_then(|params| params.file_context.as_ref())
        .and_then(|file_context| file_context.programming_language.as_ref())
        .and_then(|language| language.language_name.clone());

    Ok(EnrichedEvent {
        event_time,
        account_id,
        user_id: on_behalf_of.user_id.clone(),
        identity_store_arn: on_behalf_of.identity_store_arn.clone(),
        event_type,
        programming_language,
        user_name: None,
        group_id: None,
        group_name: None,
    })
}
