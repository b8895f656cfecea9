use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::MalformedRecordError;
use crate::models::{AuditEvent, EventEnvelope, FirehoseRecord};


pub fn decode(record: &FirehoseRecord) -> Result<AuditEvent, MalformedRecordError> {
    let envelope: EventEnvelope = decode_payload(&record.record_id, &record.data)?;
    Ok(envelope.detail)
}

/// base64 -> JSON. Trailing whitespace, including our own newline terminator, is accepted.
pub fn decode_payload<T: DeserializeOwned>(record_id: &str, data: &str) -> Result<T, MalformedRecordError> {
    let bytes = STANDARD.decode(data.trim())
        .map_err(|source| MalformedRecordError::Base64 {
            record_id: record_id.to_string(),
            source,
        })?;

    serde_json::from_slice(&bytes)
        .map_err(|source| MalformedRecordError::Json {
            record_id: record_id.to_string(),
            source,
        })
}

/// JSON + "\n" -> base64. The newline keeps records separable once Firehose
/// concatenates them into one object.
pub fn encode<T: Serialize>(value: &T) -> Result<String, serde_json::Error> {
    let mut json = serde_json::to_vec(value)?;
    json.push(b'\n');
    Ok(STANDARD.encode(json))
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EnrichedEvent, EventType};

    fn record(data: String) -> FirehoseRecord {
        FirehoseRecord {
            record_id: "r1".to_string(),
            approximate_arrival_timestamp: None,
            data,
        }
    }

    #[test]
    fn decodes_event_detail() {
        let data = STANDARD.encode(r#"{"detail":{"eventName":"GenerateCompletions","userIdentity":{"accountId":"123"}}}"#);

        let event = decode(&record(data)).unwrap();

        assert_eq!(event.event_name, "GenerateCompletions");
        assert_eq!(event.user_identity.account_id.as_deref(), Some("123"));
    }

    #[test]
    fn invalid_base64_is_malformed() {
        let err = decode(&record("not base64!".to_string())).unwrap_err();
        assert!(matches!(err, MalformedRecordError::Base64 { .. }));
    }

    #[test]
    fn invalid_json_is_malformed() {
        let err = decode(&record(STANDARD.encode("{not json"))).unwrap_err();
        assert!(matches!(err, MalformedRecordError::Json { .. }));
    }

    #[test]
    fn missing_user_identity_is_malformed() {
        let err = decode(&record(STANDARD.encode(r#"{"detail":{"eventName":"GenerateCompletions"}}"#))).unwrap_err();
        assert!(matches!(err, MalformedRecordError::Json { .. }));
    }

    #[test]
    fn encoded_payload_is_newline_terminated() {
        let encoded = encode(&serde_json::json!({ "a": 1 })).unwrap();
        let bytes = STANDARD.decode(encoded).unwrap();

        assert_eq!(bytes, b"{\"a\":1}\n");
    }

    #[test]
    fn enriched_event_survives_encoding() {
        let event = EnrichedEvent {
            event_time: "2024-05-01T12:00:00Z".to_string(),
            account_id: "123456789012".to_string(),
            user_id: "u1".to_string(),
            identity_store_arn: "arn:aws:identitystore::123456789012:identitystore/d-111".to_string(),
            event_type: EventType::SecurityScanInvocation,
            programming_language: Some("python".to_string()),
            user_name: Some("alice".to_string()),
            group_id: Some("g2".to_string()),
            group_name: Some("Security".to_string()),
        };

        let decoded: EnrichedEvent = decode_payload("r1", &encode(&event).unwrap()).unwrap();

        assert_eq!(decoded, event);
    }
}
