use serde::{Deserialize, Serialize};


// Firehose data transformation invocation and response

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FirehoseEvent {
    #[serde(default)]
    pub invocation_id: Option<String>,
    #[serde(default)]
    pub delivery_stream_arn: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
    pub records: Vec<FirehoseRecord>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FirehoseRecord {
    pub record_id: String,
    #[serde(default)]
    pub approximate_arrival_timestamp: Option<i64>,
    pub data: String, // base64
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RecordResult {
    Ok,
    Dropped,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransformedRecord {
    pub record_id: String,
    pub result: RecordResult,
    pub data: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FirehoseResponse {
    pub records: Vec<TransformedRecord>,
}


// CloudTrail event as delivered by EventBridge, only the fields we read

#[derive(Debug, Clone, Deserialize)]
pub struct EventEnvelope {
    pub detail: AuditEvent,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEvent {
    #[serde(default)]
    pub event_time: Option<String>,
    #[serde(default)]
    pub event_name: String,
    #[serde(default)]
    pub event_source: Option<String>,
    pub user_identity: UserIdentity,
    #[serde(default)]
    pub request_parameters: Option<RequestParameters>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserIdentity {
    #[serde(default)]
    pub account_id: Option<String>,
    #[serde(default)]
    pub on_behalf_of: Option<OnBehalfOf>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OnBehalfOf {
    pub user_id: String,
    pub identity_store_arn: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestParameters {
    #[serde(default)]
    pub next_token: Option<String>,
    #[serde(default)]
    pub file_context: Option<FileContext>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileContext {
    #[serde(default)]
    pub programming_language: Option<ProgrammingLanguage>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgrammingLanguage {
    #[serde(default)]
    pub language_name: Option<String>,
}


#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventType {
    CodeSuggestionInvocation,
    SecurityScanInvocation,
}

/// The compact record written to the analytics bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrichedEvent {
    pub event_time: String,
    pub account_id: String,
    pub user_id: String,
    pub identity_store_arn: String,
    pub event_type: EventType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub programming_language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_name: Option<String>,
}

impl EnrichedEvent {
    pub fn apply_identity(&mut self, identity: identity_store::ResolvedIdentity) {
        self.user_name = Some(identity.user_name);
        if let Some(group) = identity.group {
            self.group_id = Some(group.group_id);
            self.group_name = Some(group.group_name);
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_type_serializes_as_variant_name() {
        assert_eq!(serde_json::to_string(&EventType::SecurityScanInvocation).unwrap(), "\"SecurityScanInvocation\"");
    }

    #[test]
    fn absent_optionals_are_omitted() {
        let event = EnrichedEvent {
            event_time: "2024-01-01T00:00:00Z".to_string(),
            account_id: "123456789012".to_string(),
            user_id: "u1".to_string(),
            identity_store_arn: "arn:aws:identitystore::123456789012:identitystore/d-111".to_string(),
            event_type: EventType::CodeSuggestionInvocation,
            programming_language: None,
            user_name: None,
            group_id: None,
            group_name: None,
        };

        let json: serde_json::Value = serde_json::to_value(&event).unwrap();
        let keys: Vec<&str> = json.as_object().unwrap().keys().map(String::as_str).collect();
        assert_eq!(keys.len(), 5);
        assert!(!keys.contains(&"user_name"));
        assert!(!keys.contains(&"programming_language"));
    }

    #[test]
    fn response_uses_firehose_field_names() {
        let response = FirehoseResponse {
            records: vec![TransformedRecord {
                record_id: "r1".to_string(),
                result: RecordResult::Dropped,
                data: "e30=".to_string(),
            }],
        };

        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            serde_json::json!({ "records": [{ "recordId": "r1", "result": "Dropped", "data": "e30=" }] })
        );
    }

    #[test]
    fn audit_event_tolerates_missing_request_parameters() {
        let event: EventEnvelope = serde_json::from_value(serde_json::json!({
            "detail": {
                "eventName": "GenerateCompletions",
                "userIdentity": { "accountId": "123456789012" },
                "requestParameters": null
            }
        })).unwrap();

        assert!(event.detail.request_parameters.is_none());
        assert!(event.detail.user_identity.on_behalf_of.is_none());
    }
}
