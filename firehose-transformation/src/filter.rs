use crate::models::{AuditEvent, EventType};

const SECURITY_SCAN_EVENT: &str = "ListCodeAnalysisFindings";


#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    Qualifies(EventType),
    Excluded,
}

/// Only calls made on behalf of an Identity Center user count; service
/// integrations carry no `onBehalfOf`. A non-empty `nextToken` marks a
/// paginated continuation whose results were not returned to the user.
pub fn classify(event: &AuditEvent) -> Classification {
    if event.user_identity.on_behalf_of.is_none() || has_pending_page(event) {
        return Classification::Excluded;
    }

    if event.event_name == SECURITY_SCAN_EVENT {
        Classification::Qualifies(EventType::SecurityScanInvocation)
    } else {
        Classification::Qualifies(EventType::CodeSuggestionInvocation)
    }
}

fn has_pending_page(event: &AuditEvent) -> bool {
    event.request_parameters
        .as_ref()
        .and_then(|params| params.next_token.as_deref())
        .is_some_and(|token| !token.is_empty())
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EventEnvelope;

    fn event(value: serde_json::Value) -> AuditEvent {
        serde_json::from_value::<EventEnvelope>(serde_json::json!({ "detail": value }))
            .unwrap()
            .detail
    }

    fn delegated(event_name: &str, request_parameters: serde_json::Value) -> AuditEvent {
        event(serde_json::json!({
            "eventName": event_name,
            "userIdentity": {
                "accountId": "123456789012",
                "onBehalfOf": {
                    "userId": "u1",
                    "identityStoreArn": "arn:aws:identitystore::123456789012:identitystore/d-111"
                }
            },
            "requestParameters": request_parameters
        }))
    }

    #[test]
    fn code_analysis_findings_is_a_security_scan() {
        assert_eq!(
            classify(&delegated("ListCodeAnalysisFindings", serde_json::json!({}))),
            Classification::Qualifies(EventType::SecurityScanInvocation)
        );
    }

    #[test]
    fn every_other_event_is_a_code_suggestion() {
        for name in ["GenerateCompletions", "GenerateRecommendations", "CreateCodeScan", ""] {
            assert_eq!(
                classify(&delegated(name, serde_json::json!({}))),
                Classification::Qualifies(EventType::CodeSuggestionInvocation),
                "event name {name:?}"
            );
        }
    }

    #[test]
    fn service_calls_are_excluded() {
        let service_call = event(serde_json::json!({
            "eventName": "GenerateCompletions",
            "userIdentity": { "accountId": "123456789012", "type": "AWSService" },
            "requestParameters": {}
        }));

        assert_eq!(classify(&service_call), Classification::Excluded);
    }

    #[test]
    fn pending_page_is_excluded() {
        assert_eq!(
            classify(&delegated("ListCodeAnalysisFindings", serde_json::json!({ "nextToken": "abc" }))),
            Classification::Excluded
        );
    }

    #[test]
    fn empty_or_null_next_token_qualifies() {
        for params in [
            serde_json::json!({ "nextToken": "" }),
            serde_json::json!({ "nextToken": null }),
            serde_json::Value::Null,
        ] {
            assert!(matches!(classify(&delegated("GenerateCompletions", params)), Classification::Qualifies(_)));
        }
    }
}
