use thiserror::Error;

use identity_store::IdentityLookupError;


#[derive(Debug, Error)]
pub enum MalformedRecordError {
    #[error("record {record_id}: data is not valid base64: {source}")]
    Base64 {
        record_id: String,
        source: base64::DecodeError,
    },

    #[error("record {record_id}: data is not a valid audit event: {source}")]
    Json {
        record_id: String,
        source: serde_json::Error,
    },

    #[error("record {record_id}: qualifying event is missing {field}")]
    MissingField {
        record_id: String,
        field: &'static str,
    },

    #[error("record {record_id}: cannot derive identity store id from '{arn}'")]
    IdentityStoreArn {
        record_id: String,
        arn: String,
    },
}

/// Any error aborts the whole batch.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    MalformedRecord(#[from] MalformedRecordError),

    #[error("record {record_id}: identity lookup failed: {source}")]
    IdentityLookup {
        record_id: String,
        source: IdentityLookupError,
    },

    #[error("failed to encode transformed record {record_id}: {source}")]
    Encode {
        record_id: String,
        source: serde_json::Error,
    },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} not set")]
    Missing(&'static str),

    #[error("invalid {name}: {message}")]
    Invalid {
        name: &'static str,
        message: String,
    },
}
