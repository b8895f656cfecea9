//! Kinesis Data Firehose transformation for CodeWhisperer CloudTrail events.
//!
//! Records are filtered to calls made on behalf of Identity Center users,
//! reshaped into a compact analytics schema and optionally enriched with the
//! user's name and group from the identity store.

pub mod batch;
pub mod codec;
pub mod config;
pub mod error;
pub mod filter;
pub mod models;
pub mod reshape;

pub use batch::BatchProcessor;
pub use config::Config;
pub use error::{ConfigError, EngineError, MalformedRecordError};
