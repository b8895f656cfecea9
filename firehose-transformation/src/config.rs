use std::env;

use identity_store::GroupMatchPolicy;

use crate::error::ConfigError;

pub const GROUP_IDS_VAR: &str = "SSO_GROUP_IDS";
pub const REGION_VAR: &str = "SSO_REGION";
pub const GROUP_MATCH_POLICY_VAR: &str = "SSO_GROUP_MATCH_POLICY";


/// Read once when the function starts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    /// Empty disables identity enrichment.
    pub group_ids: Vec<String>,
    pub region: Option<String>,
    pub group_match_policy: GroupMatchPolicy,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let group_ids = lookup(GROUP_IDS_VAR)
            .map(|raw| parse_group_ids(&raw))
            .ok_or(ConfigError::Missing(GROUP_IDS_VAR))?;

        let region = lookup(REGION_VAR)
            .map(|region| region.trim().to_string())
            .filter(|region| !region.is_empty());

        let group_match_policy = match lookup(GROUP_MATCH_POLICY_VAR) {
            Some(raw) if !raw.trim().is_empty() => raw
                .parse()
                .map_err(|err: identity_store::ParseGroupMatchPolicyError| ConfigError::Invalid {
                    name: GROUP_MATCH_POLICY_VAR,
                    message: err.to_string(),
                })?,
            _ => GroupMatchPolicy::default(),
        };

        Ok(Config { group_ids, region, group_match_policy })
    }

    pub fn enrichment_enabled(&self) -> bool {
        !self.group_ids.is_empty()
    }
}

// "g1, g2,,g1" -> ["g1", "g2"], keeping first occurrence order
fn parse_group_ids(raw: &str) -> Vec<String> {
    let mut group_ids: Vec<String> = Vec::new();
    for group_id in raw.split(',').map(str::trim).filter(|id| !id.is_empty()) {
        if !group_ids.iter().any(|existing| existing == group_id) {
            group_ids.push(group_id.to_string());
        }
    }
    group_ids
}
