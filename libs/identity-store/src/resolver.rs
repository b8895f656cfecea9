use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::{DirectoryService, GroupMembership, IdentityCache, IdentityLookupError, Membership};


/// How a single group is picked when a user belongs to several configured groups.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum GroupMatchPolicy {
    /// First member result in the order the directory returned them.
    #[default]
    ResponseOrder,
    /// First configured group id the user is a member of.
    ConfiguredOrder,
}

#[derive(Debug, Error)]
#[error("unknown group match policy '{0}', expected 'response-order' or 'configured-order'")]
pub struct ParseGroupMatchPolicyError(String);

impl FromStr for GroupMatchPolicy {
    type Err = ParseGroupMatchPolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "response-order" => Ok(GroupMatchPolicy::ResponseOrder),
            "configured-order" => Ok(GroupMatchPolicy::ConfiguredOrder),
            other => Err(ParseGroupMatchPolicyError(other.to_string())),
        }
    }
}

impl fmt::Display for GroupMatchPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupMatchPolicy::ResponseOrder => write!(f, "response-order"),
            GroupMatchPolicy::ConfiguredOrder => write!(f, "configured-order"),
        }
    }
}

impl GroupMatchPolicy {
    pub fn select<'a>(&self, results: &'a [GroupMembership], configured: &[String]) -> Option<&'a str> {
        match self {
            GroupMatchPolicy::ResponseOrder => results
                .iter()
                .find(|result| result.is_member)
                .map(|result| result.group_id.as_str()),
            GroupMatchPolicy::ConfiguredOrder => configured
                .iter()
                .find_map(|group_id| {
                    results
                        .iter()
                        .find(|result| result.is_member && &result.group_id == group_id)
                })
                .map(|result| result.group_id.as_str()),
        }
    }
}


#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedGroup {
    pub group_id: String,
    pub group_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedIdentity {
    pub user_name: String,
    pub group: Option<ResolvedGroup>,
}

/// Resolves user ids to names and a single configured group, going to the
/// directory only on cache misses.
///
/// A user costs at most one `describe_user` and one `is_member_in_groups`
/// call per process, and each group at most one `describe_group` call.
/// "Not a member of any configured group" is cached as well.
pub struct IdentityResolver<D> {
    directory: D,
    group_ids: Vec<String>,
    policy: GroupMatchPolicy,
    cache: IdentityCache,
}

impl<D: DirectoryService> IdentityResolver<D> {
    pub fn new(directory: D, group_ids: Vec<String>, policy: GroupMatchPolicy) -> Self {
        IdentityResolver {
            directory,
            group_ids,
            policy,
            cache: IdentityCache::new(),
        }
    }

    pub fn group_ids(&self) -> &[String] {
        &self.group_ids
    }

    pub fn cache(&self) -> &IdentityCache {
        &self.cache
    }

    pub fn directory(&self) -> &D {
        &self.directory
    }

    pub async fn resolve(&mut self, identity_store_id: &str, user_id: &str) -> Result<ResolvedIdentity, IdentityLookupError> {
        let user_name = self.resolve_user_name(identity_store_id, user_id).await?;

        let membership = match self.cache.membership(user_id) {
            Some(membership) => membership.clone(),
            None => {
                let membership = self.check_membership(identity_store_id, user_id).await?;
                self.cache.set_membership(user_id, membership.clone());
                membership
            }
        };

        let group = match membership {
            Membership::Member(group_id) => {
                let group_name = self.resolve_group_name(identity_store_id, &group_id).await?;
                Some(ResolvedGroup { group_id, group_name })
            }
            Membership::NoMatch => None,
        };

        Ok(ResolvedIdentity { user_name, group })
    }

    async fn resolve_user_name(&mut self, identity_store_id: &str, user_id: &str) -> Result<String, IdentityLookupError> {
        if let Some(user_name) = self.cache.user_name(user_id) {
            return Ok(user_name.to_string());
        }

        tracing::debug!("User {} not cached, describing user in {}", user_id, identity_store_id);
        let user_name = self.directory.describe_user(identity_store_id, user_id).await?;
        self.cache.insert_user(user_id, user_name.clone());

        Ok(user_name)
    }

    async fn check_membership(&self, identity_store_id: &str, user_id: &str) -> Result<Membership, IdentityLookupError> {
        tracing::debug!("Checking membership of user {} in {} configured groups", user_id, self.group_ids.len());
        let results = self.directory
            .is_member_in_groups(identity_store_id, user_id, &self.group_ids)
            .await?;

        match self.policy.select(&results, &self.group_ids) {
            Some(group_id) => Ok(Membership::Member(group_id.to_string())),
            None => {
                tracing::debug!("User {} is not a member of any configured group", user_id);
                Ok(Membership::NoMatch)
            }
        }
    }

    async fn resolve_group_name(&mut self, identity_store_id: &str, group_id: &str) -> Result<String, IdentityLookupError> {
        if let Some(group_name) = self.cache.group_name(group_id) {
            return Ok(group_name.to_string());
        }

        tracing::debug!("Group {} not cached, describing group in {}", group_id, identity_store_id);
        let group_name = self.directory.describe_group(identity_store_id, group_id).await?;
        self.cache.insert_group_name(group_id, group_name.clone());

        Ok(group_name)
    }
}
