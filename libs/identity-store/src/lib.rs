//! Read access to the IAM Identity Center identity store, plus the warm
//! per-process cache and group resolution built on top of it.

mod cache;
mod resolver;
#[cfg(any(test, feature = "test-util"))]
mod memory;

use async_trait::async_trait;
use aws_sdk_identitystore::types::MemberId;
use thiserror::Error;

pub use cache::{IdentityCache, Membership};
pub use resolver::{GroupMatchPolicy, IdentityResolver, ParseGroupMatchPolicyError, ResolvedGroup, ResolvedIdentity};
#[cfg(any(test, feature = "test-util"))]
pub use memory::{DirectoryCall, InMemoryDirectory};


#[derive(Debug, Error)]
pub enum IdentityLookupError {
    #[error("identity store request failed: {0}")]
    Service(#[from] aws_sdk_identitystore::Error),

    #[error("{operation} response for {id} is missing {field}")]
    MissingField {
        operation: &'static str,
        id: String,
        field: &'static str,
    },

    // only produced by non-AWS directories, e.g. the in-memory one
    #[error("{operation} failed for {id}: {message}")]
    Rejected {
        operation: &'static str,
        id: String,
        message: String,
    },
}

/// Membership of one user in one group, as reported by the directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupMembership {
    pub group_id: String,
    pub is_member: bool,
}

/// The read-only directory operations the resolver depends on.
///
/// `is_member_in_groups` returns results in whatever order the directory
/// chooses, which is not necessarily the order of `group_ids`.
#[async_trait]
pub trait DirectoryService: Send + Sync {
    async fn describe_user(&self, identity_store_id: &str, user_id: &str) -> Result<String, IdentityLookupError>;

    async fn is_member_in_groups(
        &self,
        identity_store_id: &str,
        user_id: &str,
        group_ids: &[String],
    ) -> Result<Vec<GroupMembership>, IdentityLookupError>;

    async fn describe_group(&self, identity_store_id: &str, group_id: &str) -> Result<String, IdentityLookupError>;
}

/// Extracts the identity store id from an identity store ARN,
/// e.g. `arn:aws:identitystore::123456789012:identitystore/d-1234567890` gives `d-1234567890`.
pub fn identity_store_id(identity_store_arn: &str) -> Option<&str> {
    identity_store_arn
        .split('/')
        .nth(1)
        .filter(|id| !id.is_empty())
}


pub struct IdentityStoreClient {
    client: aws_sdk_identitystore::Client,
}

impl IdentityStoreClient {
    pub fn new(client: aws_sdk_identitystore::Client) -> Self {
        IdentityStoreClient { client }
    }
}

#[async_trait]
impl DirectoryService for IdentityStoreClient {
    async fn describe_user(&self, identity_store_id: &str, user_id: &str) -> Result<String, IdentityLookupError> {
        let output = self.client
            .describe_user()
            .identity_store_id(identity_store_id)
            .user_id(user_id)
            .send()
            .await
            .map_err(aws_sdk_identitystore::Error::from)?;

        output.user_name()
            .map(str::to_string)
            .ok_or_else(|| IdentityLookupError::MissingField {
                operation: "DescribeUser",
                id: user_id.to_string(),
                field: "UserName",
            })
    }

    async fn is_member_in_groups(
        &self,
        identity_store_id: &str,
        user_id: &str,
        group_ids: &[String],
    ) -> Result<Vec<GroupMembership>, IdentityLookupError> {
        let output = self.client
            .is_member_in_groups()
            .identity_store_id(identity_store_id)
            .member_id(MemberId::UserId(user_id.to_string()))
            .set_group_ids(Some(group_ids.to_vec()))
            .send()
            .await
            .map_err(aws_sdk_identitystore::Error::from)?;

        output.results()
            .iter()
            .map(|result| {
                let group_id = result.group_id().ok_or_else(|| IdentityLookupError::MissingField {
                    operation: "IsMemberInGroups",
                    id: user_id.to_string(),
                    field: "GroupId",
                })?;

                Ok(GroupMembership {
                    group_id: group_id.to_string(),
                    is_member: result.membership_exists(),
                })
            })
            .collect()
    }

    async fn describe_group(&self, identity_store_id: &str, group_id: &str) -> Result<String, IdentityLookupError> {
        let output = self.client
            .describe_group()
            .identity_store_id(identity_store_id)
            .group_id(group_id)
            .send()
            .await
            .map_err(aws_sdk_identitystore::Error::from)?;

        output.display_name()
            .map(str::to_string)
            .ok_or_else(|| IdentityLookupError::MissingField {
                operation: "DescribeGroup",
                id: group_id.to_string(),
                field: "DisplayName",
            })
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_id_is_second_path_segment() {
        assert_eq!(
            identity_store_id("arn:aws:identitystore::123456789012:identitystore/d-111"),
            Some("d-111")
        );
        assert_eq!(
            identity_store_id("arn:aws:identitystore::123456789012:identitystore/d-111/extra"),
            Some("d-111")
        );
    }

    #[test]
    fn store_id_missing_segment() {
        assert_eq!(identity_store_id("arn:aws:identitystore::123456789012:identitystore"), None);
        assert_eq!(identity_store_id("arn:aws:identitystore::123456789012:identitystore/"), None);
    }
}
