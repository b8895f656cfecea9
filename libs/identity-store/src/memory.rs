use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::{DirectoryService, GroupMembership, IdentityLookupError};


#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DirectoryCall {
    DescribeUser { identity_store_id: String, user_id: String },
    IsMemberInGroups { identity_store_id: String, user_id: String, group_ids: Vec<String> },
    DescribeGroup { identity_store_id: String, group_id: String },
}

/// Directory backed by fixed maps that records every call made against it.
///
/// Membership results are returned in the order they were registered, and
/// only for the requested group ids.
#[derive(Debug, Default)]
pub struct InMemoryDirectory {
    users: HashMap<String, String>,
    groups: HashMap<String, String>,
    memberships: HashMap<String, Vec<GroupMembership>>,
    calls: Mutex<Vec<DirectoryCall>>,
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(mut self, user_id: &str, user_name: &str) -> Self {
        self.users.insert(user_id.to_string(), user_name.to_string());
        self
    }

    pub fn with_group(mut self, group_id: &str, group_name: &str) -> Self {
        self.groups.insert(group_id.to_string(), group_name.to_string());
        self
    }

    pub fn with_memberships(mut self, user_id: &str, results: Vec<GroupMembership>) -> Self {
        self.memberships.insert(user_id.to_string(), results);
        self
    }

    pub fn calls(&self) -> Vec<DirectoryCall> {
        self.calls.lock().map(|calls| calls.clone()).unwrap_or_default()
    }

    pub fn count_user_lookups(&self) -> usize {
        self.count(|call| matches!(call, DirectoryCall::DescribeUser { .. }))
    }

    pub fn count_membership_checks(&self) -> usize {
        self.count(|call| matches!(call, DirectoryCall::IsMemberInGroups { .. }))
    }

    pub fn count_group_lookups(&self) -> usize {
        self.count(|call| matches!(call, DirectoryCall::DescribeGroup { .. }))
    }

    fn count(&self, predicate: impl Fn(&DirectoryCall) -> bool) -> usize {
        self.calls().iter().filter(|call| predicate(call)).count()
    }

    fn record(&self, call: DirectoryCall) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
    }
}

#[async_trait]
impl DirectoryService for InMemoryDirectory {
    async fn describe_user(&self, identity_store_id: &str, user_id: &str) -> Result<String, IdentityLookupError> {
        self.record(DirectoryCall::DescribeUser {
            identity_store_id: identity_store_id.to_string(),
            user_id: user_id.to_string(),
        });

        self.users.get(user_id).cloned().ok_or_else(|| IdentityLookupError::Rejected {
            operation: "DescribeUser",
            id: user_id.to_string(),
            message: "user not found".to_string(),
        })
    }

    async fn is_member_in_groups(
        &self,
        identity_store_id: &str,
        user_id: &str,
        group_ids: &[String],
    ) -> Result<Vec<GroupMembership>, IdentityLookupError> {
        self.record(DirectoryCall::IsMemberInGroups {
            identity_store_id: identity_store_id.to_string(),
            user_id: user_id.to_string(),
            group_ids: group_ids.to_vec(),
        });

        let results = self.memberships.get(user_id).cloned().unwrap_or_default();
        Ok(results
            .into_iter()
            .filter(|result| group_ids.contains(&result.group_id))
            .collect())
    }

    async fn describe_group(&self, identity_store_id: &str, group_id: &str) -> Result<String, IdentityLookupError> {
        self.record(DirectoryCall::DescribeGroup {
            identity_store_id: identity_store_id.to_string(),
            group_id: group_id.to_string(),
        });

        self.groups.get(group_id).cloned().ok_or_else(|| IdentityLookupError::Rejected {
            operation: "DescribeGroup",
            id: group_id.to_string(),
            message: "group not found".to_string(),
        })
    }
}
