use std::collections::HashMap;

/// Outcome of a membership check against the configured groups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Membership {
    Member(String),
    NoMatch,
}

#[derive(Debug, Clone)]
struct CachedUser {
    user_name: String,
    // None until the membership check has run for this user
    membership: Option<Membership>,
}

/// Warm cache of identity store lookups for the lifetime of the process.
///
/// Entries are never evicted or refreshed; group membership changes upstream
/// are not picked up until the process is recycled.
#[derive(Debug, Default)]
pub struct IdentityCache {
    users: HashMap<String, CachedUser>,
    groups: HashMap<String, String>,
}

impl IdentityCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn user_name(&self, user_id: &str) -> Option<&str> {
        self.users.get(user_id).map(|user| user.user_name.as_str())
    }

    pub fn insert_user(&mut self, user_id: &str, user_name: String) {
        self.users
            .entry(user_id.to_string())
            .and_modify(|user| user.user_name = user_name.clone())
            .or_insert(CachedUser { user_name, membership: None });
    }

    pub fn membership(&self, user_id: &str) -> Option<&Membership> {
        self.users.get(user_id).and_then(|user| user.membership.as_ref())
    }

    /// Records the membership outcome for a user already in the cache.
    /// Returns false if the user is unknown.
    pub fn set_membership(&mut self, user_id: &str, membership: Membership) -> bool {
        match self.users.get_mut(user_id) {
            Some(user) => {
                user.membership = Some(membership);
                true
            }
            None => false,
        }
    }

    pub fn group_name(&self, group_id: &str) -> Option<&str> {
        self.groups.get(group_id).map(String::as_str)
    }

    pub fn insert_group_name(&mut self, group_id: &str, group_name: String) {
        self.groups.insert(group_id.to_string(), group_name);
    }

    pub fn cached_users(&self) -> usize {
        self.users.len()
    }

    pub fn cached_groups(&self) -> usize {
        self.groups.len()
    }
}
