//! Group handle to numeric id resolution
//!
//! Comment-level calls address a wall by its negative numeric owner id, while
//! configuration names groups by handle.

use crate::api::types::GroupsPayload;
use crate::api::ApiClient;
use std::collections::HashMap;

/// Resolves a group handle with a single `groups.getById` call
///
/// Returns `None` if the call fails or the handle does not resolve.
pub async fn resolve_group_id(client: &ApiClient, handle: &str) -> Option<i64> {
    let payload: GroupsPayload = client
        .call("groups.getById", &[("group_id", handle.to_string())])
        .await
        .ok()?;

    let id = payload.first_id();
    if id.is_none() {
        tracing::warn!(group = handle, "Group handle did not resolve to an id");
    }
    id
}

/// Caches successful resolutions for the duration of a run
///
/// Failures are not cached; the next post of the same group tries again.
#[derive(Debug, Default)]
pub struct GroupResolver {
    resolved: HashMap<String, i64>,
}

impl GroupResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the numeric id for `handle`, calling the API on a cache miss
    pub async fn resolve(&mut self, client: &ApiClient, handle: &str) -> Option<i64> {
        if let Some(id) = self.resolved.get(handle) {
            return Some(*id);
        }

        let id = resolve_group_id(client, handle).await?;
        tracing::debug!(group = handle, id, "Resolved group id");
        self.resolved.insert(handle.to_string(), id);
        Some(id)
    }

    /// Returns a previously resolved id without calling the API
    pub fn cached(&self, handle: &str) -> Option<i64> {
        self.resolved.get(handle).copied()
    }
}
