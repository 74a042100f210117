//! Cache keys, one builder per query.
//!
//! Global and contract-scoped variants share a resource name and differ in
//! the scope slot, so invalidating the resource prefix clears both.

use crate::query::QueryKey;
use crate::types::{Limit, TimeRange};

/// Empty scope requests the global endpoints, so it shares their key
fn scoped(resource: &str, scope: Option<&str>) -> QueryKey {
    QueryKey::new(resource).with_opt(scope.filter(|id| !id.is_empty()))
}

fn metric(resource: &str, scope: Option<&str>, time_range: TimeRange) -> QueryKey {
    scoped(resource, scope).with(time_range)
}

pub fn tx_volume_key(scope: Option<&str>, time_range: TimeRange) -> QueryKey {
    metric("txVolume", scope, time_range)
}

pub fn tx_success_rate_key(scope: Option<&str>, time_range: TimeRange) -> QueryKey {
    metric("txSuccessRate", scope, time_range)
}

pub fn unique_users_key(scope: Option<&str>, time_range: TimeRange) -> QueryKey {
    metric("uniqueUsers", scope, time_range)
}

pub fn tx_fees_key(scope: Option<&str>, time_range: TimeRange) -> QueryKey {
    metric("txFees", scope, time_range)
}

pub fn top_events_key(scope: Option<&str>, time_range: TimeRange, limit: Option<Limit>) -> QueryKey {
    metric("topEvents", scope, time_range).with_opt(limit)
}

pub fn top_users_key(scope: Option<&str>, time_range: TimeRange, limit: Option<Limit>) -> QueryKey {
    metric("topUsers", scope, time_range).with_opt(limit)
}

pub fn recent_tx_key(scope: Option<&str>, limit: Limit) -> QueryKey {
    scoped("recentTx", scope).with(limit)
}

pub fn recent_events_key(scope: Option<&str>, limit: Limit) -> QueryKey {
    scoped("recentEvents", scope).with(limit)
}

pub fn recent_alerts_key(scope: Option<&str>, limit: Limit) -> QueryKey {
    scoped("recentAlerts", scope).with(limit)
}

pub fn user_profile_key() -> QueryKey {
    QueryKey::new("userProfile")
}

pub fn saved_contracts_key() -> QueryKey {
    QueryKey::new("savedContracts")
}

pub fn saved_contract_key(id: &str) -> QueryKey {
    QueryKey::new("savedContract").with(id)
}
