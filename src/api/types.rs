//! API Types - Data structures for the Blip backend API
//!
//! Every record is an immutable snapshot of server state. Wire names are camelCase.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

// ─────────────────────────────────────────────────────────────────
// Metrics
// ─────────────────────────────────────────────────────────────────

/// Comparison of a metric against the prior period of equal length
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparedMetric {
    /// None when the prior period had no data
    pub previous_count: Option<f64>,
    #[serde(default)]
    pub absolute_change: f64,
    /// `Some(None)` when the change is unbounded (prior value was zero),
    /// `None` when the backend left the field out
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub percentage_change: Option<Option<f64>>,
}

/// Marks a field as sent, even when its value is null
fn present<'de, D>(deserializer: D) -> Result<Option<Option<f64>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<f64>::deserialize(deserializer).map(Some)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntervalTransactionVolume {
    pub date: String,
    pub transaction_count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionVolumeWithComparison {
    pub interval_volumes: Vec<IntervalTransactionVolume>,
    pub total_volume: u64,
    pub compared_total_volume: ComparedMetric,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntervalTransactionSuccessRate {
    pub date: String,
    pub transaction_count: u64,
    pub successful_transactions: u64,
    pub failed_transactions: u64,
    pub interval_success_rate: f64,
    pub interval_failure_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionSuccessRateWithComparison {
    pub interval_success_rates: Vec<IntervalTransactionSuccessRate>,
    pub total_transactions: u64,
    pub total_successful: u64,
    pub total_failed: u64,
    pub overall_success_rate: f64,
    pub overall_failure_rate: f64,
    pub compared_total_transactions: ComparedMetric,
    pub compared_total_successful: ComparedMetric,
    pub compared_total_failed: ComparedMetric,
    pub compared_overall_success_rate: ComparedMetric,
    pub compared_overall_failure_rate: ComparedMetric,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntervalUniqueUsers {
    pub date: String,
    pub unique_users: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UniqueUsersWithComparison {
    pub interval_unique_users: Vec<IntervalUniqueUsers>,
    pub total_unique_users: u64,
    pub compared_total_unique_users: ComparedMetric,
}

/// Fees are denominated in stroops (1 XLM = 10,000,000 stroops)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntervalTransactionFees {
    pub date: String,
    pub total_fees: f64,
    pub avg_fee: f64,
    pub transaction_count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionFeesWithComparison {
    pub interval_fees: Vec<IntervalTransactionFees>,
    pub total_fees: f64,
    pub avg_fee: f64,
    pub total_transactions: u64,
    pub compared_total_fees: ComparedMetric,
    pub compared_avg_fee: ComparedMetric,
    pub compared_total_transactions: ComparedMetric,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopEvent {
    pub contract_id: String,
    #[serde(default)]
    pub contract_nickname: String,
    pub event_name: String,
    pub event_count: u64,
    pub compared: ComparedMetric,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopUser {
    pub contract_id: String,
    #[serde(default)]
    pub contract_nickname: String,
    pub user: String,
    pub transaction_count: u64,
    pub compared: ComparedMetric,
}

// ─────────────────────────────────────────────────────────────────
// History
// ─────────────────────────────────────────────────────────────────

/// Typed value attached to an invocation or event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScValue {
    #[serde(rename = "type")]
    pub kind: String,
    pub value: String,
}

pub type Parameter = ScValue;
pub type Topic = ScValue;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentTransaction {
    pub contract_id: String,
    #[serde(default)]
    pub contract_nickname: Option<String>,
    pub source_account: String,
    pub transaction_hash: String,
    pub ledger_sequence: u64,
    pub created_at: DateTime<Utc>,
    pub function_name: String,
    #[serde(default)]
    pub parameters: Vec<Parameter>,
    pub successful: bool,
    /// Stroops
    pub fee_charged: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentEvent {
    pub contract_id: String,
    #[serde(default)]
    pub contract_nickname: Option<String>,
    pub transaction_hash: String,
    pub ledger_sequence: u64,
    pub created_at: DateTime<Utc>,
    pub event_type: String,
    #[serde(default)]
    pub topics: Vec<Topic>,
    #[serde(default)]
    pub data: serde_json::Value,
    pub successful: bool,
    pub in_successful_contract_call: bool,
}

impl RecentEvent {
    /// Topics worth showing: symbol topics only
    pub fn symbol_topics(&self) -> impl Iterator<Item = &Topic> {
        self.topics.iter().filter(|t| t.kind == "Sym")
    }

    /// Stable row identity: hash, event type and topic values joined by '.'
    pub fn row_key(&self) -> String {
        let mut key = format!("{}.{}", self.transaction_hash, self.event_type);
        for topic in &self.topics {
            key.push('.');
            key.push_str(&topic.value);
        }
        key
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentAlert {
    pub contract_id: String,
    #[serde(default)]
    pub contract_nickname: Option<String>,
    pub alert_time: DateTime<Utc>,
    pub total_transactions: u64,
    pub failed_transactions: u64,
    pub error_rate: f64,
}

// ─────────────────────────────────────────────────────────────────
// Saved contracts
// ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedContract {
    pub contract_id: String,
    #[serde(default)]
    pub nickname: String,
    #[serde(default)]
    pub is_default: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Paginated list envelope returned by `GET /saved-contracts`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedContractPage {
    pub results: Vec<SavedContract>,
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub limit: Option<u32>,
    #[serde(default)]
    pub total_pages: Option<u32>,
    #[serde(default)]
    pub total_results: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSavedContract {
    pub contract_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nickname: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SavedContractUpdate {
    pub nickname: String,
}

// ─────────────────────────────────────────────────────────────────
// Profile
// ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub profile_image_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub email: String,
}

impl ProfileUpdate {
    /// Start from the current profile so only changed fields need setting
    pub fn from_profile(profile: &UserProfile) -> Self {
        Self {
            first_name: profile.first_name.clone(),
            last_name: profile.last_name.clone(),
            username: profile.username.clone(),
            email: profile.email.clone(),
        }
    }
}
