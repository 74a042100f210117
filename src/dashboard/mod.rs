//! Dashboard data layer
//!
//! Binds the services to the query cache and the stores. Each resource has
//! one method taking an optional contract scope: `None` reads across all
//! saved contracts, `Some(id)` reads a single contract.
//!
//! Mutations round-trip through the backend and then invalidate the cached
//! queries they affect.

mod keys;

pub use keys::*;

use std::sync::Arc;
use tracing::{error, info};

use crate::api::{
    ApiClient, NewSavedContract, ProfileUpdate, RecentAlert, RecentEvent, RecentTransaction,
    SavedContract, SavedContractPage, SavedContractUpdate, TopEvent, TopUser,
    TransactionFeesWithComparison, TransactionSuccessRateWithComparison,
    TransactionVolumeWithComparison, UniqueUsersWithComparison, UserProfile,
};
use crate::error::{QueryError, ServiceError};
use crate::query::{QueryClient, QueryOptions, QueryState};
use crate::services::Services;
use crate::store::Stores;
use crate::types::{Limit, TimeRange};
use crate::views::OverviewData;

/// Query and mutation entry points for every view
#[derive(Clone)]
pub struct Dashboard {
    services: Services,
    queries: Arc<QueryClient>,
    stores: Stores,
}

impl Dashboard {
    pub fn new(client: ApiClient, queries: Arc<QueryClient>, stores: Stores) -> Self {
        Self {
            services: Services::new(client),
            queries,
            stores,
        }
    }

    pub fn queries(&self) -> &Arc<QueryClient> {
        &self.queries
    }

    pub fn stores(&self) -> &Stores {
        &self.stores
    }

    pub fn services(&self) -> &Services {
        &self.services
    }

    // ─────────────────────────────────────────────────────────────
    // Metrics
    // ─────────────────────────────────────────────────────────────

    pub async fn tx_volume(
        &self,
        scope: Option<&str>,
        time_range: TimeRange,
    ) -> QueryState<TransactionVolumeWithComparison> {
        let metrics = &self.services.metrics;
        self.queries
            .fetch(tx_volume_key(scope, time_range), || async move {
                metrics.tx_volume(scope, time_range).await.map_err(QueryError::from)
            })
            .await
    }

    pub async fn tx_success_rate(
        &self,
        scope: Option<&str>,
        time_range: TimeRange,
    ) -> QueryState<TransactionSuccessRateWithComparison> {
        let metrics = &self.services.metrics;
        self.queries
            .fetch(tx_success_rate_key(scope, time_range), || async move {
                metrics.tx_success_rate(scope, time_range).await.map_err(QueryError::from)
            })
            .await
    }

    pub async fn unique_users(
        &self,
        scope: Option<&str>,
        time_range: TimeRange,
    ) -> QueryState<UniqueUsersWithComparison> {
        let metrics = &self.services.metrics;
        self.queries
            .fetch(unique_users_key(scope, time_range), || async move {
                metrics.unique_users(scope, time_range).await.map_err(QueryError::from)
            })
            .await
    }

    pub async fn tx_fees(
        &self,
        scope: Option<&str>,
        time_range: TimeRange,
    ) -> QueryState<TransactionFeesWithComparison> {
        let metrics = &self.services.metrics;
        self.queries
            .fetch(tx_fees_key(scope, time_range), || async move {
                metrics.tx_fees(scope, time_range).await.map_err(QueryError::from)
            })
            .await
    }

    pub async fn top_events(
        &self,
        scope: Option<&str>,
        time_range: TimeRange,
        limit: Option<Limit>,
    ) -> QueryState<Vec<TopEvent>> {
        let metrics = &self.services.metrics;
        self.queries
            .fetch(top_events_key(scope, time_range, limit), || async move {
                metrics.top_events(scope, time_range, limit).await.map_err(QueryError::from)
            })
            .await
    }

    pub async fn top_users(
        &self,
        scope: Option<&str>,
        time_range: TimeRange,
        limit: Option<Limit>,
    ) -> QueryState<Vec<TopUser>> {
        let metrics = &self.services.metrics;
        self.queries
            .fetch(top_users_key(scope, time_range, limit), || async move {
                metrics.top_users(scope, time_range, limit).await.map_err(QueryError::from)
            })
            .await
    }

    /// The four overview metrics, fetched concurrently. Failed metrics are
    /// left empty; the services have already logged why.
    pub async fn overview(&self, scope: Option<&str>, time_range: TimeRange) -> OverviewData {
        let (tx_volume, unique_users, tx_success_rate, tx_fees) = tokio::join!(
            self.tx_volume(scope, time_range),
            self.unique_users(scope, time_range),
            self.tx_success_rate(scope, time_range),
            self.tx_fees(scope, time_range),
        );
        OverviewData {
            tx_volume: tx_volume.data,
            unique_users: unique_users.data,
            tx_success_rate: tx_success_rate.data,
            tx_fees: tx_fees.data,
        }
    }

    // ─────────────────────────────────────────────────────────────
    // History
    // ─────────────────────────────────────────────────────────────

    pub async fn recent_tx(
        &self,
        scope: Option<&str>,
        limit: Limit,
    ) -> QueryState<Vec<RecentTransaction>> {
        let history = &self.services.history;
        self.queries
            .fetch(recent_tx_key(scope, limit), || async move {
                history.recent_tx(scope, limit).await.map_err(QueryError::from)
            })
            .await
    }

    pub async fn recent_events(
        &self,
        scope: Option<&str>,
        limit: Limit,
    ) -> QueryState<Vec<RecentEvent>> {
        let history = &self.services.history;
        self.queries
            .fetch(recent_events_key(scope, limit), || async move {
                history.recent_events(scope, limit).await.map_err(QueryError::from)
            })
            .await
    }

    pub async fn recent_alerts(
        &self,
        scope: Option<&str>,
        limit: Limit,
    ) -> QueryState<Vec<RecentAlert>> {
        let history = &self.services.history;
        self.queries
            .fetch(recent_alerts_key(scope, limit), || async move {
                history.recent_alerts(scope, limit).await.map_err(QueryError::from)
            })
            .await
    }

    // ─────────────────────────────────────────────────────────────
    // Profile
    // ─────────────────────────────────────────────────────────────

    /// Current user's profile; a successful fetch also fills the profile store
    pub async fn user_profile(&self) -> QueryState<UserProfile> {
        let profile = &self.services.profile;
        let state = self
            .queries
            .fetch(user_profile_key(), || async move {
                profile.get_me().await.map_err(QueryError::from)
            })
            .await;
        if let Some(data) = &state.data {
            self.stores.profile.set(Some(data.clone()));
        }
        state
    }

    pub async fn update_user_profile(
        &self,
        update: &ProfileUpdate,
    ) -> Result<UserProfile, ServiceError> {
        match self.services.profile.update_me(update).await {
            Ok(profile) => {
                self.queries.invalidate(&user_profile_key()).await;
                Ok(profile)
            }
            Err(e) => {
                error!("Error updating user profile: {e}");
                Err(e)
            }
        }
    }

    // ─────────────────────────────────────────────────────────────
    // Saved contracts
    // ─────────────────────────────────────────────────────────────

    /// Saved contracts, most recently updated first.
    ///
    /// The list response must carry a `results` array. The sorted list is
    /// mirrored into the saved-contracts store.
    pub async fn saved_contracts(&self) -> QueryState<Vec<SavedContract>> {
        let service = &self.services.saved_contracts;
        let state = self
            .queries
            .fetch(saved_contracts_key(), || async move {
                let raw = service.get_all().await?;
                let page = parse_saved_contract_page(raw)?;
                Ok::<_, QueryError>(sort_by_updated_desc(page.results))
            })
            .await;
        if let Some(list) = &state.data {
            self.stores.saved_contracts.set(list.clone());
        }
        state
    }

    /// Single saved contract; idle when `id` is empty
    pub async fn saved_contract(&self, id: &str) -> QueryState<SavedContract> {
        let service = &self.services.saved_contracts;
        let options = QueryOptions {
            enabled: !id.is_empty(),
            ..self.queries.defaults()
        };
        self.queries
            .fetch_with(saved_contract_key(id), options, || async move {
                service.get_by_id(id).await.map_err(QueryError::from)
            })
            .await
    }

    pub async fn create_saved_contract(
        &self,
        contract_id: &str,
        nickname: Option<&str>,
    ) -> Result<SavedContract, ServiceError> {
        let new = NewSavedContract {
            contract_id: contract_id.to_string(),
            nickname: nickname.map(str::to_string),
        };
        let result = self.services.saved_contracts.create(&new).await;
        self.after_mutation(result, "Error creating saved contract").await
    }

    pub async fn update_saved_contract(
        &self,
        id: &str,
        nickname: &str,
    ) -> Result<SavedContract, ServiceError> {
        let update = SavedContractUpdate {
            nickname: nickname.to_string(),
        };
        let result = self.services.saved_contracts.update(id, &update).await;
        self.after_mutation(result, "Error updating saved contract").await
    }

    pub async fn delete_saved_contract(&self, id: &str) -> Result<(), ServiceError> {
        let result = self.services.saved_contracts.delete(id).await;
        self.after_mutation(result, "Error deleting saved contract").await
    }

    pub async fn set_default_saved_contract(&self, id: &str) -> Result<(), ServiceError> {
        let result = self.services.saved_contracts.set_default(id).await;
        self.after_mutation(result, "Error setting default saved contract")
            .await
    }

    async fn after_mutation<T>(
        &self,
        result: Result<T, ServiceError>,
        failure: &str,
    ) -> Result<T, ServiceError> {
        match result {
            Ok(value) => {
                let count = self.queries.invalidate(&saved_contracts_key()).await;
                info!(invalidated = count, "saved contracts changed");
                Ok(value)
            }
            Err(e) => {
                error!("{failure}: {e}");
                Err(e)
            }
        }
    }
}

/// Check the list envelope: anything without a `results` array is rejected
pub fn parse_saved_contract_page(raw: serde_json::Value) -> Result<SavedContractPage, QueryError> {
    let has_results = raw
        .get("results")
        .map(serde_json::Value::is_array)
        .unwrap_or(false);
    if !has_results {
        return Err(QueryError::UnexpectedFormat);
    }
    serde_json::from_value(raw).map_err(|e| {
        error!("saved contracts list did not decode: {e}");
        QueryError::UnexpectedFormat
    })
}

/// Most recently updated first; ties keep their input order
pub fn sort_by_updated_desc(mut contracts: Vec<SavedContract>) -> Vec<SavedContract> {
    contracts.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
    contracts
}
