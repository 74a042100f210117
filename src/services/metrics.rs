//! Metrics service: aggregates with comparison against the prior period

use super::{collapse, scoped_path};
use crate::api::{
    ApiClient, ApiRequest, TopEvent, TopUser, TransactionFeesWithComparison,
    TransactionSuccessRateWithComparison, TransactionVolumeWithComparison,
    UniqueUsersWithComparison,
};
use crate::error::ServiceError;
use crate::types::{Limit, TimeRange};

#[derive(Clone)]
pub struct MetricsService {
    client: ApiClient,
}

impl MetricsService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// `GET /metrics/tx-volume[/:contractId]?timeRange=`
    pub async fn tx_volume(
        &self,
        scope: Option<&str>,
        time_range: TimeRange,
    ) -> Result<TransactionVolumeWithComparison, ServiceError> {
        let request = ApiRequest::get(scoped_path("/metrics/tx-volume", scope))
            .query("timeRange", time_range);
        self.client
            .json(request)
            .await
            .map_err(|e| collapse("Failed to fetch transaction volume", scope, e))
    }

    /// `GET /metrics/tx-success-rate[/:contractId]?timeRange=`
    pub async fn tx_success_rate(
        &self,
        scope: Option<&str>,
        time_range: TimeRange,
    ) -> Result<TransactionSuccessRateWithComparison, ServiceError> {
        let request = ApiRequest::get(scoped_path("/metrics/tx-success-rate", scope))
            .query("timeRange", time_range);
        self.client
            .json(request)
            .await
            .map_err(|e| collapse("Failed to fetch transaction success rate", scope, e))
    }

    /// `GET /metrics/unique-users[/:contractId]?timeRange=`
    pub async fn unique_users(
        &self,
        scope: Option<&str>,
        time_range: TimeRange,
    ) -> Result<UniqueUsersWithComparison, ServiceError> {
        let request = ApiRequest::get(scoped_path("/metrics/unique-users", scope))
            .query("timeRange", time_range);
        self.client
            .json(request)
            .await
            .map_err(|e| collapse("Failed to fetch unique users", scope, e))
    }

    /// `GET /metrics/tx-fees[/:contractId]?timeRange=`
    pub async fn tx_fees(
        &self,
        scope: Option<&str>,
        time_range: TimeRange,
    ) -> Result<TransactionFeesWithComparison, ServiceError> {
        let request = ApiRequest::get(scoped_path("/metrics/tx-fees", scope))
            .query("timeRange", time_range);
        self.client
            .json(request)
            .await
            .map_err(|e| collapse("Failed to fetch transaction fees", scope, e))
    }

    /// `GET /metrics/top-events[/:contractId]?timeRange=&limit=`
    pub async fn top_events(
        &self,
        scope: Option<&str>,
        time_range: TimeRange,
        limit: Option<Limit>,
    ) -> Result<Vec<TopEvent>, ServiceError> {
        let request = ApiRequest::get(scoped_path("/metrics/top-events", scope))
            .query("timeRange", time_range)
            .query_opt("limit", limit);
        self.client
            .json(request)
            .await
            .map_err(|e| collapse("Failed to fetch top events", scope, e))
    }

    /// `GET /metrics/top-users[/:contractId]?timeRange=&limit=`
    pub async fn top_users(
        &self,
        scope: Option<&str>,
        time_range: TimeRange,
        limit: Option<Limit>,
    ) -> Result<Vec<TopUser>, ServiceError> {
        let request = ApiRequest::get(scoped_path("/metrics/top-users", scope))
            .query("timeRange", time_range)
            .query_opt("limit", limit);
        self.client
            .json(request)
            .await
            .map_err(|e| collapse("Failed to fetch top users", scope, e))
    }
}
