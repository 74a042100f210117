//! History service: recent transactions, events and alerts

use super::{collapse, scoped_path};
use crate::api::{ApiClient, ApiRequest, RecentAlert, RecentEvent, RecentTransaction};
use crate::error::ServiceError;
use crate::types::Limit;

#[derive(Clone)]
pub struct HistoryService {
    client: ApiClient,
}

impl HistoryService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn recent_tx(
        &self,
        scope: Option<&str>,
        limit: Limit,
    ) -> Result<Vec<RecentTransaction>, ServiceError> {
        let request =
            ApiRequest::get(scoped_path("/history/recent-tx", scope)).query("limit", limit);
        self.client
            .json(request)
            .await
            .map_err(|e| collapse("Failed to fetch recent transactions", scope, e))
    }

    pub async fn recent_events(
        &self,
        scope: Option<&str>,
        limit: Limit,
    ) -> Result<Vec<RecentEvent>, ServiceError> {
        let request =
            ApiRequest::get(scoped_path("/history/recent-events", scope)).query("limit", limit);
        self.client
            .json(request)
            .await
            .map_err(|e| collapse("Failed to fetch recent events", scope, e))
    }

    pub async fn recent_alerts(
        &self,
        scope: Option<&str>,
        limit: Limit,
    ) -> Result<Vec<RecentAlert>, ServiceError> {
        let request =
            ApiRequest::get(scoped_path("/history/recent-alerts", scope)).query("limit", limit);
        self.client
            .json(request)
            .await
            .map_err(|e| collapse("Failed to fetch recent alerts", scope, e))
    }
}
