//! Tests for the dashboard queries and mutations against an in-memory backend

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use blip::api::{
        ApiClient, ApiRequest, ApiResponse, ProfileUpdate, StaticSession, TokenStore, Transport,
    };
    use blip::dashboard::{saved_contracts_key, Dashboard};
    use blip::error::{ClientError, QueryError};
    use blip::query::{QueryClient, QueryEvent, QueryOptions};
    use blip::store::Stores;
    use blip::types::{Limit, TimeRange};
    use blip::views;
    use chrono::{Duration as ChronoDuration, TimeZone, Utc};
    use reqwest::Method;
    use serde_json::{json, Value};
    use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;
    use tokio_test::{assert_err, assert_ok};

    /// Minimal stand-in for the Blip backend
    #[derive(Default)]
    struct FakeBackend {
        contracts: Mutex<Vec<Value>>,
        profile: Mutex<Option<Value>>,
        requests: Mutex<Vec<String>>,
        clock: AtomicI64,
        malformed_list: AtomicBool,
    }

    impl FakeBackend {
        fn requests_to(&self, method: &str, path: &str) -> usize {
            let needle = format!("{method} {path}");
            self.requests
                .lock()
                .unwrap()
                .iter()
                .filter(|r| **r == needle)
                .count()
        }

        /// Strictly increasing timestamps so sort order is deterministic
        fn tick(&self) -> String {
            let n = self.clock.fetch_add(1, Ordering::SeqCst);
            let at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + ChronoDuration::minutes(n);
            at.to_rfc3339()
        }

        fn handle(&self, request: &ApiRequest) -> ApiResponse {
            let segments: Vec<&str> = request.path.trim_matches('/').split('/').collect();
            match (&request.method, segments.as_slice()) {
                (m, ["saved-contracts"]) if *m == Method::GET => {
                    if self.malformed_list.load(Ordering::SeqCst) {
                        return json_response(200, json!({ "items": [] }));
                    }
                    let results = self.contracts.lock().unwrap().clone();
                    json_response(200, json!({ "results": results, "page": 1 }))
                }
                (m, ["saved-contracts"]) if *m == Method::POST => {
                    let body = request.body.clone().unwrap_or(Value::Null);
                    let now = self.tick();
                    let contract = json!({
                        "contractId": body["contractId"],
                        "nickname": body["nickname"].as_str().unwrap_or(""),
                        "isDefault": false,
                        "createdAt": now,
                        "updatedAt": now,
                    });
                    self.contracts.lock().unwrap().push(contract.clone());
                    json_response(201, contract)
                }
                (m, ["saved-contracts", id]) if *m == Method::GET => {
                    match self.find(id) {
                        Some(c) => json_response(200, c),
                        None => ApiResponse::new(404, "not found"),
                    }
                }
                (m, ["saved-contracts", id]) if *m == Method::PATCH => {
                    let nickname = request
                        .body
                        .as_ref()
                        .and_then(|b| b["nickname"].as_str())
                        .unwrap_or("")
                        .to_string();
                    let now = self.tick();
                    let mut contracts = self.contracts.lock().unwrap();
                    match contracts.iter_mut().find(|c| c["contractId"] == *id) {
                        Some(c) => {
                            c["nickname"] = json!(nickname);
                            c["updatedAt"] = json!(now);
                            json_response(200, c.clone())
                        }
                        None => ApiResponse::new(404, "not found"),
                    }
                }
                (m, ["saved-contracts", id]) if *m == Method::DELETE => {
                    let mut contracts = self.contracts.lock().unwrap();
                    let before = contracts.len();
                    contracts.retain(|c| c["contractId"] != *id);
                    if contracts.len() < before {
                        ApiResponse::new(204, "")
                    } else {
                        ApiResponse::new(404, "not found")
                    }
                }
                (m, ["saved-contracts", id, "set-default"]) if *m == Method::POST => {
                    for c in self.contracts.lock().unwrap().iter_mut() {
                        let is_target = c["contractId"] == *id;
                        c["isDefault"] = json!(is_target);
                    }
                    json_response(200, json!({}))
                }
                (m, ["users", "me"]) if *m == Method::GET => match self.profile.lock().unwrap().clone() {
                    Some(p) => json_response(200, p),
                    None => ApiResponse::new(404, "no profile"),
                },
                (m, ["users", "me"]) if *m == Method::PATCH => {
                    let body = request.body.clone().unwrap_or(Value::Null);
                    let mut profile = self.profile.lock().unwrap();
                    let current = profile.get_or_insert_with(|| json!({ "id": "u1" }));
                    for key in ["firstName", "lastName", "username", "email"] {
                        current[key] = body[key].clone();
                    }
                    json_response(200, current.clone())
                }
                (m, ["metrics", "tx-volume", ..]) if *m == Method::GET => json_response(
                    200,
                    json!({
                        "intervalVolumes": [
                            { "date": "2024-03-10", "transactionCount": 700 },
                            { "date": "2024-03-09", "transactionCount": 800 }
                        ],
                        "totalVolume": 1500,
                        "comparedTotalVolume": {
                            "previousCount": 1000,
                            "absoluteChange": 500,
                            "percentageChange": 50.0
                        }
                    }),
                ),
                _ => ApiResponse::new(500, "unexpected request"),
            }
        }

        fn find(&self, id: &str) -> Option<Value> {
            self.contracts
                .lock()
                .unwrap()
                .iter()
                .find(|c| c["contractId"] == id)
                .cloned()
        }
    }

    fn json_response(status: u16, body: Value) -> ApiResponse {
        ApiResponse::new(status, body.to_string())
    }

    #[async_trait]
    impl Transport for FakeBackend {
        async fn send(
            &self,
            request: ApiRequest,
            _bearer: Option<String>,
        ) -> Result<ApiResponse, ClientError> {
            self.requests
                .lock()
                .unwrap()
                .push(format!("{} {}", request.method, request.path));
            Ok(self.handle(&request))
        }
    }

    fn setup() -> (Dashboard, Arc<FakeBackend>) {
        let backend = Arc::new(FakeBackend::default());
        let tokens = Arc::new(TokenStore::new(Arc::new(StaticSession::new(Some(
            "token".into(),
        )))));
        let client = ApiClient::new(backend.clone(), tokens);
        let queries = Arc::new(QueryClient::new(QueryOptions {
            retries: 0,
            retry_delay: Duration::ZERO,
            ..QueryOptions::default()
        }));
        (Dashboard::new(client, queries, Stores::default()), backend)
    }

    fn ids(dashboard_list: &[blip::api::SavedContract]) -> Vec<&str> {
        dashboard_list.iter().map(|c| c.contract_id.as_str()).collect()
    }

    // ============================================================================
    // Saved contracts
    // ============================================================================

    #[tokio::test]
    async fn test_create_then_list_includes_contract() {
        let (dashboard, _backend) = setup();
        let before = dashboard.saved_contracts().await;
        assert_eq!(before.data, Some(vec![]));

        let created = assert_ok!(dashboard.create_saved_contract("C123", Some("Test")).await);
        assert_eq!(created.nickname, "Test");

        let after = dashboard.saved_contracts().await;
        assert_eq!(ids(after.data.as_deref().unwrap()), vec!["C123"]);
        assert_eq!(ids(&dashboard.stores().saved_contracts.get()), vec!["C123"]);
    }

    #[tokio::test]
    async fn test_delete_removes_contract_from_list() {
        let (dashboard, _backend) = setup();
        assert_ok!(dashboard.create_saved_contract("C1", Some("One")).await);
        assert_ok!(dashboard.create_saved_contract("C2", Some("Two")).await);
        assert_eq!(dashboard.saved_contracts().await.data.unwrap().len(), 2);

        assert_ok!(dashboard.delete_saved_contract("C1").await);

        let list = dashboard.saved_contracts().await.data.unwrap();
        assert_eq!(ids(&list), vec!["C2"]);
    }

    #[tokio::test]
    async fn test_list_is_most_recently_updated_first() {
        let (dashboard, _backend) = setup();
        for id in ["A", "B", "C"] {
            assert_ok!(dashboard.create_saved_contract(id, None).await);
        }
        assert_ok!(dashboard.update_saved_contract("A", "renamed").await);

        let list = dashboard.saved_contracts().await.data.unwrap();
        assert_eq!(ids(&list), vec!["A", "C", "B"]);
        assert_eq!(list[0].nickname, "renamed");
    }

    #[tokio::test]
    async fn test_list_is_cached_until_a_mutation() {
        let (dashboard, backend) = setup();
        dashboard.saved_contracts().await;
        dashboard.saved_contracts().await;
        assert_eq!(backend.requests_to("GET", "/saved-contracts"), 1);

        let mut events = dashboard.queries().subscribe();
        assert_ok!(dashboard.create_saved_contract("C9", None).await);
        assert_eq!(
            events.recv().await.unwrap(),
            QueryEvent::Invalidated(saved_contracts_key())
        );

        dashboard.saved_contracts().await;
        assert_eq!(backend.requests_to("GET", "/saved-contracts"), 2);
    }

    #[tokio::test]
    async fn test_set_default_marks_one_contract() {
        let (dashboard, _backend) = setup();
        assert_ok!(dashboard.create_saved_contract("C1", None).await);
        assert_ok!(dashboard.create_saved_contract("C2", None).await);

        assert_ok!(dashboard.set_default_saved_contract("C2").await);

        let list = dashboard.saved_contracts().await.data.unwrap();
        let defaults: Vec<&str> = list
            .iter()
            .filter(|c| c.is_default)
            .map(|c| c.contract_id.as_str())
            .collect();
        assert_eq!(defaults, vec!["C2"]);
    }

    #[tokio::test]
    async fn test_list_without_results_array_is_unexpected_format() {
        let (dashboard, backend) = setup();
        backend.malformed_list.store(true, Ordering::SeqCst);

        let state = dashboard.saved_contracts().await;
        assert_eq!(state.error, Some(QueryError::UnexpectedFormat));
        assert_eq!(state.error.unwrap().to_string(), "Unexpected response format");
        assert!(dashboard.stores().saved_contracts.get().is_empty());
    }

    #[tokio::test]
    async fn test_single_contract_query_is_disabled_without_id() {
        let (dashboard, backend) = setup();
        let state = dashboard.saved_contract("").await;
        assert!(state.data.is_none() && state.error.is_none());
        assert!(backend.requests.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_failed_mutation_returns_static_message() {
        let (dashboard, _backend) = setup();
        let err = assert_err!(dashboard.delete_saved_contract("missing").await);
        assert_eq!(err.to_string(), "Failed to delete saved contract");
    }

    // ============================================================================
    // Profile
    // ============================================================================

    #[tokio::test]
    async fn test_profile_fetch_fills_store_and_update_invalidates() {
        let (dashboard, backend) = setup();
        *backend.profile.lock().unwrap() = Some(json!({
            "id": "u1",
            "firstName": "Ada",
            "lastName": "Lovelace",
            "fullName": "Ada Lovelace",
            "username": "ada",
            "email": "ada@example.com"
        }));

        let profile = dashboard.user_profile().await.data.unwrap();
        assert_eq!(
            dashboard.stores().profile.get().map(|p| p.username),
            Some("ada".to_string())
        );

        let mut update = ProfileUpdate::from_profile(&profile);
        update.username = "countess".into();
        let updated = assert_ok!(dashboard.update_user_profile(&update).await);
        assert_eq!(updated.username, "countess");

        dashboard.user_profile().await;
        assert_eq!(backend.requests_to("GET", "/users/me"), 2);
        assert_eq!(
            dashboard.stores().profile.get().map(|p| p.username),
            Some("countess".to_string())
        );
    }

    // ============================================================================
    // Metrics and history
    // ============================================================================

    #[tokio::test]
    async fn test_service_failure_surfaces_static_message() {
        let (dashboard, _backend) = setup();
        let state = dashboard.recent_alerts(None, Limit::L10).await;
        assert_eq!(
            state.error.map(|e| e.to_string()).as_deref(),
            Some("Failed to fetch recent alerts")
        );
    }

    #[tokio::test]
    async fn test_scoped_metrics_hit_contract_path() {
        let (dashboard, backend) = setup();
        let state = dashboard.tx_volume(Some("C1"), TimeRange::Week1).await;
        assert_eq!(state.data.unwrap().total_volume, 1500);
        assert_eq!(backend.requests_to("GET", "/metrics/tx-volume/C1"), 1);
    }

    #[tokio::test]
    async fn test_overview_keeps_partial_results() {
        let (dashboard, _backend) = setup();
        let data = dashboard.overview(None, TimeRange::Week1).await;
        assert!(data.tx_volume.is_some());
        assert!(data.unique_users.is_none());

        let stats = views::overview_stats(&data, TimeRange::Week1);
        assert_eq!(stats[0].value, "1.5K");
        assert_eq!(stats[0].change, "+50.00%");
        assert!(stats[0].is_positive());
        assert_eq!(stats[1].value, "0");
        assert_eq!(stats[1].change, "-");

        let series = views::volume_series(data.tx_volume.as_ref().unwrap());
        assert_eq!(series[0].label, "Mar 9");
    }
}
