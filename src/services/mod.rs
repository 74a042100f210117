//! Domain services
//!
//! One service per backend resource area. Each method makes exactly one HTTP
//! call. On failure the underlying error is logged and a [`ServiceError`]
//! with a fixed per-endpoint message is returned in its place.

pub mod history;
pub mod metrics;
pub mod profile;
pub mod saved_contracts;

pub use history::HistoryService;
pub use metrics::MetricsService;
pub use profile::ProfileService;
pub use saved_contracts::SavedContractsService;

use tracing::error;

use crate::api::ApiClient;
use crate::error::{ClientError, ServiceError};

/// Append `/{contract_id}` when the call is contract-scoped
pub(crate) fn scoped_path(base: &str, scope: Option<&str>) -> String {
    match scope.filter(|id| !id.is_empty()) {
        Some(id) => format!("{base}/{id}"),
        None => base.to_string(),
    }
}

/// Log the real cause, keep only the static message
pub(crate) fn collapse(message: &'static str, scope: Option<&str>, err: ClientError) -> ServiceError {
    match scope {
        Some(id) => error!(contract_id = id, error = %err, "{message}"),
        None => error!(error = %err, "{message}"),
    }
    ServiceError::new(message)
}

/// All services over one shared client
#[derive(Clone)]
pub struct Services {
    pub metrics: MetricsService,
    pub history: HistoryService,
    pub saved_contracts: SavedContractsService,
    pub profile: ProfileService,
}

impl Services {
    pub fn new(client: ApiClient) -> Self {
        Self {
            metrics: MetricsService::new(client.clone()),
            history: HistoryService::new(client.clone()),
            saved_contracts: SavedContractsService::new(client.clone()),
            profile: ProfileService::new(client),
        }
    }
}
