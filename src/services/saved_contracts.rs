//! Saved contracts service
//!
//! The only client-authored mutations in the system live here.

use super::collapse;
use crate::api::{
    ApiClient, ApiRequest, NewSavedContract, SavedContract, SavedContractUpdate,
};
use crate::error::ServiceError;

#[derive(Clone)]
pub struct SavedContractsService {
    client: ApiClient,
}

impl SavedContractsService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// `POST /saved-contracts`
    pub async fn create(&self, new: &NewSavedContract) -> Result<SavedContract, ServiceError> {
        const MSG: &str = "Failed to create saved contract";
        let request = ApiRequest::post("/saved-contracts")
            .json(new)
            .map_err(|e| collapse(MSG, Some(&new.contract_id), e))?;
        self.client
            .json(request)
            .await
            .map_err(|e| collapse(MSG, Some(&new.contract_id), e))
    }

    /// `GET /saved-contracts`
    ///
    /// Returned as raw JSON; the query layer checks the envelope shape.
    pub async fn get_all(&self) -> Result<serde_json::Value, ServiceError> {
        self.client
            .json(ApiRequest::get("/saved-contracts"))
            .await
            .map_err(|e| collapse("Failed to fetch saved contracts", None, e))
    }

    /// `GET /saved-contracts/:id`
    pub async fn get_by_id(&self, id: &str) -> Result<SavedContract, ServiceError> {
        self.client
            .json(ApiRequest::get(format!("/saved-contracts/{id}")))
            .await
            .map_err(|e| collapse("Failed to fetch saved contract", Some(id), e))
    }

    /// `PATCH /saved-contracts/:id`
    pub async fn update(
        &self,
        id: &str,
        update: &SavedContractUpdate,
    ) -> Result<SavedContract, ServiceError> {
        const MSG: &str = "Failed to update saved contract";
        let request = ApiRequest::patch(format!("/saved-contracts/{id}"))
            .json(update)
            .map_err(|e| collapse(MSG, Some(id), e))?;
        self.client
            .json(request)
            .await
            .map_err(|e| collapse(MSG, Some(id), e))
    }

    /// `DELETE /saved-contracts/:id`
    pub async fn delete(&self, id: &str) -> Result<(), ServiceError> {
        self.client
            .send(ApiRequest::delete(format!("/saved-contracts/{id}")))
            .await
            .map_err(|e| collapse("Failed to delete saved contract", Some(id), e))
    }

    /// `POST /saved-contracts/:id/set-default` with an empty object body
    pub async fn set_default(&self, id: &str) -> Result<(), ServiceError> {
        const MSG: &str = "Failed to set default saved contract";
        let request = ApiRequest::post(format!("/saved-contracts/{id}/set-default"))
            .json(&serde_json::json!({}))
            .map_err(|e| collapse(MSG, Some(id), e))?;
        self.client
            .send(request)
            .await
            .map_err(|e| collapse(MSG, Some(id), e))
    }
}
