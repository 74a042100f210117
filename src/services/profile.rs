//! Profile service for the signed-in user

use super::collapse;
use crate::api::{ApiClient, ApiRequest, ProfileUpdate, UserProfile};
use crate::error::ServiceError;

#[derive(Clone)]
pub struct ProfileService {
    client: ApiClient,
}

impl ProfileService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn get_me(&self) -> Result<UserProfile, ServiceError> {
        const MSG: &str = "Failed to fetch user profile";
        self.client
            .json(ApiRequest::get("/users/me"))
            .await
            .map_err(|e| collapse(MSG, None, e))
    }

    pub async fn update_me(&self, update: &ProfileUpdate) -> Result<UserProfile, ServiceError> {
        const MSG: &str = "Failed to update user profile";
        let request = ApiRequest::patch("/users/me")
            .json(update)
            .map_err(|e| collapse(MSG, None, e))?;
        self.client
            .json(request)
            .await
            .map_err(|e| collapse(MSG, None, e))
    }
}
