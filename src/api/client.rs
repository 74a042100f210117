//! Authenticated API client
//!
//! Wraps a [`Transport`] with the two auth steps every request goes through:
//! - outbound: attach the bearer token, refreshing first when none is held
//! - inbound: on 401, refresh once and retry the same request once
//!
//! Concurrent requests that all hit 401 each run their own refresh.

use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, warn};

use super::token::{SessionProvider, TokenStore};
use super::transport::{ApiRequest, ApiResponse, ReqwestTransport, Transport};
use crate::error::ClientError;

const UNAUTHORIZED: u16 = 401;

/// Shared, cheaply clonable client for the Blip backend
#[derive(Clone)]
pub struct ApiClient {
    transport: Arc<dyn Transport>,
    tokens: Arc<TokenStore>,
}

impl ApiClient {
    pub fn new(transport: Arc<dyn Transport>, tokens: Arc<TokenStore>) -> Self {
        Self { transport, tokens }
    }

    /// Client on the reqwest transport
    pub fn connect(
        base_url: &str,
        timeout: Duration,
        session: Arc<dyn SessionProvider>,
    ) -> Result<Self, ClientError> {
        let transport = ReqwestTransport::new(base_url, timeout)?;
        Ok(Self::new(
            Arc::new(transport),
            Arc::new(TokenStore::new(session)),
        ))
    }

    pub fn tokens(&self) -> &Arc<TokenStore> {
        &self.tokens
    }

    /// Send a request through the auth steps and return the successful response
    pub async fn execute(&self, request: ApiRequest) -> Result<ApiResponse, ClientError> {
        let token = match self.tokens.token().await {
            Some(token) => Some(token),
            None => self.tokens.refresh().await,
        };

        let response = self.transport.send(request.clone(), token).await?;
        if response.status != UNAUTHORIZED {
            return Self::check_status(response);
        }

        warn!(path = %request.path, "401 received; refreshing token and retrying once");
        match self.tokens.refresh().await {
            Some(fresh) => {
                let retried = self.transport.send(request, Some(fresh)).await?;
                Self::check_status(retried)
            }
            None => {
                error!(path = %request.path, "Token refresh failed");
                Err(ClientError::Unauthorized)
            }
        }
    }

    /// Execute and decode the JSON body
    pub async fn json<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T, ClientError> {
        let response = self.execute(request).await?;
        response.json()
    }

    /// Execute and discard the body
    pub async fn send(&self, request: ApiRequest) -> Result<(), ClientError> {
        self.execute(request).await.map(|_| ())
    }

    fn check_status(response: ApiResponse) -> Result<ApiResponse, ClientError> {
        if response.is_success() {
            debug!(status = response.status, "request succeeded");
            return Ok(response);
        }
        if response.status == UNAUTHORIZED {
            return Err(ClientError::Unauthorized);
        }
        Err(ClientError::Status {
            status: response.status,
            body: response.text(),
        })
    }
}
