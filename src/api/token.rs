//! Bearer token store
//!
//! Holds the current token in memory only. Tokens come from a
//! [`SessionProvider`]; a failed refresh clears the token and the next
//! request starts the sequence again.
//!
//! Lifecycle: `Absent -> Refreshing -> Present`, and on a 401
//! `Present -> Refreshing -> Present | Absent`.

use anyhow::Result;
use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, error, warn};

/// Source of fresh tokens (the auth provider's session)
#[async_trait]
pub trait SessionProvider: Send + Sync {
    /// `Ok(None)` means there is no active session
    async fn fetch_token(&self) -> Result<Option<String>>;
}

/// Session backed by a fixed token from configuration
#[derive(Debug, Clone, Default)]
pub struct StaticSession {
    token: Option<String>,
}

impl StaticSession {
    pub fn new(token: Option<String>) -> Self {
        Self {
            token: token.filter(|t| !t.trim().is_empty()),
        }
    }
}

#[async_trait]
impl SessionProvider for StaticSession {
    async fn fetch_token(&self) -> Result<Option<String>> {
        Ok(self.token.clone())
    }
}

/// Session that re-reads an environment variable on every refresh,
/// so a token rotated by an outer process is picked up after a 401.
#[derive(Debug, Clone)]
pub struct EnvSession {
    var: String,
}

impl EnvSession {
    pub fn new(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }
}

#[async_trait]
impl SessionProvider for EnvSession {
    async fn fetch_token(&self) -> Result<Option<String>> {
        Ok(std::env::var(&self.var)
            .ok()
            .filter(|v| !v.trim().is_empty()))
    }
}

/// Observable token lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenState {
    Absent,
    Refreshing,
    Present,
}

/// In-memory bearer token plus its refresh procedure
pub struct TokenStore {
    token: RwLock<Option<String>>,
    session: Arc<dyn SessionProvider>,
    /// Refreshes currently awaiting the session
    in_flight: AtomicUsize,
    refresh_count: AtomicU64,
}

impl TokenStore {
    pub fn new(session: Arc<dyn SessionProvider>) -> Self {
        Self {
            token: RwLock::new(None),
            session,
            in_flight: AtomicUsize::new(0),
            refresh_count: AtomicU64::new(0),
        }
    }

    pub async fn token(&self) -> Option<String> {
        self.token.read().await.clone()
    }

    pub async fn set_token(&self, token: Option<String>) {
        *self.token.write().await = token;
    }

    pub async fn clear(&self) {
        self.set_token(None).await;
    }

    pub async fn state(&self) -> TokenState {
        if self.in_flight.load(Ordering::Acquire) > 0 {
            return TokenState::Refreshing;
        }
        match self.token.read().await.as_ref() {
            Some(_) => TokenState::Present,
            None => TokenState::Absent,
        }
    }

    /// Number of refresh attempts made so far
    pub fn refresh_count(&self) -> u64 {
        self.refresh_count.load(Ordering::Relaxed)
    }

    /// Ask the session for a fresh token.
    ///
    /// Stores and returns it on success. No session or a provider error
    /// clears the stored token and returns `None`; neither is fatal.
    pub async fn refresh(&self) -> Option<String> {
        self.in_flight.fetch_add(1, Ordering::AcqRel);
        self.refresh_count.fetch_add(1, Ordering::Relaxed);

        let fresh = match self.session.fetch_token().await {
            Ok(Some(token)) => {
                debug!("session token refreshed");
                Some(token)
            }
            Ok(None) => {
                warn!("no active session; continuing without bearer token");
                None
            }
            Err(e) => {
                error!("Error refreshing token: {e:#}");
                None
            }
        };

        *self.token.write().await = fresh.clone();
        self.in_flight.fetch_sub(1, Ordering::AcqRel);
        fresh
    }
}
