//! Blip backend API
//!
//! Authenticated HTTP access to the monitoring backend:
//! - Bearer token store refreshed from the auth session
//! - Client with refresh-on-missing-token and a single retry on 401
//! - Wire types for metrics, history, saved contracts and profile

pub mod client;
pub mod token;
pub mod transport;
pub mod types;

pub use client::*;
pub use token::*;
pub use transport::*;
pub use types::*;
