//! Blip Library
//!
//! Client for the Blip smart-contract monitoring backend: authenticated API
//! access, cached queries, session stores and terminal views.

pub mod api;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod format;
pub mod query;
pub mod services;
pub mod store;
pub mod types;
pub mod views;
