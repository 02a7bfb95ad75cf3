//! SDK resource modules
//!
//! This module contains resource-specific clients for interacting with
//! different API endpoints.

pub mod health;
pub mod queries;
pub mod topics;

pub use health::HealthClient;
pub use queries::QueriesClient;
pub use topics::TopicsClient;
