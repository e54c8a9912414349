//! Challenge API collaborators
//!
//! The editor persists through the `ChallengeApi` trait. This crate
//! provides the HTTP implementation used against a real backend and an
//! in-memory implementation for offline runs and tests.

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod memory;

pub use client::{ChallengeApi, ChallengeRecord};
pub use config::ApiConfig;
pub use error::{ApiError, Result};
pub use http::HttpChallengeApi;
pub use memory::{ApiCall, ApiOperation, MemoryChallengeApi};
