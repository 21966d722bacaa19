//! Station Cache - response caching and rate limiting for a radio station CMS
//!
//! Serves the mobile API from an in-process TTL cache with content-hash
//! ETags, evicts related reads when admin writes land, and rate-limits the
//! admin endpoints that hit remote radio streams.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod invalidation;
pub mod models;
pub mod ratelimit;
pub mod services;
pub mod tasks;

pub use api::{create_router, AppState};
pub use config::Config;
pub use tasks::Reaper;
