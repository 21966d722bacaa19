//! Background Tasks Module
//!
//! Contains background tasks that run periodically during server operation.
//!
//! # Tasks
//! - Reaper: removes expired cache entries and elapsed rate-limit records

mod reaper;

pub use reaper::{sweep, Reaper, SweepReport};
