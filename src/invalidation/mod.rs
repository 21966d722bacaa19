//! Invalidation Module
//!
//! Maps content domains to the cache patterns they own and evicts them after
//! admin writes commit.

mod domain;
mod router;

pub use domain::Domain;
pub use router::{InvalidationCallback, InvalidationRouter};
