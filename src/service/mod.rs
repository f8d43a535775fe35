//! Generic resource API built on the query-by-example engine.

mod crud;
pub mod example;
pub mod identity;
pub use crud::ResourceApi;
pub use identity::{allocate_free_identity, IdentityCandidates, TimeCandidates, DEFAULT_MAX_ATTEMPTS};
