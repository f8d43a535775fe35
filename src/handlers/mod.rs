//! HTTP handlers for resource CRUD and custom operations.

pub mod resource;
pub use resource::*;
