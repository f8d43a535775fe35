//! Field descriptor model: kinds, values, resource types and their registry.

mod field;
mod registry;
mod resource;

pub use field::*;
pub use registry::*;
pub use resource::*;
