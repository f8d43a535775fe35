//! Safe SQL builder: identifiers from registered descriptors only, values as parameters.

mod builder;
pub mod params;
pub use builder::*;
pub use params::*;
