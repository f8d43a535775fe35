pub mod token;
pub use token::{RequestContext, TOKEN_HEADER};
