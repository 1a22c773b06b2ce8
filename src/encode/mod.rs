//! Feature encoding: one-hot encode a request and align it to the training schema.

pub mod encoder;
pub mod schema;

pub use encoder::*;
pub use schema::*;
