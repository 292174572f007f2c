/// REST backend access
///
/// - `endpoints.rs` - logical endpoint names resolved to URLs
/// - `client.rs` - the `Backend` trait and its reqwest implementation
/// - `error.rs` - error taxonomy and operator-facing messages

pub mod client;
pub mod endpoints;
pub mod error;

#[cfg(test)]
pub mod fake;

pub use client::{Backend, HttpBackend, MarkRequest, RegisterRequest};
pub use error::ApiError;
