//! Conditional choice HTTP service library.
//!
//! Exposes the building blocks (config, form store, state, error handling,
//! routes) so integration tests and the binary entrypoint can both use them.

pub mod config;
pub mod error;
pub mod handlers;
pub mod response;
pub mod routes;
pub mod state;
pub mod store;
