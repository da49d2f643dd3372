//! HTTP request handlers.
//!
//! Handlers are thin wrappers that delegate to the core `GatewayService`.

pub mod health;
pub mod query;
