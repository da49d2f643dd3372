//! Port definitions (trait abstractions) for external systems.
//!
//! Ports define the interfaces that the core domain expects from infrastructure.
//! They contain no implementation details and use only domain types.

pub mod backend;

pub use backend::{BackendError, InferenceBackend, ModelTag};

#[cfg(test)]
pub use backend::MockInferenceBackend;
