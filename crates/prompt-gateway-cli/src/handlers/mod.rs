//! Subcommand handlers.

pub mod check;
pub mod keygen;
pub mod serve;
