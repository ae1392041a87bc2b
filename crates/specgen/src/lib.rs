//! Drives a tool-calling model to write formal specifications and
//! spec-guided tests for benchmark problems.
//!
//! The crate ships a CLI for the terminal, and the same pieces can be used
//! as a library: load an [`config::AgentConfig`], build a [`Session`] from
//! it, and run prompts through it, or hand a [`workflow::SessionFactory`]
//! to the workflow passes.

#![deny(missing_docs)]

#[allow(unused_imports)]
#[macro_use]
extern crate tracing;

pub mod config;
pub mod problems;
mod session;
pub mod tools;
pub mod workflow;

pub use session::{Session, SessionBuilder};

/// Re-exports of [`specgen_core`] crate.
pub mod core {
    pub use specgen_core::*;
}
