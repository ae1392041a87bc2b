//! Core logic: the tool-calling conversation loop, the tool registry, and
//! the transcript it produces.

#![deny(missing_docs)]

#[macro_use]
extern crate tracing;

mod agent;
pub mod conversation;
mod error;
mod model_client;
pub mod tool;

pub use agent::{Agent, AgentBuilder, DEFAULT_MAX_TURNS, RunOutcome, StopReason};
pub use error::Error;
