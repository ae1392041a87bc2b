//! Provider-neutral types for talking to chat-completion models.
//!
//! The agent loop only ever sees the types in this crate. Concrete
//! providers translate them into their own wire format, and test
//! providers can script responses without touching the network.
//!
//! Types in this crate don't define any behavior, instead they are the
//! constraints that the implementors should adhere to.

#![deny(missing_docs)]

mod error;
mod provider;
mod request;
mod response;

pub use error::*;
pub use provider::*;
pub use request::*;
pub use response::*;
