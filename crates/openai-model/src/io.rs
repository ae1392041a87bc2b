//! Byte sources and the server-sent events decoder on top of them.

mod sse;

#[cfg(test)]
use std::collections::VecDeque;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Response;

pub use sse::{Error as SseError, Sse};

/// Error returned when the underlying body fails mid-stream.
#[derive(Debug, PartialEq, Eq)]
pub struct ChunkError(pub String);

/// Something that yields the body of a response chunk by chunk.
#[async_trait]
pub trait ChunkSource: Send {
    /// Returns the next chunk, or `None` at the end of the body.
    async fn next_chunk(&mut self) -> Result<Option<Bytes>, ChunkError>;
}

#[async_trait]
impl ChunkSource for Response {
    async fn next_chunk(&mut self) -> Result<Option<Bytes>, ChunkError> {
        self.chunk()
            .await
            .map_err(|err| ChunkError(format!("{err}")))
    }
}

#[cfg(test)]
#[async_trait]
impl ChunkSource for VecDeque<Bytes> {
    async fn next_chunk(&mut self) -> Result<Option<Bytes>, ChunkError> {
        Ok(self.pop_front())
    }
}
