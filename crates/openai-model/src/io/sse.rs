use super::{ChunkError, ChunkSource};

#[derive(Debug, PartialEq, Eq)]
pub enum Error {
    Chunk(ChunkError),
    InvalidPayload,
}

/// A type for reading server-sent events from a chunk stream.
///
/// Only the `data` field is surfaced; multi-line data is joined with line
/// feeds, comment lines (like the keep-alives OpenRouter sends while the
/// model is queued) and other fields are skipped. CRLF line endings are
/// accepted, bare CR line endings are not.
pub struct Sse {
    buf: Vec<u8>,
    source: Box<dyn ChunkSource>,
    exhausted: bool,
}

impl Sse {
    #[inline]
    pub fn new<S: ChunkSource + 'static>(source: S) -> Self {
        Self {
            buf: Vec::new(),
            source: Box::new(source),
            exhausted: false,
        }
    }

    /// Returns the data of the next event, or `None` when the stream has
    /// ended. A trailing event without its terminating blank line is
    /// dropped.
    pub async fn next_event(&mut self) -> Result<Option<String>, Error> {
        loop {
            if let Some(data) = self.try_parse_event()? {
                return Ok(Some(data));
            }
            if self.exhausted {
                return Ok(None);
            }
            match self.source.next_chunk().await.map_err(Error::Chunk)? {
                Some(bytes) => self
                    .buf
                    .extend(bytes.iter().copied().filter(|b| *b != b'\r')),
                None => self.exhausted = true,
            }
        }
    }

    fn try_parse_event(&mut self) -> Result<Option<String>, Error> {
        loop {
            let Some(end) = self.buf.windows(2).position(|w| w == b"\n\n")
            else {
                return Ok(None);
            };
            let block: Vec<u8> = self.buf.drain(..end + 2).collect();
            let Ok(block) = str::from_utf8(&block[..end]) else {
                return Err(Error::InvalidPayload);
            };

            let mut data: Option<Vec<&str>> = None;
            for line in block.split('\n') {
                if line.is_empty() || line.starts_with(':') {
                    continue;
                }
                let (field, value) = match line.split_once(':') {
                    Some((field, value)) => {
                        (field, value.strip_prefix(' ').unwrap_or(value))
                    }
                    None => (line, ""),
                };
                if field == "data" {
                    data.get_or_insert_default().push(value);
                }
            }

            // Blocks with only comments or other fields carry nothing for
            // us, keep looking.
            if let Some(data) = data {
                return Ok(Some(data.join("\n")));
            }
        }
    }
}
