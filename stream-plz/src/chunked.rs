use std::io::{BufRead, ErrorKind};

use line_plz::read_line;
use tracing::error;

use crate::error::{BodyError, ChunkError};

// Decoder state for Transfer-Encoding: chunked. Terminal states latch:
// once Done or Failed is recorded every later read replays it, a
// partial chunk is never resumed. InChunk with zero remaining means
// the data is out but the chunk's CRLF terminator is still owed.
#[cfg_attr(any(test, debug_assertions), derive(Debug, PartialEq, Eq))]
#[derive(Default)]
pub enum ChunkState {
    #[default]
    AwaitingChunk,
    InChunk {
        remaining: u64,
    },
    Done,
    Failed(ChunkError),
}

/* Steps:
 *      1. Terminal states replay forever.
 *      2. Between chunks, read "size CRLF" and parse the size as hex.
 *         A zero size eats trailer lines upto the blank one and
 *         finishes the body as a success.
 *      3. Cap the read at the bytes left in the chunk and delegate to
 *         the underlying stream. Bytes already handed out are never
 *         taken back, so the terminator check waits for the next call.
 *      4. A drained chunk must be followed by exactly CRLF.
 */
impl ChunkState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, ChunkState::Done | ChunkState::Failed(_))
    }

    pub fn read<R: BufRead>(
        &mut self,
        reader: &mut R,
        out: &mut [u8],
    ) -> Result<usize, BodyError> {
        loop {
            match self {
                // 1. Latched
                ChunkState::Done => return Ok(0),
                ChunkState::Failed(err) => return Err(BodyError::Chunk(err.clone())),
                ChunkState::AwaitingChunk => match next_size(reader) {
                    Ok(0) => match drain_trailers(reader) {
                        Ok(()) => *self = ChunkState::Done,
                        Err(err) => return Err(self.latch(err)),
                    },
                    Ok(size) => *self = ChunkState::InChunk { remaining: size },
                    Err(err) => return Err(self.latch(err)),
                },
                ChunkState::InChunk { remaining } => {
                    if *remaining == 0 {
                        // 4. The owed terminator
                        match chunk_terminator(reader) {
                            Ok(()) => *self = ChunkState::AwaitingChunk,
                            Err(err) => return Err(self.latch(err)),
                        }
                        continue;
                    }
                    if out.is_empty() {
                        return Ok(0);
                    }
                    // 3. Never read past the chunk boundary
                    let cap = (*remaining).min(out.len() as u64) as usize;
                    let read = match reader.read(&mut out[..cap]) {
                        Ok(0) => return Err(self.latch(ChunkError::Truncated)),
                        Ok(read) => read,
                        Err(e) => return Err(self.latch(ChunkError::Io(e.kind()))),
                    };
                    *remaining -= read as u64;
                    return Ok(read);
                }
            }
        }
    }

    fn latch(&mut self, err: ChunkError) -> BodyError {
        error!(%err, "chunk decode failed");
        *self = ChunkState::Failed(err.clone());
        BodyError::Chunk(err)
    }
}

fn next_size<R: BufRead>(reader: &mut R) -> Result<u64, ChunkError> {
    let line = match read_line(reader) {
        Ok(Some(line)) => line,
        Ok(None) => return Err(ChunkError::Truncated),
        Err(err) => return Err(err.into()),
    };
    let text = str::from_utf8(&line).map_err(|_| ChunkError::Malformed)?;
    u64::from_str_radix(text, 16).map_err(|_| ChunkError::Malformed)
}

// Trailer lines after the zero chunk are consumed, never surfaced.
fn drain_trailers<R: BufRead>(reader: &mut R) -> Result<(), ChunkError> {
    loop {
        match read_line(reader) {
            Ok(Some(line)) if line.is_empty() => return Ok(()),
            Ok(Some(_)) => (),
            Ok(None) => return Err(ChunkError::Truncated),
            Err(err) => return Err(err.into()),
        }
    }
}

// 4. Exactly CR LF; a mismatch or short read is a framing error.
fn chunk_terminator<R: BufRead>(reader: &mut R) -> Result<(), ChunkError> {
    let mut crlf = [0u8; 2];
    match reader.read_exact(&mut crlf) {
        Ok(()) => (),
        Err(ref e) if e.kind() == ErrorKind::UnexpectedEof => return Err(ChunkError::Malformed),
        Err(e) => return Err(ChunkError::Io(e.kind())),
    }
    if crlf != *b"\r\n" {
        return Err(ChunkError::Malformed);
    }
    Ok(())
}
