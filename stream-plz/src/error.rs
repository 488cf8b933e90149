use line_plz::LineError;
use thiserror::Error;

// Cloneable so a latched failure can replay on every later read.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ChunkError {
    #[error("malformed chunked encoding")]
    Malformed,
    #[error("chunked body truncated")]
    Truncated,
    #[error("chunk line too long")]
    TooLong,
    #[error("chunk read| {0:?}")]
    Io(std::io::ErrorKind),
}

impl From<LineError> for ChunkError {
    fn from(err: LineError) -> ChunkError {
        match err {
            LineError::Truncated => ChunkError::Truncated,
            LineError::TooLong => ChunkError::TooLong,
            LineError::Io(e) => ChunkError::Io(e.kind()),
        }
    }
}

#[derive(Debug, Error)]
pub enum BodyError {
    #[error("chunk| {0}")]
    Chunk(#[from] ChunkError),
    #[error("invalid content length| {0}")]
    InvalidContentLength(String),
    #[error("read| {0}")]
    Io(#[from] std::io::Error),
}
