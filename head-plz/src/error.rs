use line_plz::LineError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HeadError {
    #[error("line| {0}")]
    Line(#[from] LineError),
    // Carries the raw line text for diagnostics
    #[error("malformed field line| {0}")]
    MalformedFieldLine(String),
    #[error("value too long for key| {0}")]
    ValueTooLong(String),
    #[error("malformed status line| {0}")]
    MalformedStatusLine(String),
    #[error("invalid status code| {0}")]
    InvalidStatusCode(String),
}
