pub mod chunked;
pub mod error;
pub mod framing;
pub mod limited;
