use std::io::BufRead;

use head_plz::{
    const_headers::{CHUNKED, CONTENT_LENGTH, TRANSFER_ENCODING},
    response_head::ResponseHead,
};

use crate::{chunked::ChunkState, error::BodyError, limited::Limited};

// How the rest of the stream frames the response body.
#[cfg_attr(any(test, debug_assertions), derive(Debug, PartialEq, Eq))]
pub enum Framing {
    Chunked(ChunkState),
    Limited(Limited),
    Unbounded,
}

/* Selection, once the head is known:
 *      1. Transfer-Encoding equal to "chunked" wraps the stream in the
 *         chunk decoder.
 *      2. Else a Content-Length caps the stream at that many bytes.
 *      3. Else the raw stream runs unbounded and only closing the
 *         connection ends it.
 * Header lookups are byte-exact on the name.
 */
impl Framing {
    pub fn from_head(head: &ResponseHead) -> Result<Framing, BodyError> {
        if head.headers().first(TRANSFER_ENCODING) == Some(CHUNKED) {
            return Ok(Framing::Chunked(ChunkState::default()));
        }
        match head.headers().first(CONTENT_LENGTH) {
            Some(value) => {
                let limit: u64 = value
                    .parse()
                    .map_err(|_| BodyError::InvalidContentLength(value.to_string()))?;
                Ok(Framing::Limited(Limited::new(limit)))
            }
            None => Ok(Framing::Unbounded),
        }
    }

    pub fn read<R: BufRead>(
        &mut self,
        reader: &mut R,
        out: &mut [u8],
    ) -> Result<usize, BodyError> {
        match self {
            Framing::Chunked(state) => state.read(reader, out),
            Framing::Limited(limited) => limited.read(reader, out),
            Framing::Unbounded => Ok(reader.read(out)?),
        }
    }
}
