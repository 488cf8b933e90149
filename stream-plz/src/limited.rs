use std::io::Read;

use crate::error::BodyError;

// Caps a stream at the declared content length. Reads never return
// more bytes in total than the limit, however much more the underlying
// stream has buffered.
#[cfg_attr(any(test, debug_assertions), derive(Debug, PartialEq, Eq))]
pub struct Limited {
    remaining: u64,
}

impl Limited {
    pub fn new(limit: u64) -> Self {
        Limited { remaining: limit }
    }

    pub fn remaining(&self) -> u64 {
        self.remaining
    }

    pub fn read<R: Read>(&mut self, reader: &mut R, out: &mut [u8]) -> Result<usize, BodyError> {
        if self.remaining == 0 {
            return Ok(0);
        }
        let cap = self.remaining.min(out.len() as u64) as usize;
        let read = reader.read(&mut out[..cap])?;
        self.remaining -= read as u64;
        Ok(read)
    }
}
