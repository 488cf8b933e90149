use std::io::BufRead;

use line_plz::LineError;
use tracing::debug;

use crate::{abnf::SP, error::HeadError, field::read_field, header_map::HeaderMap};

// Status line plus the full header block of one response.
#[cfg_attr(any(test, debug_assertions), derive(Debug, PartialEq, Eq))]
pub struct ResponseHead {
    status: u16,
    reason: String,
    headers: HeaderMap,
}

/* Steps:
 *      1. Split the first line on spaces into protocol, status and
 *         reason. The reason keeps any spaces of its own, so the split
 *         caps at three fields.
 *      2. Status must parse as a decimal integer.
 *      3. Field loop upto the empty line, repeated names appending to
 *         their entry in arrival order.
 * Either the whole head parses or an error comes back, never a
 * partial head.
 */
impl ResponseHead {
    pub fn read<R: BufRead>(reader: &mut R) -> Result<ResponseHead, HeadError> {
        let line = match line_plz::read_line(reader)? {
            Some(line) => line,
            None => return Err(HeadError::Line(LineError::Truncated)),
        };
        let text = str::from_utf8(&line).map_err(|_| {
            HeadError::MalformedStatusLine(String::from_utf8_lossy(&line).into_owned())
        })?;
        let mut fields = text.splitn(3, SP as char);
        let (Some(_protocol), Some(status), Some(reason)) =
            (fields.next(), fields.next(), fields.next())
        else {
            return Err(HeadError::MalformedStatusLine(text.to_string()));
        };
        let status: u16 = status
            .parse()
            .map_err(|_| HeadError::InvalidStatusCode(status.to_string()))?;
        let reason = reason.to_string();

        let mut headers = HeaderMap::new();
        while let Some((key, value)) = read_field(reader)? {
            headers.append(key, value);
        }
        debug!(status, header_count = headers.len(), "parsed response head");
        Ok(ResponseHead {
            status,
            reason,
            headers,
        })
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn into_parts(self) -> (u16, String, HeaderMap) {
        (self.status, self.reason, self.headers)
    }
}
