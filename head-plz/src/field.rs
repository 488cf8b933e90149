use std::io::{BufRead, ErrorKind};

use line_plz::{LineError, read_line};

use crate::{
    abnf::{COLON, SP},
    error::HeadError,
};

// Cap on a single field value, folded continuations included.
pub const MAX_VALUE: usize = 1024;

/* Steps:
 *      1. Read one line. A clean end of stream before any field is
 *         truncation, an empty line ends the header block.
 *      2. Split at the first colon. No colon, a key containing a
 *         space, or bytes that are not utf8 reject the line.
 *      3. Value is the remainder with leading spaces trimmed.
 *      4. While the next unconsumed byte is a space, eat the
 *         indentation, read the rest of that line and fold it into the
 *         value joined by a single space. A non indented line is left
 *         for the next call.
 */
pub fn read_field<R: BufRead>(reader: &mut R) -> Result<Option<(String, String)>, HeadError> {
    let line = match read_line(reader)? {
        Some(line) => line,
        None => return Err(HeadError::Line(LineError::Truncated)),
    };
    if line.is_empty() {
        // 1. End of the header block
        return Ok(None);
    }
    let Ok(text) = str::from_utf8(&line) else {
        return Err(HeadError::MalformedFieldLine(
            String::from_utf8_lossy(&line).into_owned(),
        ));
    };
    let Some((key, rest)) = text.split_once(COLON as char) else {
        return Err(HeadError::MalformedFieldLine(text.to_string()));
    };
    if key.contains(' ') {
        return Err(HeadError::MalformedFieldLine(text.to_string()));
    }
    let key = key.to_string();
    let mut value = rest.trim_start_matches(' ').to_string();

    // 4. Continuation lines
    while next_is_indented(reader)? {
        eat_spaces(reader)?;
        let folded = match read_line(reader).map_err(HeadError::Line)? {
            Some(folded) => folded,
            None => return Err(HeadError::Line(LineError::Truncated)),
        };
        let Ok(folded_text) = str::from_utf8(&folded) else {
            return Err(HeadError::MalformedFieldLine(
                String::from_utf8_lossy(&folded).into_owned(),
            ));
        };
        value.push(' ');
        value.push_str(folded_text);
        if value.len() >= MAX_VALUE {
            return Err(HeadError::ValueTooLong(key));
        }
    }
    Ok(Some((key, value)))
}

fn next_is_indented<R: BufRead>(reader: &mut R) -> Result<bool, HeadError> {
    Ok(peek(reader).map_err(HeadError::Line)? == Some(SP))
}

// Leading indentation is not part of the folded value.
fn eat_spaces<R: BufRead>(reader: &mut R) -> Result<(), HeadError> {
    loop {
        match peek(reader).map_err(HeadError::Line)? {
            Some(SP) => reader.consume(1),
            Some(_) => return Ok(()),
            None => return Err(HeadError::Line(LineError::Truncated)),
        }
    }
}

fn peek<R: BufRead>(reader: &mut R) -> Result<Option<u8>, LineError> {
    loop {
        match reader.fill_buf() {
            Ok(buf) => return Ok(buf.first().copied()),
            Err(ref e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(LineError::Io(e)),
        }
    }
}
