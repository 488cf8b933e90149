use std::io::{BufRead, ErrorKind};

use bytes::BytesMut;
use thiserror::Error;

pub const CR: u8 = b'\r';
pub const HTAB: u8 = b'\t';
pub const LF: u8 = b'\n';
pub const SP: u8 = b' ';

// Hard cap on a single protocol line, terminator included.
pub const MAX_LINE: usize = 1024;

#[derive(Debug, Error)]
pub enum LineError {
    // Stream ended after at least one byte but before the terminator
    #[error("line truncated")]
    Truncated,
    #[error("line too long")]
    TooLong,
    #[error("read| {0}")]
    Io(#[from] std::io::Error),
}

/* Steps:
 *      1. Pull whatever the underlying reader has buffered.
 *      2. Zero bytes before any data is a clean end of stream.
 *      3. Append upto and including LF, rejecting the line once the
 *         accumulated length reaches MAX_LINE.
 *      4. Strip trailing CR / LF / SP / HTAB.
 */
pub fn read_line<R: BufRead>(reader: &mut R) -> Result<Option<BytesMut>, LineError> {
    let mut line = BytesMut::new();
    loop {
        // Invariant: line.len() < MAX_LINE here
        let space = MAX_LINE - line.len();
        let (found_lf, used) = {
            let available = match reader.fill_buf() {
                Ok(buf) => buf,
                Err(ref e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(LineError::Io(e)),
            };
            if available.is_empty() {
                if line.is_empty() {
                    // 2. Clean end of stream
                    return Ok(None);
                }
                return Err(LineError::Truncated);
            }
            match available.iter().position(|&b| b == LF) {
                Some(index) if index < space => {
                    line.extend_from_slice(&available[..=index]);
                    (true, index + 1)
                }
                _ => {
                    let take = available.len().min(space);
                    line.extend_from_slice(&available[..take]);
                    (false, take)
                }
            }
        };
        reader.consume(used);
        if line.len() >= MAX_LINE {
            return Err(LineError::TooLong);
        }
        if found_lf {
            break;
        }
    }
    trim_line_end(&mut line);
    Ok(Some(line))
}

fn trim_line_end(line: &mut BytesMut) {
    let mut end = line.len();
    while end > 0 && matches!(line[end - 1], CR | LF | SP | HTAB) {
        end -= 1;
    }
    line.truncate(end);
}

#[cfg(test)]
mod tests {
    use std::io::BufReader;

    use super::*;

    #[test]
    fn test_read_line_basic() {
        let mut reader = BufReader::new(&b"GET / HTTP/1.1\r\nHost: a\r\n"[..]);
        let line = read_line(&mut reader).unwrap().unwrap();
        assert_eq!(line, "GET / HTTP/1.1");
        let line = read_line(&mut reader).unwrap().unwrap();
        assert_eq!(line, "Host: a");
    }

    #[test]
    fn test_read_line_lf_only() {
        let mut reader = BufReader::new(&b"value\n"[..]);
        let line = read_line(&mut reader).unwrap().unwrap();
        assert_eq!(line, "value");
    }

    #[test]
    fn test_read_line_strips_trailing_whitespace() {
        let mut reader = BufReader::new(&b"value \t \r\n"[..]);
        let line = read_line(&mut reader).unwrap().unwrap();
        assert_eq!(line, "value");
    }

    #[test]
    fn test_read_line_empty_line() {
        let mut reader = BufReader::new(&b"\r\nrest"[..]);
        let line = read_line(&mut reader).unwrap().unwrap();
        assert_eq!(line, "");
    }

    #[test]
    fn test_read_line_clean_eof() {
        let mut reader = BufReader::new(&b""[..]);
        assert!(read_line(&mut reader).unwrap().is_none());
    }

    #[test]
    fn test_read_line_truncated() {
        let mut reader = BufReader::new(&b"no terminator"[..]);
        let err = read_line(&mut reader).unwrap_err();
        assert!(matches!(err, LineError::Truncated));
    }

    #[test]
    fn test_read_line_too_long() {
        let mut input = vec![b'a'; MAX_LINE + 6];
        input.extend_from_slice(b"\r\n");
        let mut reader = BufReader::new(input.as_slice());
        let err = read_line(&mut reader).unwrap_err();
        assert!(matches!(err, LineError::TooLong));
    }

    // Terminator bytes count against the cap.
    #[test]
    fn test_read_line_too_long_at_boundary() {
        let mut input = vec![b'a'; MAX_LINE - 2];
        input.extend_from_slice(b"\r\n");
        let mut reader = BufReader::new(input.as_slice());
        let err = read_line(&mut reader).unwrap_err();
        assert!(matches!(err, LineError::TooLong));
    }

    #[test]
    fn test_read_line_just_under_cap() {
        let mut input = vec![b'a'; MAX_LINE - 3];
        input.extend_from_slice(b"\r\n");
        let mut reader = BufReader::new(input.as_slice());
        let line = read_line(&mut reader).unwrap().unwrap();
        assert_eq!(line.len(), MAX_LINE - 3);
    }

    // Line split across several refills of a tiny buffer.
    #[test]
    fn test_read_line_across_fills() {
        let mut reader = BufReader::with_capacity(4, &b"a long enough line\r\nnext\r\n"[..]);
        let line = read_line(&mut reader).unwrap().unwrap();
        assert_eq!(line, "a long enough line");
        let line = read_line(&mut reader).unwrap().unwrap();
        assert_eq!(line, "next");
        assert!(read_line(&mut reader).unwrap().is_none());
    }
}
