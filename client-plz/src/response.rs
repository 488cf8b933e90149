use std::cell::RefCell;
#[cfg(any(test, debug_assertions))]
use std::fmt;
use std::io::{self, Read};
use std::rc::Rc;

use head_plz::header_map::HeaderMap;
use stream_plz::{error::BodyError, framing::Framing};

use crate::conn::Connection;

// The connection slot shared between the client (for reuse) and the
// response body (as its closer). An emptied slot means the socket is
// gone.
pub type SharedConn = Rc<RefCell<Option<Connection>>>;

// Response envelope plus the lazy body stream.
pub struct Response {
    status: u16,
    reason: String,
    headers: HeaderMap,
    body: Body,
}

impl Response {
    pub(crate) fn new(status: u16, reason: String, headers: HeaderMap, body: Body) -> Self {
        Response {
            status,
            reason,
            headers,
            body,
        }
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

    // First value for this exact name.
    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers.first(key)
    }

    pub fn body_mut(&mut self) -> &mut Body {
        &mut self.body
    }

    pub fn into_body(self) -> Body {
        self.body
    }
}

#[cfg(any(test, debug_assertions))]
impl fmt::Debug for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Response")
            .field("status", &self.status)
            .field("reason", &self.reason)
            .field("headers", &self.headers)
            .finish_non_exhaustive()
    }
}

// Single pass, forward only body stream. It holds a handle on the
// connection it reads from; the client holds the other one.
pub struct Body {
    conn: SharedConn,
    framing: Framing,
}

impl Body {
    pub(crate) fn new(conn: SharedConn, framing: Framing) -> Self {
        Body { conn, framing }
    }

    // Releases the decoder state and the socket together. Taking self
    // by value makes a second close unrepresentable. Dropping a Body
    // without closing leaves the connection cached for reuse, which
    // only works out if the stream was fully drained.
    pub fn close(self) {
        self.conn.borrow_mut().take();
    }
}

impl Read for Body {
    fn read(&mut self, out: &mut [u8]) -> io::Result<usize> {
        let mut slot = self.conn.borrow_mut();
        let Some(connection) = slot.as_mut() else {
            // Closer already fired
            return Ok(0);
        };
        self.framing
            .read(connection.reader(), out)
            .map_err(|err| match err {
                BodyError::Io(e) => e,
                other => io::Error::new(io::ErrorKind::InvalidData, other),
            })
    }
}
