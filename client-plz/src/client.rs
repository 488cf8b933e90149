use std::cell::RefCell;
use std::io;
use std::rc::Rc;
use std::sync::Arc;

use bytes::Bytes;
use head_plz::{
    const_headers::{HOST, USER_AGENT},
    methods::Method,
    response_head::ResponseHead,
};
use stream_plz::framing::Framing;
use tracing::{debug, error};
use url::Url;

use crate::{
    conn::{Connection, default_tls_config},
    error::ClientError,
    request::Request,
    response::{Body, Response, SharedConn},
};

pub const DEFAULT_USER_AGENT: &str = concat!("client-plz/", env!("CARGO_PKG_VERSION"));

// One reusable connection per client. Blocking I/O, no internal locks;
// callers serialize use of a client themselves. Reuse keys on the
// remembered host alone and ignores the scheme, so flipping between
// http and https on one host name keeps the first transport.
pub struct Client {
    conn: Option<SharedConn>,
    last_host: Option<String>,
    tls: Option<Arc<rustls::ClientConfig>>,
    dump_wire: bool,
}

impl Client {
    pub fn new() -> Client {
        Client {
            conn: None,
            last_host: None,
            tls: None,
            dump_wire: false,
        }
    }

    // Log every serialized request before it hits the wire.
    pub fn with_wire_dump(mut self, enabled: bool) -> Client {
        self.dump_wire = enabled;
        self
    }

    /* Steps:
     *      1. Parse the target and fill in Host / User-Agent when the
     *         caller left them out.
     *      2. Reuse the live connection when the remembered host
     *         matches, otherwise dial fresh. https gets a verified
     *         handshake against the host without its port. Dial and
     *         handshake failures return without retry.
     *      3. Write the request. A write failure leaves the connection
     *         in place but its further usability is undefined.
     *      4. Read the envelope and pick the body framing. Failures
     *         here drop the connection, the stream position is
     *         unknown.
     *      5. Hand the connection to the response body as its closer
     *         and keep a handle for reuse.
     */
    pub fn request(
        &mut self,
        raw_url: &str,
        method: Method,
        headers: Vec<(String, String)>,
        body: impl Into<Bytes>,
    ) -> Result<Response, ClientError> {
        let url = Url::parse(raw_url)?;
        let host = url
            .host_str()
            .ok_or_else(|| ClientError::MissingHost(raw_url.to_string()))?
            .to_string();
        // The remembered host keeps an explicit port
        let target = match url.port() {
            Some(port) => format!("{host}:{port}"),
            None => host.clone(),
        };

        let mut request = Request::new(url, method, headers, body.into());
        if request.header(HOST).is_none() {
            request.push_header(HOST, target.clone());
        }
        if request.header(USER_AGENT).is_none() {
            request.push_header(USER_AGENT, DEFAULT_USER_AGENT.to_string());
        }

        // 2. Reuse or redial
        let shared = match self.conn.take() {
            Some(existing)
                if existing.borrow().is_some()
                    && self.last_host.as_deref() == Some(target.as_str()) =>
            {
                debug!(host = %target, "reusing connection");
                existing
            }
            _ => {
                let scheme = request.url.scheme().to_string();
                let port = request
                    .url
                    .port_or_known_default()
                    .ok_or_else(|| ClientError::UnsupportedScheme(scheme.clone()))?;
                let tls = (scheme == "https").then(|| self.tls_config());
                debug!(host = %target, port, tls = tls.is_some(), "dialing");
                Rc::new(RefCell::new(Some(Connection::open(&host, port, tls)?)))
            }
        };
        self.conn = Some(Rc::clone(&shared));
        self.last_host = Some(target);

        // 3. Serialize and send
        let mut wire = Vec::with_capacity(128 + request.body.len());
        request.write_to(&mut wire)?;
        if self.dump_wire {
            debug!(request = %String::from_utf8_lossy(&wire), "request wire dump");
        }
        let mut slot = shared.borrow_mut();
        let Some(connection) = slot.as_mut() else {
            return Err(ClientError::Connection(io::Error::from(
                io::ErrorKind::NotConnected,
            )));
        };
        connection.write_all(&wire)?;

        // 4. Envelope, then framing
        let head = match ResponseHead::read(connection.reader()) {
            Ok(head) => head,
            Err(err) => {
                error!(%err, "response head unreadable, dropping connection");
                *slot = None;
                return Err(err.into());
            }
        };
        let framing = match Framing::from_head(&head) {
            Ok(framing) => framing,
            Err(err) => {
                error!(%err, "body framing unusable, dropping connection");
                *slot = None;
                return Err(err.into());
            }
        };
        drop(slot);

        // 5. The body shares the connection slot with this client
        let (status, reason, headers) = head.into_parts();
        Ok(Response::new(
            status,
            reason,
            headers,
            Body::new(shared, framing),
        ))
    }

    fn tls_config(&mut self) -> Arc<rustls::ClientConfig> {
        self.tls.get_or_insert_with(default_tls_config).clone()
    }
}

impl Default for Client {
    fn default() -> Self {
        Client::new()
    }
}
