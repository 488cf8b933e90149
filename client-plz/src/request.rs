use std::io::{self, Write};

use bytes::Bytes;
use head_plz::{
    abnf::{CRLF, HTTP_1_1},
    const_headers::CONTENT_LENGTH,
    methods::Method,
};
use url::Url;

// Outgoing request. Headers go on the wire in vector order, nothing is
// reordered or canonicalized on behalf of the caller.
pub struct Request {
    pub url: Url,
    pub method: Method,
    pub headers: Vec<(String, String)>,
    pub body: Bytes,
}

impl Request {
    pub fn new(url: Url, method: Method, headers: Vec<(String, String)>, body: Bytes) -> Self {
        Request {
            url,
            method,
            headers,
            body,
        }
    }

    // First header with this exact name.
    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value.as_str())
    }

    pub fn push_header(&mut self, key: &str, value: String) {
        self.headers.push((key.to_string(), value));
    }

    /* Steps:
     *      1. "METHOD path[?query] HTTP/1.1" line.
     *      2. Headers in the order supplied.
     *      3. Blank line, then the body capped at a declared
     *         Content-Length.
     */
    pub fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        write!(writer, "{} {}", self.method.as_str(), self.url.path())?;
        if let Some(query) = self.url.query() {
            write!(writer, "?{query}")?;
        }
        write!(writer, " {HTTP_1_1}\r\n")?;
        for (name, value) in &self.headers {
            write!(writer, "{name}: {value}\r\n")?;
        }
        writer.write_all(CRLF)?;
        writer.write_all(self.body_to_send())?;
        Ok(())
    }

    // A declared Content-Length wins over the actual body length,
    // excess body bytes are dropped on write. A body shorter than the
    // declaration goes out in full.
    fn body_to_send(&self) -> &[u8] {
        match self.declared_len() {
            Some(declared) if declared < self.body.len() => &self.body[..declared],
            _ => &self.body,
        }
    }

    fn declared_len(&self) -> Option<usize> {
        self.header(CONTENT_LENGTH)?.trim().parse().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(raw_url: &str, headers: Vec<(String, String)>, body: &str) -> Request {
        Request::new(
            Url::parse(raw_url).unwrap(),
            Method::GET,
            headers,
            Bytes::copy_from_slice(body.as_bytes()),
        )
    }

    fn wire(request: &Request) -> Vec<u8> {
        let mut buf = Vec::new();
        request.write_to(&mut buf).unwrap();
        buf
    }

    #[test]
    fn test_request_line_basic() {
        let req = request("http://example.com/path", Vec::new(), "");
        assert_eq!(wire(&req), b"GET /path HTTP/1.1\r\n\r\n");
    }

    #[test]
    fn test_request_line_with_query() {
        let req = request("http://example.com/search?q=rust&page=2", Vec::new(), "");
        assert_eq!(wire(&req), b"GET /search?q=rust&page=2 HTTP/1.1\r\n\r\n");
    }

    #[test]
    fn test_request_root_path() {
        let req = request("http://example.com", Vec::new(), "");
        assert_eq!(wire(&req), b"GET / HTTP/1.1\r\n\r\n");
    }

    #[test]
    fn test_request_headers_keep_caller_order() {
        let headers = vec![
            ("Zebra".to_string(), "1".to_string()),
            ("Alpha".to_string(), "2".to_string()),
        ];
        let req = request("http://example.com/", headers, "");
        assert_eq!(
            wire(&req),
            b"GET / HTTP/1.1\r\nZebra: 1\r\nAlpha: 2\r\n\r\n"
        );
    }

    // The declared length truncates a longer body on the wire.
    #[test]
    fn test_request_body_truncated_to_declared_length() {
        let headers = vec![("Content-Length".to_string(), "5".to_string())];
        let req = request("http://example.com/", headers, "helloworld");
        assert_eq!(
            wire(&req),
            b"GET / HTTP/1.1\r\nContent-Length: 5\r\n\r\nhello"
        );
    }

    #[test]
    fn test_request_body_shorter_than_declared() {
        let headers = vec![("Content-Length".to_string(), "50".to_string())];
        let req = request("http://example.com/", headers, "short");
        let wire = wire(&req);
        assert!(wire.ends_with(b"\r\n\r\nshort"));
    }

    #[test]
    fn test_request_body_without_declaration() {
        let req = request("http://example.com/", Vec::new(), "payload");
        assert_eq!(wire(&req), b"GET / HTTP/1.1\r\n\r\npayload");
    }

    #[test]
    fn test_request_header_lookup_exact() {
        let headers = vec![("content-length".to_string(), "5".to_string())];
        let req = request("http://example.com/", headers, "helloworld");
        // Lowercase declaration is not seen, nothing truncates
        assert!(req.header("Content-Length").is_none());
        assert!(wire(&req).ends_with(b"helloworld"));
    }
}
