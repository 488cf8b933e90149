pub const CONNECT: &str = "CONNECT";
pub const DELETE: &str = "DELETE";
pub const GET: &str = "GET";
pub const HEAD: &str = "HEAD";
pub const OPTIONS: &str = "OPTIONS";
pub const PATCH: &str = "PATCH";
pub const POST: &str = "POST";
pub const PUT: &str = "PUT";
pub const TRACE: &str = "TRACE";

#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub enum Method {
    CONNECT,
    DELETE,
    #[default]
    GET,
    HEAD,
    OPTIONS,
    PATCH,
    POST,
    PUT,
    TRACE,
    // Anything else goes on the wire verbatim
    Extension(String),
}

impl Method {
    pub fn as_str(&self) -> &str {
        match self {
            Method::CONNECT => CONNECT,
            Method::DELETE => DELETE,
            Method::GET => GET,
            Method::HEAD => HEAD,
            Method::OPTIONS => OPTIONS,
            Method::PATCH => PATCH,
            Method::POST => POST,
            Method::PUT => PUT,
            Method::TRACE => TRACE,
            Method::Extension(name) => name,
        }
    }
}

impl From<&str> for Method {
    fn from(src: &str) -> Method {
        match src {
            CONNECT => Method::CONNECT,
            DELETE => Method::DELETE,
            GET => Method::GET,
            HEAD => Method::HEAD,
            OPTIONS => Method::OPTIONS,
            PATCH => Method::PATCH,
            POST => Method::POST,
            PUT => Method::PUT,
            TRACE => Method::TRACE,
            other => Method::Extension(other.to_string()),
        }
    }
}
