pub const CHUNKED: &str = "chunked";
pub const CONTENT_LENGTH: &str = "Content-Length";
pub const HOST: &str = "Host";
pub const TRANSFER_ENCODING: &str = "Transfer-Encoding";
pub const USER_AGENT: &str = "User-Agent";
