pub const COLON: u8 = b':';
pub const CRLF: &[u8] = b"\r\n";
pub const HTTP_1_1: &str = "HTTP/1.1";
pub const SP: u8 = b' ';
