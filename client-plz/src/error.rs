use head_plz::error::HeadError;
use stream_plz::error::BodyError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("url| {0}")]
    Url(#[from] url::ParseError),
    #[error("url missing host| {0}")]
    MissingHost(String),
    #[error("no known port for scheme| {0}")]
    UnsupportedScheme(String),
    #[error("connection| {0}")]
    Connection(#[from] std::io::Error),
    #[error("certificate verification| {0}")]
    CertificateVerification(String),
    #[error("head| {0}")]
    Head(#[from] HeadError),
    #[error("body| {0}")]
    Body(#[from] BodyError),
}
