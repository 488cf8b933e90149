use std::io::{self, BufReader, Read, Write};
use std::net::TcpStream;
use std::sync::Arc;

use rustls::pki_types::ServerName;
use rustls::{ClientConnection, StreamOwned};
use tracing::debug;

use crate::error::ClientError;

// Transport under the buffered reader, plain TCP or TLS.
pub enum Transport {
    Plain(TcpStream),
    Tls(Box<StreamOwned<ClientConnection, TcpStream>>),
}

impl Read for Transport {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            Transport::Plain(tcp) => tcp.read(buf),
            Transport::Tls(tls) => tls.read(buf),
        }
    }
}

impl Write for Transport {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Transport::Plain(tcp) => tcp.write(buf),
            Transport::Tls(tls) => tls.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Transport::Plain(tcp) => tcp.flush(),
            Transport::Tls(tls) => tls.flush(),
        }
    }
}

// One exclusively owned connection, buffered for line parsing.
// Dropping it closes the socket.
pub struct Connection {
    stream: BufReader<Transport>,
}

impl Connection {
    pub fn open(
        host: &str,
        port: u16,
        tls: Option<Arc<rustls::ClientConfig>>,
    ) -> Result<Connection, ClientError> {
        let tcp = TcpStream::connect((host, port))?;
        let transport = match tls {
            None => Transport::Plain(tcp),
            Some(config) => Transport::Tls(Box::new(handshake(config, host, tcp)?)),
        };
        Ok(Connection {
            stream: BufReader::new(transport),
        })
    }

    pub fn reader(&mut self) -> &mut BufReader<Transport> {
        &mut self.stream
    }

    pub fn write_all(&mut self, data: &[u8]) -> io::Result<()> {
        self.stream.get_mut().write_all(data)?;
        self.stream.get_mut().flush()
    }
}

/* Steps:
 *      1. The certificate is checked against the host without its
 *         port.
 *      2. Drive the handshake to completion before any request bytes,
 *         so verification failures surface on open.
 */
fn handshake(
    config: Arc<rustls::ClientConfig>,
    host: &str,
    mut tcp: TcpStream,
) -> Result<StreamOwned<ClientConnection, TcpStream>, ClientError> {
    let name = server_name(host)?;
    let mut tls = ClientConnection::new(config, name)
        .map_err(|e| ClientError::Connection(io::Error::other(e)))?;
    while tls.is_handshaking() {
        tls.complete_io(&mut tcp).map_err(classify_handshake_error)?;
    }
    debug!(host, "tls handshake complete");
    Ok(StreamOwned::new(tls, tcp))
}

fn server_name(host: &str) -> Result<ServerName<'static>, ClientError> {
    ServerName::try_from(host.to_owned())
        .map_err(|e| ClientError::CertificateVerification(e.to_string()))
}

// rustls reports certificate failures through the io layer during
// complete_io; pull them back apart from plain transport errors.
fn classify_handshake_error(err: io::Error) -> ClientError {
    let cert_failure = err
        .get_ref()
        .and_then(|inner| inner.downcast_ref::<rustls::Error>())
        .is_some_and(|e| matches!(e, rustls::Error::InvalidCertificate(_)));
    if cert_failure {
        ClientError::CertificateVerification(err.to_string())
    } else {
        ClientError::Connection(err)
    }
}

pub fn default_tls_config() -> Arc<rustls::ClientConfig> {
    let roots = rustls::RootCertStore::from_iter(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());
    Arc::new(
        rustls::ClientConfig::builder()
            .with_root_certificates(roots)
            .with_no_client_auth(),
    )
}

#[cfg(test)]
mod tests {
    use rustls::CertificateError;

    use super::*;

    #[test]
    fn test_server_name_accepts_dns_and_ip() {
        assert!(server_name("example.com").is_ok());
        assert!(server_name("127.0.0.1").is_ok());
    }

    #[test]
    fn test_server_name_rejects_garbage() {
        let err = server_name("not a hostname").unwrap_err();
        assert!(matches!(err, ClientError::CertificateVerification(_)));
    }

    #[test]
    fn test_classify_handshake_error_certificate() {
        let inner = rustls::Error::InvalidCertificate(CertificateError::NotValidForName);
        let err = io::Error::new(io::ErrorKind::InvalidData, inner);
        assert!(matches!(
            classify_handshake_error(err),
            ClientError::CertificateVerification(_)
        ));
    }

    #[test]
    fn test_classify_handshake_error_transport() {
        let err = io::Error::from(io::ErrorKind::ConnectionReset);
        assert!(matches!(
            classify_handshake_error(err),
            ClientError::Connection(_)
        ));
    }

    #[test]
    fn test_default_tls_config_builds() {
        let config = default_tls_config();
        assert!(!config.crypto_provider().cipher_suites.is_empty());
    }
}
