use crate::clients::tcp::{connect, exchange_prefixed};
use crate::clients::{with_timeout, Exchanger};
use crate::errors::{Error, Result};
use async_trait::async_trait;
use rustls::pki_types::ServerName;
use rustls::{ClientConfig, RootCertStore};
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio_rustls::TlsConnector;

lazy_static! {
    static ref TLS_CONFIG: Arc<ClientConfig> = {
        let mut roots = RootCertStore::empty();
        roots.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());

        Arc::new(
            ClientConfig::builder()
                .with_root_certificates(roots)
                .with_no_client_auth(),
        )
    };
}

/// A DNS over TLS (DoT) Client.
///
/// Frames are the same length prefixed messages used over TCP. The server's
/// certificate must be valid for its IP address.
///
/// See <https://datatracker.ietf.org/doc/html/rfc7858>
pub struct TlsClient {
    server: SocketAddr,
    timeout: Duration,
}

impl TlsClient {
    /// Creates a new TlsClient that connects to `server`, usually on port 853.
    pub fn new(server: SocketAddr) -> Self {
        TlsClient {
            server,
            timeout: Duration::from_millis(5000),
        }
    }

    /// Applies separately to connecting, the handshake, and the exchange.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[async_trait]
impl Exchanger for TlsClient {
    async fn exchange(&self, frame: &[u8]) -> Result<Vec<u8>> {
        let tcp = connect(self.server, self.timeout).await?;

        let connector = TlsConnector::from(TLS_CONFIG.clone());
        let domain = ServerName::from(self.server.ip());

        let mut stream = with_timeout(self.timeout, async {
            connector.connect(domain, tcp).await.map_err(handshake_error)
        })
        .await?;

        with_timeout(self.timeout, exchange_prefixed(&mut stream, frame)).await
    }

    fn server(&self) -> String {
        self.server.to_string()
    }
}

// rustls reports certificate and protocol failures as InvalidData, and a
// peer that hangs up mid handshake as UnexpectedEof.
fn handshake_error(err: io::Error) -> Error {
    match err.kind() {
        io::ErrorKind::InvalidData => Error::Tls(err.to_string()),
        io::ErrorKind::UnexpectedEof => {
            Error::ConnectionReset(format!("connection closed during tls handshake: {}", err))
        }
        _ => err.into(),
    }
}
