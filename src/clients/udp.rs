use crate::clients::{with_timeout, Exchanger};
use crate::errors::Result;
use async_trait::async_trait;
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};
use std::time::Duration;
use tokio::net::UdpSocket;

/// Largest response we will accept over UDP.
const MAX_RESPONSE_LEN: usize = 4096;

/// A UDP DNS Client.
///
/// # Example
///
/// ```rust,no_run
/// use stubdns::clients::{Exchanger, UdpClient};
/// use stubdns::dns::Query;
/// use stubdns::name::encode_hostname;
/// use stubdns::{Message, Transport, Type};
///
/// #[tokio::main]
/// async fn main() -> Result<(), stubdns::Error> {
///     let query = Query::new(encode_hostname("bramp.net")?, Type::A);
///
///     let response = UdpClient::new("8.8.8.8:53".parse().unwrap())
///        .exchange(&query.to_frame(Transport::Udp))
///        .await?;
///
///     println!("{}", Message::from_slice(&response)?);
///     Ok(())
/// }
/// ```
///
/// See <https://datatracker.ietf.org/doc/html/rfc1035#section-4.2.1>
pub struct UdpClient {
    server: SocketAddr,
    timeout: Duration,
}

impl UdpClient {
    /// Creates a new UdpClient that sends to `server`.
    pub fn new(server: SocketAddr) -> Self {
        UdpClient {
            server,
            timeout: Duration::from_millis(5000),
        }
    }

    /// How long to wait for the response datagram.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    async fn send_and_recv(&self, frame: &[u8]) -> Result<Vec<u8>> {
        let local: SocketAddr = match self.server {
            SocketAddr::V4(_) => (Ipv4Addr::UNSPECIFIED, 0).into(),
            SocketAddr::V6(_) => (Ipv6Addr::UNSPECIFIED, 0).into(),
        };

        let socket = UdpSocket::bind(local).await?;

        // Connect us to the server, meaning recv will only receive directly
        // from the server.
        socket.connect(self.server).await?;
        socket.send(frame).await?;

        let mut buf = vec![0; MAX_RESPONSE_LEN];
        let len = socket.recv(&mut buf).await?;
        buf.truncate(len);

        Ok(buf)
    }
}

#[async_trait]
impl Exchanger for UdpClient {
    /// Sends the frame in a single datagram and returns the first datagram received back.
    async fn exchange(&self, frame: &[u8]) -> Result<Vec<u8>> {
        with_timeout(self.timeout, self.send_and_recv(frame)).await
    }

    fn server(&self) -> String {
        self.server.to_string()
    }
}
