use crate::bail;
use crate::clients::{with_timeout, Exchanger};
use crate::errors::{Error, Result};
use async_trait::async_trait;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;

/// A TCP DNS Client.
///
/// The frame given to [`Exchanger::exchange`] must already carry its two byte
/// length prefix, and the returned bytes include the response's prefix.
///
/// See <https://datatracker.ietf.org/doc/html/rfc1035#section-4.2.2>
pub struct TcpClient {
    server: SocketAddr,
    timeout: Duration,
}

impl TcpClient {
    /// Creates a new TcpClient that connects to `server`.
    pub fn new(server: SocketAddr) -> Self {
        TcpClient {
            server,
            timeout: Duration::from_millis(5000),
        }
    }

    /// Applies separately to connecting, and to the exchange that follows.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[async_trait]
impl Exchanger for TcpClient {
    async fn exchange(&self, frame: &[u8]) -> Result<Vec<u8>> {
        let mut stream = connect(self.server, self.timeout).await?;
        with_timeout(self.timeout, exchange_prefixed(&mut stream, frame)).await
    }

    fn server(&self) -> String {
        self.server.to_string()
    }
}

/// Opens a TCP connection to `server`, used by both TCP and DoT.
pub(crate) async fn connect(server: SocketAddr, timeout: Duration) -> Result<TcpStream> {
    let stream = with_timeout(timeout, async { Ok(TcpStream::connect(server).await?) }).await?;
    stream.set_nodelay(true)?; // We send discrete frames, so we can send as soon as possible.

    Ok(stream)
}

/// Writes the length prefixed `frame` to `stream`, and reads back one length
/// prefixed response.
pub(crate) async fn exchange_prefixed<S>(stream: &mut S, frame: &[u8]) -> Result<Vec<u8>>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    stream.write_all(frame).await?;
    stream.flush().await?;

    // Now receive a two byte length
    let mut resp = vec![0; 2];
    if let Err(err) = stream.read_exact(&mut resp).await {
        return Err(match err.kind() {
            std::io::ErrorKind::UnexpectedEof => Error::ConnectionReset(
                "connection closed before a response was received".to_string(),
            ),
            _ => err.into(),
        });
    }

    let len = usize::from(u16::from_be_bytes([resp[0], resp[1]]));
    resp.resize(2 + len, 0);

    // and finally the message, which the server may have cut short.
    let mut read = 0;
    while read < len {
        match stream.read(&mut resp[2 + read..]).await? {
            0 => bail!(
                Malformed,
                "response was {} bytes but its length prefix promised {}",
                read,
                len
            ),
            n => read += n,
        }
    }

    Ok(resp)
}
