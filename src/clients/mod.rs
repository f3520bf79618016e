//! Clients for sending a framed query over each [`crate::Transport`], and the
//! [`Resolver`] that chains them together.
use crate::errors::{Error, Result};
use async_trait::async_trait;
use std::future::Future;
use std::time::Duration;

pub use self::doh::DohClient;
pub use self::resolver::{Connector, NetworkConnector, Request, Resolver, Response};
pub use self::tcp::TcpClient;
pub use self::tls::TlsClient;
pub use self::udp::UdpClient;

pub(crate) use self::stats::StatsBuilder;

pub mod doh;
mod mime;
mod resolver;
mod stats;
pub mod tcp;
pub mod tls;
pub mod udp;

/// Exchanger sends one already framed query and returns the raw response.
///
/// Each call uses its own socket or connection, which is closed before
/// returning.
#[async_trait]
pub trait Exchanger: Send + Sync {
    async fn exchange(&self, frame: &[u8]) -> Result<Vec<u8>>;

    /// Where queries are sent, used for logging and [`crate::Stats`].
    fn server(&self) -> String;
}

/// Runs `f`, failing with [`Error::Timeout`] if it takes longer than `timeout`.
pub(crate) async fn with_timeout<T, F>(timeout: Duration, f: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout(timeout, f).await {
        Ok(result) => result,
        Err(_) => Err(Error::Timeout(timeout)),
    }
}
