use crate::clients::doh;
use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;

/// Default server for UDP, TCP and DoT, Cloudflare's public resolver.
pub const CLOUDFLARE: IpAddr = IpAddr::V4(Ipv4Addr::new(1, 1, 1, 1));

/// Settings shared by every resolution made with a [`crate::clients::Resolver`].
///
/// # Example
///
/// ```rust
/// use stubdns::Config;
/// use std::time::Duration;
///
/// let config = Config::default()
///     .with_timeout(Duration::from_millis(2500))
///     .with_server("8.8.8.8".parse().unwrap());
///
/// assert_eq!(config.tls_port, 853);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    /// Timeout for each UDP, TCP and DoT attempt.
    pub timeout: Duration,

    /// Timeout for a DoH request.
    pub doh_timeout: Duration,

    /// Server used when the request does not name one.
    pub server: IpAddr,

    /// DoH endpoint used when the request does not name one.
    pub doh_url: String,

    pub udp_port: u16,
    pub tcp_port: u16,
    pub tls_port: u16,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            timeout: Duration::from_millis(5000),
            doh_timeout: Duration::from_secs(10),
            server: CLOUDFLARE,
            doh_url: doh::CLOUDFLARE.to_string(),
            udp_port: 53,
            tcp_port: 53,
            tls_port: 853,
        }
    }
}

impl Config {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_doh_timeout(mut self, timeout: Duration) -> Self {
        self.doh_timeout = timeout;
        self
    }

    pub fn with_server(mut self, server: IpAddr) -> Self {
        self.server = server;
        self
    }

    pub fn with_doh_url(mut self, url: &str) -> Self {
        self.doh_url = url.to_string();
        self
    }

    /// Sets the port used by UDP and TCP.
    pub fn with_port(mut self, port: u16) -> Self {
        self.udp_port = port;
        self.tcp_port = port;
        self
    }

    pub fn with_tls_port(mut self, port: u16) -> Self {
        self.tls_port = port;
        self
    }
}
