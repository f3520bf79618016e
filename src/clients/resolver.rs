use crate::clients::{DohClient, Exchanger, StatsBuilder, TcpClient, TlsClient, UdpClient};
use crate::config::Config;
use crate::dns::{HeaderWarning, Query};
use crate::errors::{Error, Result};
use crate::name::{encode_hostname, encode_reverse};
use crate::types::{Message, Stats, Transport, Type};
use log::{debug, warn};
use std::net::{IpAddr, SocketAddr};

/// What to resolve, and how.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Request {
    /// A hostname, or an IP address to look up the PTR record of.
    pub name: String,

    /// Overrides [`Config::server`].
    pub server: Option<IpAddr>,

    /// Ignored when `name` is an IP address.
    pub r#type: Type,

    /// The first transport to try. UDP and TCP fall back along the
    /// UDP, TCP, DoT chain, while DoT and DoH are tried alone.
    pub transport: Transport,

    /// Overrides [`Config::doh_url`].
    pub doh_url: Option<String>,
}

impl Request {
    pub fn new(name: &str, r#type: Type) -> Request {
        Request {
            name: name.to_string(),
            r#type,
            ..Default::default()
        }
    }

    pub fn with_server(mut self, server: IpAddr) -> Self {
        self.server = Some(server);
        self
    }

    pub fn with_transport(mut self, transport: Transport) -> Self {
        self.transport = transport;
        self
    }

    pub fn with_doh_url(mut self, url: &str) -> Self {
        self.doh_url = Some(url.to_string());
        self
    }
}

/// A successfully parsed response, and how it was obtained.
#[derive(Clone, Debug, PartialEq)]
pub struct Response {
    pub message: Message,

    /// The transport that answered.
    pub transport: Transport,

    pub stats: Stats,

    /// Header checks that failed. These never stop the response being returned.
    pub warnings: Vec<HeaderWarning>,
}

/// Connector creates the [`Exchanger`] used for a single attempt.
pub trait Connector: Send + Sync {
    fn client(
        &self,
        config: &Config,
        transport: Transport,
        server: IpAddr,
        doh_url: &str,
    ) -> Result<Box<dyn Exchanger>>;
}

/// Connects with the real network clients.
#[derive(Copy, Clone, Debug, Default)]
pub struct NetworkConnector;

impl Connector for NetworkConnector {
    fn client(
        &self,
        config: &Config,
        transport: Transport,
        server: IpAddr,
        doh_url: &str,
    ) -> Result<Box<dyn Exchanger>> {
        Ok(match transport {
            Transport::Udp => Box::new(
                UdpClient::new(SocketAddr::new(server, config.udp_port))
                    .with_timeout(config.timeout),
            ),
            Transport::Tcp => Box::new(
                TcpClient::new(SocketAddr::new(server, config.tcp_port))
                    .with_timeout(config.timeout),
            ),
            Transport::Dot => Box::new(
                TlsClient::new(SocketAddr::new(server, config.tls_port))
                    .with_timeout(config.timeout),
            ),
            Transport::Doh => Box::new(DohClient::new(doh_url)?.with_timeout(config.doh_timeout)),
        })
    }
}

/// Resolves names, falling back between transports.
///
/// # Example
///
/// ```rust,no_run
/// use stubdns::{Request, Resolver, Type};
///
/// #[tokio::main]
/// async fn main() -> Result<(), stubdns::Error> {
///     let resolver = Resolver::default();
///
///     let response = resolver.resolve(&Request::new("bramp.net", Type::A)).await?;
///
///     println!("{}", response);
///     Ok(())
/// }
/// ```
pub struct Resolver<C = NetworkConnector> {
    config: Config,
    connector: C,
    id_source: fn() -> u16,
}

impl Default for Resolver {
    fn default() -> Self {
        Resolver::new(Config::default())
    }
}

impl Resolver {
    pub fn new(config: Config) -> Self {
        Resolver::with_connector(config, NetworkConnector)
    }
}

impl<C: Connector> Resolver<C> {
    /// Creates a Resolver that obtains its clients from `connector`.
    pub fn with_connector(config: Config, connector: C) -> Self {
        Resolver {
            config,
            connector,
            id_source: rand::random,
        }
    }

    /// Replaces the random transaction ID generator.
    pub fn with_id_source(mut self, id_source: fn() -> u16) -> Self {
        self.id_source = id_source;
        self
    }

    /// Resolves the request, returning the first response received.
    ///
    /// The same transaction ID is used for every transport tried. A name
    /// that cannot be encoded fails before anything is sent, and a malformed
    /// response is returned immediately without trying another transport.
    pub async fn resolve(&self, request: &Request) -> Result<Response> {
        let (qname, r#type) = match request.name.parse::<IpAddr>() {
            Ok(ip) => (encode_reverse(ip)?, Type::PTR),
            Err(_) => (encode_hostname(&request.name)?, request.r#type),
        };

        let query = Query::with_id((self.id_source)(), qname, r#type);
        let server = request.server.unwrap_or(self.config.server);
        let doh_url = request.doh_url.as_deref().unwrap_or(&self.config.doh_url);

        let chained = matches!(request.transport, Transport::Udp | Transport::Tcp);
        let mut transport = request.transport;

        loop {
            let err = match self.attempt(&query, transport, server, doh_url).await {
                Ok(response) => return Ok(response),
                Err(err) => err,
            };

            if !chained || !err.is_transport_failure() {
                return Err(err);
            }

            match transport.fallback() {
                Some(next) => {
                    warn!(
                        "{} query to {} failed: {}, falling back to {}",
                        transport, server, err, next
                    );
                    transport = next;
                }
                None => {
                    return Err(Error::ResolutionFailed {
                        transport,
                        cause: Box::new(err),
                    })
                }
            }
        }
    }

    async fn attempt(
        &self,
        query: &Query,
        transport: Transport,
        server: IpAddr,
        doh_url: &str,
    ) -> Result<Response> {
        let client = self
            .connector
            .client(&self.config, transport, server, doh_url)?;

        let frame = query.to_frame(transport);
        debug!(
            "sending {} byte {} query (id {}) to {}",
            frame.len(),
            transport,
            query.id,
            client.server()
        );

        let stats = StatsBuilder::start(frame.len());
        let resp = client.exchange(&frame).await?;
        let stats = stats.end(client.server(), resp.len());

        debug!("received {} bytes from {}", resp.len(), stats.server);

        let message = Message::from_frame(&resp, transport)?;

        let warnings = message.header_warnings(query.id);
        for warning in &warnings {
            warn!("response from {}: {}", stats.server, warning);
        }

        Ok(Response {
            message,
            transport,
            stats,
            warnings,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_defaults() {
        let request = Request::new("bramp.net", Type::AAAA);
        assert_eq!(request.transport, Transport::Udp);
        assert_eq!(request.server, None);
        assert_eq!(request.doh_url, None);

        let request = request
            .with_transport(Transport::Doh)
            .with_doh_url("https://dns.google/dns-query");
        assert_eq!(request.doh_url.as_deref(), Some("https://dns.google/dns-query"));
    }

    #[test]
    fn test_network_connector() {
        let config = Config::default();
        let server: IpAddr = "9.9.9.9".parse().unwrap();

        let udp = NetworkConnector
            .client(&config, Transport::Udp, server, &config.doh_url)
            .unwrap();
        assert_eq!(udp.server(), "9.9.9.9:53");

        let dot = NetworkConnector
            .client(&config, Transport::Dot, server, &config.doh_url)
            .unwrap();
        assert_eq!(dot.server(), "9.9.9.9:853");

        let doh = NetworkConnector
            .client(&config, Transport::Doh, server, &config.doh_url)
            .unwrap();
        assert_eq!(doh.server(), "https://cloudflare-dns.com/dns-query");

        assert!(matches!(
            NetworkConnector.client(&config, Transport::Doh, server, "ftp://x"),
            Err(Error::Http(_))
        ));
    }
}
