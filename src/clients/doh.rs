use crate::bail;
use crate::clients::mime::content_type_equal;
use crate::clients::{with_timeout, Exchanger};
use crate::errors::{Error, Result};
use async_trait::async_trait;
use http::header::*;
use http::{HeaderMap, Method, Request, StatusCode};
use hyper::{Body, Client as HyperClient};
use hyper_alpn::AlpnConnector;
use std::time::Duration;
use url::Url;

pub const CLOUDFLARE: &str = "https://cloudflare-dns.com/dns-query";

// For use in Content-type and Accept headers
const CONTENT_TYPE_APPLICATION_DNS_MESSAGE: &str = "application/dns-message";

/// A DNS over HTTPS (DoH) Client (rfc8484).
///
/// The frame is POSTed as the request body, and the response body returned.
///
/// # Example
///
/// ```rust,no_run
/// use stubdns::clients::{DohClient, Exchanger};
/// use stubdns::dns::Query;
/// use stubdns::name::encode_hostname;
/// use stubdns::{Message, Transport, Type};
///
/// #[tokio::main]
/// async fn main() -> Result<(), stubdns::Error> {
///     let query = Query::new(encode_hostname("bramp.net")?, Type::A);
///
///     let response = DohClient::new("https://dns.google/dns-query")?
///        .exchange(&query.to_frame(Transport::Doh))
///        .await?;
///
///     println!("{}", Message::from_slice(&response)?);
///     Ok(())
/// }
/// ```
///
/// See <https://datatracker.ietf.org/doc/html/rfc8484>
pub struct DohClient {
    url: Url,
    timeout: Duration,
}

impl DohClient {
    /// Creates a new DohClient for the endpoint at `url`.
    ///
    /// Be aware the host in `url` will be resolved by the system's standard DNS library.
    pub fn new(url: &str) -> Result<Self> {
        let url = match Url::parse(url) {
            Ok(url) => url,
            Err(err) => bail!(Http, "invalid DoH url {:?}: {}", url, err),
        };

        if url.scheme() != "https" {
            bail!(Http, "DoH url must be https, not {:?}", url.scheme());
        }

        Ok(DohClient {
            url,
            timeout: Duration::from_secs(10),
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    async fn post(&self, frame: &[u8]) -> Result<Vec<u8>> {
        // Create a Alpn client, so our connection will upgrade to HTTP/2.
        let alpn = AlpnConnector::new();

        let client = HyperClient::builder()
            .http2_only(true)
            .build::<_, hyper::Body>(alpn);

        let req = Request::builder()
            .method(Method::POST)
            .uri(self.url.as_str())
            .header(ACCEPT, CONTENT_TYPE_APPLICATION_DNS_MESSAGE)
            .header(CONTENT_TYPE, CONTENT_TYPE_APPLICATION_DNS_MESSAGE)
            .body(Body::from(frame.to_vec())) // content-length header will be added.
            .map_err(|err| Error::Http(err.to_string()))?;

        let resp = client
            .request(req)
            .await
            .map_err(|err| Error::Http(err.to_string()))?;

        let status = resp.status();
        let headers = resp.headers().clone();

        // Read the full body
        let body = hyper::body::to_bytes(resp.into_body())
            .await
            .map_err(|err| Error::Http(err.to_string()))?;

        check_response(status, &headers, body.to_vec())
    }
}

/// Returns the body of a successful `application/dns-message` response.
///
/// A non-2xx status is returned as [`Error::HttpStatus`] along with the body.
fn check_response(status: StatusCode, headers: &HeaderMap, body: Vec<u8>) -> Result<Vec<u8>> {
    if !status.is_success() {
        return Err(Error::HttpStatus {
            status: status.as_u16(),
            body,
        });
    }

    if let Some(content_type) = headers.get(CONTENT_TYPE) {
        if !content_type_equal(content_type, CONTENT_TYPE_APPLICATION_DNS_MESSAGE) {
            bail!(
                Http,
                "received invalid content-type: {:?} expected {}",
                content_type,
                CONTENT_TYPE_APPLICATION_DNS_MESSAGE,
            );
        }
    }

    Ok(body)
}

#[async_trait]
impl Exchanger for DohClient {
    async fn exchange(&self, frame: &[u8]) -> Result<Vec<u8>> {
        with_timeout(self.timeout, self.post(frame)).await
    }

    fn server(&self) -> String {
        self.url.to_string()
    }
}
