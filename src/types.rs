use num_traits::FromPrimitive;
use std::net::{Ipv4Addr, Ipv6Addr};
use std::time::{Duration, SystemTime};
use strum_macros::{Display, EnumString};

/// DNS Message as decoded from a response.
///
/// # Examples
///
/// ```rust
/// use stubdns::{Message, Transport};
///
/// // A response for "example.com A" with a single answer.
/// let resp: &[u8] = &[
///     0x12, 0x34, 0x81, 0x80, 0x00, 0x01, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00,
///     0x07, b'e', b'x', b'a', b'm', b'p', b'l', b'e', 0x03, b'c', b'o', b'm', 0x00,
///     0x00, 0x01, 0x00, 0x01,
///     0xc0, 0x0c, 0x00, 0x01, 0x00, 0x01, 0x00, 0x00, 0x0e, 0x10, 0x00, 0x04,
///     93, 184, 216, 34,
/// ];
///
/// let m = Message::from_frame(resp, Transport::Udp).expect("invalid response");
/// assert_eq!(m.an_count, 1);
/// assert_eq!(m.answers[0].resource.to_string(), "93.184.216.34");
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Message {
    /// 16-bit identifier assigned by the program that generates any kind of
    /// query. This identifier is copied into the corresponding reply and can be
    /// used by the requester to match up replies to outstanding queries.
    pub id: u16,

    /// Specifies whether this message is a query (0), or a response (1).
    pub qr: QR,

    /// Specifies kind of query in this message. 0 represents a standard query.
    pub opcode: u8,

    /// Authoritative Answer - Specifies that the responding name server is an
    /// authority for the domain name in question section.
    pub aa: bool,

    /// Truncation - specifies that this message was truncated.
    pub tc: bool,

    /// Recursion Desired - this bit directs the name server to pursue the query
    /// recursively.
    pub rd: bool,

    /// Recursion Available - this be is set or cleared in a response, and
    /// denotes whether recursive query support is available in the name server.
    pub ra: bool,

    /// The three Z bits. Reserved, but some servers use them for AD and CD.
    pub z: u8,

    /// Response code, see [`Rcode`].
    pub rcode: u8,

    // The counts exactly as they appeared in the header.
    pub qd_count: u16,
    pub an_count: u16,
    pub ns_count: u16,
    pub ar_count: u16,

    /// The questions. Normally exactly one, echoed from the query.
    pub questions: Vec<Question>,

    /// The answer records.
    pub answers: Vec<Record>,

    /// The authoritive records.
    pub authoritys: Vec<Record>,

    /// The additional records.
    pub additionals: Vec<Record>,
}

impl Message {
    /// The echoed question, if the server included one.
    pub fn question(&self) -> Option<&Question> {
        self.questions.first()
    }
}

/// DNS Question.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Question {
    /// Dotted domain name, without a trailing dot.
    pub name: String,
    pub r#type: u16,
    pub class: u16,
}

/// Resource Record (RR)
#[derive(Clone, Debug, PartialEq)]
pub struct Record {
    pub name: String,

    pub r#type: u16,
    pub class: u16,

    /// The number of seconds that the resource record may be cached
    /// before the source of the information should again be consulted.
    /// Zero is interpreted to mean that the RR can only be used for the
    /// transaction in progress.
    pub ttl: u32,

    /// The raw RDATA.
    pub rdata: Vec<u8>,

    /// The RDATA interpreted according to `r#type`.
    pub resource: Resource,
}

impl Record {
    pub fn rdlength(&self) -> u16 {
        // Bounded by the u16 read from the wire.
        self.rdata.len() as u16
    }
}

#[derive(Copy, Clone, Debug, EnumString, PartialEq)]
pub enum QR {
    Query = 0,
    Response = 1,
}

impl Default for QR {
    fn default() -> Self {
        QR::Query
    }
}

impl QR {
    pub fn from_bool(b: bool) -> QR {
        match b {
            false => QR::Query,
            true => QR::Response,
        }
    }

    pub fn to_bool(self) -> bool {
        match self {
            QR::Query => false,
            QR::Response => true,
        }
    }
}

/// Response Codes.
/// See [rfc1035] and <https://www.iana.org/assignments/dns-parameters/dns-parameters.xhtml#dns-parameters-6>
///
/// [rfc1035]: https://datatracker.ietf.org/doc/html/rfc1035
#[derive(Copy, Clone, Debug, Display, EnumString, FromPrimitive, PartialEq)]
#[allow(clippy::upper_case_acronyms)]
#[repr(u8)]
pub enum Rcode {
    /// No Error
    NoError = 0,

    /// Format Error
    FormErr = 1,

    /// Server Failure
    ServFail = 2,

    /// Non-Existent Domain
    NXDomain = 3,

    /// Not Implemented
    NotImp = 4,

    /// Query Refused
    Refused = 5,

    /// Name Exists when it should not. See [rfc2136].
    ///
    /// [rfc2136]: https://datatracker.ietf.org/doc/html/rfc2136
    YXDomain = 6,

    /// RR Set Exists when it should not. See [rfc2136].
    ///
    /// [rfc2136]: https://datatracker.ietf.org/doc/html/rfc2136
    YXRRSet = 7,

    /// RR Set that should exist does not. See [rfc2136].
    ///
    /// [rfc2136]: https://datatracker.ietf.org/doc/html/rfc2136
    NXRRSet = 8,

    /// Not Authoritative, or Not Authorized when TSIG is in use.
    NotAuth = 9,

    /// Name not contained in zone. See [rfc2136].
    ///
    /// [rfc2136]: https://datatracker.ietf.org/doc/html/rfc2136
    NotZone = 10,
    // 11-15 are unassigned or only meaningful with EDNS(0).
}

impl Rcode {
    /// Returns the mnemonic of a 4 bit header rcode, or its number if unknown.
    pub fn name(rcode: u8) -> String {
        match Rcode::from_u8(rcode) {
            Some(r) => r.to_string(),
            None => format!("RCODE{}", rcode),
        }
    }
}

/// Resource Record Type that can be asked for, for example, A, CNAME or SOA.
///
/// Responses may carry any type, so records keep the raw `u16` and
/// only use this enum for naming.
#[derive(Copy, Clone, Debug, Display, EnumString, FromPrimitive, PartialEq, Eq, Hash)]
#[allow(clippy::upper_case_acronyms)]
#[strum(ascii_case_insensitive)]
#[repr(u16)]
pub enum Type {
    /// (Default) IPv4 Address.
    A = 1,
    NS = 2,
    CNAME = 5,
    SOA = 6,

    /// Domain name pointer.
    PTR = 12,

    /// Mail exchange.
    MX = 15,

    /// Text strings.
    TXT = 16,

    /// IPv6 Address.
    AAAA = 28,

    /// Server Selection
    SRV = 33,
}

impl Default for Type {
    fn default() -> Self {
        Type::A
    }
}

impl Type {
    /// Returns the mnemonic for the numeric type, or `TYPE<n>` per [rfc3597].
    ///
    /// [rfc3597]: https://datatracker.ietf.org/doc/html/rfc3597
    pub fn name(r#type: u16) -> String {
        match Type::from_u16(r#type) {
            Some(t) => t.to_string(),
            None => format!("TYPE{}", r#type),
        }
    }
}

/// The Internet (IN) class, the only one we ever ask for.
pub const CLASS_IN: u16 = 1;

/// Returns the mnemonic for the numeric class, or `CLASS<n>` per [rfc3597].
///
/// [rfc3597]: https://datatracker.ietf.org/doc/html/rfc3597
pub fn class_name(class: u16) -> String {
    match class {
        CLASS_IN => "IN".to_string(),
        3 => "CH".to_string(),
        4 => "HS".to_string(),
        _ => format!("CLASS{}", class),
    }
}

/// Interpreted RDATA.
///
/// Only the address and single-name types are decoded, everything else is
/// kept as the raw bytes.
#[derive(Clone, Debug, PartialEq)]
#[allow(clippy::upper_case_acronyms)]
pub enum Resource {
    A(Ipv4Addr),
    AAAA(Ipv6Addr),

    CNAME(String),
    NS(String),
    PTR(String),

    Opaque(Vec<u8>),
}

/// The transports a query can be sent over.
#[derive(Copy, Clone, Debug, Display, EnumString, PartialEq, Eq, Hash)]
#[strum(ascii_case_insensitive)]
pub enum Transport {
    /// Plain UDP on port 53.
    #[strum(serialize = "UDP")]
    Udp,

    /// Plain TCP on port 53, length prefixed.
    #[strum(serialize = "TCP")]
    Tcp,

    /// DNS over TLS on port 853 ([rfc7858]), length prefixed.
    ///
    /// [rfc7858]: https://datatracker.ietf.org/doc/html/rfc7858
    #[strum(serialize = "DoT")]
    Dot,

    /// DNS over HTTPS ([rfc8484]) using the binary `application/dns-message` format.
    ///
    /// [rfc8484]: https://datatracker.ietf.org/doc/html/rfc8484
    #[strum(serialize = "DoH")]
    Doh,
}

impl Default for Transport {
    fn default() -> Self {
        Transport::Udp
    }
}

impl Transport {
    /// TCP and DoT messages carry a two byte length prefix.
    pub fn is_length_prefixed(self) -> bool {
        match self {
            Transport::Tcp | Transport::Dot => true,
            Transport::Udp | Transport::Doh => false,
        }
    }

    /// The transport to fall back to when this one fails while running the
    /// automatic UDP, TCP, DoT chain.
    pub fn fallback(self) -> Option<Transport> {
        match self {
            Transport::Udp => Some(Transport::Tcp),
            Transport::Tcp => Some(Transport::Dot),
            Transport::Dot | Transport::Doh => None,
        }
    }
}

/// Stats related to the specific query, e.g. the query time, the server, etc.
#[derive(Clone, Debug, PartialEq)]
pub struct Stats {
    /// Time the request was sent.
    pub start: SystemTime,

    /// How long the round trip took.
    pub duration: Duration,

    /// The server that answered, an address or a URL.
    pub server: String,

    /// Size of the request in bytes, including any length prefix.
    pub request_size: usize,

    /// Size of the response in bytes, including any length prefix.
    pub response_size: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::str::FromStr;

    #[test]
    fn test_type_names() {
        assert_eq!(Type::name(1), "A");
        assert_eq!(Type::name(28), "AAAA");
        assert_eq!(Type::name(99), "TYPE99");
        assert_eq!(Type::from_str("mx").unwrap(), Type::MX);
        assert_eq!(Type::SRV as u16, 33);
    }

    #[test]
    fn test_transport() {
        assert_eq!(Transport::from_str("dot").unwrap(), Transport::Dot);
        assert_eq!(Transport::from_str("DoH").unwrap(), Transport::Doh);
        assert_eq!(Transport::Tcp.to_string(), "TCP");

        assert_eq!(Transport::Udp.fallback(), Some(Transport::Tcp));
        assert_eq!(Transport::Tcp.fallback(), Some(Transport::Dot));
        assert_eq!(Transport::Dot.fallback(), None);
        assert_eq!(Transport::Doh.fallback(), None);

        assert!(Transport::Dot.is_length_prefixed());
        assert!(!Transport::Doh.is_length_prefixed());
    }

    #[test]
    fn test_rcode_names() {
        assert_eq!(Rcode::name(0), "NoError");
        assert_eq!(Rcode::name(3), "NXDomain");
        assert_eq!(Rcode::name(14), "RCODE14");
    }
}
