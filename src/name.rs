//! Encoding of domain names into the wire format used in questions.
use crate::bail;
use crate::errors::Result;
use std::fmt::Write;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

/// Restricts the length of a domain label to 63 characters. [RFC1034]
pub const MAX_LABEL_LEN: usize = 63;

/// Restricts the length of an encoded name to 255 bytes. [RFC1035]
pub const MAX_NAME_LEN: usize = 255;

/// A domain name encoded as a sequence of length prefixed labels,
/// terminated by the zero length root label.
///
/// Can only be built by [`encode_hostname`] or [`encode_reverse`], so it always
/// holds a valid name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QName(Vec<u8>);

impl QName {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True for the root name, which is encoded as a single zero byte.
    pub fn is_root(&self) -> bool {
        self.0.len() == 1
    }
}

impl AsRef<[u8]> for QName {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Encodes a dotted ASCII hostname, such as `www.example.com`.
///
/// A single trailing dot is allowed. `""` and `"."` both encode the root.
///
/// # Errors
///
/// Returns [`crate::Error::Encoding`] if the name is not ASCII, has an empty
/// label, a label longer than 63 bytes, or would encode to more than 255 bytes.
///
/// # Example
///
/// ```rust
/// use stubdns::name::encode_hostname;
///
/// let qname = encode_hostname("bramp.net").unwrap();
/// assert_eq!(qname.as_bytes(), b"\x05bramp\x03net\x00");
/// ```
pub fn encode_hostname(name: &str) -> Result<QName> {
    if !name.is_ascii() {
        bail!(Encoding, "'{}' is not a legal name (not ascii)", name);
    }

    let mut buf = Vec::with_capacity(name.len() + 2);

    if !name.is_empty() && name != "." {
        for label in name.split_terminator('.') {
            if label.is_empty() {
                bail!(Encoding, "'{}' is not a legal name (empty label)", name);
            }

            if label.len() > MAX_LABEL_LEN {
                bail!(Encoding, "'{}' is not a legal name (label too long)", name);
            }

            buf.push(label.len() as u8);
            buf.extend_from_slice(label.as_bytes());
        }
    }

    buf.push(0);

    if buf.len() > MAX_NAME_LEN {
        bail!(Encoding, "'{}' is not a legal name (ran out of space)", name);
    }

    Ok(QName(buf))
}

/// Encodes the reverse lookup name for an address, for use with a PTR query.
///
/// `1.2.3.4` becomes `4.3.2.1.in-addr.arpa`, and IPv6 addresses are written
/// as 32 reversed nibbles under `ip6.arpa`. See [rfc1035#section-3.5] and [rfc3596#section-2.5].
///
/// [rfc1035#section-3.5]: https://datatracker.ietf.org/doc/html/rfc1035#section-3.5
/// [rfc3596#section-2.5]: https://datatracker.ietf.org/doc/html/rfc3596#section-2.5
pub fn encode_reverse(ip: IpAddr) -> Result<QName> {
    encode_hostname(&reverse_name(ip))
}

/// Returns the dotted reverse lookup name for an address.
pub fn reverse_name(ip: IpAddr) -> String {
    match ip {
        IpAddr::V4(ip) => reverse_name_v4(ip),
        IpAddr::V6(ip) => reverse_name_v6(ip),
    }
}

fn reverse_name_v4(ip: Ipv4Addr) -> String {
    let [a, b, c, d] = ip.octets();
    format!("{}.{}.{}.{}.in-addr.arpa", d, c, b, a)
}

fn reverse_name_v6(ip: Ipv6Addr) -> String {
    // 32 nibbles each followed by a dot, then the suffix.
    let mut name = String::with_capacity(72);
    for b in ip.octets().iter().rev() {
        // Writing to a String never fails.
        let _ = write!(name, "{:x}.{:x}.", b & 0x0f, b >> 4);
    }
    name.push_str("ip6.arpa");
    name
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::decode_name;
    use crate::Error;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_encode_hostname() {
        assert_eq!(encode_hostname("").unwrap().as_bytes(), b"\x00");
        assert_eq!(encode_hostname(".").unwrap().as_bytes(), b"\x00");
        assert!(encode_hostname(".").unwrap().is_root());
        assert_eq!(encode_hostname("com").unwrap().as_bytes(), b"\x03com\x00");
        assert_eq!(
            encode_hostname("a.b.com").unwrap().as_bytes(),
            b"\x01a\x01b\x03com\x00"
        );
        assert_eq!(
            encode_hostname("a.b.com.").unwrap().as_bytes(),
            b"\x01a\x01b\x03com\x00"
        );
    }

    #[test]
    fn test_encode_hostname_invalid() {
        let label = "a".repeat(64);
        assert!(matches!(
            encode_hostname(&format!("{}.com", label)),
            Err(Error::Encoding(_))
        ));
        assert!(encode_hostname(&"a".repeat(63)).is_ok());

        assert!(matches!(encode_hostname("a..com"), Err(Error::Encoding(_))));
        assert!(matches!(encode_hostname(".com"), Err(Error::Encoding(_))));
        assert!(matches!(encode_hostname("com.."), Err(Error::Encoding(_))));
        assert!(matches!(encode_hostname("☺️.com"), Err(Error::Encoding(_))));
    }

    #[test]
    fn test_encode_hostname_max_len() {
        // Four 62 byte labels is 4 * 63 + 1 = 253 bytes.
        let label = "a".repeat(62);
        let name = vec![label.as_str(); 4].join(".");
        assert_eq!(encode_hostname(&name).unwrap().len(), 253);

        // 255 exactly.
        let name = format!("{}.b", name);
        assert_eq!(encode_hostname(&name).unwrap().len(), 255);

        // And one more is too many.
        let name = format!("{}c", name);
        assert!(matches!(encode_hostname(&name), Err(Error::Encoding(_))));
    }

    #[test]
    fn test_reverse_name() {
        assert_eq!(
            reverse_name("1.2.3.4".parse().unwrap()),
            "4.3.2.1.in-addr.arpa"
        );
        assert_eq!(
            reverse_name("2001:db8::567:89ab".parse().unwrap()),
            "b.a.9.8.7.6.5.0.0.0.0.0.0.0.0.0.0.0.0.0.0.0.0.0.8.b.d.0.1.0.0.2.ip6.arpa"
        );
    }

    #[test]
    fn test_encode_reverse() {
        let qname = encode_reverse("8.8.4.4".parse().unwrap()).unwrap();
        assert_eq!(qname.as_bytes(), b"\x014\x014\x018\x018\x07in-addr\x04arpa\x00");

        // 32 single nibble labels, plus "ip6" and "arpa".
        let qname = encode_reverse("::1".parse().unwrap()).unwrap();
        assert_eq!(qname.len(), 32 * 2 + 4 + 5 + 1);
        assert_eq!(&qname.as_bytes()[..4], b"\x011\x010");
        assert_eq!(
            decode_name(qname.as_bytes(), 0).unwrap().0,
            "1.0.0.0.0.0.0.0.0.0.0.0.0.0.0.0.0.0.0.0.0.0.0.0.0.0.0.0.0.0.0.0.ip6.arpa"
        );

        let qname = encode_reverse("1.2.3.4".parse().unwrap()).unwrap();
        assert_eq!(
            decode_name(qname.as_bytes(), 0).unwrap(),
            ("4.3.2.1.in-addr.arpa".to_string(), qname.len())
        );

        let qname = encode_reverse("2001:db8::567:89ab".parse().unwrap()).unwrap();
        assert_eq!(
            decode_name(qname.as_bytes(), 0).unwrap().0,
            "b.a.9.8.7.6.5.0.0.0.0.0.0.0.0.0.0.0.0.0.0.0.0.0.8.b.d.0.1.0.0.2.ip6.arpa"
        );
    }
}
