use crate::bail;
use crate::errors::Result;
use crate::io::{DNSReadExt, SeekExt};
use crate::name::QName;
use crate::types::*;
use byteorder::{ReadBytesExt, BE};
use log::warn;
use std::fmt;
use std::io::Cursor;

/// A query holding exactly one question, for the Internet class.
///
/// # Example
///
/// ```rust
/// use stubdns::name::encode_hostname;
/// use stubdns::{Query, Transport, Type};
///
/// let query = Query::with_id(0x1234, encode_hostname("bramp.net").unwrap(), Type::A);
///
/// let udp = query.to_frame(Transport::Udp);
/// let tcp = query.to_frame(Transport::Tcp);
///
/// assert_eq!(&udp[..4], &[0x12, 0x34, 0x01, 0x00]);
/// assert_eq!(&tcp[2..], &udp[..]);
/// assert_eq!(u16::from_be_bytes([tcp[0], tcp[1]]) as usize, udp.len());
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Query {
    /// Transaction ID, echoed back by the server.
    pub id: u16,
    pub qname: QName,
    pub r#type: Type,
}

impl Query {
    /// Creates a query with a fresh random ID.
    pub fn new(qname: QName, r#type: Type) -> Query {
        Query::with_id(rand::random(), qname, r#type)
    }

    pub fn with_id(id: u16, qname: QName, r#type: Type) -> Query {
        Query { id, qname, r#type }
    }

    /// Returns this query as a Vec<u8>, as defined by [rfc1035](https://datatracker.ietf.org/doc/html/rfc1035).
    ///
    /// Only RD is set in the flags, and the only count is QDCOUNT = 1.
    pub fn to_vec(&self) -> Vec<u8> {
        let mut req = Vec::<u8>::with_capacity(12 + self.qname.len() + 4);

        req.extend_from_slice(&self.id.to_be_bytes());

        // QR, Opcode, AA, TC are all zero, RD is set.
        req.push(0b0000_0001);
        // RA, Z, RCODE are all zero.
        req.push(0b0000_0000);

        req.extend_from_slice(&1_u16.to_be_bytes()); // QDCOUNT
        req.extend_from_slice(&0_u16.to_be_bytes()); // ANCOUNT
        req.extend_from_slice(&0_u16.to_be_bytes()); // NSCOUNT
        req.extend_from_slice(&0_u16.to_be_bytes()); // ARCOUNT

        req.extend_from_slice(self.qname.as_bytes());
        req.extend_from_slice(&(self.r#type as u16).to_be_bytes());
        req.extend_from_slice(&CLASS_IN.to_be_bytes());

        req
    }

    /// Returns the bytes to send over the given transport.
    ///
    /// TCP and DoT get a two byte big-endian length prefix, see
    /// [rfc1035#section-4.2.2](https://datatracker.ietf.org/doc/html/rfc1035#section-4.2.2).
    pub fn to_frame(&self, transport: Transport) -> Vec<u8> {
        let message = self.to_vec();
        if !transport.is_length_prefixed() {
            return message;
        }

        let mut frame = Vec::with_capacity(2 + message.len());

        // A query is at most 12 + 255 + 4 bytes, so this never truncates.
        frame.extend_from_slice(&(message.len() as u16).to_be_bytes());
        frame.extend_from_slice(&message);
        frame
    }
}

// A helper class to hold state while the parsing is happening.
pub(crate) struct MessageParser<'a> {
    cur: Cursor<&'a [u8]>,

    m: Message,
}

#[derive(Copy, Clone, PartialEq)]
enum RecordSection {
    Answers,
    Authorities,
    Additionals,
}

impl<'a> MessageParser<'a> {
    fn new(buf: &'a [u8]) -> MessageParser<'a> {
        MessageParser {
            cur: Cursor::new(buf),
            m: Message::default(),
        }
    }

    /// Consume the MessageParser and returned the resulting Message.
    fn parse(mut self) -> Result<Message> {
        if self.cur.get_ref().len() < 12 {
            bail!(
                Malformed,
                "message of {} bytes is shorter than a header",
                self.cur.get_ref().len()
            );
        }

        self.m.id = self.cur.read_u16::<BE>()?;

        let b = self.cur.read_u8()?;
        self.m.qr = QR::from_bool(0b1000_0000 & b != 0);
        self.m.opcode = (0b0111_1000 & b) >> 3;
        self.m.aa = (0b0000_0100 & b) != 0;
        self.m.tc = (0b0000_0010 & b) != 0;
        self.m.rd = (0b0000_0001 & b) != 0;

        let b = self.cur.read_u8()?;
        self.m.ra = (0b1000_0000 & b) != 0;
        self.m.z = (0b0111_0000 & b) >> 4;
        self.m.rcode = 0b0000_1111 & b;

        self.m.qd_count = self.cur.read_u16::<BE>()?;
        self.m.an_count = self.cur.read_u16::<BE>()?;
        self.m.ns_count = self.cur.read_u16::<BE>()?;
        self.m.ar_count = self.cur.read_u16::<BE>()?;

        self.read_questions(self.m.qd_count)?;
        self.read_records(self.m.an_count, RecordSection::Answers)?;
        self.read_records(self.m.ns_count, RecordSection::Authorities)?;
        self.read_records(self.m.ar_count, RecordSection::Additionals)?;

        let remaining = self.cur.remaining()?;
        if remaining > 0 {
            warn!("finished parsing with {} bytes left over", remaining);
        }

        Ok(self.m)
    }

    fn read_questions(&mut self, count: u16) -> Result<()> {
        for _ in 0..count {
            let name = self.cur.read_qname()?;
            let r#type = self.cur.read_u16::<BE>()?;
            let class = self.cur.read_u16::<BE>()?;

            self.m.questions.push(Question {
                name,
                r#type,
                class,
            });
        }

        Ok(())
    }

    fn read_records(&mut self, count: u16, section: RecordSection) -> Result<()> {
        for _ in 0..count {
            let record = self.read_record()?;

            let records = match section {
                RecordSection::Answers => &mut self.m.answers,
                RecordSection::Authorities => &mut self.m.authoritys,
                RecordSection::Additionals => &mut self.m.additionals,
            };
            records.push(record);
        }

        Ok(())
    }

    fn read_record(&mut self) -> Result<Record> {
        let name = self.cur.read_qname()?;
        let r#type = self.cur.read_u16::<BE>()?;
        let class = self.cur.read_u16::<BE>()?;
        let ttl = self.cur.read_u32::<BE>()?;
        let len = self.cur.read_u16::<BE>()?;

        let buf: &'a [u8] = *self.cur.get_ref();
        let start = self.cur.position() as usize;
        let end = start + usize::from(len);

        if end > buf.len() {
            bail!(
                Malformed,
                "record '{}' has RDLENGTH {} but only {} bytes remain",
                name,
                len,
                buf.len().saturating_sub(start)
            );
        }

        let resource = Resource::parse(buf, start, end, r#type)?;
        self.cur.set_position(end as u64);

        Ok(Record {
            name,
            r#type,
            class,
            ttl,
            rdata: buf[start..end].to_vec(),
            resource,
        })
    }
}

impl Message {
    /// Parses a DNS message, as defined by [rfc1035](https://datatracker.ietf.org/doc/html/rfc1035).
    pub fn from_slice(buf: &[u8]) -> Result<Message> {
        MessageParser::new(buf).parse()
    }

    /// Parses a response as received over the given transport.
    ///
    /// For TCP and DoT the leading length prefix is stripped first, so name
    /// compression offsets are resolved relative to the DNS message itself.
    pub fn from_frame(buf: &[u8], transport: Transport) -> Result<Message> {
        if !transport.is_length_prefixed() {
            return Message::from_slice(buf);
        }

        if buf.len() < 2 {
            bail!(Malformed, "response of {} bytes has no length prefix", buf.len());
        }

        let len = usize::from(u16::from_be_bytes([buf[0], buf[1]]));
        let rest = &buf[2..];
        if len > rest.len() {
            bail!(
                Malformed,
                "length prefix claims {} bytes but only {} were received",
                len,
                rest.len()
            );
        }

        Message::from_slice(&rest[..len])
    }

    /// Checks the header echoes what a response to a standard query should.
    ///
    /// Some resolvers vary these fields, so a mismatch is only worth a warning.
    pub fn header_warnings(&self, expected_id: u16) -> Vec<HeaderWarning> {
        let mut warnings = Vec::new();

        if self.id != expected_id {
            warnings.push(HeaderWarning::IdMismatch {
                expected: expected_id,
                got: self.id,
            });
        }
        if self.qr != QR::Response {
            warnings.push(HeaderWarning::NotAResponse);
        }
        if self.opcode != 0 {
            warnings.push(HeaderWarning::Opcode(self.opcode));
        }
        if self.tc {
            warnings.push(HeaderWarning::Truncated);
        }
        if self.rcode != 0 {
            warnings.push(HeaderWarning::Rcode(self.rcode));
        }
        if self.qd_count != 1 {
            warnings.push(HeaderWarning::QuestionCount(self.qd_count));
        }

        warnings
    }
}

/// A response header field that differs from what was expected.
#[derive(Clone, Debug, PartialEq)]
pub enum HeaderWarning {
    IdMismatch { expected: u16, got: u16 },
    NotAResponse,
    Opcode(u8),
    Truncated,
    Rcode(u8),
    QuestionCount(u16),
}

impl fmt::Display for HeaderWarning {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            HeaderWarning::IdMismatch { expected, got } => {
                write!(f, "id mismatch: expected {} got {}", expected, got)
            }
            HeaderWarning::NotAResponse => write!(f, "qr bit not set"),
            HeaderWarning::Opcode(opcode) => write!(f, "unexpected opcode {}", opcode),
            HeaderWarning::Truncated => write!(f, "message truncated"),
            HeaderWarning::Rcode(rcode) => write!(f, "status {}", Rcode::name(*rcode)),
            HeaderWarning::QuestionCount(n) => write!(f, "expected 1 question got {}", n),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::name::{encode_hostname, encode_reverse};
    use crate::Error;
    use pretty_assertions::assert_eq;

    // "example.com A", the answer uses a pointer back to the question.
    const EXAMPLE_COM: &[u8] = &[
        0xab, 0xcd, 0x81, 0x80, 0x00, 0x01, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00, //
        0x07, b'e', b'x', b'a', b'm', b'p', b'l', b'e', 0x03, b'c', b'o', b'm', 0x00, //
        0x00, 0x01, 0x00, 0x01, //
        0xc0, 0x0c, 0x00, 0x01, 0x00, 0x01, 0x00, 0x00, 0x0e, 0x10, 0x00, 0x04, //
        93, 184, 216, 34,
    ];

    #[test]
    fn test_query_to_vec() {
        let query = Query::with_id(0xeccb, encode_hostname("bramp.net").unwrap(), Type::AAAA);
        assert_eq!(
            query.to_vec(),
            b"\xec\xcb\x01\x00\x00\x01\x00\x00\x00\x00\x00\x00\x05bramp\x03net\x00\x00\x1c\x00\x01"
        );

        // Same id, same bytes.
        let again = Query::with_id(0xeccb, encode_hostname("bramp.net").unwrap(), Type::AAAA);
        assert_eq!(again.to_vec(), query.to_vec());
    }

    #[test]
    fn test_query_frames() {
        let query = Query::new(encode_reverse("1.2.3.4".parse().unwrap()).unwrap(), Type::PTR);

        for transport in &[Transport::Udp, Transport::Doh] {
            assert_eq!(query.to_frame(*transport), query.to_vec());
        }

        for transport in &[Transport::Tcp, Transport::Dot] {
            let frame = query.to_frame(*transport);
            assert_eq!(
                usize::from(u16::from_be_bytes([frame[0], frame[1]])),
                frame.len() - 2
            );
            assert_eq!(&frame[2..], &query.to_vec()[..]);
        }
    }

    #[test]
    fn test_parse_example_com() {
        let m = Message::from_slice(EXAMPLE_COM).unwrap();

        assert_eq!(m.id, 0xabcd);
        assert_eq!(m.qr, QR::Response);
        assert!(m.rd);
        assert!(m.ra);
        assert!(!m.tc);
        assert_eq!(m.rcode, 0);
        assert_eq!(m.an_count, 1);

        assert_eq!(
            m.question(),
            Some(&Question {
                name: "example.com".to_string(),
                r#type: 1,
                class: 1,
            })
        );

        assert_eq!(m.answers.len(), 1);
        let answer = &m.answers[0];
        assert_eq!(answer.name, "example.com");
        assert_eq!(answer.r#type, 1);
        assert_eq!(answer.ttl, 3600);
        assert_eq!(answer.rdlength(), 4);
        assert_eq!(answer.resource, Resource::A("93.184.216.34".parse().unwrap()));
        assert_eq!(answer.resource.to_string(), "93.184.216.34");

        assert!(m.header_warnings(0xabcd).is_empty());
    }

    #[test]
    fn test_parse_tcp_frame() {
        let mut frame = (EXAMPLE_COM.len() as u16).to_be_bytes().to_vec();
        frame.extend_from_slice(EXAMPLE_COM);

        let m = Message::from_frame(&frame, Transport::Tcp).unwrap();
        assert_eq!(m, Message::from_slice(EXAMPLE_COM).unwrap());
        assert_eq!(m.answers[0].name, "example.com");

        // Without the prefix stripped, the pointers would be off by two.
        assert!(Message::from_frame(&frame, Transport::Udp).is_err());
    }

    #[test]
    fn test_parse_short_tcp_frame() {
        let mut frame = ((EXAMPLE_COM.len() + 10) as u16).to_be_bytes().to_vec();
        frame.extend_from_slice(EXAMPLE_COM);

        assert!(matches!(
            Message::from_frame(&frame, Transport::Dot),
            Err(Error::Malformed(_))
        ));
        assert!(matches!(
            Message::from_frame(&[0x00], Transport::Tcp),
            Err(Error::Malformed(_))
        ));
    }

    #[test]
    fn test_parse_rdlength_too_long() {
        let mut buf = EXAMPLE_COM.to_vec();
        let len = buf.len();
        buf[len - 5] = 0x08; // RDLENGTH of 8, with only 4 bytes left.

        assert!(matches!(Message::from_slice(&buf), Err(Error::Malformed(_))));
    }

    #[test]
    fn test_parse_bad_address_length() {
        let mut buf = EXAMPLE_COM.to_vec();
        let len = buf.len();
        buf[len - 5] = 0x03; // RDLENGTH of 3 for an A record.

        assert!(matches!(Message::from_slice(&buf), Err(Error::Malformed(_))));
    }

    #[test]
    fn test_parse_truncated() {
        for len in 0..EXAMPLE_COM.len() {
            assert!(
                matches!(Message::from_slice(&EXAMPLE_COM[..len]), Err(Error::Malformed(_))),
                "parsing {} bytes should fail",
                len
            );
        }
    }

    #[test]
    fn test_parse_trailing_bytes() {
        let mut buf = EXAMPLE_COM.to_vec();
        buf.extend_from_slice(&[0, 0, 0]);

        let m = Message::from_slice(&buf).unwrap();
        assert_eq!(m.answers.len(), 1);
    }

    #[test]
    fn test_header_warnings() {
        let mut buf = EXAMPLE_COM.to_vec();
        buf[2] = 0x03; // Query, not a response, with TC and RD set.
        buf[3] = 0x03; // NXDomain

        let m = Message::from_slice(&buf).unwrap();
        assert_eq!(
            m.header_warnings(0x1111),
            vec![
                HeaderWarning::IdMismatch {
                    expected: 0x1111,
                    got: 0xabcd
                },
                HeaderWarning::NotAResponse,
                HeaderWarning::Truncated,
                HeaderWarning::Rcode(3),
            ]
        );
        assert_eq!(HeaderWarning::Rcode(3).to_string(), "status NXDomain");
    }
}
