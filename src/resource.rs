//! Interpretation of RDATA.
use crate::bail;
use crate::errors::Result;
use crate::io::decode_name;
use crate::types::{Resource, Type};
use num_traits::FromPrimitive;
use std::net::{Ipv4Addr, Ipv6Addr};

impl Resource {
    /// Interprets the RDATA found at `buf[start..end]`.
    ///
    /// `buf` must be the whole message, as names within the RDATA may point
    /// back into earlier parts of it.
    pub(crate) fn parse(buf: &[u8], start: usize, end: usize, r#type: u16) -> Result<Resource> {
        let rdata = &buf[start..end];

        let r#type = match Type::from_u16(r#type) {
            Some(t) => t,
            None => return Ok(Resource::Opaque(rdata.to_vec())),
        };

        Ok(match r#type {
            Type::A => Resource::A(parse_a(rdata)?),
            Type::AAAA => Resource::AAAA(parse_aaaa(rdata)?),

            Type::NS => Resource::NS(parse_name(buf, start, end)?),
            Type::CNAME => Resource::CNAME(parse_name(buf, start, end)?),
            Type::PTR => Resource::PTR(parse_name(buf, start, end)?),

            Type::SOA | Type::MX | Type::TXT | Type::SRV => Resource::Opaque(rdata.to_vec()),
        })
    }
}

fn parse_a(rdata: &[u8]) -> Result<Ipv4Addr> {
    let octets: [u8; 4] = match rdata.try_into() {
        Ok(octets) => octets,
        Err(_) => bail!(Malformed, "invalid A record length ({}) expected 4", rdata.len()),
    };

    Ok(Ipv4Addr::from(octets))
}

fn parse_aaaa(rdata: &[u8]) -> Result<Ipv6Addr> {
    let octets: [u8; 16] = match rdata.try_into() {
        Ok(octets) => octets,
        Err(_) => bail!(Malformed, "invalid AAAA record length ({}) expected 16", rdata.len()),
    };

    Ok(Ipv6Addr::from(octets))
}

fn parse_name(buf: &[u8], start: usize, end: usize) -> Result<String> {
    let (name, next) = decode_name(buf, start)?;
    if next != end {
        bail!(
            Malformed,
            "name length ({}) did not match expected record len ({})",
            next - start,
            end - start
        );
    }

    Ok(name)
}
