//! Various traits to help parsing of DNS messages.

use crate::bail;
use crate::errors::Result;
use crate::name::MAX_NAME_LEN;
use byteorder::ReadBytesExt;
use std::io;
use std::io::Cursor;
use std::io::SeekFrom;

/// Upper bound on labels plus compression pointers followed while reading
/// a single name.
pub const MAX_LABELS: usize = 128;

pub trait SeekExt: io::Seek {
    /// Returns the number of bytes remaining to be consumed.
    /// This is used as a way to check for malformed input.
    fn remaining(&mut self) -> io::Result<u64>;
}

impl<'a> SeekExt for Cursor<&'a [u8]> {
    fn remaining(&mut self) -> io::Result<u64> {
        let len = self.get_ref().len() as u64;
        Ok(len.saturating_sub(self.position()))
    }
}

/// All types that implement `Read` and `Seek` get methods defined
/// in `DNSReadExt` for free.
impl<R: io::Read + ?Sized + io::Seek> DNSReadExt for R {}

/// Extensions to io::Read to add some DNS specific types.
pub trait DNSReadExt: io::Read + io::Seek {
    /// Reads a domain name, following compression pointers.
    ///
    /// The stream must start at the beginning of the DNS message, as pointers
    /// are offsets from the start of the stream. Returns the labels joined with
    /// `.`, without a trailing dot, so the root domain is the empty string. On
    /// return the stream is positioned just after the name as it appeared
    /// inline, i.e. after the first pointer if one was followed.
    ///
    /// # Errors
    ///
    /// Will return a [`crate::Error::Malformed`] if the name runs past the end of
    /// the stream, uses a pointer that does not point strictly backwards, uses a
    /// reserved label type, or is longer than allowed.
    fn read_qname(&mut self) -> Result<String> {
        let mut labels: Vec<String> = Vec::new();

        // Labels and pointers followed so far.
        let mut steps = 0;

        // Encoded length of the name, including the final root label.
        let mut len_on_wire = 1;

        // Where to continue from once done, set by the first pointer.
        let mut resume = None;

        loop {
            let pos = self.stream_position()?;
            let len = self.read_u8()?;

            if len != 0 {
                steps += 1;
                if steps > MAX_LABELS {
                    bail!(Malformed, "name at offset {} has too many labels", pos);
                }
            }

            match len & 0xC0 {
                // No compression
                0x00 => {
                    if len == 0 {
                        break;
                    }

                    len_on_wire += 1 + usize::from(len);
                    if len_on_wire > MAX_NAME_LEN {
                        bail!(Malformed, "name at offset {} is too long", pos);
                    }

                    let mut label = vec![0; len.into()];
                    self.read_exact(&mut label)?;

                    if !label.is_ascii() {
                        bail!(Malformed, "invalid label at offset {}: not valid ascii", pos);
                    }

                    // Any ASCII is valid UTF-8.
                    labels.push(label.into_iter().map(char::from).collect());
                }

                // Compression
                0xC0 => {
                    // Read the 14 bit pointer.
                    let b2 = self.read_u8()?;
                    let ptr = u64::from(u16::from(len & 0x3F) << 8 | u16::from(b2));

                    // Make sure we don't get into a loop.
                    if ptr >= pos {
                        bail!(
                            Malformed,
                            "invalid compressed pointer at offset {} pointing to {}",
                            pos,
                            ptr
                        );
                    }

                    if resume.is_none() {
                        resume = Some(self.stream_position()?);
                    }

                    self.seek(SeekFrom::Start(ptr))?;
                }

                // 0x40 and 0x80 are reserved (or the obsolete extended labels).
                _ => bail!(
                    Malformed,
                    "unsupported label type {:#04x} at offset {}",
                    len & 0xC0,
                    pos
                ),
            }
        }

        if let Some(resume) = resume {
            self.seek(SeekFrom::Start(resume))?;
        }

        Ok(labels.join("."))
    }
}

/// Decodes the name starting at `offset` within the DNS message `buf`.
///
/// Returns the dotted name and the offset of the first byte after it.
pub fn decode_name(buf: &[u8], offset: usize) -> Result<(String, usize)> {
    let mut cur = Cursor::new(buf);
    cur.set_position(offset as u64);

    let name = cur.read_qname()?;

    Ok((name, cur.position() as usize))
}
