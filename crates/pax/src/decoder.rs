//! Decoder for the length-prefixed attribute listing returned by
//! [`AttributeStore::list`](hbsd_extattr::AttributeStore::list).
//!
//! The buffer is a plain concatenation of entries, each one length byte followed
//! by that many name bytes. There is no count prefix and no terminator.

use crate::error::PaxError;
use std::fmt;

/// Names decoded from one listing call, in buffer order.
///
/// Entries borrow from the buffer they were decoded from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttributeListing<'a> {
    entries: Vec<&'a [u8]>,
}

impl<'a> AttributeListing<'a> {
    #[must_use]
    pub fn entries(&self) -> &[&'a [u8]] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a [u8]> + '_ {
        self.entries.iter().copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'a> IntoIterator for AttributeListing<'a> {
    type Item = &'a [u8];
    type IntoIter = std::vec::IntoIter<&'a [u8]>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl fmt::Display for AttributeListing<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, entry) in self.entries.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", String::from_utf8_lossy(entry))?;
        }
        Ok(())
    }
}

/// Cursor over a listing buffer that never reads past its end.
struct ListingReader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> ListingReader<'a> {
    const fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    const fn is_exhausted(&self) -> bool {
        self.pos >= self.buf.len()
    }

    fn next_entry(&mut self) -> Result<&'a [u8], PaxError> {
        let Some(&len) = self.buf.get(self.pos) else {
            return Err(self.truncated(1));
        };
        let start = self.pos + 1;
        let end = start + usize::from(len);
        let Some(name) = self.buf.get(start..end) else {
            return Err(self.truncated(end - self.buf.len()));
        };
        self.pos = end;
        Ok(name)
    }

    fn truncated(&self, missing: usize) -> PaxError {
        PaxError::MalformedAttributeList {
            message: format!(
                "entry at offset {} needs {missing} more byte(s) than the {}-byte buffer holds",
                self.pos,
                self.buf.len()
            )
            .into(),
            context: None,
        }
    }
}

/// Decodes every entry of `buffer`.
///
/// An empty buffer yields an empty listing. Zero-length entries are kept as empty
/// names; they never match a feature.
///
/// # Errors
/// Returns [`PaxError::MalformedAttributeList`] when a length byte claims more
/// bytes than remain in the buffer.
pub fn decode(buffer: &[u8]) -> Result<AttributeListing<'_>, PaxError> {
    let mut reader = ListingReader::new(buffer);
    let mut entries = Vec::new();
    while !reader.is_exhausted() {
        entries.push(reader.next_entry()?);
    }
    tracing::trace!(bytes = buffer.len(), entries = entries.len(), "decoded attribute listing");
    Ok(AttributeListing { entries })
}

#[cfg(test)]
mod tests {
    use super::*;
    use hbsd_extattr::encode_listing;

    #[test]
    fn test_empty_buffer() {
        let listing = decode(&[]).unwrap();
        assert!(listing.is_empty());
    }

    #[test]
    fn test_decodes_in_order() {
        let buf = b"\x0dhbsd.pax.aslr\x03md5\x0fhbsd.pax.noaslr";
        let listing = decode(buf).unwrap();
        assert_eq!(
            listing.entries(),
            [&b"hbsd.pax.aslr"[..], &b"md5"[..], &b"hbsd.pax.noaslr"[..]]
        );
        assert_eq!(listing.to_string(), "hbsd.pax.aslr, md5, hbsd.pax.noaslr");
    }

    #[test]
    fn test_matches_store_encoder() {
        let buf = encode_listing(["hbsd.pax.segvguard", "user.comment"]).unwrap();
        let names: Vec<_> = decode(&buf).unwrap().into_iter().collect();
        assert_eq!(names, [&b"hbsd.pax.segvguard"[..], &b"user.comment"[..]]);
    }

    #[test]
    fn test_final_length_overruns_buffer() {
        let err = decode(b"\x03md5\x0dhbsd.pax").unwrap_err();
        assert!(matches!(err, PaxError::MalformedAttributeList { .. }));
        assert!(err.to_string().contains("offset 4"));
    }

    #[test]
    fn test_single_oversized_length_byte() {
        assert!(matches!(decode(&[0xff]), Err(PaxError::MalformedAttributeList { .. })));
        assert!(matches!(decode(&[0x01]), Err(PaxError::MalformedAttributeList { .. })));
    }

    #[test]
    fn test_zero_length_entries() {
        let listing = decode(&[0, 0, 1, b'x']).unwrap();
        assert_eq!(listing.entries(), [&b""[..], &b""[..], &b"x"[..]]);
    }
}
