//! BER-TLV codec for PIV payloads
//!
//! PIV requests and responses use single-byte tags with DER-style lengths
//! (short form, or long form `0x81`/`0x82` for values up to 65535 bytes).
//! Responses are flat sequences of sibling records; each tag of interest
//! appears at most once, so lookups return the first match.

use bytes::{BufMut, Bytes, BytesMut};

/// Errors that can occur while encoding or decoding TLV records
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TlvError {
    /// Unexpected end of data while reading a tag byte
    #[error("unexpected end of data while parsing tag")]
    TruncatedTag,

    /// Unexpected end of data while reading length bytes
    #[error("unexpected end of data while parsing length")]
    TruncatedLength,

    /// Declared value length overruns the buffer
    #[error("value overruns the buffer")]
    TruncatedValue,

    /// Length form not supported by PIV (more than two length bytes)
    #[error("unsupported length encoding")]
    InvalidLength,

    /// Value too long to encode (over 65535 bytes)
    #[error("value too long for TLV encoding: {0}")]
    LengthTooLarge(usize),
}

/// A single tag-length-value record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tlv {
    tag: u8,
    value: Bytes,
}

impl Tlv {
    /// Create a new record, validating the value length
    pub fn new(tag: u8, value: impl Into<Bytes>) -> Result<Self, TlvError> {
        let value = value.into();
        if value.len() > 0xFFFF {
            return Err(TlvError::LengthTooLarge(value.len()));
        }
        Ok(Self { tag, value })
    }

    /// The record's tag
    pub const fn tag(&self) -> u8 {
        self.tag
    }

    /// The record's value bytes
    pub const fn value(&self) -> &Bytes {
        &self.value
    }

    /// Encode the record as tag, DER length, value
    pub fn to_bytes(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(self.value.len() + 4);
        buf.put_u8(self.tag);
        match self.value.len() {
            len if len < 0x80 => buf.put_u8(len as u8),
            len if len <= 0xFF => {
                buf.put_u8(0x81);
                buf.put_u8(len as u8);
            }
            len => {
                buf.put_u8(0x82);
                buf.put_u16(len as u16);
            }
        }
        buf.put_slice(&self.value);
        buf.freeze()
    }

    /// Parse one record from the front of `data`, returning it and the rest
    pub fn parse(data: &[u8]) -> Result<(Self, &[u8]), TlvError> {
        let (&tag, rest) = data.split_first().ok_or(TlvError::TruncatedTag)?;
        let (&first, rest) = rest.split_first().ok_or(TlvError::TruncatedLength)?;

        let (len, rest) = match first {
            len if len < 0x80 => (len as usize, rest),
            0x81 => {
                let (&len, rest) = rest.split_first().ok_or(TlvError::TruncatedLength)?;
                (len as usize, rest)
            }
            0x82 => {
                if rest.len() < 2 {
                    return Err(TlvError::TruncatedLength);
                }
                let len = u16::from_be_bytes([rest[0], rest[1]]) as usize;
                (len, &rest[2..])
            }
            _ => return Err(TlvError::InvalidLength),
        };

        if rest.len() < len {
            return Err(TlvError::TruncatedValue);
        }

        let tlv = Self {
            tag,
            value: Bytes::copy_from_slice(&rest[..len]),
        };
        Ok((tlv, &rest[len..]))
    }

    /// Parse exactly one record, rejecting trailing bytes
    pub fn from_bytes(data: &[u8]) -> Result<Self, TlvError> {
        let (tlv, rest) = Self::parse(data)?;
        if !rest.is_empty() {
            return Err(TlvError::TruncatedValue);
        }
        Ok(tlv)
    }

    /// Parse a flat sequence of sibling records
    pub fn parse_all(mut data: &[u8]) -> Result<Vec<Self>, TlvError> {
        let mut records = Vec::new();
        while !data.is_empty() {
            let (tlv, rest) = Self::parse(data)?;
            records.push(tlv);
            data = rest;
        }
        Ok(records)
    }
}

/// Find the first record with the given tag
pub fn find(records: &[Tlv], tag: u8) -> Option<&Tlv> {
    records.iter().find(|tlv| tlv.tag() == tag)
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    fn round_trip(len: usize) {
        let value = vec![0x5A; len];
        let tlv = Tlv::new(0x06, value.clone()).unwrap();
        let encoded = tlv.to_bytes();
        let decoded = Tlv::from_bytes(&encoded).unwrap();
        assert_eq!(decoded.tag(), 0x06);
        assert_eq!(decoded.value().as_ref(), &value[..]);
    }

    #[test]
    fn test_round_trip_boundary_lengths() {
        for len in [0, 1, 127, 128, 65535] {
            round_trip(len);
        }
    }

    #[test]
    fn test_length_forms() {
        let tlv = Tlv::new(0x80, vec![0u8; 127]).unwrap();
        assert_eq!(&tlv.to_bytes()[..2], &[0x80, 0x7F]);

        let tlv = Tlv::new(0x80, vec![0u8; 128]).unwrap();
        assert_eq!(&tlv.to_bytes()[..3], &[0x80, 0x81, 0x80]);

        let tlv = Tlv::new(0x80, vec![0u8; 256]).unwrap();
        assert_eq!(&tlv.to_bytes()[..4], &[0x80, 0x82, 0x01, 0x00]);
    }

    #[test]
    fn test_value_too_long() {
        assert_eq!(
            Tlv::new(0x80, vec![0u8; 65536]),
            Err(TlvError::LengthTooLarge(65536))
        );
    }

    #[test]
    fn test_parse_sequence_first_match() {
        // 05 01 01 / 06 02 03 05 / 06 02 07 07
        let data = hex!("050101 06020305 06020707");
        let records = Tlv::parse_all(&data).unwrap();
        assert_eq!(records.len(), 3);

        let retries = find(&records, 0x06).unwrap();
        assert_eq!(retries.value().as_ref(), &[0x03, 0x05]);
        assert!(find(&records, 0x01).is_none());
    }

    #[test]
    fn test_malformed() {
        assert_eq!(Tlv::parse(&[]), Err(TlvError::TruncatedTag));
        assert_eq!(Tlv::parse(&[0x80]), Err(TlvError::TruncatedLength));
        assert_eq!(Tlv::parse(&[0x80, 0x81]), Err(TlvError::TruncatedLength));
        assert_eq!(Tlv::parse(&[0x80, 0x82, 0x01]), Err(TlvError::TruncatedLength));
        // Declared 4 bytes, only 2 present
        assert_eq!(
            Tlv::parse(&hex!("80040102")),
            Err(TlvError::TruncatedValue)
        );
        // Three-byte length form is not used by PIV
        assert_eq!(Tlv::parse(&[0x80, 0x83, 0x00]), Err(TlvError::InvalidLength));
        // Trailing garbage after a single record
        assert_eq!(
            Tlv::from_bytes(&hex!("800100FF")),
            Err(TlvError::TruncatedValue)
        );
    }

    #[test]
    fn test_nested_template() {
        // 7C 0A 80 08 <8 bytes>
        let witness = Tlv::new(0x80, Bytes::from_static(&hex!("0011223344556677"))).unwrap();
        let outer = Tlv::new(0x7C, witness.to_bytes()).unwrap();
        let encoded = outer.to_bytes();
        assert_eq!(encoded[0], 0x7C);

        let parsed = Tlv::from_bytes(&encoded).unwrap();
        let inner = Tlv::from_bytes(parsed.value()).unwrap();
        assert_eq!(inner.tag(), 0x80);
        assert_eq!(inner.value().as_ref(), &hex!("0011223344556677"));
    }
}
