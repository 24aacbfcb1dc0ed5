//! APDU command definitions
//!
//! This module provides types for building APDU commands according to
//! ISO/IEC 7816-4, in both short and extended framing.

use bytes::{BufMut, Bytes, BytesMut};

use crate::{Error, Result};

/// APDU framing mode
///
/// Short framing caps the payload at 255 bytes and the expected response
/// length at 256; extended framing uses 2-byte length fields and supports
/// payloads up to 65535 bytes. The caller selects the mode; serialization
/// never switches modes silently.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApduFormat {
    /// Single-byte Lc/Le fields
    Short,
    /// Extended (2-byte) Lc/Le fields
    Extended,
}

impl ApduFormat {
    /// Maximum payload length encodable in this format
    pub const fn max_payload_len(self) -> usize {
        match self {
            Self::Short => 255,
            Self::Extended => 65535,
        }
    }

    /// Maximum expected response length encodable in this format
    pub const fn max_expected_len(self) -> u32 {
        match self {
            Self::Short => 256,
            Self::Extended => 65536,
        }
    }
}

/// Generic APDU command structure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    /// Command class byte
    pub cla: u8,
    /// Instruction byte
    pub ins: u8,
    /// Parameter 1
    pub p1: u8,
    /// Parameter 2
    pub p2: u8,
    /// Command data (optional)
    pub data: Option<Bytes>,
    /// Expected response length (optional)
    pub le: Option<u32>,
}

impl Command {
    /// Create a new command with just the header bytes
    pub const fn new(cla: u8, ins: u8, p1: u8, p2: u8) -> Self {
        Self {
            cla,
            ins,
            p1,
            p2,
            data: None,
            le: None,
        }
    }

    /// Create a new command with data payload
    pub fn new_with_data<T: Into<Bytes>>(cla: u8, ins: u8, p1: u8, p2: u8, data: T) -> Self {
        Self {
            cla,
            ins,
            p1,
            p2,
            data: Some(data.into()),
            le: None,
        }
    }

    /// Set the data field
    pub fn with_data<T: Into<Bytes>>(mut self, data: T) -> Self {
        self.data = Some(data.into());
        self
    }

    /// Set the expected length field
    pub const fn with_le(mut self, le: u32) -> Self {
        self.le = Some(le);
        self
    }

    /// Serialize the command in the given framing mode
    ///
    /// Fails with [`Error::PayloadTooLong`] or [`Error::ExpectedLengthTooLong`]
    /// when a field does not fit the selected format.
    pub fn serialize(&self, format: ApduFormat) -> Result<Bytes> {
        if let Some(data) = &self.data {
            if data.len() > format.max_payload_len() {
                return Err(Error::PayloadTooLong {
                    len: data.len(),
                    max: format.max_payload_len(),
                });
            }
        }
        if let Some(le) = self.le {
            if le == 0 || le > format.max_expected_len() {
                return Err(Error::ExpectedLengthTooLong {
                    le,
                    max: format.max_expected_len(),
                });
            }
        }

        let mut buffer = BytesMut::with_capacity(self.serialized_len(format));

        // Header: CLA, INS, P1, P2
        buffer.put_u8(self.cla);
        buffer.put_u8(self.ins);
        buffer.put_u8(self.p1);
        buffer.put_u8(self.p2);

        // Lc and data
        if let Some(data) = &self.data {
            match format {
                ApduFormat::Short => buffer.put_u8(data.len() as u8),
                ApduFormat::Extended => {
                    buffer.put_u8(0x00);
                    buffer.put_u16(data.len() as u16);
                }
            }
            buffer.put_slice(data);
        }

        // Le; a maximal value encodes as zero in both formats
        if let Some(le) = self.le {
            match format {
                ApduFormat::Short => buffer.put_u8(le as u8),
                ApduFormat::Extended => {
                    if self.data.is_none() {
                        buffer.put_u8(0x00);
                    }
                    buffer.put_u16(le as u16);
                }
            }
        }

        Ok(buffer.freeze())
    }

    /// Length of the serialized command in the given format
    fn serialized_len(&self, format: ApduFormat) -> usize {
        // Header is always 4 bytes
        let mut length = 4;

        if let Some(data) = &self.data {
            length += data.len();
            length += match format {
                ApduFormat::Short => 1,
                ApduFormat::Extended => 3,
            };
        }

        if self.le.is_some() {
            length += match format {
                ApduFormat::Short => 1,
                ApduFormat::Extended => {
                    if self.data.is_some() {
                        2
                    } else {
                        3
                    }
                }
            };
        }

        length
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_serialization() {
        let data = Bytes::from_static(&[0xA0, 0x00, 0x00, 0x01, 0x51, 0x00]);
        let cmd = Command::new_with_data(0x00, 0xA4, 0x04, 0x00, data).with_le(256);
        let bytes = cmd.serialize(ApduFormat::Short).unwrap();

        assert_eq!(
            bytes.as_ref(),
            &[0x00, 0xA4, 0x04, 0x00, 0x06, 0xA0, 0x00, 0x00, 0x01, 0x51, 0x00, 0x00]
        );
    }

    #[test]
    fn test_short_no_data() {
        let cmd = Command::new(0x00, 0xB0, 0x00, 0x00);
        assert_eq!(
            cmd.serialize(ApduFormat::Short).unwrap().as_ref(),
            &[0x00, 0xB0, 0x00, 0x00]
        );

        let cmd = Command::new(0x00, 0xB0, 0x00, 0x00).with_le(0xFF);
        assert_eq!(
            cmd.serialize(ApduFormat::Short).unwrap().as_ref(),
            &[0x00, 0xB0, 0x00, 0x00, 0xFF]
        );
    }

    #[test]
    fn test_extended_serialization() {
        let data = Bytes::from(vec![0xAB; 300]);
        let cmd = Command::new_with_data(0x00, 0xD6, 0x00, 0x00, data).with_le(65536);
        let bytes = cmd.serialize(ApduFormat::Extended).unwrap();

        assert_eq!(&bytes[..4], &[0x00, 0xD6, 0x00, 0x00]);
        // Extended Lc: 00 01 2C
        assert_eq!(&bytes[4..7], &[0x00, 0x01, 0x2C]);
        assert_eq!(&bytes[7..307], &[0xAB; 300][..]);
        // Extended Le: 00 00 (65536)
        assert_eq!(&bytes[307..], &[0x00, 0x00]);
        assert_eq!(bytes.len(), 309);
    }

    #[test]
    fn test_extended_le_without_data() {
        let cmd = Command::new(0x00, 0xCB, 0x3F, 0xFF).with_le(1024);
        let bytes = cmd.serialize(ApduFormat::Extended).unwrap();
        assert_eq!(bytes.as_ref(), &[0x00, 0xCB, 0x3F, 0xFF, 0x00, 0x04, 0x00]);
    }

    #[test]
    fn test_short_payload_limit() {
        let cmd = Command::new_with_data(0x00, 0xD6, 0x00, 0x00, Bytes::from(vec![0u8; 256]));
        // Caller must select extended framing; short framing refuses
        assert!(matches!(
            cmd.serialize(ApduFormat::Short),
            Err(Error::PayloadTooLong { len: 256, max: 255 })
        ));
        assert!(cmd.serialize(ApduFormat::Extended).is_ok());
    }

    #[test]
    fn test_extended_payload_limit() {
        let cmd = Command::new_with_data(0x00, 0xD6, 0x00, 0x00, Bytes::from(vec![0u8; 65536]));
        assert!(matches!(
            cmd.serialize(ApduFormat::Extended),
            Err(Error::PayloadTooLong { .. })
        ));
    }

    #[test]
    fn test_le_limits() {
        let cmd = Command::new(0x00, 0xB0, 0x00, 0x00).with_le(257);
        assert!(matches!(
            cmd.serialize(ApduFormat::Short),
            Err(Error::ExpectedLengthTooLong { .. })
        ));
        assert!(cmd.serialize(ApduFormat::Extended).is_ok());
    }
}
