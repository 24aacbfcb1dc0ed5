//! APDU response definitions
//!
//! This module provides types for working with APDU responses
//! according to ISO/IEC 7816-4.

pub mod status;

use bytes::{BufMut, Bytes, BytesMut};
use tracing::trace;

use crate::{Error, Result};
use status::StatusWord;

/// Basic APDU response structure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// Response payload data
    payload: Option<Bytes>,
    /// Status word
    status: StatusWord,
}

impl Response {
    /// Create a new response with payload and status
    pub fn new(payload: Option<Bytes>, status: impl Into<StatusWord>) -> Self {
        Self {
            payload,
            status: status.into(),
        }
    }

    /// Create a success response
    pub const fn success(payload: Option<Bytes>) -> Self {
        Self {
            payload,
            status: StatusWord::new(0x90, 0x00),
        }
    }

    /// Parse a response from raw bytes (payload followed by SW1 SW2)
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        if data.len() < 2 {
            return Err(Error::Incomplete);
        }

        let len = data.len();
        let status = StatusWord::new(data[len - 2], data[len - 1]);
        let payload = if len > 2 {
            Some(Bytes::copy_from_slice(&data[..len - 2]))
        } else {
            None
        };

        trace!(
            sw1 = format_args!("{:#04x}", status.sw1),
            sw2 = format_args!("{:#04x}", status.sw2),
            payload_len = payload.as_ref().map_or(0, |p| p.len()),
            "Parsed APDU response"
        );

        Ok(Self { payload, status })
    }

    /// Get the response payload data
    pub const fn payload(&self) -> Option<&Bytes> {
        self.payload.as_ref()
    }

    /// Get the status word
    pub const fn status(&self) -> StatusWord {
        self.status
    }

    /// Check if the response indicates success
    pub const fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Convert to a payload result, mapping a non-success status to an error
    pub fn into_payload(self) -> Result<Option<Bytes>> {
        if self.is_success() {
            Ok(self.payload)
        } else {
            Err(Error::Status {
                status: self.status,
            })
        }
    }
}

impl TryFrom<&[u8]> for Response {
    type Error = Error;

    fn try_from(data: &[u8]) -> Result<Self> {
        Self::from_bytes(data)
    }
}

impl From<Response> for Bytes {
    fn from(response: Response) -> Self {
        let mut buf = BytesMut::with_capacity(response.payload.as_ref().map_or(0, |p| p.len()) + 2);
        if let Some(payload) = response.payload {
            buf.put_slice(&payload);
        }
        buf.put_u8(response.status.sw1);
        buf.put_u8(response.status.sw2);
        buf.freeze()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_creation() {
        let data = Some(Bytes::from_static(&[0x01, 0x02, 0x03]));
        let resp = Response::new(data, (0x90, 0x00));
        assert_eq!(
            resp.payload(),
            Some(&Bytes::from_static(&[0x01, 0x02, 0x03]))
        );
        assert_eq!(resp.status(), StatusWord::new(0x90, 0x00));
        assert!(resp.is_success());
    }

    #[test]
    fn test_response_from_bytes() {
        let resp = Response::from_bytes(&[0x01, 0x02, 0x03, 0x90, 0x00]).unwrap();
        assert_eq!(
            resp.payload().map(|p| p.as_ref()),
            Some(&[0x01, 0x02, 0x03][..])
        );
        assert!(resp.is_success());

        let resp = Response::from_bytes(&[0x6A, 0x82]).unwrap();
        assert!(resp.payload().is_none());
        assert_eq!(resp.status(), StatusWord::new(0x6A, 0x82));
        assert!(!resp.is_success());

        assert!(matches!(
            Response::from_bytes(&[0x01]),
            Err(Error::Incomplete)
        ));
    }

    #[test]
    fn test_response_into_payload() {
        let data = Bytes::from_static(&[0x01, 0x02, 0x03]);
        let success = Response::success(Some(data.clone()));
        assert_eq!(success.into_payload().unwrap(), Some(data));

        let error = Response::new(None, (0x6A, 0x82));
        assert!(matches!(
            error.into_payload(),
            Err(Error::Status { status }) if status.to_u16() == 0x6A82
        ));
    }
}
