//! Executor for APDU command execution
//!
//! This module provides the [`Executor`] trait and the [`CardExecutor`]
//! implementation, which drives a [`CardTransport`] to execute commands
//! and parse their responses.

use core::fmt;

use bytes::Bytes;
use tracing::{debug, instrument, trace};

use crate::command::{ApduFormat, Command};
use crate::response::Response;
use crate::transport::CardTransport;
use crate::{Error, Result};

/// Trait for APDU command execution
pub trait Executor: Send + Sync + fmt::Debug {
    /// Transmit raw APDU bytes
    #[instrument(level = "trace", skip(self), fields(executor = std::any::type_name::<Self>()))]
    fn transmit(&mut self, command: &[u8]) -> Result<Bytes> {
        trace!(command = %hex::encode(command), "Transmitting command");
        let response = self.do_transmit(command);
        match &response {
            Ok(bytes) => {
                trace!(response = %hex::encode(bytes), "Received response");
            }
            Err(err) => {
                debug!(error = ?err, "Error during transmission");
            }
        }
        response
    }

    /// Internal implementation of transmit
    fn do_transmit(&mut self, command: &[u8]) -> Result<Bytes>;

    /// Execute a command in the given framing mode and parse the response
    ///
    /// The returned [`Response`] carries whatever status word the card
    /// produced; interpreting a non-success status is the caller's job.
    fn execute(&mut self, command: &Command, format: ApduFormat) -> Result<Response> {
        let command_bytes = command.serialize(format)?;
        let response_bytes = self.transmit(&command_bytes)?;
        Response::from_bytes(&response_bytes)
    }

    /// Reset the executor, including the transport
    fn reset(&mut self) -> Result<()>;
}

/// Card executor implementation combining a transport with response bookkeeping
#[derive(Debug)]
pub struct CardExecutor<T: CardTransport> {
    /// The transport used for communication
    transport: T,
    /// The last response received
    last_response: Option<Bytes>,
}

impl<T: CardTransport> CardExecutor<T> {
    /// Create a new card executor with the given transport
    pub const fn new(transport: T) -> Self {
        Self {
            transport,
            last_response: None,
        }
    }

    /// Get a reference to the underlying transport
    pub const fn transport(&self) -> &T {
        &self.transport
    }

    /// Get a mutable reference to the underlying transport
    pub const fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Take ownership of the transport and return it
    pub fn into_transport(self) -> T {
        self.transport
    }

    /// Get the last response received
    pub const fn last_response(&self) -> Option<&Bytes> {
        self.last_response.as_ref()
    }
}

impl<T: CardTransport> Executor for CardExecutor<T> {
    fn do_transmit(&mut self, command: &[u8]) -> Result<Bytes> {
        if !self.transport.is_connected() {
            return Err(Error::Connection);
        }

        let response = self.transport.transmit_raw(command)?;
        self.last_response = Some(response.clone());
        Ok(response)
    }

    fn reset(&mut self) -> Result<()> {
        self.transport.reset()?;
        self.last_response = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::MockTransport;

    #[test]
    fn test_executor_basic_transmit() {
        let transport = MockTransport::with_response(Bytes::from_static(&[0x90, 0x00]));
        let mut executor = CardExecutor::new(transport);

        let response = executor.transmit(&[0x00, 0xA4, 0x04, 0x00]).unwrap();
        assert_eq!(response.as_ref(), &[0x90, 0x00]);
        assert_eq!(executor.last_response().unwrap().as_ref(), &[0x90, 0x00]);
    }

    #[test]
    fn test_executor_execute() {
        let transport =
            MockTransport::with_response(Bytes::from_static(&[0x05, 0x02, 0x04, 0x90, 0x00]));
        let mut executor = CardExecutor::new(transport);

        let cmd = Command::new(0x00, 0xFD, 0x00, 0x00);
        let response = executor.execute(&cmd, ApduFormat::Short).unwrap();
        assert!(response.is_success());
        assert_eq!(
            response.payload().map(|p| p.as_ref()),
            Some(&[0x05, 0x02, 0x04][..])
        );
    }

    #[test]
    fn test_executor_disconnected() {
        let mut transport = MockTransport::with_response(Bytes::from_static(&[0x90, 0x00]));
        transport.connected = false;
        let mut executor = CardExecutor::new(transport);

        assert!(matches!(
            executor.transmit(&[0x00, 0xA4, 0x04, 0x00]),
            Err(Error::Connection)
        ));
    }
}
