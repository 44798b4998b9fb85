//! Virtual serial port (USB CDC class) driver interface

use crate::DriverFault;

/// Transmit half of a virtual serial port
pub trait VportTx {
    /// Hands `bytes` to the device stack for transmission.
    ///
    /// Unlike [`crate::serial::SerialTx`], the call completes the transfer:
    /// the device stack owns a copy of the data once it returns.
    fn transmit(&mut self, bytes: &[u8]) -> Result<(), DriverFault>;
}

/// Receive half of a virtual serial port
///
/// Reception is armed by the device stack itself; there is no start call. Each
/// completed host transfer raises the receive channel's completion signal with
/// the transfer length.
pub trait VportRx {
    /// Borrows the transfer buffer filled by the last completed reception.
    ///
    /// `len` is the length the completion signal carried. The slot contents
    /// stay valid until the driver is told the slot is free again, which the
    /// stack reports through the release hook bound to the produced frame.
    fn frame(&self, len: usize) -> &[u8];
}
