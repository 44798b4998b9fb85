//! Serial port driver interface

use crate::DriverFault;

/// Transmit half of a serial port
///
/// One transfer may be in flight at a time. The stack starts the next transfer
/// only after the previous completion was observed.
pub trait SerialTx {
    /// Starts transmitting `bytes`.
    ///
    /// The transfer-complete interrupt must raise the send channel's completion
    /// signal. `bytes` stays valid until that signal is raised.
    fn start_transmit(&mut self, bytes: &[u8]) -> Result<(), DriverFault>;
}

/// Receive half of a serial port
///
/// Reception is burst-oriented: one started transfer captures bytes until the
/// line goes idle or `scratch` is full, whichever comes first.
pub trait SerialRx {
    /// Starts one receive-until-idle transfer into `scratch`.
    ///
    /// The reception-complete interrupt must raise the receive channel's
    /// completion signal with the number of bytes written. `scratch` stays
    /// valid until that signal is raised.
    fn start_receive(&mut self, scratch: &mut [u8]) -> Result<(), DriverFault>;
}
