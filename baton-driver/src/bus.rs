//! Addressed register bus driver interface

use embassy_time::Duration;

use crate::DriverFault;

/// A shared bus addressed by device and register (I2C-style)
///
/// The bus serves one transfer at a time; the stack serializes all requests
/// through a single queue, so implementations never see overlapping starts.
pub trait RegisterBus {
    /// Starts writing `bytes` to `register` of the device at `device`.
    ///
    /// The transfer-complete interrupt must raise the bus channel's completion
    /// signal. `bytes` stays valid until that signal is raised.
    fn start_write(&mut self, device: u8, register: u8, bytes: &[u8]) -> Result<(), DriverFault>;

    /// Starts reading `into.len()` bytes from `register` of the device at
    /// `device`.
    ///
    /// The transfer-complete interrupt must raise the bus channel's completion
    /// signal. `into` stays valid until that signal is raised.
    fn start_read(&mut self, device: u8, register: u8, into: &mut [u8]) -> Result<(), DriverFault>;

    /// Checks whether a device answers at `device`, retrying up to `trials`
    /// times, each trial bounded by `budget`.
    ///
    /// Probing is a blocking bus operation; no completion signal is involved.
    fn probe(&mut self, device: u8, trials: u8, budget: Duration) -> bool;
}
