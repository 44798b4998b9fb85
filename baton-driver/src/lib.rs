//! Baton driver interface
//!
//! The crate provides an interface between peripheral drivers and the baton stack.
//! Limited scope facilitates compatibility across versions.
//! Driver crates should depend on this crate. Baton stack users should depend on
//! the `baton` crate instead.
//!
//! Each channel of the stack pairs a driver trait with a single-slot completion
//! signal. A driver method only *starts* a transfer; the matching completion
//! interrupt raises the channel's signal, carrying the received length where one
//! exists. A driver that finishes a transfer synchronously may raise the signal
//! before returning from the start call; the stack does not distinguish the two.
//!
//! The stack samples peripheral health out of band for its status queries.
//! Drivers expose it by mapping their controller state onto [`Health`].

#![no_std]

pub mod bus;
pub mod serial;
pub mod vport;

pub mod time {
    pub use embassy_time::{Duration, Instant};
}

/// Peripheral controller condition, sampled for channel status queries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Health {
    /// The controller accepts transfers.
    Ready,
    /// The controller has not left its reset state.
    Reset,
    /// The controller reported an unrecoverable error.
    Fault,
}

/// A peripheral rejected or failed to start a transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DriverFault;
