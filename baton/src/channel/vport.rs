//! Virtual serial port channel runners
//!
//! The same channel pattern applied to a USB-backed transport. Transmission
//! completes inline in the device stack, so the send side needs no completion
//! signal. Reception is armed by the hardware; when the receive queue is full
//! the oldest buffered frame is evicted so the completion task never blocks.
//! The channel favors liveness over a complete backlog.

use baton_driver::vport::{VportRx, VportTx};
use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::signal::Signal;

use crate::buffer::{Payload, Release, Termination};
use crate::channel::{ReceiveChannel, SendChannel};

/// Receive-side tuning
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub struct RxConfig {
    /// Termination applied to every captured frame.
    pub termination: Termination,
}

impl Default for RxConfig {
    fn default() -> Self {
        Self {
            termination: Termination::Nul,
        }
    }
}

/// Transmit runner. Run for proper channel operation.
///
/// Drains the send queue one payload at a time; the device stack owns a copy
/// of the data once the transmit call returns, so the payload is destroyed
/// right after. A transmit fault is escalated as fatal.
pub struct TxRunner<'a, M: RawMutex, T, const N: usize> {
    channel: &'a SendChannel<M, N>,
    driver: T,
}

impl<'a, M: RawMutex, T: VportTx, const N: usize> TxRunner<'a, M, T, N> {
    pub fn new(channel: &'a SendChannel<M, N>, driver: T) -> Self {
        Self { channel, driver }
    }

    pub async fn run(&mut self) -> ! {
        loop {
            let payload = self.channel.dequeue().await;
            if self.driver.transmit(&payload).is_err() {
                panic!("virtual port transmit failed");
            }
        }
    }
}

/// Receive runner. Run for proper channel operation.
///
/// Waits for the completion signal of each host transfer, copies the driver's
/// frame slot into a fresh payload and queues it, evicting the oldest frame
/// first when the queue is full. An optional slot-free hook is bound to every
/// produced payload; it fires once the payload's last holder destroys it,
/// telling the driver the slot may be reused.
pub struct RxRunner<'a, M: RawMutex, R, const N: usize> {
    channel: &'a ReceiveChannel<M, N>,
    driver: R,
    done: &'a Signal<M, usize>,
    slot_free: Option<&'static dyn Release>,
    termination: Termination,
}

impl<'a, M: RawMutex, R: VportRx, const N: usize> RxRunner<'a, M, R, N> {
    pub fn new(
        channel: &'a ReceiveChannel<M, N>,
        driver: R,
        done: &'a Signal<M, usize>,
        slot_free: Option<&'static dyn Release>,
        config: RxConfig,
    ) -> Self {
        Self {
            channel,
            driver,
            done,
            slot_free,
            termination: config.termination,
        }
    }

    pub async fn run(&mut self) -> ! {
        loop {
            let len = self.done.wait().await;

            if self.channel.evict_if_full().is_some() {
                warn!("receive queue full, dropping the oldest frame");
            }

            let mut frame = Payload::copy_from(self.driver.frame(len), self.termination);
            if let Some(hook) = self.slot_free {
                frame.bind_release(hook);
            }
            self.channel.push(frame).await;
        }
    }
}
