//! Serial port channel runners
//!
//! Two independent instances of the channel pattern: a send channel and a
//! receive channel, each with its own queue, runner task and completion
//! signal.

use baton_driver::serial::{SerialRx, SerialTx};
use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::signal::Signal;
use embassy_time::{Duration, with_timeout};

use crate::buffer::{FrameBuf, Payload, Termination};
use crate::channel::{ReceiveChannel, SendChannel};

/// Send-side tuning
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub struct TxConfig {
    /// How long a started transfer may take before the peripheral is treated
    /// as dead.
    pub completion_budget: Duration,
}

impl Default for TxConfig {
    fn default() -> Self {
        Self {
            completion_budget: Duration::from_secs(1),
        }
    }
}

/// Receive-side tuning
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub struct RxConfig {
    /// Capacity of the reusable reception scratch buffer; bounds one burst.
    pub scratch_capacity: usize,
    /// Termination applied to every captured frame.
    pub termination: Termination,
}

impl Default for RxConfig {
    fn default() -> Self {
        Self {
            scratch_capacity: 256,
            termination: Termination::Nul,
        }
    }
}

/// Transmit runner. Run for proper channel operation.
///
/// Drains the send queue one payload at a time: starts the hardware transfer,
/// awaits the completion signal within the configured budget, then destroys
/// the payload. A start fault or an overdue completion has no structured
/// recovery path once the transfer is underway and is escalated as fatal.
pub struct TxRunner<'a, M: RawMutex, T, const N: usize> {
    channel: &'a SendChannel<M, N>,
    driver: T,
    done: &'a Signal<M, ()>,
    config: TxConfig,
}

impl<'a, M: RawMutex, T: SerialTx, const N: usize> TxRunner<'a, M, T, N> {
    pub fn new(
        channel: &'a SendChannel<M, N>,
        driver: T,
        done: &'a Signal<M, ()>,
        config: TxConfig,
    ) -> Self {
        Self {
            channel,
            driver,
            done,
            config,
        }
    }

    pub async fn run(&mut self) -> ! {
        loop {
            let payload = self.channel.dequeue().await;
            if self.driver.start_transmit(&payload).is_err() {
                panic!("serial transmit start failed");
            }
            if with_timeout(self.config.completion_budget, self.done.wait())
                .await
                .is_err()
            {
                panic!("serial transmit completion overdue");
            }
        }
    }
}

/// Receive runner. Run for proper channel operation.
///
/// Issues one receive-until-idle transfer at a time against a reusable
/// scratch buffer, learns the burst length from the completion signal, copies
/// the burst into a fresh payload and queues it for consumers. The push waits
/// for room: the receive queue is not expected to fill under normal load.
pub struct RxRunner<'a, M: RawMutex, R, const N: usize> {
    channel: &'a ReceiveChannel<M, N>,
    driver: R,
    done: &'a Signal<M, usize>,
    scratch: FrameBuf,
    termination: Termination,
}

impl<'a, M: RawMutex, R: SerialRx, const N: usize> RxRunner<'a, M, R, N> {
    pub fn new(
        channel: &'a ReceiveChannel<M, N>,
        driver: R,
        done: &'a Signal<M, usize>,
        config: RxConfig,
    ) -> Self {
        Self {
            channel,
            driver,
            done,
            scratch: FrameBuf::new(config.scratch_capacity),
            termination: config.termination,
        }
    }

    pub async fn run(&mut self) -> ! {
        loop {
            self.scratch.clear();
            if self.driver.start_receive(self.scratch.backing_mut()).is_err() {
                panic!("serial receive start failed");
            }
            let len = self.done.wait().await;
            self.scratch.set_len(len);

            let frame = Payload::copy_from(self.scratch.as_bytes(), self.termination);
            self.channel.push(frame).await;
        }
    }
}
