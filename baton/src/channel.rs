//! Producer/consumer channels between tasks and peripherals
//!
//! The repeating pattern: a bounded FIFO of payloads, one dedicated runner
//! task that drains it and drives the hardware, and a single-slot completion
//! signal raised by the hardware-completion interrupt. [`serial`], [`vport`]
//! and [`bus`] instantiate the pattern per peripheral and direction.
//!
//! Each channel is one struct, constructed once at startup and shared by
//! reference between its runner and the public API callers.

use baton_driver::Health;
use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::channel::Channel;
use embassy_time::{Duration, with_timeout};

use crate::buffer::Payload;

pub mod bus;
pub mod serial;
pub mod vport;

/// Condition of one channel direction, computed on demand
///
/// Exactly one state is reported per query, evaluated in order: hardware
/// fault, hardware reset, queue occupancy, ready.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ChannelStatus {
    /// The peripheral reported an unrecoverable error.
    HardwareFault,
    /// The peripheral has not left its reset state.
    HardwareReset,
    /// Send direction: no room for another entry.
    QueueFull,
    /// Receive direction: no completed frame is waiting.
    QueueEmpty,
    /// The channel accepts work.
    Ready,
}

/// The channel could not accept the entry within the allowed wait
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Rejected;

/// Outbound payload queue of one peripheral direction
pub struct SendChannel<M: RawMutex, const N: usize> {
    queue: Channel<M, Payload, N>,
}

impl<M: RawMutex, const N: usize> SendChannel<M, N> {
    pub const fn new() -> Self {
        Self {
            queue: Channel::new(),
        }
    }

    /// Places `payload` on the queue, waiting up to `timeout` for room.
    ///
    /// On failure the payload is destroyed before the error is returned:
    /// ownership never transferred.
    pub async fn enqueue(&self, payload: Payload, timeout: Duration) -> Result<(), Rejected> {
        with_timeout(timeout, self.queue.send(payload))
            .await
            .map_err(|_| Rejected)
    }

    /// Non-waiting [`enqueue`](Self::enqueue), for contexts that must not
    /// block, such as completion callbacks. A full queue destroys the payload.
    pub fn try_enqueue(&self, payload: Payload) -> Result<(), Rejected> {
        self.queue.try_send(payload).map_err(|_| Rejected)
    }

    /// Queue occupancy.
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Channel condition, given a fresh peripheral health sample.
    pub fn status(&self, health: Health) -> ChannelStatus {
        match health {
            Health::Fault => ChannelStatus::HardwareFault,
            Health::Reset => ChannelStatus::HardwareReset,
            Health::Ready if self.queue.is_full() => ChannelStatus::QueueFull,
            Health::Ready => ChannelStatus::Ready,
        }
    }

    pub(crate) async fn dequeue(&self) -> Payload {
        self.queue.receive().await
    }
}

/// Inbound frame queue of one peripheral direction
pub struct ReceiveChannel<M: RawMutex, const N: usize> {
    queue: Channel<M, Payload, N>,
}

impl<M: RawMutex, const N: usize> ReceiveChannel<M, N> {
    pub const fn new() -> Self {
        Self {
            queue: Channel::new(),
        }
    }

    /// Waits for the next completed frame. Ownership passes to the caller,
    /// who must destroy it.
    pub async fn receive(&self) -> Payload {
        self.queue.receive().await
    }

    /// Like [`receive`](Self::receive), bounded by `timeout`.
    pub async fn receive_timeout(&self, timeout: Duration) -> Option<Payload> {
        with_timeout(timeout, self.queue.receive()).await.ok()
    }

    /// Queue occupancy.
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Channel condition, given a fresh peripheral health sample.
    pub fn status(&self, health: Health) -> ChannelStatus {
        match health {
            Health::Fault => ChannelStatus::HardwareFault,
            Health::Reset => ChannelStatus::HardwareReset,
            Health::Ready if self.queue.is_empty() => ChannelStatus::QueueEmpty,
            Health::Ready => ChannelStatus::Ready,
        }
    }

    /// Hands a completed frame to consumers, waiting for room.
    pub(crate) async fn push(&self, frame: Payload) {
        self.queue.send(frame).await;
    }

    /// Removes the oldest buffered frame when the queue is at capacity, so
    /// that the following push cannot block the completion task.
    pub(crate) fn evict_if_full(&self) -> Option<Payload> {
        if self.queue.is_full() {
            self.queue.try_receive().ok()
        } else {
            None
        }
    }
}
