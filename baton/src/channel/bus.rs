//! Addressed-bus request channel
//!
//! A single queue of tagged request frames serialized onto one shared bus by
//! a single runner task. Each request kind carries its own callback shape,
//! which encodes the payload-ownership rule for that kind.

use alloc::boxed::Box;

use baton_driver::Health;
use baton_driver::bus::RegisterBus;
use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::channel::Channel;
use embassy_sync::signal::Signal;
use embassy_time::{Duration, with_timeout};

use crate::buffer::Payload;
use crate::channel::{ChannelStatus, Rejected};

/// Reports a write outcome. Never owns the written payload.
pub type WriteDone = Box<dyn FnOnce(bool) + Send>;

/// Reports a read outcome. `Some` carries the filled payload, which the
/// callback now owns; `None` means the transfer failed and the payload is
/// already gone.
pub type ReadDone = Box<dyn FnOnce(Option<Payload>) + Send>;

/// Reports a probe outcome.
pub type ProbeDone = Box<dyn FnOnce(bool) + Send>;

/// One queued unit of bus work
pub enum Request {
    /// Write `data` to a device register.
    Write {
        device: u8,
        register: u8,
        data: Payload,
        done: Option<WriteDone>,
    },
    /// Fill the pre-allocated `data` from a device register.
    Read {
        device: u8,
        register: u8,
        data: Payload,
        done: Option<ReadDone>,
    },
    /// Check that a device answers at all.
    Probe {
        device: u8,
        trials: u8,
        done: Option<ProbeDone>,
    },
}

impl Request {
    /// Finishes the request: invokes the callback and settles payload
    /// ownership per kind.
    ///
    /// A callback is never handed a payload that is destroyed afterwards, and
    /// never observes a destroyed one.
    fn complete(self, success: bool) {
        match self {
            Request::Write { data, done, .. } => {
                if let Some(done) = done {
                    done(success);
                }
                drop(data);
            }
            Request::Read { data, done, .. } => {
                if success {
                    match done {
                        Some(done) => done(Some(data)),
                        None => drop(data),
                    }
                } else {
                    drop(data);
                    if let Some(done) = done {
                        done(None);
                    }
                }
            }
            Request::Probe { done, .. } => {
                if let Some(done) = done {
                    done(success);
                }
            }
        }
    }
}

/// Bus channel tuning
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub struct Config {
    /// Budget for one bus transfer, and for each probe trial.
    pub transfer_budget: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            transfer_budget: Duration::from_millis(100),
        }
    }
}

/// Request queue of the shared bus
pub struct RequestChannel<M: RawMutex, const N: usize> {
    queue: Channel<M, Request, N>,
}

impl<M: RawMutex, const N: usize> RequestChannel<M, N> {
    pub const fn new() -> Self {
        Self {
            queue: Channel::new(),
        }
    }

    /// Queues a register write of `data`.
    pub async fn write(
        &self,
        device: u8,
        register: u8,
        data: Payload,
        done: Option<WriteDone>,
        timeout: Duration,
    ) -> Result<(), Rejected> {
        let request = Request::Write {
            device,
            register,
            data,
            done,
        };
        self.submit(request, timeout).await
    }

    /// Queues a register read of `len` bytes.
    pub async fn read(
        &self,
        device: u8,
        register: u8,
        len: usize,
        done: Option<ReadDone>,
        timeout: Duration,
    ) -> Result<(), Rejected> {
        let request = Request::Read {
            device,
            register,
            data: Payload::alloc(len),
            done,
        };
        self.submit(request, timeout).await
    }

    /// Queues a presence probe of up to `trials` attempts.
    pub async fn probe(
        &self,
        device: u8,
        trials: u8,
        done: Option<ProbeDone>,
        timeout: Duration,
    ) -> Result<(), Rejected> {
        let request = Request::Probe {
            device,
            trials,
            done,
        };
        self.submit(request, timeout).await
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

    /// On rejection the frame is destroyed in place: its payload is freed and
    /// its callback is never invoked.
    async fn submit(&self, request: Request, timeout: Duration) -> Result<(), Rejected> {
        with_timeout(timeout, self.queue.send(request))
            .await
            .map_err(|_| Rejected)
    }
}

/// Bus runner. Run for proper channel operation.
///
/// Serves one request at a time in queue order, so completion callbacks fire
/// in submission order.
pub struct Runner<'a, M: RawMutex, B, const N: usize> {
    channel: &'a RequestChannel<M, N>,
    driver: B,
    done: &'a Signal<M, ()>,
    config: Config,
}

impl<'a, M: RawMutex, B: RegisterBus, const N: usize> Runner<'a, M, B, N> {
    pub fn new(
        channel: &'a RequestChannel<M, N>,
        driver: B,
        done: &'a Signal<M, ()>,
        config: Config,
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
            let mut request = self.channel.queue.receive().await;
            let success = self.serve(&mut request).await;
            request.complete(success);
        }
    }

    async fn serve(&mut self, request: &mut Request) -> bool {
        match request {
            Request::Write {
                device,
                register,
                data,
                ..
            } => {
                if self.driver.start_write(*device, *register, data).is_err() {
                    return false;
                }
                self.await_done().await
            }
            Request::Read {
                device,
                register,
                data,
                ..
            } => {
                // read frames are built with an owned payload
                let slot = unwrap!(data.make_mut());
                if self.driver.start_read(*device, *register, slot).is_err() {
                    return false;
                }
                self.await_done().await
            }
            Request::Probe { device, trials, .. } => {
                self.driver
                    .probe(*device, *trials, self.config.transfer_budget)
            }
        }
    }

    /// A completion that arrives after the budget expired stays latched in
    /// the single-slot signal and will satisfy the wait of the next,
    /// unrelated request.
    async fn await_done(&self) -> bool {
        with_timeout(self.config.transfer_budget, self.done.wait())
            .await
            .is_ok()
    }
}
