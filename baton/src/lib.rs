//! # Baton
//!
//! This library is the data-movement core of a microcontroller firmware image:
//! a buffer-ownership model and a family of asynchronous peripheral I/O
//! channels that let producer code hand off variable-length binary payloads to
//! hardware without blocking on the hardware's completion, and let consumer
//! code retrieve completed inbound payloads in FIFO order.
//!
//! ## Architecture
//!
//! ```text
//!            enqueue                       dequeue
//! producer ──────────► SendChannel ────────────────► TxRunner ──► driver ──► wire
//!                                                       ▲
//!                                   completion signal ──┘ (raised by the ISR)
//!
//!                        completion signal (length)
//! wire ──► driver ──────────────────────────────────► RxRunner ──► ReceiveChannel ──► consumer
//!
//!             write/read/probe                        dispatch
//! caller ─────────────────────► RequestChannel ────────────────► bus::Runner ──► RegisterBus
//!                                                                     │
//!                                                  per-kind callback ◄┘
//! ```
//!
//! Components:
//! * _FrameBuf_ is a mutable scratch buffer with a fixed capacity, owned by a
//!   single producer at a time.
//! * _Payload_ is a finished, immutable unit of data. It is consumed, not
//!   copied, when placed on a channel; whichever task dequeues it becomes the
//!   owner and must destroy it. An optional release hook fired on destruction
//!   lets a payload double as a "transient resource is reusable" message.
//! * _SendChannel_ / _ReceiveChannel_ are bounded FIFO queues of payloads, one
//!   per peripheral direction. [`channel::serial`] and [`channel::vport`] pair
//!   them with runner tasks that drive the hardware through the narrow driver
//!   traits of the `baton-driver` crate.
//! * _RequestChannel_ ([`channel::bus`]) queues tagged read/write/probe frames
//!   for a shared register bus, with per-kind completion callbacks.
//! * _Shell_ ([`shell`]) is a text command dispatcher built entirely from the
//!   above, demonstrating the pattern end to end.
//!
//! ## Concurrency model
//!
//! Every channel direction is served by exactly one runner task; ownership
//! transfer through the queues is the only sharing mechanism, so no buffer is
//! ever touched by two tasks at once. Hardware completion is a single-slot
//! signal: raising it with no task waiting leaves it armed for the next wait,
//! which limits each channel to one outstanding transfer at a time. Within one
//! channel, FIFO order is preserved end to end; nothing is guaranteed across
//! channels.
//!
//! All channel state is generic over an `embassy_sync` raw mutex, chosen per
//! instantiation (critical-section or thread-mode locking).
//!
//! ## Limitations
//!
//! * There is no mid-flight cancellation; callers only choose how long to wait
//!   for queue room.
//! * Payload contents are heap-owned; a global allocator is required.
//! * A completion interrupt that fires after its wait budget expired stays
//!   latched and can be misattributed to the next transfer (see
//!   [`channel::bus`]).

#![no_std]

extern crate alloc;

pub use baton_driver as driver;
pub use baton_driver::time;

// This mod MUST go first, so that the others see its macros.
pub(crate) mod fmt;

pub mod buffer;
pub mod channel;
pub mod command;
pub mod hex;
pub mod shell;

pub use buffer::{FrameBuf, Payload, Release, Termination};
pub use channel::{ChannelStatus, ReceiveChannel, Rejected, SendChannel};
