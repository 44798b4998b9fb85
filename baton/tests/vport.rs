use core::cell::{Cell, RefCell};
use core::sync::atomic::{AtomicUsize, Ordering};
use std::boxed::Box;
use std::vec::Vec;

use baton::channel::vport::{RxConfig, RxRunner, TxRunner};
use baton::driver::DriverFault;
use baton::driver::vport::{VportRx, VportTx};
use baton::{Payload, ReceiveChannel, Release, SendChannel};
use embassy_futures::yield_now;
use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use embassy_time::Duration;
use futures_executor::LocalPool;
use futures_task::LocalSpawn;

type Mtx = CriticalSectionRawMutex;

const TIMEOUT: Duration = Duration::from_millis(100);

struct Counter(AtomicUsize);

impl Release for Counter {
    fn release(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

struct MockTx {
    sent: &'static Mutex<Mtx, RefCell<Vec<Vec<u8>>>>,
}

impl VportTx for MockTx {
    fn transmit(&mut self, bytes: &[u8]) -> Result<(), DriverFault> {
        self.sent.lock(|cell| cell.borrow_mut().push(bytes.to_vec()));
        Ok(())
    }
}

/// Hands out one scripted host transfer per completion.
struct MockRx {
    frames: &'static [&'static [u8]],
    next: Cell<usize>,
}

impl VportRx for MockRx {
    fn frame(&self, len: usize) -> &[u8] {
        let idx = self.next.get();
        self.next.set(idx + 1);
        &self.frames[idx][..len]
    }
}

async fn drive_tx(mut runner: TxRunner<'static, Mtx, MockTx, 4>) {
    runner.run().await
}

async fn drive_rx<const N: usize>(mut runner: RxRunner<'static, Mtx, MockRx, N>) {
    runner.run().await
}

#[test]
fn test_send() {
    let mut executor = LocalPool::new();
    let spawner = executor.spawner();

    let channel: &'static SendChannel<Mtx, 4> = Box::leak(Box::new(SendChannel::new()));
    let sent: &'static Mutex<Mtx, RefCell<Vec<Vec<u8>>>> =
        Box::leak(Box::new(Mutex::new(RefCell::new(Vec::new()))));

    let runner = TxRunner::new(channel, MockTx { sent });
    spawner
        .spawn_local_obj(Box::new(drive_tx(runner)).into())
        .unwrap();

    executor.run_until(async {
        channel
            .enqueue(Payload::from_static(b"first"), TIMEOUT)
            .await
            .unwrap();
        channel
            .enqueue(Payload::from_static(b"second"), TIMEOUT)
            .await
            .unwrap();
    });
    executor.run_until_stalled();

    let sent = sent.lock(|cell| cell.borrow().clone());
    assert_eq!(sent, [b"first".to_vec(), b"second".to_vec()]);
}

#[test]
fn test_receive_eviction() {
    static SLOT_FREE: Counter = Counter(AtomicUsize::new(0));
    const FRAMES: &[&[u8]] = &[b"one", b"two", b"three"];

    let mut executor = LocalPool::new();
    let spawner = executor.spawner();

    let channel: &'static ReceiveChannel<Mtx, 2> = Box::leak(Box::new(ReceiveChannel::new()));
    let done: &'static Signal<Mtx, usize> = Box::leak(Box::new(Signal::new()));

    let driver = MockRx {
        frames: FRAMES,
        next: Cell::new(0),
    };
    let runner = RxRunner::new(channel, driver, done, Some(&SLOT_FREE), RxConfig::default());
    spawner
        .spawn_local_obj(Box::new(drive_rx(runner)).into())
        .unwrap();

    executor.run_until(async {
        for frame in FRAMES {
            done.signal(frame.len());
            for _ in 0..8 {
                yield_now().await;
            }
        }
    });

    // the queue never grew past its capacity: the oldest frame was destroyed,
    // which released its slot
    assert_eq!(channel.len(), 2);
    assert_eq!(SLOT_FREE.0.load(Ordering::SeqCst), 1);

    executor.run_until(async {
        let second = channel.receive().await;
        assert_eq!(&second[..], b"two\0");
        drop(second);
        assert_eq!(SLOT_FREE.0.load(Ordering::SeqCst), 2);

        let third = channel.receive().await;
        assert_eq!(&third[..], b"three\0");
        drop(third);
        assert_eq!(SLOT_FREE.0.load(Ordering::SeqCst), 3);
    });
}
