//! Text command dispatcher
//!
//! Consumes command lines from a receive channel and fans them out to the
//! addressed-bus channel; replies travel through a send channel. Works over
//! the serial or the virtual-port transport, since both expose the same
//! channel types.
//!
//! Wire format (ASCII, case-sensitive): `<BODY><space>{<space>}<HEXARGS>`,
//! where the hex run decodes pairwise to the raw argument bytes:
//!
//! * `SEND <addr><reg><data...>` writes the data tail (at least one byte) to
//!   a device register
//! * `REC <addr><reg><len>` reads `len` bytes from a device register
//! * `TOUCH <addr><trials>` probes for a device
//!
//! A successful dispatch echoes the line and confirms with `<BODY> Done`; the
//! transfer outcome arrives later as `Success!`, `Fail!` or `Rec: <HEX>`.
//! All replies are CRLF-terminated.

use alloc::boxed::Box;
use core::str;

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_time::Duration;

use crate::buffer::{FrameBuf, Payload, Termination};
use crate::channel::bus::{ReadDone, RequestChannel, WriteDone};
use crate::channel::{ReceiveChannel, SendChannel};
use crate::command::{self, Command};
use crate::hex;

const UNKNOWN_COMMAND: &str = "Unknown Command!\r\n";
const BAD_ARGS: &str = "Bad Args!\r\n";
const BUS_BUSY: &str = "Bus Busy!\r\n";
const SUCCESS: &str = "Success!\r\n";
const FAIL: &str = "Fail!\r\n";

/// Dispatcher tuning
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub struct Config {
    /// How long to wait for room on the bus request queue.
    pub submit_timeout: Duration,
    /// How long to wait for room on the reply queue.
    pub reply_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            submit_timeout: Duration::from_millis(100),
            reply_timeout: Duration::from_millis(100),
        }
    }
}

/// Command dispatcher. Run for proper operation.
pub struct Shell<M: RawMutex + 'static, const RN: usize, const TN: usize, const BN: usize> {
    input: &'static ReceiveChannel<M, RN>,
    output: &'static SendChannel<M, TN>,
    bus: &'static RequestChannel<M, BN>,
    config: Config,
}

impl<M, const RN: usize, const TN: usize, const BN: usize> Shell<M, RN, TN, BN>
where
    M: RawMutex + Sync + 'static,
{
    pub fn new(
        input: &'static ReceiveChannel<M, RN>,
        output: &'static SendChannel<M, TN>,
        bus: &'static RequestChannel<M, BN>,
        config: Config,
    ) -> Self {
        Self {
            input,
            output,
            bus,
            config,
        }
    }

    pub async fn run(&mut self) -> ! {
        loop {
            let line = self.input.receive().await;
            self.dispatch(&line).await;
        }
    }

    async fn dispatch(&self, line: &Payload) {
        let Some(Command { body, args }) = command::parse(line.as_text()) else {
            self.reply(Payload::from_text(UNKNOWN_COMMAND)).await;
            return;
        };

        let body = body.as_text();
        let submitted = if body == b"SEND" && args.len() >= 3 {
            let data = unwrap!(Payload::copy_range(&args, 2, None, Termination::Raw));
            self.bus
                .write(
                    args[0],
                    args[1],
                    data,
                    Some(self.outcome_reply()),
                    self.config.submit_timeout,
                )
                .await
                .map(|()| "SEND Done\r\n")
        } else if body == b"REC" && args.len() == 3 {
            self.bus
                .read(
                    args[0],
                    args[1],
                    usize::from(args[2]),
                    Some(self.read_reply()),
                    self.config.submit_timeout,
                )
                .await
                .map(|()| "REC Done\r\n")
        } else if body == b"TOUCH" && args.len() == 2 {
            self.bus
                .probe(
                    args[0],
                    args[1],
                    Some(self.outcome_reply()),
                    self.config.submit_timeout,
                )
                .await
                .map(|()| "TOUCH Done\r\n")
        } else if body == b"SEND" || body == b"REC" || body == b"TOUCH" {
            self.reply(Payload::from_text(BAD_ARGS)).await;
            return;
        } else {
            self.reply(Payload::from_text(UNKNOWN_COMMAND)).await;
            return;
        };

        match submitted {
            Ok(confirmation) => {
                self.reply(Self::echo(line.as_text())).await;
                self.reply(Payload::from_text(confirmation)).await;
            }
            Err(_) => self.reply(Payload::from_text(BUS_BUSY)).await,
        }
    }

    /// Callback for write and probe requests.
    fn outcome_reply(&self) -> WriteDone {
        let output = self.output;
        Box::new(move |success| {
            let text = if success { SUCCESS } else { FAIL };
            let _ = output.try_enqueue(Payload::from_text(text));
        })
    }

    /// Callback for read requests; renders the received bytes as hex.
    fn read_reply(&self) -> ReadDone {
        let output = self.output;
        Box::new(move |data| {
            let reply = data
                .as_ref()
                .and_then(|data| Self::hex_reply(data))
                .unwrap_or_else(|| Payload::from_text(FAIL));
            let _ = output.try_enqueue(reply);
        })
    }

    fn hex_reply(data: &Payload) -> Option<Payload> {
        let digits = hex::encode(data);
        let digits = str::from_utf8(digits.as_text()).ok()?;
        let mut line = FrameBuf::new(digits.len() + 8);
        line.format(Termination::Raw, format_args!("Rec: {digits}\r\n"))
            .ok()?;
        Some(Payload::copy_from(line.as_bytes(), Termination::Raw))
    }

    fn echo(line: &[u8]) -> Payload {
        let mut echo = Payload::alloc(line.len() + 2);
        let slot = unwrap!(echo.make_mut());
        slot[..line.len()].copy_from_slice(line);
        slot[line.len()..].copy_from_slice(b"\r\n");
        echo
    }

    /// Best-effort: a full reply queue drops the line.
    async fn reply(&self, reply: Payload) {
        let _ = self.output.enqueue(reply, self.config.reply_timeout).await;
    }
}
