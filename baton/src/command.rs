//! Text command parsing
//!
//! A command line is a body token, one or more spaces, and a run of uppercase
//! hex digit pairs encoding the raw argument bytes.

use crate::buffer::{Payload, Termination};
use crate::hex;

/// A parsed command line
#[derive(Debug)]
pub struct Command {
    /// Body token, text-terminated.
    pub body: Payload,
    /// Decoded argument bytes, raw.
    pub args: Payload,
}

/// Splits `line` into a body token and decoded argument bytes.
///
/// Fails when no space follows the body, or when nothing follows the spaces.
/// The hex run is maximal: the first non-hex byte ends it without error, an
/// odd trailing digit is dropped, and an empty run yields empty args.
///
/// `line` is the received text without its terminator.
pub fn parse(line: &[u8]) -> Option<Command> {
    let space = line.iter().position(|&byte| byte == b' ')?;
    let body = Payload::copy_range(line, 0, Some(space), Termination::Nul)?;

    let mut start = space;
    while line.get(start) == Some(&b' ') {
        start += 1;
    }
    if start == line.len() {
        return None;
    }

    let digits = line[start..]
        .iter()
        .take_while(|&&byte| hex::digit(byte).is_some())
        .count();

    let mut args = Payload::alloc(digits / 2);
    let slot = unwrap!(args.make_mut());
    for (pair, byte) in slot.iter_mut().enumerate() {
        let high = unwrap!(hex::digit(line[start + 2 * pair]));
        let low = unwrap!(hex::digit(line[start + 2 * pair + 1]));
        *byte = (high << 4) | low;
    }

    Some(Command { body, args })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        let command = unwrap!(parse(b"SEND 78008D14AFA5"));
        assert_eq!(command.body.as_text(), b"SEND");
        assert_eq!(&command.args[..], [0x78, 0x00, 0x8D, 0x14, 0xAF, 0xA5]);
    }

    #[test]
    fn test_parse_failures() {
        // no space after the body
        assert!(parse(b"NOBODY").is_none());
        // nothing after the spaces
        assert!(parse(b"CMD   ").is_none());
        assert!(parse(b"").is_none());
        assert!(parse(b" ").is_none());
    }

    #[test]
    fn test_parse_hex_run() {
        // odd trailing digit is dropped
        let command = unwrap!(parse(b"X ABC"));
        assert_eq!(&command.args[..], [0xAB]);

        // first non-hex byte ends the run
        let command = unwrap!(parse(b"X 12g344"));
        assert_eq!(&command.args[..], [0x12]);

        // lowercase digits are not part of the run
        let command = unwrap!(parse(b"X ab"));
        assert!(command.args.is_empty());

        // empty run still parses
        let command = unwrap!(parse(b"TOUCH ?"));
        assert_eq!(command.body.as_text(), b"TOUCH");
        assert!(command.args.is_empty());
    }

    #[test]
    fn test_parse_multiple_spaces() {
        let command = unwrap!(parse(b"REC    400104"));
        assert_eq!(command.body.as_text(), b"REC");
        assert_eq!(&command.args[..], [0x40, 0x01, 0x04]);
    }

    #[test]
    fn test_hex_round_trip() {
        let cases: &[&[u8]] = &[&[0x00], &[0x12, 0x34], &[0xDE, 0xAD, 0xBE, 0xEF]];
        for &bytes in cases {
            let mut line = alloc::vec::Vec::from(&b"X "[..]);
            line.extend_from_slice(hex::encode(bytes).as_text());
            let command = unwrap!(parse(&line));
            assert_eq!(&command.args[..], bytes);
        }
    }
}
