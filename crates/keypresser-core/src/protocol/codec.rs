//! ASCII frame codec for firmware commands.
//!
//! Wire format:
//! ```text
//! <type_id,arg1,arg2,...>
//! ```
//! Encoding is pure.  Sending a command means writing the encoded bytes to the
//! serial transport; no acknowledgement or checksum exists.
//!
//! `TypeString` payloads are written verbatim.  A string containing `<`, `>`
//! or `,` corrupts the framing on the firmware side; callers must avoid them.

use thiserror::Error;

use crate::protocol::command::{
    Command, CommandType, MouseButtons, ARG_SEPARATOR, FRAME_END, FRAME_START,
};

/// Errors that can occur during frame encoding or decoding.
#[derive(Debug, Error, PartialEq)]
pub enum ProtocolError {
    /// A `PressCombination` with no keys; send a single `PressKey` instead.
    #[error("key combination is empty")]
    EmptyCombination,

    /// The text is not wrapped in `<` and `>`.
    #[error("frame is not delimited by '<' and '>': {0:?}")]
    MissingDelimiters(String),

    /// The leading type id is not a known command.
    #[error("unknown command type: {0:?}")]
    UnknownCommandType(String),

    /// The number of arguments does not match the command type.
    #[error("command type {type_id} expects {expected} argument(s), got {got}")]
    WrongArity {
        type_id: u8,
        expected: usize,
        got: usize,
    },

    /// A numeric argument could not be parsed.
    #[error("invalid numeric argument: {0:?}")]
    InvalidNumber(String),
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Encodes a [`Command`] into its ASCII frame.
///
/// # Errors
///
/// Returns [`ProtocolError::EmptyCombination`] for a combination without keys.
///
/// # Examples
///
/// ```rust
/// use keypresser_core::protocol::{encode_command, Command};
///
/// let frame = encode_command(&Command::PressCombination(vec!["128".into(), "44".into()])).unwrap();
/// assert_eq!(frame, "<3,128,44>");
/// ```
pub fn encode_command(cmd: &Command) -> Result<String, ProtocolError> {
    let id = cmd.command_type() as u8;
    let args: Vec<String> = match cmd {
        Command::PressKey(key) | Command::ReleaseKey(key) => vec![key.clone()],
        Command::TypeString(text) => vec![text.clone()],
        Command::PressCombination(keys) => {
            if keys.is_empty() {
                return Err(ProtocolError::EmptyCombination);
            }
            keys.clone()
        }
        Command::Delay(ms) => vec![ms.to_string()],
        Command::MouseMove { dx, dy } => vec![dx.to_string(), dy.to_string()],
        Command::MousePress(buttons) | Command::MouseRelease(buttons) => {
            vec![buttons.0.to_string()]
        }
        Command::MouseClick { buttons, count } => {
            vec![buttons.0.to_string(), count.to_string()]
        }
        Command::MouseWheel(delta) => vec![delta.to_string()],
    };

    let mut frame = String::with_capacity(4 + args.iter().map(|a| a.len() + 1).sum::<usize>());
    frame.push(FRAME_START);
    frame.push_str(&id.to_string());
    for arg in &args {
        frame.push(ARG_SEPARATOR);
        frame.push_str(arg);
    }
    frame.push(FRAME_END);
    Ok(frame)
}

/// Encodes a [`Command`] straight into the bytes written to the port.
///
/// # Errors
///
/// Same as [`encode_command`].
pub fn encode_command_bytes(cmd: &Command) -> Result<Vec<u8>, ProtocolError> {
    encode_command(cmd).map(String::into_bytes)
}

/// Decodes one complete frame back into a [`Command`].
///
/// The firmware never sends frames back, so this exists for diagnostics and
/// for verifying what a test transport recorded.  A `TypeString` payload is
/// everything after the first separator, commas included.
///
/// # Errors
///
/// Returns [`ProtocolError`] if the frame is malformed.
pub fn decode_frame(frame: &str) -> Result<Command, ProtocolError> {
    let body = frame
        .strip_prefix(FRAME_START)
        .and_then(|rest| rest.strip_suffix(FRAME_END))
        .ok_or_else(|| ProtocolError::MissingDelimiters(frame.to_string()))?;

    let (id_text, rest) = match body.split_once(ARG_SEPARATOR) {
        Some((id, rest)) => (id, Some(rest)),
        None => (body, None),
    };
    let type_id: u8 = id_text
        .parse()
        .map_err(|_| ProtocolError::UnknownCommandType(id_text.to_string()))?;
    let ty = CommandType::try_from(type_id)
        .map_err(|_| ProtocolError::UnknownCommandType(id_text.to_string()))?;

    let args: Vec<&str> = rest
        .map(|r| r.split(ARG_SEPARATOR).collect())
        .unwrap_or_default();
    let expect = |n: usize| -> Result<(), ProtocolError> {
        if args.len() == n {
            Ok(())
        } else {
            Err(ProtocolError::WrongArity {
                type_id,
                expected: n,
                got: args.len(),
            })
        }
    };

    let cmd = match ty {
        CommandType::PressKey => {
            expect(1)?;
            Command::PressKey(args[0].to_string())
        }
        CommandType::ReleaseKey => {
            expect(1)?;
            Command::ReleaseKey(args[0].to_string())
        }
        CommandType::TypeString => {
            let text = rest.ok_or(ProtocolError::WrongArity {
                type_id,
                expected: 1,
                got: 0,
            })?;
            Command::TypeString(text.to_string())
        }
        CommandType::PressCombination => {
            if args.is_empty() {
                return Err(ProtocolError::EmptyCombination);
            }
            Command::PressCombination(args.iter().map(|a| a.to_string()).collect())
        }
        CommandType::Delay => {
            expect(1)?;
            Command::Delay(parse_num(args[0])?)
        }
        CommandType::MouseMove => {
            expect(2)?;
            Command::MouseMove {
                dx: parse_num(args[0])?,
                dy: parse_num(args[1])?,
            }
        }
        CommandType::MousePress => {
            expect(1)?;
            Command::MousePress(MouseButtons(parse_num(args[0])?))
        }
        CommandType::MouseRelease => {
            expect(1)?;
            Command::MouseRelease(MouseButtons(parse_num(args[0])?))
        }
        CommandType::MouseClick => {
            expect(2)?;
            Command::MouseClick {
                buttons: MouseButtons(parse_num(args[0])?),
                count: parse_num(args[1])?,
            }
        }
        CommandType::MouseWheel => {
            expect(1)?;
            Command::MouseWheel(parse_num(args[0])?)
        }
    };
    Ok(cmd)
}

// ── Private helpers ───────────────────────────────────────────────────────────

fn parse_num<T: std::str::FromStr>(text: &str) -> Result<T, ProtocolError> {
    text.parse()
        .map_err(|_| ProtocolError::InvalidNumber(text.to_string()))
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_press_key_frame() {
        let frame = encode_command(&Command::press_key(58)).expect("encode");
        assert_eq!(frame, "<0,58>");
    }

    #[test]
    fn test_encode_release_key_frame() {
        let frame = encode_command(&Command::release_key(58)).expect("encode");
        assert_eq!(frame, "<1,58>");
    }

    #[test]
    fn test_encode_combination_joins_keys_in_order() {
        // Arrange
        let cmd = Command::PressCombination(vec!["128".to_string(), "44".to_string()]);

        // Act
        let frame = encode_command(&cmd).expect("encode");

        // Assert
        assert_eq!(frame, "<3,128,44>");
    }

    #[test]
    fn test_encode_empty_combination_is_rejected() {
        let result = encode_command(&Command::PressCombination(vec![]));
        assert_eq!(result, Err(ProtocolError::EmptyCombination));
    }

    #[test]
    fn test_encode_mouse_frames() {
        assert_eq!(
            encode_command(&Command::MouseMove { dx: -5, dy: 12 }).unwrap(),
            "<5,-5,12>"
        );
        assert_eq!(
            encode_command(&Command::MousePress(MouseButtons::left())).unwrap(),
            "<6,1>"
        );
        assert_eq!(
            encode_command(&Command::MouseRelease(MouseButtons::all())).unwrap(),
            "<7,7>"
        );
        assert_eq!(
            encode_command(&Command::MouseClick {
                buttons: MouseButtons::middle(),
                count: 3
            })
            .unwrap(),
            "<8,4,3>"
        );
        assert_eq!(encode_command(&Command::MouseWheel(-2)).unwrap(), "<9,-2>");
    }

    #[test]
    fn test_encode_type_string_does_not_escape_delimiters() {
        let frame = encode_command(&Command::TypeString("a,b".to_string())).unwrap();
        assert_eq!(frame, "<2,a,b>");
    }

    #[test]
    fn test_encode_delay_frame() {
        assert_eq!(encode_command(&Command::Delay(250)).unwrap(), "<4,250>");
    }

    #[test]
    fn test_encode_command_bytes_is_ascii_of_frame() {
        let bytes = encode_command_bytes(&Command::press_key(32)).unwrap();
        assert_eq!(bytes, b"<0,32>".to_vec());
    }

    #[test]
    fn test_decode_rejects_missing_delimiters() {
        let result = decode_frame("0,58");
        assert!(matches!(result, Err(ProtocolError::MissingDelimiters(_))));
    }

    #[test]
    fn test_decode_rejects_unknown_type() {
        let result = decode_frame("<12,1>");
        assert_eq!(result, Err(ProtocolError::UnknownCommandType("12".into())));
    }

    #[test]
    fn test_decode_rejects_wrong_arity() {
        let result = decode_frame("<5,1>");
        assert_eq!(
            result,
            Err(ProtocolError::WrongArity {
                type_id: 5,
                expected: 2,
                got: 1
            })
        );
    }

    #[test]
    fn test_decode_rejects_non_numeric_delay() {
        let result = decode_frame("<4,soon>");
        assert_eq!(result, Err(ProtocolError::InvalidNumber("soon".into())));
    }

    #[test]
    fn test_decode_type_string_without_payload_is_rejected() {
        assert_eq!(
            decode_frame("<2>"),
            Err(ProtocolError::WrongArity {
                type_id: 2,
                expected: 1,
                got: 0
            })
        );
    }

    #[test]
    fn test_decode_type_string_keeps_embedded_commas() {
        let cmd = decode_frame("<2,hello, world>").expect("decode");
        assert_eq!(cmd, Command::TypeString("hello, world".into()));
    }
}
