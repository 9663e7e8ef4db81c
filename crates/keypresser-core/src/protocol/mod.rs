//! Protocol module containing firmware command types and the frame codec.

pub mod codec;
pub mod command;

pub use codec::{decode_frame, encode_command, encode_command_bytes, ProtocolError};
pub use command::{Command, CommandType, MouseButtons};
