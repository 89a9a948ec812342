//! Binary wire protocol for two-party tic-tac-toe sessions.
//!
//! Every frame starts with a one-byte [`Opcode`] that fixes the shape of
//! the payload behind it. Integers are big-endian `i32`; names and error
//! texts end with two zero bytes; moves are fixed 3-byte fields.
//!
//! # Example
//!
//! ```
//! use noughts_wire::{Message, WireReader, WireWriter};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), noughts_wire::WireError> {
//! let mut writer = WireWriter::new(Vec::new());
//! writer.send(&Message::Play { session: 12345 }).await?;
//! let bytes = writer.into_inner();
//! assert_eq!(bytes, vec![3, 0, 0, 0x30, 0x39]);
//!
//! let mut reader = WireReader::new(bytes.as_slice());
//! assert_eq!(reader.read_message().await?, Message::Play { session: 12345 });
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod codec;
mod error;
mod message;
mod opcode;

pub use codec::{WireReader, WireWriter};
pub use error::{WireError, WireErrorKind};
pub use message::{
    ErrorCode, MOVE_LEN, Message, NO_MOVE, ResultFlag, SessionId, UNASSIGNED_SESSION,
};
pub use opcode::Opcode;
