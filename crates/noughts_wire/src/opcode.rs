//! Message opcodes: the single leading byte of every frame.

use super::error::{WireError, WireErrorKind};

/// Opcode identifying a message and its payload shape.
///
/// Value 7 is reserved and decodes as an unknown opcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::EnumIter)]
#[repr(u8)]
pub enum Opcode {
    /// Initiator greeting: session id and player name.
    Hello = 1,
    /// Responder acknowledgement carrying the bound session id.
    Ready = 2,
    /// Initiator request to start a game.
    Play = 3,
    /// Responder answer to `Play`.
    Admit = 4,
    /// A move, sent by either side.
    Action = 5,
    /// Game over notification.
    Result = 6,
    /// Error report, sent by either side.
    Error = 8,
}

impl Opcode {
    /// Wire value of this opcode.
    pub fn as_byte(self) -> u8 {
        self as u8
    }
}

impl From<Opcode> for u8 {
    fn from(opcode: Opcode) -> Self {
        opcode.as_byte()
    }
}

impl TryFrom<u8> for Opcode {
    type Error = WireError;

    #[track_caller]
    fn try_from(byte: u8) -> Result<Self, WireError> {
        match byte {
            1 => Ok(Opcode::Hello),
            2 => Ok(Opcode::Ready),
            3 => Ok(Opcode::Play),
            4 => Ok(Opcode::Admit),
            5 => Ok(Opcode::Action),
            6 => Ok(Opcode::Result),
            8 => Ok(Opcode::Error),
            other => Err(WireError::new(WireErrorKind::UnknownOpcode(other))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_byte_values() {
        let bytes: Vec<u8> = Opcode::iter().map(u8::from).collect();
        assert_eq!(bytes, vec![1, 2, 3, 4, 5, 6, 8]);
        for opcode in Opcode::iter() {
            assert_eq!(Opcode::try_from(opcode.as_byte()), Ok(opcode));
        }
    }

    #[test]
    fn test_reserved_and_undefined_bytes_rejected() {
        for byte in [0u8, 7, 9, 42, 255] {
            let err = Opcode::try_from(byte).unwrap_err();
            assert_eq!(err.kind(), &WireErrorKind::UnknownOpcode(byte));
        }
    }
}
