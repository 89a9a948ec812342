//! Typed protocol messages and their frame layouts.
//!
//! | Opcode | Message | Payload                                   |
//! |--------|---------|-------------------------------------------|
//! | 1      | Hello   | session:i32, name:terminated              |
//! | 2      | Ready   | session:i32                               |
//! | 3      | Play    | session:i32                               |
//! | 4      | Admit   | session:i32, flag:u8                      |
//! | 5      | Action  | session:i32, move:3 bytes                 |
//! | 6      | Result  | session:i32, move:3 bytes, flag:u8        |
//! | 8      | Error   | session:i32, code:u8, message:terminated  |

use super::codec::{WireReader, WireWriter};
use super::error::{WireError, WireErrorKind};
use super::opcode::Opcode;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncWrite};
use tracing::{debug, instrument};

/// Numeric session identifier.
pub type SessionId = i32;

/// Session id meaning "not yet assigned".
pub const UNASSIGNED_SESSION: SessionId = 0;

/// Width of the move field in `Action` and `Result`.
pub const MOVE_LEN: usize = 3;

/// Move field of a `Result` won by the initiator.
pub const NO_MOVE: &str = "---";

/// Who won, as carried by `Result`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::EnumIter)]
#[repr(u8)]
pub enum ResultFlag {
    /// The responder completed a line.
    ResponderWin = 0,
    /// The initiator completed a line.
    InitiatorWin = 1,
    /// Board full with no line.
    Draw = 2,
}

impl TryFrom<u8> for ResultFlag {
    type Error = WireError;

    #[track_caller]
    fn try_from(byte: u8) -> Result<Self, Self::Error> {
        match byte {
            0 => Ok(ResultFlag::ResponderWin),
            1 => Ok(ResultFlag::InitiatorWin),
            2 => Ok(ResultFlag::Draw),
            other => Err(WireError::new(WireErrorKind::InvalidField(format!(
                "result flag {other}"
            )))),
        }
    }
}

/// Error code carried by an `Error` message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display)]
#[display("{}", _0)]
pub struct ErrorCode(pub u8);

impl ErrorCode {
    /// Move text is not `<row>-<col>` with digits 0 to 2.
    pub const MALFORMED_MOVE: Self = Self(0);
    /// Target cell already holds a mark.
    pub const CELL_OCCUPIED: Self = Self(1);
    /// Session id does not match the bound session.
    pub const INVALID_SESSION: Self = Self(9);
}

/// A protocol message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    /// Initiator greeting; session 0 asks the responder to assign one.
    Hello {
        /// Session id, or [`UNASSIGNED_SESSION`].
        session: SessionId,
        /// Player name.
        name: String,
    },
    /// Responder acknowledgement with the bound session id.
    Ready {
        /// Bound session id.
        session: SessionId,
    },
    /// Request to start a game.
    Play {
        /// Session id.
        session: SessionId,
    },
    /// Answer to `Play`.
    Admit {
        /// Session id.
        session: SessionId,
        /// Whether the game was started.
        admitted: bool,
    },
    /// A move.
    Action {
        /// Session id.
        session: SessionId,
        /// Move text, nominally `<row>-<col>`.
        mv: String,
    },
    /// Game over.
    Result {
        /// Session id.
        session: SessionId,
        /// Deciding move, or [`NO_MOVE`] when the initiator won.
        mv: String,
        /// Who won.
        flag: ResultFlag,
    },
    /// Error report.
    Error {
        /// Session id of the sender.
        session: SessionId,
        /// Error code.
        code: ErrorCode,
        /// Human-readable description.
        message: String,
    },
}

impl Message {
    /// Opcode leading this message's frame.
    pub fn opcode(&self) -> Opcode {
        match self {
            Message::Hello { .. } => Opcode::Hello,
            Message::Ready { .. } => Opcode::Ready,
            Message::Play { .. } => Opcode::Play,
            Message::Admit { .. } => Opcode::Admit,
            Message::Action { .. } => Opcode::Action,
            Message::Result { .. } => Opcode::Result,
            Message::Error { .. } => Opcode::Error,
        }
    }

    /// Session id carried by the message.
    pub fn session(&self) -> SessionId {
        match self {
            Message::Hello { session, .. }
            | Message::Ready { session }
            | Message::Play { session }
            | Message::Admit { session, .. }
            | Message::Action { session, .. }
            | Message::Result { session, .. }
            | Message::Error { session, .. } => *session,
        }
    }

    /// Stages the full frame, opcode first.
    pub fn encode<W: AsyncWrite + Unpin>(&self, writer: &mut WireWriter<W>) {
        writer.write_u8(self.opcode().as_byte());
        writer.write_int32(self.session());
        match self {
            Message::Hello { name, .. } => writer.write_terminated_string(name),
            Message::Ready { .. } | Message::Play { .. } => {}
            Message::Admit { admitted, .. } => writer.write_u8(u8::from(*admitted)),
            Message::Action { mv, .. } => writer.write_fixed_string(mv, MOVE_LEN),
            Message::Result { mv, flag, .. } => {
                writer.write_fixed_string(mv, MOVE_LEN);
                writer.write_u8(*flag as u8);
            }
            Message::Error { code, message, .. } => {
                writer.write_u8(code.0);
                writer.write_terminated_string(message);
            }
        }
    }

    /// Reads the payload that follows `opcode`.
    ///
    /// An `Admit` flag of 0 means rejected; any other value means admitted.
    #[instrument(skip(reader))]
    pub async fn read_body<R: AsyncRead + Unpin>(
        opcode: Opcode,
        reader: &mut WireReader<R>,
    ) -> Result<Self, WireError> {
        let session = reader.read_int32().await?;
        let message = match opcode {
            Opcode::Hello => Message::Hello {
                session,
                name: reader.read_terminated_string().await?,
            },
            Opcode::Ready => Message::Ready { session },
            Opcode::Play => Message::Play { session },
            Opcode::Admit => Message::Admit {
                session,
                admitted: reader.read_u8().await? != 0,
            },
            Opcode::Action => Message::Action {
                session,
                mv: reader.read_fixed_string(MOVE_LEN).await?,
            },
            Opcode::Result => {
                let mv = reader.read_fixed_string(MOVE_LEN).await?;
                let flag = ResultFlag::try_from(reader.read_u8().await?)?;
                Message::Result { session, mv, flag }
            }
            Opcode::Error => {
                let code = ErrorCode(reader.read_u8().await?);
                let message = reader.read_terminated_string().await?;
                Message::Error {
                    session,
                    code,
                    message,
                }
            }
        };
        debug!(?message, "Decoded message");
        Ok(message)
    }
}

impl<R: AsyncRead + Unpin> WireReader<R> {
    /// Reads a whole frame: opcode byte, then the payload it implies.
    pub async fn read_message(&mut self) -> Result<Message, WireError> {
        let opcode = Opcode::try_from(self.read_u8().await?)?;
        Message::read_body(opcode, self).await
    }

    /// Reads the payload that follows `opcode`, failing with `Timeout` if
    /// it is not complete within `limit`.
    pub async fn read_body_within(
        &mut self,
        opcode: Opcode,
        limit: Duration,
    ) -> Result<Message, WireError> {
        match tokio::time::timeout(limit, Message::read_body(opcode, self)).await {
            Ok(message) => message,
            Err(_) => Err(WireError::new(WireErrorKind::Timeout(limit))),
        }
    }
}

impl<W: AsyncWrite + Unpin> WireWriter<W> {
    /// Encodes `message` and flushes it to the stream.
    pub async fn send(&mut self, message: &Message) -> Result<(), WireError> {
        message.encode(self);
        self.flush().await?;
        debug!(opcode = %message.opcode(), session_id = message.session(), "Sent message");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn encoded(message: &Message) -> Vec<u8> {
        let mut writer = WireWriter::new(Vec::new());
        writer.send(message).await.unwrap();
        writer.into_inner()
    }

    #[tokio::test]
    async fn test_hello_layout() {
        let bytes = encoded(&Message::Hello {
            session: 0,
            name: "Ada".to_string(),
        })
        .await;
        assert_eq!(bytes, vec![1, 0, 0, 0, 0, b'A', b'd', b'a', 0, 0]);
    }

    #[tokio::test]
    async fn test_admit_layout() {
        let bytes = encoded(&Message::Admit {
            session: 12345,
            admitted: true,
        })
        .await;
        assert_eq!(bytes, vec![4, 0, 0, 0x30, 0x39, 1]);
    }

    #[tokio::test]
    async fn test_result_layout() {
        let bytes = encoded(&Message::Result {
            session: 1,
            mv: NO_MOVE.to_string(),
            flag: ResultFlag::InitiatorWin,
        })
        .await;
        assert_eq!(bytes, vec![6, 0, 0, 0, 1, b'-', b'-', b'-', 1]);
    }

    #[tokio::test]
    async fn test_error_layout() {
        let bytes = encoded(&Message::Error {
            session: 2,
            code: ErrorCode::INVALID_SESSION,
            message: "no".to_string(),
        })
        .await;
        assert_eq!(bytes, vec![8, 0, 0, 0, 2, 9, b'n', b'o', 0, 0]);
    }

    #[tokio::test]
    async fn test_frames_decode_back_to_back() {
        let messages = vec![
            Message::Hello {
                session: 0,
                name: "Grace".to_string(),
            },
            Message::Ready { session: 54321 },
            Message::Play { session: 54321 },
            Message::Admit {
                session: 54321,
                admitted: false,
            },
            Message::Action {
                session: 54321,
                mv: "1-1".to_string(),
            },
            Message::Result {
                session: 54321,
                mv: "2-2".to_string(),
                flag: ResultFlag::Draw,
            },
            Message::Error {
                session: -1,
                code: ErrorCode::CELL_OCCUPIED,
                message: "taken".to_string(),
            },
        ];

        let mut writer = WireWriter::new(Vec::new());
        for message in &messages {
            writer.send(message).await.unwrap();
        }
        let bytes = writer.into_inner();

        let mut reader = WireReader::new(bytes.as_slice());
        for expected in &messages {
            assert_eq!(&reader.read_message().await.unwrap(), expected);
        }
        let err = reader.read_message().await.unwrap_err();
        assert_eq!(err.kind(), &WireErrorKind::Truncated);
    }

    #[tokio::test]
    async fn test_nonzero_admit_flag_means_admitted() {
        let mut reader = WireReader::new(&[4u8, 0, 0, 0, 7, 5][..]);
        assert_eq!(
            reader.read_message().await.unwrap(),
            Message::Admit {
                session: 7,
                admitted: true
            }
        );
    }

    #[tokio::test]
    async fn test_reserved_opcode_rejected() {
        let mut reader = WireReader::new(&[7u8, 0, 0, 0, 1][..]);
        let err = reader.read_message().await.unwrap_err();
        assert_eq!(err.kind(), &WireErrorKind::UnknownOpcode(7));
    }

    #[tokio::test]
    async fn test_body_within_completes() {
        let mut reader = WireReader::new(&[0u8, 0, 0, 9][..]);
        let message = reader
            .read_body_within(Opcode::Ready, Duration::from_secs(1))
            .await
            .unwrap();
        assert_eq!(message, Message::Ready { session: 9 });
    }

    #[tokio::test]
    async fn test_stalled_body_times_out() {
        let (mut client, server) = tokio::io::duplex(64);
        tokio::io::AsyncWriteExt::write_all(&mut client, &[0, 0, 0, 0, b'A', b'd'])
            .await
            .unwrap();
        let mut reader = WireReader::new(server);
        let limit = Duration::from_millis(50);
        let err = reader.read_body_within(Opcode::Hello, limit).await.unwrap_err();
        assert_eq!(err.kind(), &WireErrorKind::Timeout(limit));
        drop(client);
    }

    #[tokio::test]
    async fn test_invalid_result_flag() {
        let mut reader = WireReader::new(&[6u8, 0, 0, 0, 1, b'0', b'-', b'0', 3][..]);
        let err = reader.read_message().await.unwrap_err();
        assert!(matches!(err.kind(), WireErrorKind::InvalidField(_)));
    }
}
