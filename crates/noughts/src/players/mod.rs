//! Player trait and implementations.

mod console;
mod search;

pub use console::ConsolePlayer;
pub use search::SearchPlayer;

use crate::error::ClientError;
use noughts_core::{Game, Move};
use noughts_wire::{ErrorCode, ResultFlag, SessionId};

/// Something the initiator reports to its player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameEvent {
    /// The responder bound a session.
    Connected {
        /// Bound session id.
        session: SessionId,
    },
    /// A new game started.
    Admitted {
        /// Session id.
        session: SessionId,
    },
    /// Our move was accepted and the responder answered.
    Countered {
        /// Move we sent.
        own: Move,
        /// Responder's reply.
        reply: Move,
    },
    /// The responder refused our move; the turn is still ours.
    Rejected {
        /// Error code.
        code: ErrorCode,
        /// Responder's explanation.
        message: String,
    },
    /// The game ended.
    Finished {
        /// Who won.
        flag: ResultFlag,
        /// Move field of the `Result` message.
        mv: String,
    },
}

/// Trait for players that drive the initiator.
#[async_trait::async_trait]
pub trait Player: Send {
    /// Name sent in `Hello`.
    fn name(&self) -> &str;

    /// Returns the move text to send next.
    ///
    /// Text that is not exactly three characters is refused locally.
    async fn choose_move(&mut self, game: &Game) -> Result<String, ClientError>;

    /// Whether to start another game, given how many have been played.
    async fn wants_game(&mut self, games_played: u32) -> Result<bool, ClientError>;

    /// Receives an event along with the local board mirror.
    fn notify(&mut self, _event: &GameEvent, _game: &Game) {}
}
