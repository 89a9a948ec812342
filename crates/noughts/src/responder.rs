//! Server side of a session: one state machine per connection.
//!
//! A connection moves through three phases. `Hello` binds a session id and
//! leads to [`Phase::AwaitingPlay`]; a matching `Play` starts a game and
//! leads to [`Phase::GameActive`]; a finished game or an `Error` from the
//! peer drops back to [`Phase::AwaitingPlay`]. `Hello` is answered in any
//! phase. The connection ends only when the stream fails or goes quiet.

use noughts_core::{Game, GameOutcome, Mark, Move, RuleError, best_move};
use noughts_wire::{
    ErrorCode, Message, NO_MOVE, Opcode, ResultFlag, SessionId, UNASSIGNED_SESSION, WireError,
    WireErrorKind, WireReader, WireWriter,
};
use rand::Rng;
use std::ops::RangeInclusive;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncWrite};
use tracing::{debug, error, info, instrument, warn};

/// Mark the responder plays.
pub const RESPONDER_MARK: Mark = Mark::O;

/// Range freshly assigned session ids are drawn from.
pub const SESSION_IDS: RangeInclusive<SessionId> = 10_000..=99_999;

/// Text sent with [`ErrorCode::MALFORMED_MOVE`].
pub const MALFORMED_MOVE_TEXT: &str =
    "Unknown move, check the format: row-col (from 0 to 2) Example: 0-0";
/// Text sent with [`ErrorCode::CELL_OCCUPIED`].
pub const CELL_OCCUPIED_TEXT: &str = "Invalid move, there is already a piece in that position";
/// Text sent with [`ErrorCode::INVALID_SESSION`].
pub const INVALID_SESSION_TEXT: &str = "Invalid session id";

/// Where a connection is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display)]
pub enum Phase {
    /// No `Hello` yet.
    #[display("awaiting hello")]
    AwaitingHello,
    /// Session bound, no game running.
    #[display("awaiting play")]
    AwaitingPlay,
    /// A game is in progress.
    #[display("game active")]
    GameActive,
}

/// How a game left [`Phase::GameActive`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GameEnd {
    /// `Result` was sent.
    Finished,
    /// The initiator sent `Error` mid-game.
    Abandoned,
}

/// Per-connection responder.
#[derive(Debug)]
pub struct Responder<R, W> {
    reader: WireReader<R>,
    writer: WireWriter<W>,
    idle_timeout: Duration,
    phase: Phase,
    session: Option<SessionId>,
    player: Option<String>,
    game: Game,
    games_completed: u32,
    games_abandoned: u32,
}

impl<R, W> Responder<R, W>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    /// Creates a responder over the two halves of a connection.
    pub fn new(reader: R, writer: W, idle_timeout: Duration) -> Self {
        Self {
            reader: WireReader::new(reader),
            writer: WireWriter::new(writer),
            idle_timeout,
            phase: Phase::AwaitingHello,
            session: None,
            player: None,
            game: Game::new(),
            games_completed: 0,
            games_abandoned: 0,
        }
    }

    /// Current phase.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Bound session id, if any.
    pub fn session(&self) -> Option<SessionId> {
        self.session
    }

    /// Name sent in the latest `Hello`.
    pub fn player(&self) -> Option<&str> {
        self.player.as_deref()
    }

    /// Games played to a `Result` on this connection.
    pub fn games_completed(&self) -> u32 {
        self.games_completed
    }

    /// Games the initiator ended with `Error` before a `Result`.
    pub fn games_abandoned(&self) -> u32 {
        self.games_abandoned
    }

    /// Serves the connection, one game after another.
    ///
    /// Returns `Ok` when the peer closes the stream between frames.
    ///
    /// # Errors
    ///
    /// Any stream failure: a frame cut short, no opcode or no complete
    /// frame within the idle timeout, or an I/O error.
    #[instrument(skip(self))]
    pub async fn run(&mut self) -> Result<(), WireError> {
        while let Some(end) = self.play_one_game().await? {
            match end {
                GameEnd::Finished => {
                    self.games_completed += 1;
                    info!(
                        session_id = ?self.session,
                        games = self.games_completed,
                        "Game finished"
                    );
                }
                GameEnd::Abandoned => {
                    self.games_abandoned += 1;
                    info!(
                        session_id = ?self.session,
                        abandoned = self.games_abandoned,
                        "Game abandoned by initiator"
                    );
                }
            }
        }
        info!(
            games = self.games_completed,
            abandoned = self.games_abandoned,
            "Peer closed the connection"
        );
        Ok(())
    }

    /// Handles frames until a game ends or the peer closes the stream
    /// cleanly (`None`).
    async fn play_one_game(&mut self) -> Result<Option<GameEnd>, WireError> {
        loop {
            let Some(byte) = self.next_opcode().await? else {
                return Ok(None);
            };
            if let Some(end) = self.handle(byte).await? {
                return Ok(Some(end));
            }
        }
    }

    /// Waits for the next opcode byte. End of stream here is a clean close.
    async fn next_opcode(&mut self) -> Result<Option<u8>, WireError> {
        match self.reader.read_u8_within(self.idle_timeout).await {
            Ok(byte) => Ok(Some(byte)),
            Err(err) if err.kind() == &WireErrorKind::Truncated => Ok(None),
            Err(err) => Err(err),
        }
    }

    /// Dispatches one frame. Returns how it ended the current game, if it did.
    async fn handle(&mut self, byte: u8) -> Result<Option<GameEnd>, WireError> {
        let opcode = match Opcode::try_from(byte) {
            Ok(opcode @ (Opcode::Hello | Opcode::Play | Opcode::Action | Opcode::Error)) => opcode,
            Ok(other) => {
                warn!(opcode = %other, phase = %self.phase, "Opcode not accepted by responder, ignoring");
                return Ok(None);
            }
            Err(err) => {
                warn!(%err, phase = %self.phase, "Ignoring unknown opcode");
                return Ok(None);
            }
        };

        let message = self
            .reader
            .read_body_within(opcode, self.idle_timeout)
            .await?;
        match message {
            Message::Hello { session, name } => {
                self.on_hello(session, name).await?;
                Ok(None)
            }
            Message::Play { session } => {
                self.on_play(session).await?;
                Ok(None)
            }
            Message::Action { session, mv } => self.on_action(session, &mv).await,
            Message::Error {
                session,
                code,
                message,
            } => Ok(self.on_peer_error(session, code, &message)),
            other => {
                debug!(?other, "Unexpected message");
                Ok(None)
            }
        }
    }

    #[instrument(skip(self))]
    async fn on_hello(&mut self, session: SessionId, name: String) -> Result<(), WireError> {
        let id = if session == UNASSIGNED_SESSION {
            fresh_session_id()
        } else {
            session
        };
        if let Some(previous) = self.session
            && previous != id
        {
            info!(previous, session_id = id, "Session rebound");
        }
        info!(session_id = id, player = %name, "Player joined");

        self.session = Some(id);
        self.player = Some(name);
        if self.phase == Phase::AwaitingHello {
            self.phase = Phase::AwaitingPlay;
        }
        self.writer.send(&Message::Ready { session: id }).await
    }

    #[instrument(skip(self))]
    async fn on_play(&mut self, session: SessionId) -> Result<(), WireError> {
        if self.session != Some(session) {
            warn!(bound = ?self.session, "Play with wrong session id");
            return self
                .send_error(ErrorCode::INVALID_SESSION, INVALID_SESSION_TEXT)
                .await;
        }

        if self.phase == Phase::GameActive {
            info!("Play during a game, starting over");
        }
        self.game = Game::new();
        self.phase = Phase::GameActive;
        info!(session_id = session, "Game started");
        self.writer
            .send(&Message::Admit {
                session,
                admitted: true,
            })
            .await
    }

    /// Applies the initiator's move, then answers with our own move or
    /// the result. Returns how the game ended, if it did.
    #[instrument(skip(self))]
    async fn on_action(
        &mut self,
        session: SessionId,
        text: &str,
    ) -> Result<Option<GameEnd>, WireError> {
        if self.session != Some(session) {
            warn!(bound = ?self.session, "Action with wrong session id");
            self.send_error(ErrorCode::INVALID_SESSION, INVALID_SESSION_TEXT)
                .await?;
            return Ok(None);
        }
        if self.phase != Phase::GameActive {
            warn!(phase = %self.phase, "Action outside a game, ignoring");
            return Ok(None);
        }

        let mv = match Move::parse(text) {
            Ok(mv) => mv,
            Err(err) => {
                debug!(%err, "Rejecting move");
                self.send_error(ErrorCode::MALFORMED_MOVE, MALFORMED_MOVE_TEXT)
                    .await?;
                return Ok(None);
            }
        };

        match self.game.play(mv) {
            Ok(outcome) if outcome.is_over() => return self.finish(outcome).await.map(Some),
            Ok(_) => {}
            Err(err @ RuleError::CellOccupied { .. }) => {
                debug!(%err, "Rejecting move");
                self.send_error(ErrorCode::CELL_OCCUPIED, CELL_OCCUPIED_TEXT)
                    .await?;
                return Ok(None);
            }
            Err(err) => {
                debug!(%err, "Rejecting move");
                self.send_error(ErrorCode::MALFORMED_MOVE, MALFORMED_MOVE_TEXT)
                    .await?;
                return Ok(None);
            }
        }

        let Some(reply) = best_move(self.game.board(), RESPONDER_MARK) else {
            error!("Search found no move in a running game");
            return Ok(None);
        };
        match self.game.play(reply.mv) {
            Ok(outcome) if outcome.is_over() => self.finish(outcome).await.map(Some),
            Ok(_) => {
                self.writer
                    .send(&Message::Action {
                        session,
                        mv: reply.mv.to_string(),
                    })
                    .await?;
                Ok(None)
            }
            Err(err) => {
                error!(%err, mv = %reply.mv, "Search produced an illegal move");
                Ok(None)
            }
        }
    }

    /// Sends `Result` for a finished game and waits for the next `Play`.
    async fn finish(&mut self, outcome: GameOutcome) -> Result<GameEnd, WireError> {
        let last = self
            .game
            .last_move()
            .map(|mv| mv.to_string())
            .unwrap_or_else(|| NO_MOVE.to_string());
        let (flag, mv) = match outcome {
            GameOutcome::Won(Mark::X) => (ResultFlag::InitiatorWin, NO_MOVE.to_string()),
            GameOutcome::Won(Mark::O) => (ResultFlag::ResponderWin, last),
            GameOutcome::Draw | GameOutcome::InProgress => (ResultFlag::Draw, last),
        };
        info!(%outcome, %flag, %mv, "Sending result");

        self.phase = Phase::AwaitingPlay;
        let session = self.session.unwrap_or(UNASSIGNED_SESSION);
        self.writer
            .send(&Message::Result { session, mv, flag })
            .await?;
        Ok(GameEnd::Finished)
    }

    /// Logs an error reported by the initiator. An active game ends without
    /// a reply.
    fn on_peer_error(
        &mut self,
        session: SessionId,
        code: ErrorCode,
        message: &str,
    ) -> Option<GameEnd> {
        warn!(session_id = session, %code, text = message, "Initiator reported an error");
        if self.phase == Phase::GameActive {
            self.phase = Phase::AwaitingPlay;
            Some(GameEnd::Abandoned)
        } else {
            None
        }
    }

    async fn send_error(&mut self, code: ErrorCode, message: &str) -> Result<(), WireError> {
        let session = self.session.unwrap_or(UNASSIGNED_SESSION);
        self.writer
            .send(&Message::Error {
                session,
                code,
                message: message.to_string(),
            })
            .await
    }
}

fn fresh_session_id() -> SessionId {
    rand::rng().random_range(SESSION_IDS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_ids_in_range() {
        for _ in 0..1000 {
            assert!(SESSION_IDS.contains(&fresh_session_id()));
        }
    }

    #[test]
    fn test_new_responder_awaits_hello() {
        let responder = Responder::new(&b""[..], Vec::new(), Duration::from_secs(1));
        assert_eq!(responder.phase(), Phase::AwaitingHello);
        assert_eq!(responder.session(), None);
        assert_eq!(responder.games_completed(), 0);
    }

    #[tokio::test]
    async fn test_immediate_close_is_clean() {
        let mut responder = Responder::new(&b""[..], Vec::new(), Duration::from_secs(1));
        responder.run().await.unwrap();
    }

    #[tokio::test]
    async fn test_frame_cut_short_is_error() {
        let mut responder = Responder::new(&[1u8, 0, 0][..], Vec::new(), Duration::from_secs(1));
        let err = responder.run().await.unwrap_err();
        assert_eq!(err.kind(), &WireErrorKind::Truncated);
    }
}
