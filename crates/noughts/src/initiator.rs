//! Client side of a session.
//!
//! Every request waits for exactly one reply within the reply timeout.
//! The initiator keeps a local board mirror: its own move and the
//! responder's reply are applied once the responder accepts them.

use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::players::{GameEvent, Player};
use noughts_core::{Game, Mark, Move};
use noughts_wire::{
    ErrorCode, MOVE_LEN, Message, Opcode, ResultFlag, SessionId, UNASSIGNED_SESSION, WireError,
    WireReader, WireWriter,
};
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncWrite, BufReader};
use tokio::net::TcpStream;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tracing::{debug, info, instrument, warn};

/// Mark the initiator plays. It always moves first.
pub const INITIATOR_MARK: Mark = Mark::X;

/// Drives one session against a responder.
#[derive(Debug)]
pub struct Initiator<R, W> {
    reader: WireReader<R>,
    writer: WireWriter<W>,
    reply_timeout: Duration,
    max_attempts: u32,
    session: SessionId,
    game: Game,
}

impl Initiator<BufReader<OwnedReadHalf>, OwnedWriteHalf> {
    /// Opens a TCP connection to the configured responder.
    #[instrument(skip(config), fields(host = %config.host(), port = config.port()))]
    pub async fn dial(config: &ClientConfig) -> Result<Self, ClientError> {
        let stream = TcpStream::connect((config.host().as_str(), *config.port()))
            .await
            .map_err(WireError::from)?;
        info!("Connected to responder");
        let (read, write) = stream.into_split();
        Ok(Self::new(
            BufReader::new(read),
            write,
            config.reply_timeout(),
            *config.max_attempts(),
        ))
    }
}

impl<R, W> Initiator<R, W>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    /// Creates an initiator over the two halves of a connection.
    pub fn new(reader: R, writer: W, reply_timeout: Duration, max_attempts: u32) -> Self {
        Self {
            reader: WireReader::new(reader),
            writer: WireWriter::new(writer),
            reply_timeout,
            max_attempts,
            session: UNASSIGNED_SESSION,
            game: Game::new(),
        }
    }

    /// Bound session id, once `Ready` has arrived.
    pub fn session(&self) -> Option<SessionId> {
        (self.session != UNASSIGNED_SESSION).then_some(self.session)
    }

    /// Local mirror of the current game.
    pub fn game(&self) -> &Game {
        &self.game
    }

    /// Connects, then plays games for as long as `player` wants them.
    /// Returns the number of games played.
    #[instrument(skip(self, player), fields(player = %player.name()))]
    pub async fn run(&mut self, player: &mut dyn Player) -> Result<u32, ClientError> {
        let name = player.name().to_string();
        let session = self.connect(&name).await?;
        player.notify(&GameEvent::Connected { session }, &self.game);

        let mut played = 0;
        while player.wants_game(played).await? {
            self.request_play().await?;
            player.notify(&GameEvent::Admitted { session }, &self.game);
            let flag = self.play_game(player).await?;
            played += 1;
            info!(%flag, games = played, "Game over");
        }
        Ok(played)
    }

    /// Sends `Hello` until the responder answers `Ready`, and binds the
    /// session id it carries.
    ///
    /// # Errors
    ///
    /// A different id than the one already bound, any reply other than
    /// `Ready` or `Error`, or a connection failure.
    #[instrument(skip(self))]
    pub async fn connect(&mut self, name: &str) -> Result<SessionId, ClientError> {
        let hello = Message::Hello {
            session: self.session,
            name: name.to_string(),
        };
        for attempt in 1..=self.max_attempts {
            match self.request(&hello).await? {
                Message::Ready { session } => return self.bind(session),
                Message::Error { code, message, .. } => {
                    warn!(attempt, %code, text = %message, "Hello refused, retrying");
                }
                other => return Err(unexpected("Ready", &other)),
            }
        }
        Err(ClientError::protocol(format!(
            "Hello refused {} times",
            self.max_attempts
        )))
    }

    /// Sends `Play` and waits to be admitted. Starts a fresh local mirror.
    ///
    /// # Errors
    ///
    /// An `Admit` with flag 0 or a foreign session id, any reply other than
    /// `Admit` or `Error`, or a connection failure.
    #[instrument(skip(self), fields(session_id = self.session))]
    pub async fn request_play(&mut self) -> Result<(), ClientError> {
        let play = Message::Play {
            session: self.session,
        };
        for attempt in 1..=self.max_attempts {
            match self.request(&play).await? {
                Message::Admit { session, admitted } => {
                    self.check_session(session)?;
                    if !admitted {
                        return Err(ClientError::protocol("responder refused to start a game"));
                    }
                    self.game = Game::new();
                    info!("Admitted");
                    return Ok(());
                }
                Message::Error { code, message, .. } => {
                    warn!(attempt, %code, text = %message, "Play refused, retrying");
                }
                other => return Err(unexpected("Admit", &other)),
            }
        }
        Err(ClientError::protocol(format!(
            "Play refused {} times",
            self.max_attempts
        )))
    }

    /// Plays until the responder sends `Result`, asking `player` for every
    /// move. Returns who won.
    pub async fn play_game(&mut self, player: &mut dyn Player) -> Result<ResultFlag, ClientError> {
        loop {
            let text = player.choose_move(&self.game).await?;
            if text.chars().count() != MOVE_LEN {
                debug!(text, "Refusing move of the wrong length");
                let event = GameEvent::Rejected {
                    code: ErrorCode::MALFORMED_MOVE,
                    message: format!("a move is exactly {MOVE_LEN} characters"),
                };
                player.notify(&event, &self.game);
                continue;
            }

            let event = self.play_turn(&text).await?;
            player.notify(&event, &self.game);
            if let GameEvent::Finished { flag, .. } = event {
                return Ok(flag);
            }
        }
    }

    /// Sends one move and interprets the reply.
    ///
    /// Returns [`GameEvent::Countered`], [`GameEvent::Finished`] or, when
    /// the responder refused the move, [`GameEvent::Rejected`].
    #[instrument(skip(self), fields(session_id = self.session))]
    pub async fn play_turn(&mut self, text: &str) -> Result<GameEvent, ClientError> {
        let action = Message::Action {
            session: self.session,
            mv: text.to_string(),
        };
        match self.request(&action).await? {
            Message::Action { session, mv } => {
                self.check_session(session)?;
                let own = self.mirror(text)?;
                let reply = self.mirror(&mv)?;
                Ok(GameEvent::Countered { own, reply })
            }
            Message::Result { session, mv, flag } => {
                self.check_session(session)?;
                let own = self.mirror(text)?;
                let decided_by_responder = match flag {
                    ResultFlag::ResponderWin => true,
                    ResultFlag::InitiatorWin => false,
                    ResultFlag::Draw => Move::parse(&mv).ok() != Some(own),
                };
                if decided_by_responder {
                    self.mirror(&mv)?;
                }
                Ok(GameEvent::Finished { flag, mv })
            }
            Message::Error { code, message, .. } => {
                info!(%code, text = %message, "Move refused");
                Ok(GameEvent::Rejected { code, message })
            }
            other => Err(unexpected("Action, Result or Error", &other)),
        }
    }

    /// Sends `request` and returns the reply, resending after transient
    /// transport errors.
    async fn request(&mut self, request: &Message) -> Result<Message, ClientError> {
        let mut attempt = 1;
        loop {
            match self.exchange(request).await {
                Err(err) if err.is_retryable() && attempt < self.max_attempts => {
                    warn!(attempt, %err, "Request failed, resending");
                    attempt += 1;
                }
                result => return result,
            }
        }
    }

    async fn exchange(&mut self, request: &Message) -> Result<Message, ClientError> {
        self.writer.send(request).await?;
        let byte = self.reader.read_u8_within(self.reply_timeout).await?;
        let opcode = Opcode::try_from(byte)?;
        let reply = self
            .reader
            .read_body_within(opcode, self.reply_timeout)
            .await?;
        debug!(opcode = %reply.opcode(), "Received reply");
        Ok(reply)
    }

    fn bind(&mut self, session: SessionId) -> Result<SessionId, ClientError> {
        if session == UNASSIGNED_SESSION {
            return Err(ClientError::protocol("Ready carries no session id"));
        }
        if self.session != UNASSIGNED_SESSION && self.session != session {
            return Err(ClientError::protocol(format!(
                "session id changed from {} to {}",
                self.session, session
            )));
        }
        self.session = session;
        info!(session_id = session, "Session bound");
        Ok(session)
    }

    fn check_session(&self, session: SessionId) -> Result<(), ClientError> {
        if session == self.session {
            Ok(())
        } else {
            Err(ClientError::protocol(format!(
                "reply for session {}, expected {}",
                session, self.session
            )))
        }
    }

    /// Applies an accepted move to the local mirror.
    fn mirror(&mut self, text: &str) -> Result<Move, ClientError> {
        let mv = Move::parse(text)
            .map_err(|e| ClientError::protocol(format!("accepted move {text:?} is unreadable: {e}")))?;
        self.game
            .play(mv)
            .map_err(|e| ClientError::protocol(format!("accepted move {mv} does not fit the local board: {e}")))?;
        Ok(mv)
    }
}

fn unexpected(expected: &str, received: &Message) -> ClientError {
    ClientError::protocol(format!(
        "expected {expected}, received {}",
        received.opcode()
    ))
}
