//! Automated player backed by the minimax search.

use super::{GameEvent, Player};
use crate::error::ClientError;
use crate::initiator::INITIATOR_MARK;
use noughts_core::{Game, best_move};
use tracing::{debug, info, instrument};

/// Plays every move with [`best_move`] and stops after a fixed number of games.
#[derive(Debug, Clone)]
pub struct SearchPlayer {
    name: String,
    games: u32,
}

impl SearchPlayer {
    /// Creates a player that plays `games` games.
    pub fn new(name: impl Into<String>, games: u32) -> Self {
        Self {
            name: name.into(),
            games,
        }
    }
}

#[async_trait::async_trait]
impl Player for SearchPlayer {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(skip(self, game), fields(player = %self.name))]
    async fn choose_move(&mut self, game: &Game) -> Result<String, ClientError> {
        let scored = best_move(game.board(), INITIATOR_MARK)
            .ok_or_else(|| ClientError::Player("no move available".to_string()))?;
        debug!(mv = %scored.mv, score = scored.score, "Chose move");
        Ok(scored.mv.to_string())
    }

    async fn wants_game(&mut self, games_played: u32) -> Result<bool, ClientError> {
        Ok(games_played < self.games)
    }

    fn notify(&mut self, event: &GameEvent, _game: &Game) {
        match event {
            GameEvent::Finished { flag, mv } => info!(%flag, %mv, "Game finished"),
            GameEvent::Rejected { code, message } => info!(%code, %message, "Move rejected"),
            other => debug!(?other, "Game event"),
        }
    }
}
