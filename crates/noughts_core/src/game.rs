//! Game state: a board, whose turn it is, and what has been played.

use super::error::RuleError;
use super::moves::Move;
use super::types::{Board, GameOutcome, Mark};
use tracing::{debug, instrument};

/// Tic-tac-toe game engine.
///
/// `X` always moves first. The turn flips only after a placement that
/// leaves the game in progress; the outcome is recomputed from the board
/// on every query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Game {
    board: Board,
    to_move: Mark,
    history: Vec<Move>,
}

impl Game {
    /// Creates a new game with an empty board and `X` to move.
    pub fn new() -> Self {
        Self {
            board: Board::new(),
            to_move: Mark::X,
            history: Vec::new(),
        }
    }

    /// Returns the board.
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Returns the side to move.
    pub fn to_move(&self) -> Mark {
        self.to_move
    }

    /// Returns the moves played so far, oldest first.
    pub fn history(&self) -> &[Move] {
        &self.history
    }

    /// Returns the most recent move, if any.
    pub fn last_move(&self) -> Option<Move> {
        self.history.last().copied()
    }

    /// Current outcome, derived from the board.
    pub fn outcome(&self) -> GameOutcome {
        self.board.outcome()
    }

    /// Places the mark of the side to move.
    ///
    /// # Errors
    ///
    /// `GameOver` once the game has ended, otherwise whatever
    /// [`Board::place_mark`] rejects. Errors leave the game untouched.
    #[instrument(skip(self), fields(mark = %self.to_move))]
    pub fn play(&mut self, mv: Move) -> Result<GameOutcome, RuleError> {
        if self.outcome().is_over() {
            return Err(RuleError::GameOver);
        }

        let outcome = self.board.place_mark(mv.row, mv.col, self.to_move)?;
        self.history.push(mv);

        if !outcome.is_over() {
            self.to_move = self.to_move.opponent();
        }

        debug!(%mv, %outcome, "Move applied");
        Ok(outcome)
    }
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}
