//! Tic-tac-toe rules engine and move search.
//!
//! # Architecture
//!
//! - **Board**: the 3x3 grid and mark placement with rule checks
//! - **Rules**: win and draw detection, recomputed from the board
//! - **Game**: turn order and move history on top of a board
//! - **Search**: exhaustive minimax shared by both sides of a session
//!
//! # Example
//!
//! ```
//! use noughts_core::{Game, Mark, Move, best_move};
//!
//! let mut game = Game::new();
//! game.play(Move::parse("1-1")?)?;
//! let reply = best_move(game.board(), Mark::O).expect("game in progress");
//! assert_eq!(reply.mv.to_string(), "0-0");
//! # Ok::<(), noughts_core::RuleError>(())
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod error;
mod game;
mod moves;
pub mod rules;
mod search;
mod types;

pub use error::RuleError;
pub use game::Game;
pub use moves::Move;
pub use search::{ScoredMove, best_move};
pub use types::{BOARD_SIZE, Board, Cell, GameOutcome, Mark};
