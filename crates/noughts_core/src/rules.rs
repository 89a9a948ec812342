//! Game rules for tic-tac-toe.
//!
//! Pure functions evaluating board contents. Outcomes are always
//! recomputed from the board, never cached between moves.
//!
//! The checks run at every node of the move search, so their spans are at
//! `trace` level.

pub mod draw;
pub mod win;

pub use draw::{is_draw, is_full};
pub use win::{LINES, check_winner};
