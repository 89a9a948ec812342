//! Moves and their `row-col` text form.

use super::error::RuleError;
use std::str::FromStr;

/// A move: the cell a side wants to mark.
///
/// Coordinates are not range-checked here; [`Board::place_mark`](super::Board::place_mark)
/// rejects cells off the board. Moves produced by [`Move::parse`] are always in range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_new::new)]
pub struct Move {
    /// Row, 0 at the top.
    pub row: usize,
    /// Column, 0 at the left.
    pub col: usize,
}

impl Move {
    /// Parses `"<row>-<col>"` with both digits in `0..=2`.
    ///
    /// Validation only: the board is not consulted, so the caller can
    /// classify a malformed move before touching game state.
    pub fn parse(text: &str) -> Result<Self, RuleError> {
        match text.as_bytes() {
            [row @ b'0'..=b'2', b'-', col @ b'0'..=b'2'] => {
                Ok(Self::new(usize::from(row - b'0'), usize::from(col - b'0')))
            }
            _ => Err(RuleError::MalformedMove(text.to_string())),
        }
    }
}

impl FromStr for Move {
    type Err = RuleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl std::fmt::Display for Move {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.row, self.col)
    }
}
