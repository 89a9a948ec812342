//! Exhaustive minimax move search.
//!
//! One search serves both sides: the caller names the maximizing mark,
//! which is also the side to move at the root. Terminal positions score
//! `+1` when the maximizing mark has a line, `-1` when its opponent does
//! and `0` for a draw.
//!
//! Cells are tried in row-major order and a later candidate replaces the
//! current best only on a strict improvement, so among equally scored
//! moves the first one in row-major order wins.

use super::moves::Move;
use super::types::{Board, Cell, GameOutcome, Mark};
use tracing::{debug, instrument};

/// A move together with its minimax score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_new::new)]
pub struct ScoredMove {
    /// The chosen move.
    pub mv: Move,
    /// Score from the maximizing side's perspective: `1`, `0` or `-1`.
    pub score: i8,
}

/// Returns the optimal move for `maximizing`, or `None` when the game is
/// already over.
#[instrument(skip(board), fields(maximizing = %maximizing))]
pub fn best_move(board: &Board, maximizing: Mark) -> Option<ScoredMove> {
    let mut scratch = board.clone();
    let (_, best) = minimax(&mut scratch, maximizing, maximizing);
    if let Some(scored) = best {
        debug!(mv = %scored.mv, score = scored.score, "Search complete");
    }
    best
}

/// Scores `board` with `to_move` about to play, returning the score and the
/// best move found (none at terminal positions).
fn minimax(board: &mut Board, to_move: Mark, maximizing: Mark) -> (i8, Option<ScoredMove>) {
    match board.outcome() {
        GameOutcome::Won(mark) if mark == maximizing => return (1, None),
        GameOutcome::Won(_) => return (-1, None),
        GameOutcome::Draw => return (0, None),
        GameOutcome::InProgress => {}
    }

    let maximize = to_move == maximizing;
    let candidates: Vec<(usize, usize)> = board.empty_cells().collect();
    let mut best: Option<ScoredMove> = None;

    for (row, col) in candidates {
        board.set(row, col, Cell::Occupied(to_move));
        let (score, _) = minimax(board, to_move.opponent(), maximizing);
        board.set(row, col, Cell::Empty);

        let improves = match best {
            None => true,
            Some(current) if maximize => score > current.score,
            Some(current) => score < current.score,
        };
        if improves {
            best = Some(ScoredMove::new(Move::new(row, col), score));
        }
    }

    match best {
        Some(scored) => (scored.score, Some(scored)),
        // Unreachable for an in-progress board, which always has an empty cell.
        None => (0, None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board_from(rows: [&str; 3]) -> Board {
        let mut board = Board::new();
        for (row, text) in rows.iter().enumerate() {
            for (col, ch) in text.chars().enumerate() {
                let mark = match ch {
                    'X' => Mark::X,
                    'O' => Mark::O,
                    _ => continue,
                };
                board.place_mark(row, col, mark).unwrap();
            }
        }
        board
    }

    #[test]
    fn test_center_opening_answered_in_corner() {
        let board = board_from(["...", ".X.", "..."]);
        let best = best_move(&board, Mark::O).unwrap();
        assert_eq!(best, ScoredMove::new(Move::new(0, 0), 0));
    }

    #[test]
    fn test_empty_board_is_a_draw() {
        let best = best_move(&Board::new(), Mark::X).unwrap();
        assert_eq!(best, ScoredMove::new(Move::new(0, 0), 0));
    }

    #[test]
    fn test_takes_immediate_win() {
        let board = board_from(["XX.", "OO.", "..."]);
        let best = best_move(&board, Mark::X).unwrap();
        assert_eq!(best, ScoredMove::new(Move::new(0, 2), 1));
    }

    #[test]
    fn test_blocks_opponent_line() {
        // X threatens the top row; O must take 0-2.
        let board = board_from(["XX.", ".O.", "..."]);
        let best = best_move(&board, Mark::O).unwrap();
        assert_eq!(best.mv, Move::new(0, 2));
    }

    #[test]
    fn test_perspective_is_symmetric() {
        // Same position with colours swapped yields the same move and score.
        let board = board_from(["OO.", "XX.", "..."]);
        let swapped = board_from(["XX.", "OO.", "..."]);
        assert_eq!(best_move(&board, Mark::O), best_move(&swapped, Mark::X));
    }

    #[test]
    fn test_lost_position_scores_negative() {
        // X has a double threat; whatever O does, X wins.
        let board = board_from(["X.X", ".O.", "X.O"]);
        let best = best_move(&board, Mark::O).unwrap();
        assert_eq!(best.score, -1);
    }

    #[test]
    fn test_finished_board_has_no_move() {
        let board = board_from(["XXX", "OO.", "..."]);
        assert_eq!(best_move(&board, Mark::O), None);
    }

    #[test]
    fn test_search_leaves_board_untouched() {
        let board = board_from(["X..", ".O.", "..X"]);
        let before = board.clone();
        let _ = best_move(&board, Mark::O);
        assert_eq!(board, before);
    }
}
