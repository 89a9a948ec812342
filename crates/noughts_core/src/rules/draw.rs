//! Draw detection logic for tic-tac-toe.

use super::super::{Board, Cell};
use super::win::check_winner;
use tracing::instrument;

/// Checks if the board is full (all cells occupied).
#[instrument(level = "trace", skip(board))]
pub fn is_full(board: &Board) -> bool {
    board.cells().iter().flatten().all(|cell| *cell != Cell::Empty)
}

/// A full board with no winner.
#[instrument(level = "trace", skip(board))]
pub fn is_draw(board: &Board) -> bool {
    is_full(board) && check_winner(board).is_none()
}

#[cfg(test)]
mod tests {
    use super::super::super::{GameOutcome, Mark};
    use super::*;

    fn board_from(rows: [&str; 3]) -> Board {
        let mut board = Board::new();
        for (row, text) in rows.iter().enumerate() {
            for (col, ch) in text.chars().enumerate() {
                match ch {
                    'X' => board.place_mark(row, col, Mark::X).map(|_| ()).unwrap(),
                    'O' => board.place_mark(row, col, Mark::O).map(|_| ()).unwrap(),
                    _ => {}
                }
            }
        }
        board
    }

    #[test]
    fn test_empty_board_not_full() {
        assert!(!is_full(&Board::new()));
    }

    #[test]
    fn test_draw_detection() {
        let board = board_from(["XOX", "XOO", "OXX"]);
        assert!(is_full(&board));
        assert!(is_draw(&board));
        assert_eq!(board.outcome(), GameOutcome::Draw);
    }

    #[test]
    fn test_not_draw_if_winner() {
        // Full board where X completes the left column.
        let board = board_from(["XOX", "XOO", "XXO"]);
        assert!(is_full(&board));
        assert!(!is_draw(&board));
        assert_eq!(board.outcome(), GameOutcome::Won(Mark::X));
    }

    #[test]
    fn test_partial_board_in_progress() {
        let board = board_from(["X..", ".O.", "..."]);
        assert!(!is_full(&board));
        assert_eq!(board.outcome(), GameOutcome::InProgress);
    }
}
