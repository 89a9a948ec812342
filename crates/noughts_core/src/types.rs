//! Core domain types for tic-tac-toe.

use super::error::RuleError;
use super::rules;
use tracing::instrument;

/// Side length of the board.
pub const BOARD_SIZE: usize = 3;

/// A mark placed on the board.
///
/// `X` belongs to the initiator (moves first), `O` to the responder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::EnumIter, strum::Display)]
pub enum Mark {
    /// Initiator's mark (goes first).
    X,
    /// Responder's mark.
    O,
}

impl Mark {
    /// Returns the opposing mark.
    pub fn opponent(self) -> Self {
        match self {
            Mark::X => Mark::O,
            Mark::O => Mark::X,
        }
    }
}

/// A cell on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cell {
    /// Nobody has played here yet.
    Empty,
    /// Cell holds a mark.
    Occupied(Mark),
}

/// Outcome derived from board contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display)]
pub enum GameOutcome {
    /// Game is ongoing.
    #[display("in progress")]
    InProgress,
    /// A side completed a line.
    #[display("{} wins", _0)]
    Won(Mark),
    /// Board is full and nobody completed a line.
    #[display("draw")]
    Draw,
}

impl GameOutcome {
    /// True once the game has ended in a win or a draw.
    pub fn is_over(self) -> bool {
        self != GameOutcome::InProgress
    }
}

/// 3x3 tic-tac-toe board, indexed `[row][col]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Board {
    cells: [[Cell; BOARD_SIZE]; BOARD_SIZE],
}

impl Board {
    /// Creates a new empty board.
    pub fn new() -> Self {
        Self {
            cells: [[Cell::Empty; BOARD_SIZE]; BOARD_SIZE],
        }
    }

    /// Gets the cell at `(row, col)`, or `None` when off the board.
    pub fn get(&self, row: usize, col: usize) -> Option<Cell> {
        self.cells.get(row).and_then(|r| r.get(col)).copied()
    }

    /// Checks if a cell is on the board and empty.
    pub fn is_empty(&self, row: usize, col: usize) -> bool {
        matches!(self.get(row, col), Some(Cell::Empty))
    }

    /// Places `mark` at `(row, col)` and returns the resulting outcome.
    ///
    /// # Errors
    ///
    /// `OutOfRange` when either coordinate is outside `0..=2`, and
    /// `CellOccupied` when the cell already holds a mark. A rejected
    /// placement never modifies the board.
    #[instrument(skip(self))]
    pub fn place_mark(&mut self, row: usize, col: usize, mark: Mark) -> Result<GameOutcome, RuleError> {
        match self.get(row, col) {
            None => Err(RuleError::OutOfRange { row, col }),
            Some(Cell::Occupied(_)) => Err(RuleError::CellOccupied { row, col }),
            Some(Cell::Empty) => {
                self.cells[row][col] = Cell::Occupied(mark);
                Ok(self.outcome())
            }
        }
    }

    /// Overwrites a cell without rule checks; the search uses this for
    /// trial placements and to undo them.
    pub(crate) fn set(&mut self, row: usize, col: usize, cell: Cell) {
        self.cells[row][col] = cell;
    }

    /// Recomputes the outcome from the current contents.
    pub fn outcome(&self) -> GameOutcome {
        if let Some(winner) = rules::check_winner(self) {
            GameOutcome::Won(winner)
        } else if rules::is_full(self) {
            GameOutcome::Draw
        } else {
            GameOutcome::InProgress
        }
    }

    /// Returns all cells as rows.
    pub fn cells(&self) -> &[[Cell; BOARD_SIZE]; BOARD_SIZE] {
        &self.cells
    }

    /// Empty cells in row-major order.
    pub fn empty_cells(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        (0..BOARD_SIZE)
            .flat_map(|row| (0..BOARD_SIZE).map(move |col| (row, col)))
            .filter(|&(row, col)| self.cells[row][col] == Cell::Empty)
    }

    /// Formats the board as a text grid.
    pub fn render(&self) -> String {
        let rows: Vec<String> = self
            .cells
            .iter()
            .map(|row| {
                let symbols: Vec<&str> = row
                    .iter()
                    .map(|cell| match cell {
                        Cell::Empty => " ",
                        Cell::Occupied(Mark::X) => "X",
                        Cell::Occupied(Mark::O) => "O",
                    })
                    .collect();
                format!("| {} |", symbols.join(" | "))
            })
            .collect();
        rows.join("\n-------------\n")
    }

    /// Formats the `row-col` coordinate of every cell, for move entry.
    pub fn legend() -> String {
        let rows: Vec<String> = (0..BOARD_SIZE)
            .map(|row| {
                let coords: Vec<String> = (0..BOARD_SIZE).map(|col| format!("{row}-{col}")).collect();
                format!("| {} |", coords.join(" | "))
            })
            .collect();
        rows.join("\n-------------------\n")
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}
