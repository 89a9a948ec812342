//! Rule violations raised by the board and move parser.

/// Error that can occur when parsing or applying a move.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum RuleError {
    /// Move text is not of the form `<row>-<col>` with digits in `0..=2`.
    #[display("Malformed move {:?}: expected row-col with digits 0 to 2", _0)]
    MalformedMove(#[error(not(source))] String),

    /// Coordinates fall outside the board.
    #[display("Cell {}-{} is outside the board", row, col)]
    OutOfRange {
        /// Requested row.
        row: usize,
        /// Requested column.
        col: usize,
    },

    /// The target cell already holds a mark.
    #[display("Cell {}-{} is already occupied", row, col)]
    CellOccupied {
        /// Requested row.
        row: usize,
        /// Requested column.
        col: usize,
    },

    /// The game has already ended.
    #[display("Game is already over")]
    GameOver,
}
