//! Error type for the domain layer

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A move or lookup referenced a cell outside the board
    #[error("Cell ({row}, {col}) is outside the {rows}x{cols} board")]
    OutOfBounds {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },
}

impl DomainError {
    /// Create an out-of-bounds error for a board of the given dimensions
    pub fn out_of_bounds(row: usize, col: usize, rows: usize, cols: usize) -> Self {
        Self::OutOfBounds {
            row,
            col,
            rows,
            cols,
        }
    }
}
