//! Fixed-size game boards derived from move lists.
//!
//! A board is never authoritative state. It is rebuilt by folding
//! "place piece at (row, col)" over a game's replicated move list, so two
//! clients holding the same moves always hold the same board.

use std::ops::Index;

use crate::error::DomainError;

/// A move that puts one piece on one cell.
pub trait PlacedMove {
    type Piece: Copy;

    fn row(&self) -> usize;
    fn col(&self) -> usize;
    fn piece(&self) -> Self::Piece;
}

/// A `ROWS` x `COLS` grid where every cell is empty or holds a piece.
///
/// Row 0 is the top row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Board<P: Copy, const ROWS: usize, const COLS: usize> {
    cells: [[Option<P>; COLS]; ROWS],
}

impl<P: Copy, const ROWS: usize, const COLS: usize> Board<P, ROWS, COLS> {
    pub fn empty() -> Self {
        Self {
            cells: [[None; COLS]; ROWS],
        }
    }

    /// Fold a move list into a fresh board, in list order.
    ///
    /// A later move onto an occupied cell overwrites it; rule enforcement
    /// belongs to the server.
    pub fn from_moves<'a, M>(moves: impl IntoIterator<Item = &'a M>) -> Result<Self, DomainError>
    where
        M: PlacedMove<Piece = P> + 'a,
    {
        moves.into_iter().try_fold(Self::empty(), |mut board, m| {
            board.place(m.row(), m.col(), m.piece())?;
            Ok(board)
        })
    }

    pub fn place(&mut self, row: usize, col: usize, piece: P) -> Result<(), DomainError> {
        let cell = self
            .cells
            .get_mut(row)
            .and_then(|r| r.get_mut(col))
            .ok_or_else(|| DomainError::out_of_bounds(row, col, ROWS, COLS))?;
        *cell = Some(piece);
        Ok(())
    }

    /// Piece at a cell; `None` for empty or out-of-range cells.
    pub fn get(&self, row: usize, col: usize) -> Option<P> {
        self.cells.get(row).and_then(|r| r.get(col)).copied().flatten()
    }

    pub fn is_occupied(&self, row: usize, col: usize) -> bool {
        self.get(row, col).is_some()
    }

    /// `(rows, columns)` of this board shape.
    pub const fn dimensions() -> (usize, usize) {
        (ROWS, COLS)
    }

    pub fn rows(&self) -> &[[Option<P>; COLS]; ROWS] {
        &self.cells
    }

    pub fn occupied_cells(&self) -> usize {
        self.cells.iter().flatten().filter(|c| c.is_some()).count()
    }
}

impl<P: Copy, const ROWS: usize, const COLS: usize> Default for Board<P, ROWS, COLS> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<P: Copy, const ROWS: usize, const COLS: usize> Index<usize> for Board<P, ROWS, COLS> {
    type Output = [Option<P>; COLS];

    fn index(&self, row: usize) -> &Self::Output {
        &self.cells[row]
    }
}
