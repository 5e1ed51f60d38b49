//! Board, cell and move types.

use std::fmt;

use thiserror::Error;

use crate::connectivity::{self, ConnectivityScratch};
use crate::{DEFAULT_SIZE, MAX_SIZE};

/// Errors raised when a board operation would break the game rules.
///
/// These are not user input errors: the search only ever plays moves it
/// generated itself, so any of these points at a bookkeeping bug and the
/// caller is expected to abort the operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BoardError {
    #[error("cell ({row}, {col}) is already occupied")]
    Occupied { row: u8, col: u8 },

    #[error("cell ({row}, {col}) is outside a {size}x{size} board")]
    OutOfBounds { row: u8, col: u8, size: usize },

    #[error("swap is only legal as Blue's reply to a single opening stone ({stones} stones on board)")]
    SwapNotAllowed { stones: usize },

    #[error("invalid board text: {0}")]
    Parse(String),
}

/// One of the two players.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    /// Moves first and connects the top row to the bottom row.
    Red,
    /// Moves second and connects the left column to the right column.
    Blue,
}

impl Side {
    /// The other player.
    #[inline]
    pub fn opponent(self) -> Side {
        match self {
            Side::Red => Side::Blue,
            Side::Blue => Side::Red,
        }
    }

    /// Whether this is the top-to-bottom side that external models are
    /// trained from.
    #[inline]
    pub fn is_primary(self) -> bool {
        self == Side::Red
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Red => f.write_str("Red"),
            Side::Blue => f.write_str("Blue"),
        }
    }
}

/// Content of a single board cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Cell {
    #[default]
    Empty,
    Red,
    Blue,
}

impl Cell {
    /// The owner of the stone, if any.
    #[inline]
    pub fn side(self) -> Option<Side> {
        match self {
            Cell::Empty => None,
            Cell::Red => Some(Side::Red),
            Cell::Blue => Some(Side::Blue),
        }
    }

    /// Same cell with the stone colour exchanged.
    #[inline]
    pub fn flipped(self) -> Cell {
        match self {
            Cell::Empty => Cell::Empty,
            Cell::Red => Cell::Blue,
            Cell::Blue => Cell::Red,
        }
    }
}

impl From<Side> for Cell {
    #[inline]
    fn from(side: Side) -> Self {
        match side {
            Side::Red => Cell::Red,
            Side::Blue => Cell::Blue,
        }
    }
}

/// A move: a stone placement or the one-time swap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Move {
    Place { row: u8, col: u8 },
    Swap,
}

impl Move {
    /// Shorthand for [`Move::Place`].
    #[inline]
    pub const fn place(row: u8, col: u8) -> Move {
        Move::Place { row, col }
    }

    /// The same move on a transposed board. Swap is unchanged.
    #[inline]
    pub fn transposed(self) -> Move {
        match self {
            Move::Place { row, col } => Move::Place { row: col, col: row },
            Move::Swap => Move::Swap,
        }
    }

    #[inline]
    pub fn is_swap(self) -> bool {
        self == Move::Swap
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Move::Place { row, col } => write!(f, "{},{}", row, col),
            Move::Swap => f.write_str("SWAP"),
        }
    }
}

/// Square Hex board of `size × size` cells.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Board {
    size: usize,
    /// Row-major cells
    cells: Vec<Cell>,
}

impl Board {
    /// Create an empty board.
    ///
    /// # Panics
    ///
    /// If `size` exceeds [`MAX_SIZE`].
    pub fn new(size: usize) -> Self {
        assert!(
            size <= MAX_SIZE,
            "board size {size} exceeds the maximum of {MAX_SIZE}"
        );
        Self {
            size,
            cells: vec![Cell::Empty; size * size],
        }
    }

    /// Build a board from one string per row.
    ///
    /// `R` is a Red stone, `B` a Blue stone, `.` or `0` an empty cell.
    /// Whitespace is ignored so the indented [`Display`](fmt::Display)
    /// output parses back.
    pub fn from_rows(rows: &[&str]) -> Result<Self, BoardError> {
        let size = rows.len();
        if size > MAX_SIZE {
            return Err(BoardError::Parse(format!(
                "{} rows exceed the maximum size of {}",
                size, MAX_SIZE
            )));
        }
        let mut cells = Vec::with_capacity(size * size);

        for (r, row) in rows.iter().enumerate() {
            let before = cells.len();
            for ch in row.chars().filter(|c| !c.is_whitespace()) {
                cells.push(match ch {
                    'R' | 'r' => Cell::Red,
                    'B' | 'b' => Cell::Blue,
                    '.' | '0' => Cell::Empty,
                    other => {
                        return Err(BoardError::Parse(format!(
                            "unexpected '{}' in row {}",
                            other, r
                        )))
                    }
                });
            }
            if cells.len() - before != size {
                return Err(BoardError::Parse(format!(
                    "row {} has {} cells, expected {}",
                    r,
                    cells.len() - before,
                    size
                )));
            }
        }

        Ok(Self { size, cells })
    }

    /// Edge length.
    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Row-major view of all cells.
    #[inline]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    #[inline]
    pub(crate) fn index(&self, row: usize, col: usize) -> usize {
        row * self.size + col
    }

    /// Cell at `(row, col)`, or `None` outside the board.
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> Option<Cell> {
        if row < self.size && col < self.size {
            Some(self.cells[self.index(row, col)])
        } else {
            None
        }
    }

    /// Whether a placement targets a cell on this board.
    #[inline]
    pub fn in_bounds(&self, row: u8, col: u8) -> bool {
        (row as usize) < self.size && (col as usize) < self.size
    }

    /// Number of stones on the board.
    pub fn stone_count(&self) -> usize {
        self.cells.iter().filter(|c| **c != Cell::Empty).count()
    }

    /// Whether every cell holds a stone.
    pub fn is_full(&self) -> bool {
        self.cells.iter().all(|c| *c != Cell::Empty)
    }

    /// Whether `side` may swap right now: Blue's first reply to Red's
    /// single opening stone.
    pub fn swap_allowed(&self, side: Side) -> bool {
        side == Side::Blue && self.stone_count() == 1
    }

    /// Whether `side` may play `mv` on this board.
    pub fn is_legal(&self, mv: Move, side: Side) -> bool {
        match mv {
            Move::Place { row, col } => {
                self.get(row as usize, col as usize) == Some(Cell::Empty)
            }
            Move::Swap => self.swap_allowed(side),
        }
    }

    /// Play `mv` for `side`.
    ///
    /// Placing on an occupied or off-board cell, or swapping outside the
    /// swap window, leaves the board untouched and returns an error.
    pub fn play(&mut self, mv: Move, side: Side) -> Result<(), BoardError> {
        match mv {
            Move::Place { row, col } => {
                if !self.in_bounds(row, col) {
                    return Err(BoardError::OutOfBounds {
                        row,
                        col,
                        size: self.size,
                    });
                }
                let idx = self.index(row as usize, col as usize);
                if self.cells[idx] != Cell::Empty {
                    return Err(BoardError::Occupied { row, col });
                }
                self.cells[idx] = Cell::from(side);
                Ok(())
            }
            Move::Swap => {
                if !self.swap_allowed(side) {
                    return Err(BoardError::SwapNotAllowed {
                        stones: self.stone_count(),
                    });
                }
                self.rotate_in_place();
                Ok(())
            }
        }
    }

    /// Transpose the board and flip every stone's colour.
    ///
    /// This is an involution and maps a position with Blue to move onto the
    /// equivalent position with Red to move.
    pub fn rotate_in_place(&mut self) {
        let n = self.size;
        for r in 0..n {
            for c in r..n {
                let a = r * n + c;
                let b = c * n + r;
                let (x, y) = (self.cells[a].flipped(), self.cells[b].flipped());
                self.cells[a] = y;
                self.cells[b] = x;
            }
        }
    }

    /// Rotated copy, see [`Board::rotate_in_place`].
    pub fn rotated(&self) -> Board {
        let mut board = self.clone();
        board.rotate_in_place();
        board
    }

    /// All empty cells in row-major order.
    pub fn empty_cells(&self) -> Vec<Move> {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, c)| **c == Cell::Empty)
            .map(|(i, _)| Move::place((i / self.size) as u8, (i % self.size) as u8))
            .collect()
    }

    /// Whether `side` has joined its two edges.
    pub fn has_connected(&self, side: Side) -> bool {
        connectivity::has_connected(self, side)
    }

    /// Like [`Board::has_connected`] but reusing caller-owned buffers.
    pub fn has_connected_with(&self, side: Side, scratch: &mut ConnectivityScratch) -> bool {
        connectivity::has_connected_with(self, side, scratch)
    }

    /// The side that has connected, if any.
    pub fn winner(&self) -> Option<Side> {
        [Side::Red, Side::Blue]
            .into_iter()
            .find(|side| self.has_connected(*side))
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new(DEFAULT_SIZE)
    }
}

impl fmt::Display for Board {
    /// One line per row, each indented one space more than the last so the
    /// rhombus shape is visible.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for r in 0..self.size {
            write!(f, "{:indent$}", "", indent = r)?;
            for c in 0..self.size {
                let ch = match self.cells[self.index(r, c)] {
                    Cell::Empty => '.',
                    Cell::Red => 'R',
                    Cell::Blue => 'B',
                };
                if c + 1 < self.size {
                    write!(f, "{} ", ch)?;
                } else {
                    write!(f, "{}", ch)?;
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
