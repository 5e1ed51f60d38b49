//! Hex board model for the search engine.
//!
//! Hex is played on an n×n rhombus where every interior cell touches six
//! neighbours. Red moves first and tries to join the top row to the bottom
//! row; Blue tries to join the left column to the right column. The second
//! player may answer Red's opening stone with a one-time swap.
//!
//! # Board Layout
//!
//! Cells are stored row-major. Each row is shifted half a cell to the right
//! of the one above it, so cell `(r, c)` touches `(r-1, c)`, `(r-1, c+1)`,
//! `(r, c-1)`, `(r, c+1)`, `(r+1, c-1)` and `(r+1, c)`:
//!
//! ```text
//! R . . . .      <- row 0 (Red's top edge)
//!  . . . . .
//!   . . B . .
//!    . . . . .
//!     . . . . .  <- row 4 (Red's bottom edge)
//! ^ Blue's left edge   ^ Blue's right edge
//! ```
//!
//! # Swap
//!
//! The swap rule is modelled without changing who plays which colour: the
//! board is transposed and every stone changes colour. Red's opening stone
//! at `(r, c)` becomes a Blue stone at `(c, r)` and it is Red's turn again.
//!
//! # Usage
//!
//! ```rust
//! use hex_core::{Board, Move, Side};
//!
//! let mut board = Board::new(5);
//! for row in 0..5 {
//!     board.play(Move::place(row, 2), Side::Red).unwrap();
//! }
//! assert!(board.has_connected(Side::Red));
//! assert!(!board.has_connected(Side::Blue));
//! ```

mod board;
mod connectivity;

pub use board::{Board, BoardError, Cell, Move, Side};
pub use connectivity::{has_connected, has_connected_with, ConnectivityScratch, NEIGHBOURS};

/// Default board edge length.
pub const DEFAULT_SIZE: usize = 11;

/// Largest edge length whose coordinates fit in a [`Move`]'s `u8`s.
pub const MAX_SIZE: usize = u8::MAX as usize + 1;
