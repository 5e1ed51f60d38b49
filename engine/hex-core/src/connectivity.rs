//! Edge-to-edge connectivity check.
//!
//! This runs after every simulated ply, so it is the hottest code in the
//! engine. Each call is a single depth-first flood fill over the side's
//! stones: O(n²) time, one visited flag per cell.

use crate::board::{Board, Cell, Side};

/// Row/column offsets of the six neighbours of a cell.
pub const NEIGHBOURS: [(isize, isize); 6] = [(-1, 0), (-1, 1), (0, -1), (0, 1), (1, -1), (1, 0)];

/// Reusable buffers for [`has_connected_with`].
///
/// Rollouts call the check once per ply; threading one scratch through them
/// avoids reallocating the visited set every time.
#[derive(Debug, Default, Clone)]
pub struct ConnectivityScratch {
    visited: Vec<bool>,
    stack: Vec<usize>,
}

impl ConnectivityScratch {
    /// Scratch pre-sized for a board of the given edge length.
    pub fn new(size: usize) -> Self {
        Self {
            visited: Vec::with_capacity(size * size),
            stack: Vec::with_capacity(size * size),
        }
    }
}

/// Whether `side` has a chain of stones joining its two edges.
///
/// Red is searched from its stones in row 0 towards row n-1, Blue from its
/// stones in column 0 towards column n-1. Returns on the first path found.
pub fn has_connected(board: &Board, side: Side) -> bool {
    let mut scratch = ConnectivityScratch::new(board.size());
    has_connected_with(board, side, &mut scratch)
}

/// [`has_connected`] with caller-provided buffers.
pub fn has_connected_with(board: &Board, side: Side, scratch: &mut ConnectivityScratch) -> bool {
    let n = board.size();
    if n == 0 {
        return false;
    }

    let cells = board.cells();
    let stone = Cell::from(side);
    let ConnectivityScratch { visited, stack } = scratch;
    visited.clear();
    visited.resize(n * n, false);
    stack.clear();

    for k in 0..n {
        let start = match side {
            Side::Red => board.index(0, k),
            Side::Blue => board.index(k, 0),
        };
        if visited[start] || cells[start] != stone {
            continue;
        }

        visited[start] = true;
        stack.push(start);

        while let Some(current) = stack.pop() {
            let (r, c) = (current / n, current % n);
            let reached = match side {
                Side::Red => r == n - 1,
                Side::Blue => c == n - 1,
            };
            if reached {
                return true;
            }

            for (dr, dc) in NEIGHBOURS {
                let nr = r as isize + dr;
                let nc = c as isize + dc;
                if nr < 0 || nc < 0 || nr >= n as isize || nc >= n as isize {
                    continue;
                }
                let next = nr as usize * n + nc as usize;
                if !visited[next] && cells[next] == stone {
                    visited[next] = true;
                    stack.push(next);
                }
            }
        }
    }

    false
}
