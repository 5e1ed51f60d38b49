//! Scripted opening for the first two turns on an 11x11 board.
//!
//! The book plays in the engine frame: our side never changes and a swap
//! rotates the board. Blue's moves are computed on the rotated board, where
//! Blue's stones appear as Red ones heading for the bottom edge, and mapped
//! back by transposition.

use hex_core::{Board, Cell, Move, Side};
use tracing::debug;

/// Board size the book is written for.
pub const BOOK_SIZE: usize = 11;

/// Counted turns before the search takes over.
const MAX_TURNS: u32 = 2;

/// Red's first stone.
const RED_OPENING: Move = Move::place(1, 5);

/// Blue's reply when it does not swap, also our answer to being swapped.
const CENTRE: Move = Move::place(5, 5);

#[derive(Debug, Clone)]
pub struct OpeningBook {
    turns: u32,
    /// +1 grows towards higher rows of the canonical board, -1 towards lower
    direction: isize,
}

impl OpeningBook {
    /// A fresh book, or `None` for boards it was not written for.
    pub fn for_board(size: usize) -> Option<Self> {
        (size == BOOK_SIZE).then_some(Self {
            turns: 0,
            direction: 1,
        })
    }

    pub fn is_active(&self) -> bool {
        self.turns < MAX_TURNS
    }

    /// The book's move for `side`, or `None` when it has nothing to offer.
    /// Either way the call consumes one turn unless it answers a swap.
    pub fn next_move(&mut self, board: &Board, side: Side) -> Option<Move> {
        self.turns += 1;

        match (self.turns, side) {
            (1, Side::Red) => Some(RED_OPENING).filter(|mv| board.is_legal(*mv, side)),
            (1, Side::Blue) => {
                if board.swap_allowed(side) && in_swap_zone(board) {
                    Some(Move::Swap)
                } else {
                    Some(CENTRE).filter(|mv| board.is_legal(*mv, side))
                }
            }
            // Our only stone was swapped away: start over from the centre
            (2, _) if board.stone_count() == 1 && board.is_legal(CENTRE, side) => {
                self.turns -= 1;
                debug!("Opening stone was swapped, replaying from the centre");
                Some(CENTRE)
            }
            (_, Side::Red) => self.bridge(board),
            (_, Side::Blue) => self.bridge(&board.rotated()).map(Move::transposed),
        }
    }

    /// Bridge from our frontier stone towards the far edge, on a board
    /// where we are Red.
    fn bridge(&mut self, board: &Board) -> Option<Move> {
        let ours = stones(board, Cell::Red);

        // With one stone each, grow away from the edge our stone is closer to
        if board.stone_count() == 2 {
            if let Some(&(row, _)) = ours.first() {
                if row > (BOOK_SIZE / 2) as isize {
                    self.direction = -1;
                }
            }
        }

        let d = self.direction;
        let frontier = if d > 0 {
            first_by_key(&ours, |(r, _)| *r)
        } else {
            first_by_key(&ours, |(r, _)| -*r)
        }?;
        let (x, y) = frontier;

        let targets = [(x + 2 * d, y - d), (x + d, y - 2 * d), (x + d, y + d)];
        let carriers = [(x, y - d), (x + d, y - d), (x + d, y), (x, y + d)];
        let rules = [
            (targets[0], [carriers[1], carriers[2]]),
            (targets[1], [carriers[0], carriers[1]]),
            (targets[2], [carriers[2], carriers[3]]),
        ];

        let open = |pos: (isize, isize)| cell_at(board, pos) == Some(Cell::Empty);
        let blocked = |pos: (isize, isize)| cell_at(board, pos) == Some(Cell::Blue);

        let pick = rules
            .iter()
            .find(|(target, pair)| open(*target) && !pair.iter().any(|c| blocked(*c)))
            .map(|(target, _)| *target)
            .or_else(|| targets.iter().copied().find(|t| open(*t)))?;

        Some(Move::place(pick.0 as u8, pick.1 as u8))
    }
}

/// Whether Red's stone sits where swapping is worth it.
fn in_swap_zone(board: &Board) -> bool {
    (0..BOOK_SIZE).any(|x| {
        let lo = 2isize.max(5 - (x / 2) as isize);
        let hi = 9isize.min(11 - (x % 2) as isize - (x / 2) as isize);
        (lo..hi).any(|y| board.get(x, y as usize) == Some(Cell::Red))
    })
}

/// Cells holding `cell`, in row-major order.
fn stones(board: &Board, cell: Cell) -> Vec<(isize, isize)> {
    let n = board.size();
    (0..n)
        .flat_map(|r| (0..n).map(move |c| (r, c)))
        .filter(|&(r, c)| board.get(r, c) == Some(cell))
        .map(|(r, c)| (r as isize, c as isize))
        .collect()
}

/// First element with the largest key.
fn first_by_key<F>(stones: &[(isize, isize)], key: F) -> Option<(isize, isize)>
where
    F: Fn(&(isize, isize)) -> isize,
{
    stones
        .iter()
        .fold(None, |best: Option<(isize, isize)>, s| match best {
            Some(b) if key(&b) >= key(s) => Some(b),
            _ => Some(*s),
        })
}

fn cell_at(board: &Board, (r, c): (isize, isize)) -> Option<Cell> {
    if r < 0 || c < 0 {
        return None;
    }
    board.get(r as usize, c as usize)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board_with(stones: &[(u8, u8, Side)]) -> Board {
        let mut board = Board::new(BOOK_SIZE);
        for &(r, c, side) in stones {
            board.play(Move::place(r, c), side).unwrap();
        }
        board
    }

    #[test]
    fn test_only_for_eleven() {
        assert!(OpeningBook::for_board(11).is_some());
        assert!(OpeningBook::for_board(9).is_none());
        assert!(OpeningBook::for_board(13).is_none());
    }

    #[test]
    fn test_red_opens_near_top() {
        let mut book = OpeningBook::for_board(11).unwrap();
        let board = Board::new(11);
        assert_eq!(book.next_move(&board, Side::Red), Some(Move::place(1, 5)));
        assert!(book.is_active());
    }

    #[test]
    fn test_blue_swaps_central_stone() {
        let mut book = OpeningBook::for_board(11).unwrap();
        let board = board_with(&[(5, 5, Side::Red)]);
        assert_eq!(book.next_move(&board, Side::Blue), Some(Move::Swap));
    }

    #[test]
    fn test_blue_keeps_edge_stone() {
        for (r, c) in [(0, 0), (0, 4), (10, 10), (5, 1), (5, 9)] {
            let mut book = OpeningBook::for_board(11).unwrap();
            let board = board_with(&[(r, c, Side::Red)]);
            assert_eq!(
                book.next_move(&board, Side::Blue),
                Some(Move::place(5, 5)),
                "red stone at ({r}, {c})"
            );
        }
    }

    #[test]
    fn test_swap_zone_shape() {
        // Row 0 covers columns 5..9, row 5 covers 3..8, row 10 covers 2..6
        let zone = |r: u8, c: u8| in_swap_zone(&board_with(&[(r, c, Side::Red)]));
        assert!(zone(0, 5) && zone(0, 8) && !zone(0, 9) && !zone(0, 4));
        assert!(zone(5, 3) && zone(5, 7) && !zone(5, 8) && !zone(5, 2));
        assert!(zone(10, 2) && zone(10, 5) && !zone(10, 6) && !zone(10, 1));
    }

    #[test]
    fn test_red_bridges_down_on_second_turn() {
        let mut book = OpeningBook::for_board(11).unwrap();
        let empty = Board::new(11);
        book.next_move(&empty, Side::Red);

        let board = board_with(&[(1, 5, Side::Red), (5, 5, Side::Blue)]);
        assert_eq!(book.next_move(&board, Side::Red), Some(Move::place(3, 4)));
        assert!(!book.is_active());
    }

    #[test]
    fn test_bridge_avoids_cut_carriers() {
        let mut book = OpeningBook::for_board(11).unwrap();
        book.turns = 2;
        // Blue sits on a carrier of the first two bridges
        let board = board_with(&[
            (1, 5, Side::Red),
            (2, 4, Side::Blue),
            (6, 6, Side::Red),
            (9, 9, Side::Blue),
        ]);
        // Frontier is (6, 6): first bridge (8, 5) is open
        assert_eq!(book.next_move(&board, Side::Red), Some(Move::place(8, 5)));

        let mut book = OpeningBook::for_board(11).unwrap();
        book.turns = 2;
        let board = board_with(&[
            (1, 5, Side::Red),
            (2, 4, Side::Blue),
            (0, 0, Side::Red),
            (9, 9, Side::Blue),
        ]);
        // Frontier (1, 5): (2, 4) cuts both (3, 4) and (2, 3), so (2, 6)
        assert_eq!(book.next_move(&board, Side::Red), Some(Move::place(2, 6)));
    }

    #[test]
    fn test_bridge_falls_back_to_any_open_target() {
        let mut book = OpeningBook::for_board(11).unwrap();
        book.turns = 2;
        // Frontier (1, 5). Blue on (2, 4) and (2, 5) cuts every bridge and
        // also holds the first target (3, 4)
        let board = board_with(&[
            (1, 5, Side::Red),
            (2, 4, Side::Blue),
            (0, 0, Side::Red),
            (2, 5, Side::Blue),
            (0, 1, Side::Red),
            (3, 4, Side::Blue),
        ]);
        assert_eq!(book.next_move(&board, Side::Red), Some(Move::place(2, 3)));
    }

    #[test]
    fn test_bridge_off_board_gives_up() {
        let mut book = OpeningBook::for_board(11).unwrap();
        book.turns = 2;
        let board = board_with(&[
            (10, 5, Side::Red),
            (0, 0, Side::Blue),
            (9, 0, Side::Red),
            (0, 1, Side::Blue),
        ]);
        assert_eq!(book.next_move(&board, Side::Red), None);
        assert!(!book.is_active());
    }

    #[test]
    fn test_swapped_opening_replays_centre() {
        let mut book = OpeningBook::for_board(11).unwrap();
        let mut board = Board::new(11);
        let first = book.next_move(&board, Side::Red).unwrap();
        board.play(first, Side::Red).unwrap();
        board.play(Move::Swap, Side::Blue).unwrap();

        // Our stone is now Blue's at (5, 1); the turn is not counted
        assert_eq!(book.next_move(&board, Side::Red), Some(Move::place(5, 5)));
        assert!(book.is_active());

        board.play(Move::place(5, 5), Side::Red).unwrap();
        board.play(Move::place(7, 4), Side::Blue).unwrap();
        assert!(book.next_move(&board, Side::Red).is_some());
        assert!(!book.is_active());
    }

    #[test]
    fn test_blue_bridges_right() {
        let mut book = OpeningBook::for_board(11).unwrap();
        let mut board = board_with(&[(0, 0, Side::Red)]);
        assert_eq!(book.next_move(&board, Side::Blue), Some(Move::place(5, 5)));
        board.play(Move::place(5, 5), Side::Blue).unwrap();
        board.play(Move::place(3, 3), Side::Red).unwrap();

        // Transposed Red bridge (x+2, y-1) from (5, 5) is (4, 7)
        assert_eq!(book.next_move(&board, Side::Blue), Some(Move::place(4, 7)));
    }

    #[test]
    fn test_blue_after_own_swap_grows_left_from_right_half() {
        let mut book = OpeningBook::for_board(11).unwrap();
        let mut board = board_with(&[(8, 3, Side::Red)]);
        assert_eq!(book.next_move(&board, Side::Blue), Some(Move::Swap));
        board.play(Move::Swap, Side::Blue).unwrap();
        assert_eq!(board.get(3, 8), Some(Cell::Blue));
        board.play(Move::place(0, 0), Side::Red).unwrap();

        // Our stone is past the middle column, so the bridge heads left:
        // canonical (8, 3) -> (6, 4), transposed back to (4, 6)
        assert_eq!(book.next_move(&board, Side::Blue), Some(Move::place(4, 6)));
    }
}
