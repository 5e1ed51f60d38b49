//! Interfaces to the external move and position models.
//!
//! The search consumes two capabilities it does not implement itself:
//! ranked candidate moves for expansion, and scores for the positions
//! reached by each root move. Both are synchronous and side-effect free
//! from the search's point of view.
//!
//! Learned models are usually trained only from Red's point of view.
//! [`Canonical`] adapts such a model: when Blue is to move the board is
//! rotated (transposed with colours flipped) before the call, and returned
//! coordinates are transposed back afterwards.

use hex_core::{Board, Move, Side};
use thiserror::Error;

/// Errors that can occur during evaluation.
#[derive(Debug, Error)]
pub enum EvaluatorError {
    #[error("Evaluation failed: {0}")]
    EvaluationFailed(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Model error: {0}")]
    ModelError(String),
}

/// Source of ranked candidate moves.
pub trait CandidateGenerator {
    /// Up to `limit` moves for `mover` on `board`, best first.
    ///
    /// May include [`Move::Swap`] only while swapping is legal. An empty
    /// result is valid and marks the position as a dead end.
    fn ranked_candidates(
        &self,
        board: &Board,
        mover: Side,
        limit: usize,
    ) -> Result<Vec<Move>, EvaluatorError>;
}

/// Scores positions reached by a move of `mover`.
pub trait PositionScorer {
    /// One score per entry of `resulting`, higher is better for `mover`.
    fn score_positions(
        &self,
        board: &Board,
        mover: Side,
        resulting: &[Board],
    ) -> Result<Vec<f64>, EvaluatorError>;
}

impl<T: CandidateGenerator + ?Sized> CandidateGenerator for &T {
    fn ranked_candidates(
        &self,
        board: &Board,
        mover: Side,
        limit: usize,
    ) -> Result<Vec<Move>, EvaluatorError> {
        (**self).ranked_candidates(board, mover, limit)
    }
}

impl<T: CandidateGenerator + ?Sized> CandidateGenerator for Box<T> {
    fn ranked_candidates(
        &self,
        board: &Board,
        mover: Side,
        limit: usize,
    ) -> Result<Vec<Move>, EvaluatorError> {
        (**self).ranked_candidates(board, mover, limit)
    }
}

impl<T: PositionScorer + ?Sized> PositionScorer for &T {
    fn score_positions(
        &self,
        board: &Board,
        mover: Side,
        resulting: &[Board],
    ) -> Result<Vec<f64>, EvaluatorError> {
        (**self).score_positions(board, mover, resulting)
    }
}

impl<T: PositionScorer + ?Sized> PositionScorer for Box<T> {
    fn score_positions(
        &self,
        board: &Board,
        mover: Side,
        resulting: &[Board],
    ) -> Result<Vec<f64>, EvaluatorError> {
        (**self).score_positions(board, mover, resulting)
    }
}

/// Move model that only understands "Red to move" boards.
pub trait PrimaryPolicy {
    /// Up to `limit` moves for Red, best first.
    fn rank(&self, board: &Board, allow_swap: bool, limit: usize)
        -> Result<Vec<Move>, EvaluatorError>;
}

/// Value model that scores boards right after a Red move.
pub trait PrimaryValue {
    fn score(&self, boards: &[Board]) -> Result<Vec<f64>, EvaluatorError>;
}

/// Adapter presenting a Red-only model as a side-aware one.
#[derive(Debug, Clone, Default)]
pub struct Canonical<M>(pub M);

impl<M: PrimaryPolicy> CandidateGenerator for Canonical<M> {
    fn ranked_candidates(
        &self,
        board: &Board,
        mover: Side,
        limit: usize,
    ) -> Result<Vec<Move>, EvaluatorError> {
        let allow_swap = board.swap_allowed(mover);
        match mover {
            Side::Red => self.0.rank(board, allow_swap, limit),
            Side::Blue => {
                let canonical = board.rotated();
                let moves = self.0.rank(&canonical, allow_swap, limit)?;
                Ok(moves.into_iter().map(Move::transposed).collect())
            }
        }
    }
}

impl<M: PrimaryValue> PositionScorer for Canonical<M> {
    fn score_positions(
        &self,
        _board: &Board,
        mover: Side,
        resulting: &[Board],
    ) -> Result<Vec<f64>, EvaluatorError> {
        match mover {
            Side::Red => self.0.score(resulting),
            Side::Blue => {
                let canonical: Vec<Board> = resulting.iter().map(Board::rotated).collect();
                self.0.score(&canonical)
            }
        }
    }
}

/// Fixed ranked list of moves, filtered to the ones still legal.
#[derive(Debug, Clone, Default)]
pub struct FixedCandidates {
    moves: Vec<Move>,
}

impl FixedCandidates {
    pub fn new(moves: Vec<Move>) -> Self {
        Self { moves }
    }
}

impl CandidateGenerator for FixedCandidates {
    fn ranked_candidates(
        &self,
        board: &Board,
        mover: Side,
        limit: usize,
    ) -> Result<Vec<Move>, EvaluatorError> {
        Ok(self
            .moves
            .iter()
            .copied()
            .filter(|mv| board.is_legal(*mv, mover))
            .take(limit)
            .collect())
    }
}

/// Empty cells ordered by hex distance to the centre of the board.
///
/// A model-free stand-in for a learned policy. Never proposes a swap;
/// that decision belongs to the opening book.
#[derive(Debug, Clone, Copy, Default)]
pub struct CentreCandidates;

impl CentreCandidates {
    pub fn new() -> Self {
        Self
    }

    /// Hex distance between two cells in this board's axial layout.
    fn distance(a: (isize, isize), b: (isize, isize)) -> isize {
        let dr = a.0 - b.0;
        let dc = a.1 - b.1;
        (dr.abs() + dc.abs() + (dr + dc).abs()) / 2
    }
}

impl PrimaryPolicy for CentreCandidates {
    fn rank(
        &self,
        board: &Board,
        _allow_swap: bool,
        limit: usize,
    ) -> Result<Vec<Move>, EvaluatorError> {
        let centre = ((board.size() / 2) as isize, (board.size() / 2) as isize);
        let mut moves = board.empty_cells();
        // Stable sort keeps row-major order among equal distances
        moves.sort_by_key(|mv| match mv {
            Move::Place { row, col } => Self::distance((*row as isize, *col as isize), centre),
            Move::Swap => isize::MAX,
        });
        moves.truncate(limit);
        Ok(moves)
    }
}

/// Scores every position the same.
#[derive(Debug, Clone, Copy)]
pub struct ConstantScorer(pub f64);

impl Default for ConstantScorer {
    fn default() -> Self {
        Self(0.5)
    }
}

impl PositionScorer for ConstantScorer {
    fn score_positions(
        &self,
        _board: &Board,
        _mover: Side,
        resulting: &[Board],
    ) -> Result<Vec<f64>, EvaluatorError> {
        Ok(vec![self.0; resulting.len()])
    }
}

impl PrimaryValue for ConstantScorer {
    fn score(&self, boards: &[Board]) -> Result<Vec<f64>, EvaluatorError> {
        Ok(vec![self.0; boards.len()])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_core::Cell;
    use std::cell::RefCell;

    /// Records what it was asked and proposes the first empty cells of row 0.
    #[derive(Default)]
    struct RecordingModel {
        seen: RefCell<Vec<Board>>,
    }

    impl PrimaryPolicy for RecordingModel {
        fn rank(
            &self,
            board: &Board,
            _allow_swap: bool,
            limit: usize,
        ) -> Result<Vec<Move>, EvaluatorError> {
            self.seen.borrow_mut().push(board.clone());
            Ok((0..board.size() as u8)
                .map(|c| Move::place(0, c))
                .filter(|mv| board.is_legal(*mv, Side::Red))
                .take(limit)
                .collect())
        }
    }

    impl PrimaryValue for RecordingModel {
        fn score(&self, boards: &[Board]) -> Result<Vec<f64>, EvaluatorError> {
            self.seen.borrow_mut().extend(boards.iter().cloned());
            // Score = number of Red stones, to check orientation
            Ok(boards
                .iter()
                .map(|b| b.cells().iter().filter(|c| **c == Cell::Red).count() as f64)
                .collect())
        }
    }

    #[test]
    fn test_canonical_passes_red_through() {
        let model = Canonical(RecordingModel::default());
        let mut board = Board::new(5);
        board.play(Move::place(2, 2), Side::Red).unwrap();
        board.play(Move::place(3, 1), Side::Blue).unwrap();

        let moves = model.ranked_candidates(&board, Side::Red, 2).unwrap();
        assert_eq!(moves, vec![Move::place(0, 0), Move::place(0, 1)]);
        assert_eq!(model.0.seen.borrow()[0], board);
    }

    #[test]
    fn test_canonical_rotates_for_blue() {
        let model = Canonical(RecordingModel::default());
        let mut board = Board::new(5);
        board.play(Move::place(0, 1), Side::Blue).unwrap();
        board.play(Move::place(2, 2), Side::Red).unwrap();

        let moves = model.ranked_candidates(&board, Side::Blue, 2).unwrap();

        // The model saw Blue's stone at (0,1) as a Red stone at (1,0) and
        // proposed (0,0), (0,1); mapped back they are (0,0), (1,0).
        let seen = model.0.seen.borrow()[0].clone();
        assert_eq!(seen, board.rotated());
        assert_eq!(seen.get(1, 0), Some(Cell::Red));
        assert_eq!(seen.get(2, 2), Some(Cell::Blue));
        assert_eq!(moves, vec![Move::place(0, 0), Move::place(1, 0)]);
        for mv in moves {
            assert!(board.is_legal(mv, Side::Blue));
        }
    }

    #[test]
    fn test_canonical_scores_from_mover_view() {
        let model = Canonical(RecordingModel::default());
        let board = Board::new(3);

        let mut after_blue = board.clone();
        after_blue.play(Move::place(1, 1), Side::Blue).unwrap();
        let scores = model
            .score_positions(&board, Side::Blue, &[after_blue.clone()])
            .unwrap();

        // Blue's stone became the model's Red stone
        assert_eq!(scores, vec![1.0]);
        assert_eq!(model.0.seen.borrow()[0], after_blue.rotated());
    }

    #[test]
    fn test_fixed_candidates_filters_and_limits() {
        let generator = FixedCandidates::new(vec![
            Move::place(0, 0),
            Move::place(1, 1),
            Move::Swap,
            Move::place(2, 2),
        ]);
        let mut board = Board::new(3);
        board.play(Move::place(1, 1), Side::Red).unwrap();

        // Blue may swap right now
        let moves = generator.ranked_candidates(&board, Side::Blue, 10).unwrap();
        assert_eq!(moves, vec![Move::place(0, 0), Move::Swap, Move::place(2, 2)]);

        // Red may not
        let moves = generator.ranked_candidates(&board, Side::Red, 10).unwrap();
        assert_eq!(moves, vec![Move::place(0, 0), Move::place(2, 2)]);

        let moves = generator.ranked_candidates(&board, Side::Blue, 1).unwrap();
        assert_eq!(moves, vec![Move::place(0, 0)]);
    }

    #[test]
    fn test_centre_candidates_order() {
        let generator = Canonical(CentreCandidates::new());
        let board = Board::new(5);
        let moves = generator.ranked_candidates(&board, Side::Red, 7).unwrap();

        assert_eq!(moves[0], Move::place(2, 2));
        // The six neighbours follow in row-major order
        assert_eq!(
            &moves[1..],
            &[
                Move::place(1, 2),
                Move::place(1, 3),
                Move::place(2, 1),
                Move::place(2, 3),
                Move::place(3, 1),
                Move::place(3, 2),
            ]
        );
    }

    #[test]
    fn test_centre_candidates_skip_stones() {
        let generator = Canonical(CentreCandidates::new());
        let mut board = Board::new(5);
        board.play(Move::place(2, 2), Side::Red).unwrap();
        let moves = generator.ranked_candidates(&board, Side::Blue, 50).unwrap();

        assert_eq!(moves.len(), 24);
        assert!(!moves.contains(&Move::place(2, 2)));
        assert!(!moves.contains(&Move::Swap));
    }

    #[test]
    fn test_constant_scorer() {
        let scorer = ConstantScorer(0.25);
        let board = Board::new(3);
        let scores = scorer
            .score_positions(&board, Side::Red, &[board.clone(), board.clone()])
            .unwrap();
        assert_eq!(scores, vec![0.25, 0.25]);
    }
}
