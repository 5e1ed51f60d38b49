//! Final move choice: search statistics blended with position scores.
//!
//! Each root child is rated `c * mean_reward + (1 - c) * score`, where `c`
//! comes from [`FusionConfig::blend_weight`] and `score` from one batched
//! [`PositionScorer`] call over the boards the root moves lead to.
//!
//! The first child with the maximal rating wins. This differs from
//! [`Explorer::best_move`], which breaks visit-count ties at random.

use std::time::Duration;

use hex_core::{Board, BoardError, Move};
use thiserror::Error;
use tracing::{debug, trace};

use crate::config::FusionConfig;
use crate::evaluator::{CandidateGenerator, EvaluatorError, PositionScorer};
use crate::search::{Explorer, SearchError};

#[derive(Debug, Error)]
pub enum FusionError {
    #[error("Search failed: {0}")]
    Search(#[from] SearchError),

    #[error("Scorer failed: {0}")]
    Evaluator(#[from] EvaluatorError),

    #[error("Board invariant violated: {0}")]
    Board(#[from] BoardError),

    #[error("Scorer returned {got} scores for {expected} positions")]
    ScoreCountMismatch { expected: usize, got: usize },

    #[error("Root has no children on a non-terminal board")]
    NoChildren,

    #[error("Every fused rating was NaN")]
    NoFiniteScore,
}

/// The chosen root move and how it was rated.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FusedChoice {
    pub mv: Move,
    /// Blended rating of `mv`
    pub rating: f64,
    /// Search weight used for every child
    pub weight: f64,
    pub visits: u32,
}

/// Pick a root move from the explorer's current statistics.
///
/// `None` once the game is over.
pub fn fuse<G, S>(
    explorer: &Explorer<G>,
    scorer: &S,
    config: &FusionConfig,
) -> Result<Option<FusedChoice>, FusionError>
where
    G: CandidateGenerator,
    S: PositionScorer + ?Sized,
{
    if explorer.is_terminal() {
        return Ok(None);
    }

    let children = explorer.root_children();
    if children.is_empty() {
        return Err(FusionError::NoChildren);
    }

    let board = explorer.board();
    let mover = explorer.to_play();
    let resulting = children
        .iter()
        .map(|child| -> Result<Board, BoardError> {
            let mut next = board.clone();
            next.play(child.mv, mover)?;
            Ok(next)
        })
        .collect::<Result<Vec<_>, _>>()?;

    let scores = scorer.score_positions(board, mover, &resulting)?;
    if scores.len() != children.len() {
        return Err(FusionError::ScoreCountMismatch {
            expected: children.len(),
            got: scores.len(),
        });
    }

    let weight = config.blend_weight(board.stone_count());
    let mut best: Option<FusedChoice> = None;
    for (child, score) in children.iter().zip(scores) {
        let rating = weight * child.mean_reward() + (1.0 - weight) * score;
        trace!(
            mv = %child.mv,
            visits = child.visits,
            mean = child.mean_reward(),
            score,
            rating,
            "Fused rating"
        );
        if rating.is_nan() {
            continue;
        }
        // Strict comparison keeps the first of equal ratings
        if best.map_or(true, |b| rating > b.rating) {
            best = Some(FusedChoice {
                mv: child.mv,
                rating,
                weight,
                visits: child.visits,
            });
        }
    }

    let choice = best.ok_or(FusionError::NoFiniteScore)?;
    debug!(
        mv = %choice.mv,
        rating = choice.rating,
        weight,
        visits = choice.visits,
        children = children.len(),
        "Fused decision"
    );
    Ok(Some(choice))
}

/// Search for `budget`, then fuse.
pub fn decide<G, S>(
    explorer: &mut Explorer<G>,
    scorer: &S,
    config: &FusionConfig,
    budget: Duration,
) -> Result<Option<FusedChoice>, FusionError>
where
    G: CandidateGenerator,
    S: PositionScorer + ?Sized,
{
    if explorer.is_terminal() {
        return Ok(None);
    }
    explorer.search(budget)?;
    fuse(explorer, scorer, config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::TickClock;
    use crate::config::MctsConfig;
    use crate::evaluator::{ConstantScorer, FixedCandidates};
    use hex_core::Side;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    /// Scores a position by whether a given cell is occupied.
    struct PreferCell {
        row: usize,
        col: usize,
    }

    impl PositionScorer for PreferCell {
        fn score_positions(
            &self,
            _board: &Board,
            _mover: Side,
            resulting: &[Board],
        ) -> Result<Vec<f64>, EvaluatorError> {
            Ok(resulting
                .iter()
                .map(|b| match b.get(self.row, self.col) {
                    Some(hex_core::Cell::Empty) | None => 0.0,
                    Some(_) => 1.0,
                })
                .collect())
        }
    }

    struct ShortScorer;

    impl PositionScorer for ShortScorer {
        fn score_positions(
            &self,
            _board: &Board,
            _mover: Side,
            _resulting: &[Board],
        ) -> Result<Vec<f64>, EvaluatorError> {
            Ok(vec![0.5])
        }
    }

    fn explorer(moves: Vec<Move>) -> Explorer<FixedCandidates> {
        Explorer::new(
            Board::new(11),
            Side::Red,
            FixedCandidates::new(moves),
            MctsConfig::for_testing(),
            ChaCha20Rng::seed_from_u64(11),
        )
        .with_clock(Box::new(TickClock::new(Duration::from_millis(1))))
    }

    fn centre_moves() -> Vec<Move> {
        vec![
            Move::place(4, 5),
            Move::place(5, 4),
            Move::place(5, 6),
            Move::place(6, 5),
        ]
    }

    #[test]
    fn test_decide_end_to_end() {
        let mut explorer = explorer(centre_moves());
        let choice = decide(
            &mut explorer,
            &ConstantScorer::default(),
            &FusionConfig::default(),
            Duration::from_millis(60),
        )
        .unwrap()
        .unwrap();

        assert!(centre_moves().contains(&choice.mv));
        // Empty board: pure minimum weight
        assert_eq!(choice.weight, 0.15);
        assert_eq!(explorer.last_stats().simulations, 59);
    }

    #[test]
    fn test_scores_dominate_early() {
        let mut explorer = explorer(centre_moves());
        explorer.run_simulations(40).unwrap();

        let choice = fuse(
            &explorer,
            &PreferCell { row: 6, col: 5 },
            &FusionConfig::default(),
        )
        .unwrap()
        .unwrap();
        // 0.85 from the score outweighs any mean reward difference
        assert_eq!(choice.mv, Move::place(6, 5));
    }

    #[test]
    fn test_equal_ratings_pick_first_child() {
        let mut explorer = explorer(centre_moves());
        explorer.run_simulations(40).unwrap();

        // Only the score term counts, and it is the same for everyone
        let config = FusionConfig {
            c_min: 0.0,
            c_max: 0.0,
            turn_to_c_max: 40,
        };
        for _ in 0..5 {
            let choice = fuse(&explorer, &ConstantScorer(0.3), &config)
                .unwrap()
                .unwrap();
            assert_eq!(choice.mv, explorer.root_children()[0].mv);
        }
    }

    #[test]
    fn test_unvisited_child_counts_as_zero_mean() {
        let mut explorer = explorer(centre_moves());
        // One simulation expands the root but visits a single child
        explorer.run_simulations(1).unwrap();
        let children = explorer.root_children();
        assert_eq!(children.len(), 4);
        assert_eq!(children.iter().filter(|c| c.visits == 0).count(), 3);

        let config = FusionConfig {
            c_min: 1.0,
            c_max: 1.0,
            turn_to_c_max: 40,
        };
        let choice = fuse(&explorer, &ConstantScorer(0.0), &config)
            .unwrap()
            .unwrap();
        let visited = children.iter().find(|c| c.visits == 1).unwrap();
        if visited.reward > 0.0 {
            assert_eq!(choice.mv, visited.mv);
        } else {
            // All ratings are 0.0, so the first child wins
            assert_eq!(choice.mv, children[0].mv);
        }
        assert!(choice.rating.is_finite());
    }

    #[test]
    fn test_score_count_mismatch() {
        let mut explorer = explorer(centre_moves());
        explorer.run_simulations(8).unwrap();

        let err = fuse(&explorer, &ShortScorer, &FusionConfig::default()).unwrap_err();
        assert!(matches!(
            err,
            FusionError::ScoreCountMismatch {
                expected: 4,
                got: 1
            }
        ));
    }

    #[test]
    fn test_fuse_without_children_fails() {
        let explorer = explorer(centre_moves());
        let err = fuse(&explorer, &ConstantScorer::default(), &FusionConfig::default())
            .unwrap_err();
        assert!(matches!(err, FusionError::NoChildren));
    }

    #[test]
    fn test_nan_scores_are_rejected() {
        let mut explorer = explorer(centre_moves());
        explorer.run_simulations(8).unwrap();
        let err = fuse(
            &explorer,
            &ConstantScorer(f64::NAN),
            &FusionConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, FusionError::NoFiniteScore));
    }

    #[test]
    fn test_fuse_after_game_over_is_none() {
        let mut explorer = Explorer::new(
            Board::new(2),
            Side::Red,
            FixedCandidates::default(),
            MctsConfig::for_testing(),
            ChaCha20Rng::seed_from_u64(0),
        );
        explorer.commit_move(Move::place(0, 0)).unwrap();
        explorer.commit_move(Move::place(0, 1)).unwrap();
        explorer.commit_move(Move::place(1, 0)).unwrap();
        assert!(explorer.is_terminal());

        let choice = decide(
            &mut explorer,
            &ConstantScorer::default(),
            &FusionConfig::default(),
            Duration::from_millis(5),
        )
        .unwrap();
        assert_eq!(choice, None);
    }
}
