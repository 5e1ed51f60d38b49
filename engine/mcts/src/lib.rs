//! Monte Carlo Tree Search for Hex move selection.
//!
//! # Overview
//!
//! The [`Explorer`] owns a search tree and the real game position. Within a
//! wall-clock budget it repeats simulations of four phases:
//!
//! 1. **Selection**: descend by UCT value
//!    `reward/visits + c * sqrt(2 ln(parent_visits + 1) / visits)`,
//!    unvisited children first
//! 2. **Expansion**: ask a [`CandidateGenerator`] for up to
//!    `candidate_limit` moves, add them all, step into one at random
//! 3. **Rollout**: uniformly random play until a side connects
//! 4. **Backup**: credit the result to every node on the path, flipping
//!    it at each level
//!
//! Between turns the tree is kept: [`Explorer::commit_move`] promotes the
//! played child to root and frees everything else.
//!
//! The final choice either takes the most visited child
//! ([`Explorer::best_move`]) or blends visit statistics with a
//! [`PositionScorer`] ([`fusion::decide`]).
//!
//! # Usage
//!
//! ```rust
//! use std::time::Duration;
//! use hex_core::{Board, Side};
//! use mcts::{fusion, Canonical, CentreCandidates, ConstantScorer, Explorer, FusionConfig, MctsConfig};
//! use rand::SeedableRng;
//! use rand_chacha::ChaCha20Rng;
//!
//! let mut explorer = Explorer::new(
//!     Board::new(7),
//!     Side::Red,
//!     Canonical(CentreCandidates),
//!     MctsConfig::for_testing(),
//!     ChaCha20Rng::seed_from_u64(42),
//! );
//! let choice = fusion::decide(
//!     &mut explorer,
//!     &ConstantScorer::default(),
//!     &FusionConfig::default(),
//!     Duration::from_millis(20),
//! )
//! .unwrap()
//! .unwrap();
//! explorer.commit_move(choice.mv).unwrap();
//! assert_eq!(explorer.to_play(), Side::Blue);
//! ```
//!
//! # Configuration
//!
//! [`MctsConfig`] controls the search:
//!
//! - `time_budget`: wall-clock budget for [`Explorer::run`] (default: 9s)
//! - `exploration`: UCT constant (default: 0.5, 0.0 disables exploration)
//! - `candidate_limit`: moves requested per expansion (default: 10)
//!
//! [`FusionConfig`] controls how much the search statistics count against
//! the position scores as the board fills up.
//!
//! # Evaluators
//!
//! - [`FixedCandidates`]: a fixed ranked list (for testing)
//! - [`CentreCandidates`]: empty cells nearest the centre first
//! - [`ConstantScorer`]: the same score for every position
//! - [`Canonical`]: adapts a Red-only model to both sides
//!
//! # Architecture
//!
//! ```text
//! +-------------------------------------------------------------+
//! |                          Explorer                           |
//! +-------------------------------------------------------------+
//! |  +-------------+  +-------------+  +---------------------+   |
//! |  | SearchTree  |  |    Board    |  | CandidateGenerator  |   |
//! |  |  (arena)    |  | (real game) |  |   (expansion)       |   |
//! |  +------+------+  +------+------+  +----------+----------+   |
//! |         |                |                    |             |
//! |         v                v                    v             |
//! |  +-------------------------------------------------------+  |
//! |  |        select -> expand -> rollout -> backup          |  |
//! |  +-------------------------------------------------------+  |
//! +-------------------------------------------------------------+
//!                              |
//!                              v
//!               fusion (PositionScorer + FusionConfig)
//! ```

pub mod clock;
pub mod config;
pub mod evaluator;
pub mod fusion;
pub mod node;
pub mod search;
pub mod tree;

// Re-export main types
pub use clock::{Clock, SystemClock, TickClock};
pub use config::{FusionConfig, MctsConfig};
pub use evaluator::{
    Canonical, CandidateGenerator, CentreCandidates, ConstantScorer, EvaluatorError,
    FixedCandidates, PositionScorer, PrimaryPolicy, PrimaryValue,
};
pub use fusion::{FusedChoice, FusionError};
pub use node::{NodeId, SearchNode};
pub use search::{ChildStats, Explorer, SearchError, SearchStats};
pub use tree::{SearchTree, TreeStats};
