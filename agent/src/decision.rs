//! Turn-by-turn move decisions: opening book first, then search and fusion.
//!
//! The decider keeps its own copy of the real game and, once the opening is
//! over, a long-lived [`Explorer`] that follows every committed move.

use hex_core::{Board, BoardError, Move, Side};
use mcts::fusion::{self, FusionError};
use mcts::{CandidateGenerator, Explorer, FusionConfig, MctsConfig, PositionScorer, SearchError};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use thiserror::Error;
use tracing::{debug, info};

use crate::opening::OpeningBook;

#[derive(Debug, Error)]
pub enum DecisionError {
    #[error("{side} may not swap with {stones} stone(s) on the board")]
    IllegalSwap { side: Side, stones: usize },

    #[error("Asked to move for {ours} while {to_move} is to move")]
    NotOurTurn { ours: Side, to_move: Side },

    #[error("The game is already decided")]
    GameOver,

    #[error(transparent)]
    Board(#[from] BoardError),

    #[error(transparent)]
    Search(#[from] SearchError),

    #[error(transparent)]
    Fusion(#[from] FusionError),
}

/// Which part of the game the decider is in.
#[allow(dead_code)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Opening,
    Search,
}

/// Plays one side of one game.
pub struct Decider<G: CandidateGenerator, S> {
    side: Side,
    board: Board,
    to_move: Side,
    opening: Option<OpeningBook>,
    explorer: Option<Explorer<G>>,
    generator: G,
    scorer: S,
    mcts: MctsConfig,
    fusion: FusionConfig,
    rng: ChaCha20Rng,
}

impl<G, S> Decider<G, S>
where
    G: CandidateGenerator + Clone,
    S: PositionScorer,
{
    /// Start a game on an empty board of `size`, playing `side`.
    pub fn new(
        size: usize,
        side: Side,
        generator: G,
        scorer: S,
        mcts: MctsConfig,
        fusion: FusionConfig,
        rng: ChaCha20Rng,
    ) -> Self {
        Self {
            side,
            board: Board::new(size),
            to_move: Side::Red,
            opening: OpeningBook::for_board(size),
            explorer: None,
            generator,
            scorer,
            mcts,
            fusion,
            rng,
        }
    }

    /// Skip the opening book and search from the first move.
    pub fn without_opening(mut self) -> Self {
        self.opening = None;
        self
    }

    pub fn side(&self) -> Side {
        self.side
    }

    #[allow(dead_code)]
    pub fn to_move(&self) -> Side {
        self.to_move
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    #[allow(dead_code)]
    pub fn phase(&self) -> Phase {
        if self.opening.is_some() {
            Phase::Opening
        } else {
            Phase::Search
        }
    }

    #[allow(dead_code)]
    pub fn explorer(&self) -> Option<&Explorer<G>> {
        self.explorer.as_ref()
    }

    /// Choose our next move without playing it.
    pub fn decide(&mut self) -> Result<Move, DecisionError> {
        if self.to_move != self.side {
            return Err(DecisionError::NotOurTurn {
                ours: self.side,
                to_move: self.to_move,
            });
        }
        if self.board.winner().is_some() {
            return Err(DecisionError::GameOver);
        }

        if let Some(book) = self.opening.as_mut() {
            let mv = book.next_move(&self.board, self.side);
            if !book.is_active() || mv.is_none() {
                self.opening = None;
                info!(stones = self.board.stone_count(), "Opening over, starting search");
                self.explorer = Some(Self::spawn_explorer(
                    &self.board,
                    self.to_move,
                    &self.generator,
                    &self.mcts,
                    &mut self.rng,
                ));
            }
            if let Some(mv) = mv {
                self.check_swap(mv, self.side)?;
                info!(mv = %mv, side = %self.side, "Opening move");
                return Ok(mv);
            }
            debug!("Opening book has no move, searching instead");
        }

        let explorer = self.explorer.get_or_insert_with(|| {
            Self::spawn_explorer(
                &self.board,
                self.to_move,
                &self.generator,
                &self.mcts,
                &mut self.rng,
            )
        });
        let choice = fusion::decide(explorer, &self.scorer, &self.fusion, self.mcts.time_budget)?
            .ok_or(DecisionError::GameOver)?;

        let stats = explorer.last_stats();
        info!(
            mv = %choice.mv,
            side = %self.side,
            rating = choice.rating,
            weight = choice.weight,
            visits = choice.visits,
            simulations = stats.simulations,
            elapsed_ms = stats.elapsed.as_millis() as u64,
            "Searched move"
        );
        self.check_swap(choice.mv, self.side)?;
        Ok(choice.mv)
    }

    /// Apply a move by whichever side is to move.
    ///
    /// On error nothing changes.
    pub fn commit(&mut self, mv: Move) -> Result<(), DecisionError> {
        let mover = self.to_move;
        self.check_swap(mv, mover)?;
        let mut next = self.board.clone();
        next.play(mv, mover)?;
        if let Some(explorer) = self.explorer.as_mut() {
            explorer.commit_move(mv)?;
        }
        self.board = next;
        self.to_move = mover.opponent();
        debug!(mv = %mv, side = %mover, stones = self.board.stone_count(), "Committed");
        Ok(())
    }

    /// Decide and commit our move.
    pub fn play(&mut self) -> Result<Move, DecisionError> {
        let mv = self.decide()?;
        self.commit(mv)?;
        Ok(mv)
    }

    fn check_swap(&self, mv: Move, side: Side) -> Result<(), DecisionError> {
        if mv.is_swap() && !self.board.swap_allowed(side) {
            return Err(DecisionError::IllegalSwap {
                side,
                stones: self.board.stone_count(),
            });
        }
        Ok(())
    }

    /// Explorer rooted at `board` with `to_move` to play.
    fn spawn_explorer(
        board: &Board,
        to_move: Side,
        generator: &G,
        mcts: &MctsConfig,
        rng: &mut ChaCha20Rng,
    ) -> Explorer<G> {
        Explorer::new(
            board.clone(),
            to_move,
            generator.clone(),
            mcts.clone(),
            ChaCha20Rng::seed_from_u64(rng.gen()),
        )
    }
}
